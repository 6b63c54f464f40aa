//! cold-storage (v1)
//!
//! Prepares and signs one wallet transaction on an offline machine.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI flags + cold-storage.toml
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────────┐   ┌─────────┐   ┌────────┐
//!   │ resolver │──▶│   builder    │──▶│ signer  │──▶│ verify │
//!   │ (script) │   │ (if needed)  │   │ (fift)  │   │ output │
//!   └──────────┘   └──────────────┘   └─────────┘   └───┬────┘
//!                                                       │
//!                                                       ▼
//!                                   ┌──────────────────────────────────┐
//!                                   │ exporter: URL on stdout, QR code │
//!                                   └──────────────────────────────────┘
//! ```
//!
//! Exit codes: 0 success, 2 invalid request, 3 configuration,
//! 4 build failed, 5 signing failed, 6 export failed.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use cold_storage::artifacts::{ArtifactStore, SigningJournal};
use cold_storage::config::{load_or_default, ColdStorageConfig, WorkspaceMode};
use cold_storage::export::{ArtifactExporter, EncodedExport};
use cold_storage::observability::init_logging;
use cold_storage::orchestrator::{Orchestrator, OrchestratorOptions};
use cold_storage::tools::{DestinationResolver, FiftToolchain, TerminalRenderer};
use cold_storage::wallet::{
    Action, Address, Amount, ColdStorageError, ColdStorageResult, SignedTransactionArtifact,
    TransactionRequest, WalletIdentity,
};

/// Exit code for an unusable configuration file.
const CONFIG_EXIT_CODE: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "cold-storage")]
#[command(version, about = "Prepare and sign a wallet transaction offline", long_about = None)]
struct Cli {
    /// What the transaction does
    #[arg(short, long, value_enum)]
    action: ActionKind,

    /// Private key filename without extension (reads <name>.pk and <name>.addr)
    #[arg(short, long, alias = "pk_filename")]
    pk_filename: PathBuf,

    /// Current on-chain seqno of the wallet
    #[arg(short, long)]
    seqno: u32,

    /// Coins attached to the message
    #[arg(short, long, alias = "ton_amount")]
    ton_amount: String,

    /// Destination address
    #[arg(short, long)]
    destination: String,

    /// Amount to withdraw (withdraw only)
    #[arg(short, long, alias = "withdraw_amount")]
    withdraw_amount: Option<String>,

    /// New validator wallet address (set-validator only)
    #[arg(short, long, alias = "new_validator_address")]
    new_validator_address: Option<String>,

    /// Text comment (transfer only)
    #[arg(short, long)]
    comment: Option<String>,

    /// Validity window of the signed message in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write artifacts into the working directory instead of a run directory
    #[arg(long)]
    shared_workdir: bool,

    /// Do not draw the QR code
    #[arg(long)]
    no_qr: bool,

    /// Do not run the address resolver on the destination
    #[arg(long)]
    no_resolve: bool,

    /// Sign a seqno the journal already holds
    #[arg(long)]
    allow_resign: bool,

    /// Print a JSON summary instead of the URL and QR code
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ActionKind {
    Withdraw,
    SetValidator,
    Transfer,
    DnsRenewal,
}

#[derive(Serialize)]
struct Summary<'a> {
    run_id: &'a str,
    action: &'static str,
    seqno: u32,
    bytes: u64,
    #[serde(flatten)]
    export: &'a EncodedExport,
}

#[derive(Serialize)]
struct Failure {
    kind: &'static str,
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: configuration: {}", e);
            return ExitCode::from(CONFIG_EXIT_CODE);
        }
    };
    apply_overrides(&mut config, &cli);

    if let Err(e) = init_logging(&config.observability, cli.verbose) {
        eprintln!("warning: logging unavailable: {}", e);
    }

    tracing::info!(
        action = ?cli.action,
        seqno = cli.seqno,
        workspace = ?config.workspace.mode,
        "cold-storage v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "Run failed");
            if cli.json {
                let failure = Failure {
                    kind: e.kind(),
                    message: e.to_string(),
                };
                if let Ok(line) = serde_json::to_string(&failure) {
                    println!("{}", line);
                }
            }
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn apply_overrides(config: &mut ColdStorageConfig, cli: &Cli) {
    if cli.shared_workdir {
        config.workspace.mode = WorkspaceMode::Shared;
    }
    if cli.no_qr || cli.json {
        config.export.render = false;
    }
    if cli.no_resolve {
        config.resolver.enabled = false;
    }
}

async fn run(cli: &Cli, config: &ColdStorageConfig) -> ColdStorageResult<()> {
    // Key files first: a missing key is reported even if parameters are off too.
    let identity = WalletIdentity::load(&cli.pk_filename, config.wallet.wallet_id)?;
    let request = build_request(cli, config)?;

    let fift = FiftToolchain::from_config(&config.toolchain).map_err(|e| {
        ColdStorageError::Configuration(format!("cannot locate the fift toolchain: {}", e))
    })?;
    let resolver = if config.resolver.enabled {
        DestinationResolver::Script(fift.clone())
    } else {
        DestinationResolver::Passthrough
    };

    let store = ArtifactStore::from_config(&config.workspace);
    let options = OrchestratorOptions {
        keep_unsigned_body: config.workspace.keep_unsigned_body,
        allow_resign: cli.allow_resign,
    };
    let mut orchestrator =
        Orchestrator::new(fift.clone(), fift.clone(), resolver, store.clone()).with_options(options);
    if config.workspace.journal {
        orchestrator = orchestrator.with_journal(SigningJournal::new(store.journal_path()));
    }

    let artifact = orchestrator.prepare_and_sign(&request, &identity).await?;

    let renderer = TerminalRenderer::from_config(&config.export, fift.timeout());
    let exporter = ArtifactExporter::new(config.export.viewer_prefix.clone(), renderer);

    if cli.json {
        let encoded = exporter.encode(&artifact).await?;
        print_summary(&request, &artifact, &encoded)
    } else {
        exporter.export(&artifact).await?;
        eprintln!("signed transaction: {}", artifact.path.display());
        Ok(())
    }
}

fn build_request(cli: &Cli, config: &ColdStorageConfig) -> ColdStorageResult<TransactionRequest> {
    if cli.comment.is_some() && cli.action != ActionKind::Transfer {
        tracing::warn!(action = ?cli.action, "Comment ignored; only transfers carry one");
    }

    let action = match cli.action {
        ActionKind::Withdraw => Action::Withdraw {
            withdraw_amount: cli.withdraw_amount.as_deref().map(Amount::parse).transpose()?,
        },
        ActionKind::SetValidator => Action::SetValidator {
            new_validator: cli
                .new_validator_address
                .as_deref()
                .map(Address::parse)
                .transpose()?,
        },
        ActionKind::Transfer => Action::Transfer {
            comment: cli.comment.clone(),
        },
        ActionKind::DnsRenewal => Action::DnsRenewal,
    };

    let amount = Amount::parse(&cli.ton_amount)?;
    let destination = Address::parse(&cli.destination)?;
    let timeout = cli.timeout.unwrap_or(config.wallet.validity_timeout_secs);

    Ok(TransactionRequest::new(action, cli.seqno, amount, destination).with_timeout(timeout))
}

fn print_summary(
    request: &TransactionRequest,
    artifact: &SignedTransactionArtifact,
    encoded: &EncodedExport,
) -> ColdStorageResult<()> {
    let summary = Summary {
        run_id: &artifact.run_id,
        action: request.action.name(),
        seqno: request.seqno,
        bytes: artifact.len,
        export: encoded,
    };
    let line = serde_json::to_string(&summary)
        .map_err(|e| ColdStorageError::Export(format!("cannot serialize summary: {}", e)))?;
    println!("{}", line);
    Ok(())
}
