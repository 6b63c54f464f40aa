//! Checks an exported artifact on either side of the air gap.
//!
//! `decode` turns a scanned URL back into a `.boc` file for broadcast;
//! `compare` confirms an export reproduces the signed file byte for byte
//! before it is carried off the offline machine.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cold_storage::config::schema::DEFAULT_VIEWER_PREFIX;
use cold_storage::config::ObservabilityConfig;
use cold_storage::export::decode_export;
use cold_storage::observability::init_logging;
use cold_storage::{ColdStorageError, ColdStorageResult};

#[derive(Parser)]
#[command(name = "boc-verify")]
#[command(about = "Decode and compare exported signed transactions", long_about = None)]
struct Cli {
    /// Viewer URL prefix the export was made with
    #[arg(long, default_value = DEFAULT_VIEWER_PREFIX)]
    viewer_prefix: String,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the transaction bytes of an export to a file
    Decode {
        /// Export URL or base64 text, `-` for stdin
        input: String,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Check an export decodes to exactly the given file
    Compare {
        /// Export URL or base64 text, `-` for stdin
        input: String,
        /// Signed transaction file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&ObservabilityConfig::default(), cli.verbose) {
        eprintln!("warning: logging unavailable: {}", e);
    }

    let result = match &cli.command {
        Commands::Decode { input, output } => decode(&cli.viewer_prefix, input, output).await,
        Commands::Compare { input, file } => compare(&cli.viewer_prefix, input, file).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn decode(prefix: &str, input: &str, output: &Path) -> ColdStorageResult<bool> {
    let bytes = decode_export(&read_input(input)?, prefix)?;
    tokio::fs::write(output, &bytes).await.map_err(|e| {
        ColdStorageError::Export(format!("cannot write {}: {}", output.display(), e))
    })?;

    tracing::info!(output = %output.display(), bytes = bytes.len(), "Export decoded");
    println!("{} bytes written to {}", bytes.len(), output.display());
    Ok(true)
}

async fn compare(prefix: &str, input: &str, file: &Path) -> ColdStorageResult<bool> {
    let decoded = decode_export(&read_input(input)?, prefix)?;
    let expected = tokio::fs::read(file).await.map_err(|e| {
        ColdStorageError::Export(format!("cannot read {}: {}", file.display(), e))
    })?;

    match first_difference(&decoded, &expected) {
        None => {
            println!("match: {} bytes", expected.len());
            Ok(true)
        }
        Some(offset) => {
            tracing::warn!(
                offset = offset,
                decoded = decoded.len(),
                expected = expected.len(),
                "Export does not match"
            );
            println!(
                "mismatch at byte {} (export {} bytes, file {} bytes)",
                offset,
                decoded.len(),
                expected.len()
            );
            Ok(false)
        }
    }
}

fn read_input(input: &str) -> ColdStorageResult<String> {
    if input != "-" {
        return Ok(input.to_string());
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| ColdStorageError::Export(format!("cannot read stdin: {}", e)))?;
    Ok(text)
}

/// Offset of the first differing byte, `None` if identical.
fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}
