//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the signer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wallet::types::{DEFAULT_VALIDITY_TIMEOUT_SECS, DEFAULT_WALLET_ID};

/// Default inspection page the export URL points at.
pub const DEFAULT_VIEWER_PREFIX: &str = "https://ton-defi-org.github.io/boc-parser-estimator/#";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ColdStorageConfig {
    /// Script interpreter and its scripts.
    pub toolchain: ToolchainConfig,

    /// Wallet contract parameters.
    pub wallet: WalletConfig,

    /// Where run artifacts are written.
    pub workspace: WorkspaceConfig,

    /// Export URL and QR rendering.
    pub export: ExportConfig,

    /// Destination address normalization.
    pub resolver: ResolverConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// External script interpreter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Interpreter binary (e.g., "./fift" or "fift").
    pub fift_binary: String,

    /// Interpreter library directory, passed to every child as `FIFTPATH`.
    pub fift_lib_path: Option<PathBuf>,

    /// Directory holding the builder/signer/resolver scripts.
    pub scripts_dir: PathBuf,

    /// Signer script name.
    pub wallet_script: String,

    /// Builder script for withdraw bodies.
    pub withdraw_script: String,

    /// Builder script for validator change bodies.
    pub change_validator_script: String,

    /// Builder script for DNS renewal bodies.
    pub dns_renewal_script: String,

    /// Address normalization script.
    pub resolver_script: String,

    /// Upper bound on any single child process, in seconds.
    pub process_timeout_secs: u64,

    /// Treat a non-zero exit status as failure even if the output exists.
    pub check_exit_status: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            fift_binary: "fift".to_string(),
            fift_lib_path: None,
            scripts_dir: PathBuf::from("."),
            wallet_script: "wallet-v3.fif".to_string(),
            withdraw_script: "withdraw.fif".to_string(),
            change_validator_script: "change-validator.fif".to_string(),
            dns_renewal_script: "dns-renewal.fif".to_string(),
            resolver_script: "str-to-addr.fif".to_string(),
            process_timeout_secs: 120,
            check_exit_status: true,
        }
    }
}

/// Wallet contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Subwallet id of the wallet contract.
    pub wallet_id: u32,

    /// Default validity window of signed messages in seconds.
    pub validity_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wallet_id: DEFAULT_WALLET_ID,
            validity_timeout_secs: DEFAULT_VALIDITY_TIMEOUT_SECS,
        }
    }
}

/// How run directories are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceMode {
    /// Fresh `<root>/runs/<run-id>/` per invocation.
    Isolated,
    /// Fixed names in the working directory. One run at a time only.
    Shared,
}

/// Artifact workspace configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub mode: WorkspaceMode,

    /// Root of isolated run directories and the signing journal.
    pub root: PathBuf,

    /// Keep the unsigned body after signing (for auditing).
    pub keep_unsigned_body: bool,

    /// Record every signed (wallet, seqno) and refuse to sign it twice.
    pub journal: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            mode: WorkspaceMode::Isolated,
            root: PathBuf::from(".cold-storage"),
            keep_unsigned_body: false,
            journal: true,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prefix of the inspection URL; the base64 artifact is appended.
    pub viewer_prefix: String,

    /// Draw a QR code of the URL in the terminal.
    pub render: bool,

    /// Renderer command and leading arguments; the URL is appended.
    pub renderer: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            viewer_prefix: DEFAULT_VIEWER_PREFIX.to_string(),
            render: true,
            renderer: vec!["qr".to_string()],
        }
    }
}

/// Address resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Run the resolver script on the destination before building.
    pub enabled: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
