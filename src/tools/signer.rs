//! Transaction signer boundary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::artifacts::store::SIGNED_OUTPUT_BASE;
use crate::artifacts::{verify_artifact, RunScratch};
use crate::tools::fift::FiftToolchain;
use crate::tools::process::absolutize;
use crate::tools::types::ToolError;
use crate::wallet::{Address, Amount, WalletIdentity};

/// Everything the signer needs for one transaction.
#[derive(Debug, Clone)]
pub struct SignRequest<'a> {
    pub identity: &'a WalletIdentity,
    pub destination: &'a Address,
    pub seqno: u32,
    pub amount: Amount,
    pub timeout_secs: u64,
    /// Unsigned body to embed as the payload.
    pub body: Option<&'a Path>,
    /// Plain-text comment, transfers only.
    pub comment: Option<&'a str>,
}

/// Produces the signed transaction.
#[allow(async_fn_in_trait)]
pub trait TransactionSigner {
    /// Sign into `scratch` and return the signed artifact's path.
    async fn sign(&self, request: &SignRequest<'_>, scratch: &RunScratch) -> Result<PathBuf, ToolError>;
}

impl FiftToolchain {
    /// Positional and option arguments for the wallet script:
    /// `<key> <dest> <wallet_id> <seqno> <amount> --timeout <t> [-B <body> | --comment <c>] <savefile>`
    ///
    /// Paths are passed through as-is, including non-UTF-8 ones.
    pub fn sign_args(&self, request: &SignRequest<'_>, key: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            key.into(),
            request.destination.as_str().into(),
            request.identity.wallet_id().to_string().into(),
            request.seqno.to_string().into(),
            request.amount.to_string().into(),
            "--timeout".into(),
            request.timeout_secs.to_string().into(),
        ];
        if let Some(body) = request.body {
            args.push("-B".into());
            args.push(body.into());
        } else if let Some(comment) = request.comment {
            args.push("--comment".into());
            args.push(comment.into());
        }
        args.push(SIGNED_OUTPUT_BASE.into());
        args
    }
}

impl TransactionSigner for FiftToolchain {
    async fn sign(&self, request: &SignRequest<'_>, scratch: &RunScratch) -> Result<PathBuf, ToolError> {
        let output = scratch.signed_artifact_path();
        scratch.clear_stale(&output).await?;

        let key = absolutize(request.identity.key_base()).map_err(|source| ToolError::Io {
            path: request.identity.key_base().to_path_buf(),
            source,
        })?;

        let command = self
            .command(&self.scripts.wallet, Some(scratch.dir()))
            .args(self.sign_args(request, &key));
        self.run_script(&command).await?;

        verify_artifact(&output).await?;
        tracing::info!(
            seqno = request.seqno,
            destination = %request.destination,
            artifact = %output.display(),
            "Transaction signed"
        );
        Ok(output)
    }
}
