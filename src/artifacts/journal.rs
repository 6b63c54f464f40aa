//! Signing journal.
//!
//! An append-only JSON-lines record of every transaction this machine has
//! signed. Two signed transactions for the same (wallet, seqno) are both
//! valid and only one may ever be broadcast, so the orchestrator consults
//! the journal before signing and refuses a repeat unless told otherwise.
//!
//! A `pending` line is written before the signer starts and a `signed` line
//! once its output is verified. A seqno with only a pending line may or may
//! not have been signed and is refused just the same.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;

/// Where a signing attempt got to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningStatus {
    /// Signer started; outcome unknown.
    Pending,
    /// Signed output verified.
    #[default]
    Signed,
}

/// One signing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Wallet address in raw form.
    pub wallet: String,
    pub seqno: u32,
    pub action: String,
    pub run_id: String,
    pub artifact: PathBuf,
    pub signed_at: u64,
    #[serde(default)]
    pub status: SigningStatus,
}

impl JournalEntry {
    pub fn new(
        wallet: impl Into<String>,
        seqno: u32,
        action: &str,
        run_id: &str,
        artifact: &Path,
    ) -> Self {
        let signed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            wallet: wallet.into(),
            seqno,
            action: action.to_string(),
            run_id: run_id.to_string(),
            artifact: artifact.to_path_buf(),
            signed_at,
            status: SigningStatus::Signed,
        }
    }

    pub fn with_status(mut self, status: SigningStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == SigningStatus::Pending
    }
}

/// Journal stored at a fixed path.
#[derive(Debug, Clone)]
pub struct SigningJournal {
    path: PathBuf,
}

impl SigningJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries; a missing journal is empty.
    pub async fn entries(&self) -> io::Result<Vec<JournalEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(line).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{} line {}: {}", self.path.display(), i + 1, e),
                )
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Most recent entry for `(wallet, seqno)`.
    pub async fn find(&self, wallet: &str, seqno: u32) -> io::Result<Option<JournalEntry>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .rev()
            .find(|e| e.wallet == wallet && e.seqno == seqno))
    }

    pub async fn record(&self, entry: &JournalEntry) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut line = serde_json::to_string(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(
            wallet = %entry.wallet,
            seqno = entry.seqno,
            run_id = %entry.run_id,
            status = ?entry.status,
            "Signing recorded in journal"
        );
        Ok(())
    }
}
