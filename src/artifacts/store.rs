//! Run directories and artifact checks.
//!
//! Every invocation gets a `RunScratch`: the directory the external tools
//! run in and the fixed file names they read and write there. In isolated
//! mode that directory is unique per run, so two signing sessions can never
//! trample each other's files. Shared mode keeps the historic behavior of
//! writing straight into the working directory; only one run may be active
//! in a directory at a time.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::{WorkspaceConfig, WorkspaceMode};
use crate::tools::process::absolutize;
use crate::tools::types::ToolError;
use crate::wallet::types::Action;

/// Base name handed to the signer; it appends `.boc` itself.
pub const SIGNED_OUTPUT_BASE: &str = "signed-tx";

/// File the signer actually writes.
pub const SIGNED_OUTPUT_FILE: &str = "signed-tx.boc";

/// Journal file name under the workspace root.
pub const JOURNAL_FILE: &str = "journal.jsonl";

/// Unsigned body file written by the builder for `action`.
pub fn unsigned_body_file(action: &Action) -> Option<&'static str> {
    match action {
        Action::Withdraw { .. } => Some("withdraw.boc"),
        Action::SetValidator { .. } => Some("change-validator.boc"),
        Action::DnsRenewal => Some("dns-renewal.boc"),
        Action::Transfer { .. } => None,
    }
}

/// Hands out run directories.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    mode: WorkspaceMode,
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(mode: WorkspaceMode, root: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            root: root.into(),
        }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::new(config.mode, config.root.clone())
    }

    pub fn mode(&self) -> WorkspaceMode {
        self.mode
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn journal_path(&self) -> PathBuf {
        self.root.join(JOURNAL_FILE)
    }

    /// Allocate the scratch location for a new run.
    pub async fn begin_run(&self) -> io::Result<RunScratch> {
        let run_id = Uuid::new_v4().to_string();
        let dir = match self.mode {
            WorkspaceMode::Isolated => {
                let dir = absolutize(&self.root.join("runs").join(&run_id))?;
                tokio::fs::create_dir_all(&dir).await?;
                dir
            }
            WorkspaceMode::Shared => std::env::current_dir()?,
        };

        tracing::debug!(
            run_id = %run_id,
            dir = %dir.display(),
            mode = ?self.mode,
            "Run scratch allocated"
        );

        Ok(RunScratch { run_id, dir })
    }
}

/// Where one run's artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunScratch {
    run_id: String,
    dir: PathBuf,
}

impl RunScratch {
    /// Scratch rooted at an existing directory, for callers managing their own.
    pub fn at(run_id: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            run_id: run_id.into(),
            dir: dir.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Working directory for the external tools.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn unsigned_body_path(&self, action: &Action) -> Option<PathBuf> {
        unsigned_body_file(action).map(|name| self.dir.join(name))
    }

    pub fn signed_artifact_path(&self) -> PathBuf {
        self.dir.join(SIGNED_OUTPUT_FILE)
    }

    /// Remove a leftover output so it cannot pass for a fresh one.
    pub async fn clear_stale(&self, path: &Path) -> Result<(), ToolError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::warn!(path = %path.display(), "Removed stale artifact from a previous run");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ToolError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Delete a consumed intermediate artifact.
    pub async fn discard(&self, path: &Path) -> io::Result<()> {
        match tokio::fs::remove_file(path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Check an artifact exists and is non-empty; returns its size.
pub async fn verify_artifact(path: &Path) -> Result<u64, ToolError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        Ok(meta) if meta.is_file() => Err(ToolError::EmptyOutput {
            path: path.to_path_buf(),
        }),
        Ok(_) => Err(ToolError::MissingOutput {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ToolError::MissingOutput {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ToolError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
