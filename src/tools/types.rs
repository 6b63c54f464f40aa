//! Failure reasons of external tool invocations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single external invocation did not deliver its output.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process ran past its deadline and was killed.
    #[error("{program} did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    /// The process exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },

    /// The expected output file does not exist.
    #[error("expected output {} was not produced", path.display())]
    MissingOutput { path: PathBuf },

    /// The expected output file exists but is empty.
    #[error("output {} is empty", path.display())]
    EmptyOutput { path: PathBuf },

    /// Filesystem access around the invocation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool cannot handle the request.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The tool ran but its answer is unusable.
    #[error("rejected: {0}")]
    Rejected(String),
}
