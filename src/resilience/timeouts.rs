//! Timeout enforcement.
//!
//! # Responsibilities
//! - Put a deadline on every external process
//! - Report which operation ran out of time
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - The timed-out future is dropped, which kills the child (`kill_on_drop`)

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// An operation did not finish before its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineExceeded {
    pub operation: String,
    pub limit: Duration,
}

impl std::fmt::Display for DeadlineExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} did not finish within {}s",
            self.operation,
            self.limit.as_secs()
        )
    }
}

impl std::error::Error for DeadlineExceeded {}

/// Run `fut` with a deadline.
pub async fn with_deadline<F, T>(operation: &str, limit: Duration, fut: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    match timeout(limit, fut).await {
        Ok(value) => Ok(value),
        Err(_) => {
            tracing::warn!(
                operation = operation,
                limit_secs = limit.as_secs(),
                "Operation timed out"
            );
            Err(DeadlineExceeded {
                operation: operation.to_string(),
                limit,
            })
        }
    }
}
