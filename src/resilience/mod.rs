//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! External process:
//!     → timeouts.rs (enforce a deadline, kill on expiry)
//!     → failure surfaces to the operator
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - No retries: re-running the signer with the same seqno can yield two
//!   valid transactions, so a failed step is reported, never repeated

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineExceeded};
