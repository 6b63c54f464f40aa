//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! orchestrator / tools / export produce:
//!     → logging.rs (structured log events on stderr)
//!
//! Every event of a run carries the run_id span field, so an operator can
//! reconstruct one signing session from a shared log.
//! ```

pub mod logging;

pub use logging::init_logging;
