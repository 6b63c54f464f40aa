//! Transaction preparation and signing orchestration.
//!
//! # Data Flow
//! ```text
//! TransactionRequest + WalletIdentity
//!     → pipeline.rs (preconditions, resolver, builder, signer)
//!     → SignedTransactionArtifact (exists, non-empty)
//!     → export::ArtifactExporter
//! ```
//!
//! # Design Decisions
//! - Strictly sequential; each step's output is confirmed before the next
//! - Errors abort the run; nothing is retried
//! - Tools are generic parameters so tests substitute fakes

pub mod pipeline;

pub use pipeline::{Orchestrator, OrchestratorOptions};
