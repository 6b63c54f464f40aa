//! Artifact store.
//!
//! # Data Flow
//! ```text
//! <pk>.pk / <pk>.addr (read-only, see wallet::identity)
//!
//! store.rs: begin_run()
//!     → <root>/runs/<run-id>/            (isolated, default)
//!     → ./                               (shared, legacy)
//!         withdraw.boc | change-validator.boc | dns-renewal.boc
//!         signed-tx.boc
//!
//! journal.rs: <root>/journal.jsonl
//!     → pending line before signing, signed line after
//! ```
//!
//! # Invariants
//! - Every artifact is created fresh per run; stale files are removed first
//! - The unsigned body is single-use and removed once signed
//! - Shared mode allows only one run per directory at a time

pub mod journal;
pub mod store;

pub use journal::{JournalEntry, SigningJournal, SigningStatus};
pub use store::{unsigned_body_file, verify_artifact, ArtifactStore, RunScratch};
