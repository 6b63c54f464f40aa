//! Wallet domain types.
//!
//! # Data Flow
//! ```text
//! CLI arguments
//!     → amount.rs / address.rs (exact parsing, syntax checks)
//!     → identity.rs (<pk>.pk + <pk>.addr on disk)
//!     → types.rs (Action, TransactionRequest)
//!     → orchestrator
//! ```
//!
//! # Security Constraints
//! - Private keys are never read by this crate, only located
//! - Seqno correctness is a caller precondition; nothing here is online

pub mod address;
pub mod amount;
pub mod identity;
pub mod types;

pub use address::Address;
pub use amount::Amount;
pub use identity::WalletIdentity;
pub use types::{
    Action, ColdStorageError, ColdStorageResult, SignedTransactionArtifact, TransactionRequest,
};
