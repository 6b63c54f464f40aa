//! Cold-storage transaction preparation and signing.
//!
//! Runs on the offline machine. Builds the message body an action needs,
//! has it signed by the wallet's offline key and exports the signed
//! transaction as a URL and QR code for broadcast from an online machine.

// Domain
pub mod wallet;
pub mod orchestrator;
pub mod export;

// External processes and their outputs
pub mod tools;
pub mod artifacts;

// Cross-cutting concerns
pub mod config;
pub mod observability;
pub mod resilience;

pub use config::schema::ColdStorageConfig;
pub use orchestrator::Orchestrator;
pub use wallet::{ColdStorageError, ColdStorageResult};
