//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! cold-storage.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ColdStorageConfig (validated, immutable)
//!     → CLI flags override individual fields
//!     → handed to the orchestrator and tool wrappers
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the tool runs without a config file
//! - Validation separates syntactic (serde) from semantic checks
//! - Nothing is read from the ambient environment except `RUST_LOG`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    ColdStorageConfig, ExportConfig, ObservabilityConfig, ResolverConfig, ToolchainConfig,
    WalletConfig, WorkspaceConfig, WorkspaceMode,
};
