//! External tool boundary.
//!
//! # Data Flow
//! ```text
//! orchestrator
//!     → resolver.rs  (fift -s str-to-addr.fif <dest>)
//!     → builder.rs   (fift -s withdraw.fif | change-validator.fif | dns-renewal.fif)
//!     → signer.rs    (fift -s wallet-v3.fif ... signed-tx)
//! exporter
//!     → renderer.rs  (qr <url>)
//!
//! each one:
//!     → process.rs (spawn, env, cwd, deadline)
//!     → Result<artifact path, ToolError>
//! ```
//!
//! # Design Decisions
//! - Each tool sits behind a trait so the orchestrator runs against fakes
//! - A produced file is verified after every build/sign step; the exit
//!   status is checked as well unless `check_exit_status` is off
//! - Outputs are cleared before each step so stale files never count

pub mod builder;
pub mod fift;
pub mod process;
pub mod renderer;
pub mod resolver;
pub mod signer;
pub mod types;

pub use builder::MessageBuilder;
pub use fift::FiftToolchain;
pub use process::{ToolCommand, ToolOutput};
pub use renderer::{CommandRenderer, QrRenderer, TerminalRenderer};
pub use resolver::{AddressResolver, DestinationResolver, PassthroughResolver};
pub use signer::{SignRequest, TransactionSigner};
pub use types::ToolError;
