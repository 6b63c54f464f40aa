//! Artifact export.
//!
//! # Data Flow
//! ```text
//! signed-tx.boc (read-only)
//!     → encoding.rs (base64, viewer URL)
//!     → exporter.rs (URL on stdout, QR on the terminal)
//!     → operator carries it to the online machine
//! ```

pub mod encoding;
pub mod exporter;

pub use encoding::{decode_export, encode_artifact, export_url};
pub use exporter::{ArtifactExporter, EncodedExport};
