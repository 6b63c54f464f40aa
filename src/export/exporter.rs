//! Artifact exporter.

use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::export::encoding::{encode_artifact, export_url};
use crate::tools::QrRenderer;
use crate::wallet::{ColdStorageError, ColdStorageResult, SignedTransactionArtifact};

/// Transport form of a signed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedExport {
    pub artifact: PathBuf,
    pub base64: String,
    pub url: String,
}

/// Encodes a signed artifact, prints its URL and renders it as a QR code.
///
/// The artifact is only ever read.
#[derive(Debug, Clone)]
pub struct ArtifactExporter<R> {
    viewer_prefix: String,
    renderer: R,
}

impl<R: QrRenderer> ArtifactExporter<R> {
    pub fn new(viewer_prefix: impl Into<String>, renderer: R) -> Self {
        Self {
            viewer_prefix: viewer_prefix.into(),
            renderer,
        }
    }

    pub fn viewer_prefix(&self) -> &str {
        &self.viewer_prefix
    }

    /// Export to stdout.
    pub async fn export(&self, artifact: &SignedTransactionArtifact) -> ColdStorageResult<EncodedExport> {
        let encoded = self.encode(artifact).await?;
        {
            let mut stdout = std::io::stdout().lock();
            write_url(&mut stdout, &encoded)?;
        }
        self.render(&encoded).await?;
        Ok(encoded)
    }

    /// Export with the URL written to `out` instead of stdout.
    pub async fn export_to<W: Write>(
        &self,
        artifact: &SignedTransactionArtifact,
        out: &mut W,
    ) -> ColdStorageResult<EncodedExport> {
        let encoded = self.encode(artifact).await?;
        write_url(out, &encoded)?;
        self.render(&encoded).await?;
        Ok(encoded)
    }

    /// Read and encode without any output.
    pub async fn encode(&self, artifact: &SignedTransactionArtifact) -> ColdStorageResult<EncodedExport> {
        let bytes = tokio::fs::read(&artifact.path).await.map_err(|e| {
            ColdStorageError::Export(format!(
                "cannot read signed artifact {}: {}",
                artifact.path.display(),
                e
            ))
        })?;
        if bytes.is_empty() {
            return Err(ColdStorageError::Export(format!(
                "signed artifact {} is empty",
                artifact.path.display()
            )));
        }

        let base64 = encode_artifact(&bytes);
        let url = export_url(&self.viewer_prefix, &base64);

        tracing::debug!(
            artifact = %artifact.path.display(),
            bytes = bytes.len(),
            url_len = url.len(),
            "Artifact encoded"
        );

        Ok(EncodedExport {
            artifact: artifact.path.clone(),
            base64,
            url,
        })
    }

    async fn render(&self, encoded: &EncodedExport) -> ColdStorageResult<()> {
        self.renderer.render(&encoded.url).await.map_err(|e| {
            ColdStorageError::Export(format!(
                "QR rendering failed ({}); the signed artifact is intact at {}",
                e,
                encoded.artifact.display()
            ))
        })
    }
}

fn write_url<W: Write>(out: &mut W, encoded: &EncodedExport) -> ColdStorageResult<()> {
    writeln!(out, "{}", encoded.url)
        .and_then(|_| out.flush())
        .map_err(|e| ColdStorageError::Export(format!("cannot write export URL: {}", e)))
}
