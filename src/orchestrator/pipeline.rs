//! Prepare-and-sign pipeline.
//!
//! # Sequence
//! ```text
//! 1. identity files present          else Configuration
//! 2. action parameters present       else InvalidRequest
//! 3. destination resolves            else InvalidRequest
//! 4. (wallet, seqno) not yet signed  else InvalidRequest
//! 5. builder → body verified         else BuildFailed (signer never runs)
//! 6. body still present              else BuildFailed
//! 7. journal: pending (wallet, seqno) else Configuration (signer never runs)
//! 8. signer → artifact verified      else SignFailed
//! 9. body discarded, journal: signed
//! ```

use tracing::Instrument;

use crate::artifacts::{
    verify_artifact, ArtifactStore, JournalEntry, RunScratch, SigningJournal, SigningStatus,
};
use crate::tools::{AddressResolver, MessageBuilder, SignRequest, ToolError, TransactionSigner};
use crate::wallet::identity::{with_suffix, ADDRESS_EXTENSION};
use crate::wallet::{
    Action, ColdStorageError, ColdStorageResult, SignedTransactionArtifact, TransactionRequest,
    WalletIdentity,
};

/// Behavior switches of a run.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorOptions {
    /// Keep the unsigned body after signing.
    pub keep_unsigned_body: bool,
    /// Sign even if the journal already holds this (wallet, seqno).
    pub allow_resign: bool,
}

/// Sequences resolver, builder and signer for one wallet.
pub struct Orchestrator<B, S, R> {
    builder: B,
    signer: S,
    resolver: R,
    store: ArtifactStore,
    journal: Option<SigningJournal>,
    options: OrchestratorOptions,
}

impl<B, S, R> Orchestrator<B, S, R>
where
    B: MessageBuilder,
    S: TransactionSigner,
    R: AddressResolver,
{
    pub fn new(builder: B, signer: S, resolver: R, store: ArtifactStore) -> Self {
        Self {
            builder,
            signer,
            resolver,
            store,
            journal: None,
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_journal(mut self, journal: SigningJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Build (when needed) and sign one transaction.
    ///
    /// On success the returned artifact exists and is non-empty. Nothing is
    /// retried: a failed run must be inspected by the operator before the
    /// same seqno is signed again.
    pub async fn prepare_and_sign(
        &self,
        request: &TransactionRequest,
        identity: &WalletIdentity,
    ) -> ColdStorageResult<SignedTransactionArtifact> {
        check_identity_files(identity)?;
        request.validate()?;

        let destination = self
            .resolver
            .resolve(&request.destination)
            .await
            .map_err(|e| {
                ColdStorageError::InvalidRequest(format!(
                    "destination {} could not be resolved: {}",
                    request.destination, e
                ))
            })?;

        let wallet = identity.address().to_raw();
        self.check_not_signed(&wallet, request.seqno).await?;

        let scratch = self.store.begin_run().await.map_err(|e| {
            ColdStorageError::Configuration(format!(
                "cannot create run directory under {}: {}",
                self.store.root().display(),
                e
            ))
        })?;

        let span = tracing::info_span!(
            "prepare_and_sign",
            run_id = %scratch.run_id(),
            action = request.action.name(),
            seqno = request.seqno,
        );

        async {
            tracing::info!(
                destination = %destination,
                amount = %request.amount,
                dir = %scratch.dir().display(),
                "Preparing transaction"
            );

            let body = if request.action.needs_message_body() {
                Some(self.build_body(request, &scratch).await?)
            } else {
                None
            };

            let comment = match &request.action {
                Action::Transfer { comment } => comment.as_deref(),
                _ => None,
            };

            let sign_request = SignRequest {
                identity,
                destination: &destination,
                seqno: request.seqno,
                amount: request.amount,
                timeout_secs: request.timeout_secs,
                body: body.as_deref(),
                comment,
            };

            let attempt = JournalEntry::new(
                wallet.clone(),
                request.seqno,
                request.action.name(),
                scratch.run_id(),
                &scratch.signed_artifact_path(),
            );
            if let Some(journal) = &self.journal {
                journal
                    .record(&attempt.clone().with_status(SigningStatus::Pending))
                    .await
                    .map_err(|e| {
                        ColdStorageError::Configuration(format!(
                            "cannot write signing journal {}; nothing was signed: {}",
                            journal.path().display(),
                            e
                        ))
                    })?;
            }

            let signed = self
                .signer
                .sign(&sign_request, &scratch)
                .await
                .map_err(sign_failed)?;
            let len = verify_artifact(&signed).await.map_err(sign_failed)?;

            if let Some(body) = &body {
                if !self.options.keep_unsigned_body {
                    if let Err(e) = scratch.discard(body).await {
                        tracing::warn!(
                            body = %body.display(),
                            error = %e,
                            "Could not remove unsigned body"
                        );
                    }
                }
            }

            if let Some(journal) = &self.journal {
                let entry = JournalEntry {
                    artifact: signed.clone(),
                    ..attempt
                };
                journal.record(&entry).await.map_err(|e| {
                    ColdStorageError::Configuration(format!(
                        "transaction signed to {} but the journal {} could not be updated: {}; \
                         seqno {} stays blocked by the pending entry of run {}",
                        signed.display(),
                        journal.path().display(),
                        e,
                        request.seqno,
                        scratch.run_id()
                    ))
                })?;
            }

            tracing::info!(artifact = %signed.display(), bytes = len, "Signed transaction ready");

            Ok::<_, ColdStorageError>(SignedTransactionArtifact {
                path: signed,
                run_id: scratch.run_id().to_string(),
                len,
            })
        }
        .instrument(span)
        .await
    }

    async fn build_body(
        &self,
        request: &TransactionRequest,
        scratch: &RunScratch,
    ) -> ColdStorageResult<std::path::PathBuf> {
        let step = format!("{} message body", request.action.name());
        let build_failed = |e: ToolError| ColdStorageError::BuildFailed {
            step: step.clone(),
            reason: e.to_string(),
        };

        let body = self
            .builder
            .build(&request.action, scratch)
            .await
            .map_err(build_failed)?;

        // The body must still be there when the signer is about to embed it.
        verify_artifact(&body).await.map_err(build_failed)?;
        Ok(body)
    }

    async fn check_not_signed(&self, wallet: &str, seqno: u32) -> ColdStorageResult<()> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };

        let previous = journal.find(wallet, seqno).await.map_err(|e| {
            ColdStorageError::Configuration(format!(
                "cannot read signing journal {}: {}",
                journal.path().display(),
                e
            ))
        })?;

        match previous {
            Some(entry) if entry.is_pending() && !self.options.allow_resign => {
                Err(ColdStorageError::InvalidRequest(format!(
                    "seqno {} of wallet {} was handed to the signer in run {} without a \
                     confirmed result; check {} before signing again. Pass --allow-resign \
                     only if no signed transaction for it exists",
                    seqno,
                    wallet,
                    entry.run_id,
                    entry.artifact.display()
                )))
            }
            Some(entry) if !self.options.allow_resign => Err(ColdStorageError::InvalidRequest(format!(
                "seqno {} of wallet {} was already signed ({} in run {}, artifact {}); \
                 broadcast at most one of them. Pass --allow-resign only if that \
                 transaction was destroyed",
                seqno,
                wallet,
                entry.action,
                entry.run_id,
                entry.artifact.display()
            ))),
            Some(entry) => {
                tracing::warn!(
                    seqno = seqno,
                    previous_run = %entry.run_id,
                    "Signing a seqno that was signed before"
                );
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn sign_failed(e: ToolError) -> ColdStorageError {
    ColdStorageError::SignFailed {
        reason: e.to_string(),
    }
}

fn check_identity_files(identity: &WalletIdentity) -> ColdStorageResult<()> {
    let key = identity.key_path();
    if !key.is_file() {
        return Err(ColdStorageError::Configuration(format!(
            "private key file not found: {}",
            key.display()
        )));
    }
    let addr = with_suffix(identity.key_base(), ADDRESS_EXTENSION);
    if !addr.is_file() {
        return Err(ColdStorageError::Configuration(format!(
            "address file not found: {}",
            addr.display()
        )));
    }
    Ok(())
}
