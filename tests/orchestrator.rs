//! End-to-end runs of the prepare-and-sign pipeline with fake tools.

use tempfile::TempDir;

use cold_storage::artifacts::{SigningJournal, SigningStatus};
use cold_storage::config::schema::DEFAULT_VIEWER_PREFIX;
use cold_storage::export::{decode_export, ArtifactExporter};
use cold_storage::orchestrator::{Orchestrator, OrchestratorOptions};
use cold_storage::tools::{PassthroughResolver, TerminalRenderer};
use cold_storage::wallet::identity::{with_suffix, ADDRESS_EXTENSION, KEY_EXTENSION};
use cold_storage::wallet::{Action, Amount, ColdStorageError, TransactionRequest};

mod common;
use common::*;

type FakeOrchestrator<R = PassthroughResolver> = Orchestrator<FakeBuilder, FakeSigner, R>;

fn orchestrator(
    dir: &TempDir,
    build: BuildBehavior,
    sign: SignBehavior,
) -> (FakeOrchestrator, FakeSigner, CallLog) {
    let log = CallLog::default();
    let signer = FakeSigner::new(sign, &log);
    let orchestrator = Orchestrator::new(
        FakeBuilder::new(build, &log),
        signer.clone(),
        PassthroughResolver,
        isolated_store(dir.path()),
    );
    (orchestrator, signer, log)
}

fn request(action: Action, seqno: u32, amount: &str) -> TransactionRequest {
    TransactionRequest::new(action, seqno, Amount::parse(amount).unwrap(), destination())
}

fn withdraw(amount: &str) -> Action {
    Action::Withdraw {
        withdraw_amount: Some(Amount::parse(amount).unwrap()),
    }
}

#[tokio::test]
async fn test_transfer_signs_without_building() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, signer, log) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);

    let action = Action::Transfer {
        comment: Some("hello".into()),
    };
    let artifact = orchestrator
        .prepare_and_sign(&request(action, 3, "1.0"), &identity)
        .await
        .unwrap();

    assert_eq!(log.calls(), vec!["sign"]);
    assert_eq!(artifact.len, SIGNED_BYTES.len() as u64);
    assert_eq!(std::fs::read(&artifact.path).unwrap(), SIGNED_BYTES);
    assert!(artifact.path.starts_with(dir.path().join("workspace").join("runs")));

    let call = signer.last_call().unwrap();
    assert_eq!(call.seqno, 3);
    assert_eq!(call.amount, "1");
    assert_eq!(call.timeout_secs, 86_400);
    assert_eq!(call.destination, DESTINATION);
    assert_eq!(call.body, None);
    assert_eq!(call.comment.as_deref(), Some("hello"));

    let exporter = ArtifactExporter::new(DEFAULT_VIEWER_PREFIX, TerminalRenderer::Disabled);
    let mut stdout = Vec::new();
    let encoded = exporter.export_to(&artifact, &mut stdout).await.unwrap();
    assert!(encoded.url.starts_with(DEFAULT_VIEWER_PREFIX));
    assert!(String::from_utf8(stdout).unwrap().starts_with(DEFAULT_VIEWER_PREFIX));
    assert_eq!(decode_export(&encoded.url, DEFAULT_VIEWER_PREFIX).unwrap(), SIGNED_BYTES);
}

#[tokio::test]
async fn test_plain_transfer_leaves_only_signed_output() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, signer, log) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);

    let artifact = orchestrator
        .prepare_and_sign(&request(Action::Transfer { comment: None }, 3, "1.0"), &identity)
        .await
        .unwrap();

    assert_eq!(log.calls(), vec!["sign"]);
    let call = signer.last_call().unwrap();
    assert_eq!(call.body, None);
    assert_eq!(call.comment, None);

    let run_dir = artifact.path.parent().unwrap();
    let mut files: Vec<String> = std::fs::read_dir(run_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["signed-tx.boc"]);

    let exporter = ArtifactExporter::new(DEFAULT_VIEWER_PREFIX, TerminalRenderer::Disabled);
    let encoded = exporter.export_to(&artifact, &mut Vec::new()).await.unwrap();
    assert!(encoded.url.starts_with(DEFAULT_VIEWER_PREFIX));
}

#[tokio::test]
async fn test_withdraw_builds_then_signs_with_body() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, signer, log) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);

    let artifact = orchestrator
        .prepare_and_sign(&request(withdraw("250"), 5, "1"), &identity)
        .await
        .unwrap();

    assert_eq!(log.calls(), vec!["build withdraw", "sign"]);
    let call = signer.last_call().unwrap();
    let body = call.body.unwrap();
    assert!(call.body_existed);
    assert!(body.ends_with("withdraw.boc"));
    assert_eq!(body.parent(), artifact.path.parent());
    assert_eq!(call.comment, None);

    // Consumed bodies do not outlive the run.
    assert!(!body.exists());
    assert!(artifact.path.exists());
}

#[tokio::test]
async fn test_unsigned_body_kept_on_request() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, signer, _) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);
    let orchestrator = orchestrator.with_options(OrchestratorOptions {
        keep_unsigned_body: true,
        allow_resign: false,
    });

    orchestrator
        .prepare_and_sign(&request(Action::DnsRenewal, 1, "0.05"), &identity)
        .await
        .unwrap();

    let body = signer.last_call().unwrap().body.unwrap();
    assert!(body.ends_with("dns-renewal.boc"));
    assert!(body.exists());
}

#[tokio::test]
async fn test_missing_body_stops_before_signing() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, _, log) = orchestrator(&dir, BuildBehavior::NoOutput, SignBehavior::WriteSigned);

    let err = orchestrator
        .prepare_and_sign(&request(withdraw("250"), 5, "1"), &identity)
        .await
        .unwrap_err();

    match err {
        ColdStorageError::BuildFailed { step, .. } => assert!(step.contains("withdraw")),
        other => panic!("expected BuildFailed, got {other:?}"),
    }
    assert_eq!(log.count("sign"), 0);
}

#[tokio::test]
async fn test_deleted_body_stops_before_signing() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, _, log) =
        orchestrator(&dir, BuildBehavior::WriteThenDelete, SignBehavior::WriteSigned);

    let err = orchestrator
        .prepare_and_sign(&request(withdraw("250"), 5, "1"), &identity)
        .await
        .unwrap_err();

    assert!(matches!(err, ColdStorageError::BuildFailed { .. }));
    assert_eq!(log.calls(), vec!["build withdraw"]);
}

#[tokio::test]
async fn test_builder_failure_is_build_failed() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, _, log) = orchestrator(&dir, BuildBehavior::Fail, SignBehavior::WriteSigned);

    let action = Action::SetValidator {
        new_validator: Some(destination()),
    };
    let err = orchestrator
        .prepare_and_sign(&request(action, 2, "1"), &identity)
        .await
        .unwrap_err();

    assert!(matches!(err, ColdStorageError::BuildFailed { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(log.calls(), vec!["build set-validator"]);
}

#[tokio::test]
async fn test_missing_signed_output_is_sign_failed() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, _, _) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::NoOutput);

    let err = orchestrator
        .prepare_and_sign(&request(Action::Transfer { comment: None }, 1, "1"), &identity)
        .await
        .unwrap_err();

    assert!(matches!(err, ColdStorageError::SignFailed { .. }));
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn test_missing_key_files_are_configuration_errors() {
    let actions = [
        withdraw("250"),
        Action::Withdraw { withdraw_amount: None },
        Action::SetValidator { new_validator: None },
        Action::Transfer { comment: None },
        Action::DnsRenewal,
    ];

    for extension in [KEY_EXTENSION, ADDRESS_EXTENSION] {
        for action in actions.clone() {
            let dir = TempDir::new().unwrap();
            let identity = identity(dir.path());
            std::fs::remove_file(with_suffix(identity.key_base(), extension)).unwrap();
            let (orchestrator, _, log) =
                orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);

            let err = orchestrator
                .prepare_and_sign(&request(action.clone(), 1, "1"), &identity)
                .await
                .unwrap_err();

            assert!(
                matches!(err, ColdStorageError::Configuration(_)),
                "{} without .{}: {err:?}",
                action.name(),
                extension
            );
            assert!(log.calls().is_empty());
        }
    }
}

#[tokio::test]
async fn test_missing_parameters_are_invalid_requests() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, _, log) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);

    for action in [
        Action::Withdraw { withdraw_amount: None },
        Action::SetValidator { new_validator: None },
    ] {
        let err = orchestrator
            .prepare_and_sign(&request(action, 1, "1"), &identity)
            .await
            .unwrap_err();
        assert!(matches!(err, ColdStorageError::InvalidRequest(_)));
        assert_eq!(err.exit_code(), 2);
    }
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_destination_is_invalid_request() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let log = CallLog::default();
    let orchestrator = Orchestrator::new(
        FakeBuilder::new(BuildBehavior::WriteBody, &log),
        FakeSigner::new(SignBehavior::WriteSigned, &log),
        HijackingResolver,
        isolated_store(dir.path()),
    );

    let err = orchestrator
        .prepare_and_sign(&request(Action::Transfer { comment: None }, 1, "1"), &identity)
        .await
        .unwrap_err();

    assert!(matches!(err, ColdStorageError::InvalidRequest(_)));
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_journal_refuses_second_signature_for_seqno() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let store = isolated_store(dir.path());
    let journal = SigningJournal::new(store.journal_path());
    let (orchestrator, _, log) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);
    let orchestrator = orchestrator.with_journal(journal.clone());

    let first = orchestrator
        .prepare_and_sign(&request(withdraw("10"), 9, "1"), &identity)
        .await
        .unwrap();

    let err = orchestrator
        .prepare_and_sign(&request(Action::Transfer { comment: None }, 9, "2"), &identity)
        .await
        .unwrap_err();
    assert!(matches!(err, ColdStorageError::InvalidRequest(_)));
    assert!(err.to_string().contains(&first.run_id));
    assert_eq!(log.count("sign"), 1);

    // Next seqno is fine.
    orchestrator
        .prepare_and_sign(&request(Action::Transfer { comment: None }, 10, "2"), &identity)
        .await
        .unwrap();

    let entries = journal.entries().await.unwrap();
    let statuses: Vec<_> = entries.iter().map(|e| (e.seqno, e.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (9, SigningStatus::Pending),
            (9, SigningStatus::Signed),
            (10, SigningStatus::Pending),
            (10, SigningStatus::Signed),
        ]
    );
    assert_eq!(entries[1].wallet, identity.address().to_raw());
    assert_eq!(entries[1].action, "withdraw");
    assert_eq!(entries[1].artifact, first.path);
}

#[tokio::test]
async fn test_unconfirmed_signing_blocks_seqno() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let journal = SigningJournal::new(isolated_store(dir.path()).journal_path());
    let (orchestrator, _, log) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::NoOutput);
    let orchestrator = orchestrator.with_journal(journal.clone());

    let err = orchestrator
        .prepare_and_sign(&request(Action::Transfer { comment: None }, 6, "1"), &identity)
        .await
        .unwrap_err();
    assert!(matches!(err, ColdStorageError::SignFailed { .. }));

    let pending = journal.find(&identity.address().to_raw(), 6).await.unwrap().unwrap();
    assert!(pending.is_pending());

    let err = orchestrator
        .prepare_and_sign(&request(Action::Transfer { comment: None }, 6, "1"), &identity)
        .await
        .unwrap_err();
    assert!(matches!(err, ColdStorageError::InvalidRequest(_)));
    assert!(err.to_string().contains("without a confirmed result"));
    assert!(err.to_string().contains(&pending.run_id));
    assert_eq!(log.count("sign"), 1);
}

#[tokio::test]
async fn test_allow_resign_overrides_journal() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let journal = SigningJournal::new(isolated_store(dir.path()).journal_path());
    let (orchestrator, _, log) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);
    let orchestrator = orchestrator
        .with_journal(journal.clone())
        .with_options(OrchestratorOptions {
            keep_unsigned_body: false,
            allow_resign: true,
        });

    for _ in 0..2 {
        orchestrator
            .prepare_and_sign(&request(Action::DnsRenewal, 4, "0.05"), &identity)
            .await
            .unwrap();
    }

    assert_eq!(log.count("sign"), 2);
    let signed = journal
        .entries()
        .await
        .unwrap()
        .into_iter()
        .filter(|e| !e.is_pending())
        .count();
    assert_eq!(signed, 2);
}

#[tokio::test]
async fn test_isolated_runs_do_not_share_files() {
    let dir = TempDir::new().unwrap();
    let identity = identity(dir.path());
    let (orchestrator, _, _) = orchestrator(&dir, BuildBehavior::WriteBody, SignBehavior::WriteSigned);

    let first = request(withdraw("1"), 1, "1");
    let second = request(withdraw("2"), 2, "1");
    let (a, b) = tokio::join!(
        orchestrator.prepare_and_sign(&first, &identity),
        orchestrator.prepare_and_sign(&second, &identity),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.run_id, b.run_id);
    assert_ne!(a.path.parent(), b.path.parent());
    assert!(a.path.exists());
    assert!(b.path.exists());
}
