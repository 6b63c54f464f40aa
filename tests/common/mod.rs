//! Shared fakes and fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cold_storage::artifacts::{ArtifactStore, RunScratch};
use cold_storage::config::WorkspaceMode;
use cold_storage::tools::{AddressResolver, MessageBuilder, SignRequest, ToolError, TransactionSigner};
use cold_storage::wallet::identity::{with_suffix, ADDRESS_EXTENSION, KEY_EXTENSION};
use cold_storage::wallet::{Action, Address, WalletIdentity};

pub const DESTINATION: &str = "EQBd31Rl7zrpOjGuTA7PEwmuFPFvacTF8o1HDdcQDG30huZL";
pub const WALLET_ID: u32 = 698_983_191;

/// Bag-of-cells magic followed by a stand-in payload.
pub const SIGNED_BYTES: &[u8] = b"\xb5\xee\x9c\x72signed-transaction";

/// Ordered record of tool invocations shared by the fakes.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildBehavior {
    /// Write the body file and report it.
    WriteBody,
    /// Exit cleanly but leave nothing behind.
    NoOutput,
    /// Write the body, then lose it before anyone reads it.
    WriteThenDelete,
    /// Report a tool failure.
    Fail,
}

/// Builder that writes into the run directory like the real scripts do.
#[derive(Debug, Clone)]
pub struct FakeBuilder {
    pub behavior: BuildBehavior,
    pub log: CallLog,
}

impl FakeBuilder {
    pub fn new(behavior: BuildBehavior, log: &CallLog) -> Self {
        Self {
            behavior,
            log: log.clone(),
        }
    }
}

impl MessageBuilder for FakeBuilder {
    async fn build(&self, action: &Action, scratch: &RunScratch) -> Result<PathBuf, ToolError> {
        self.log.push(format!("build {}", action.name()));
        let path = scratch
            .unsigned_body_path(action)
            .ok_or_else(|| ToolError::Unsupported(action.name().to_string()))?;
        match self.behavior {
            BuildBehavior::WriteBody => {
                std::fs::write(&path, b"unsigned-body").unwrap();
                Ok(path)
            }
            BuildBehavior::NoOutput => Ok(path),
            BuildBehavior::WriteThenDelete => {
                std::fs::write(&path, b"unsigned-body").unwrap();
                std::fs::remove_file(&path).unwrap();
                Ok(path)
            }
            BuildBehavior::Fail => Err(ToolError::Rejected("script aborted".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignBehavior {
    WriteSigned,
    NoOutput,
}

/// What the signer was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignCall {
    pub destination: String,
    pub seqno: u32,
    pub amount: String,
    pub timeout_secs: u64,
    pub body: Option<PathBuf>,
    pub body_existed: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FakeSigner {
    pub behavior: SignBehavior,
    pub log: CallLog,
    pub seen: Arc<Mutex<Vec<SignCall>>>,
}

impl FakeSigner {
    pub fn new(behavior: SignBehavior, log: &CallLog) -> Self {
        Self {
            behavior,
            log: log.clone(),
            seen: Arc::default(),
        }
    }

    pub fn last_call(&self) -> Option<SignCall> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl TransactionSigner for FakeSigner {
    async fn sign(&self, request: &SignRequest<'_>, scratch: &RunScratch) -> Result<PathBuf, ToolError> {
        self.log.push("sign");
        self.seen.lock().unwrap().push(SignCall {
            destination: request.destination.as_str().to_string(),
            seqno: request.seqno,
            amount: request.amount.to_string(),
            timeout_secs: request.timeout_secs,
            body: request.body.map(Path::to_path_buf),
            body_existed: request.body.is_some_and(Path::exists),
            comment: request.comment.map(str::to_string),
        });

        let path = scratch.signed_artifact_path();
        if self.behavior == SignBehavior::WriteSigned {
            std::fs::write(&path, SIGNED_BYTES).unwrap();
        }
        Ok(path)
    }
}

/// Resolver that maps every destination to another account.
#[derive(Debug, Clone, Copy)]
pub struct HijackingResolver;

impl AddressResolver for HijackingResolver {
    async fn resolve(&self, destination: &Address) -> Result<Address, ToolError> {
        Err(ToolError::Rejected(format!("{} resolved to a different account", destination)))
    }
}

/// Write `<name>.pk` and `<name>.addr` and return the key base.
pub fn write_key_files(dir: &Path, name: &str, workchain: i32, hash: [u8; 32]) -> PathBuf {
    let base = dir.join(name);
    std::fs::write(with_suffix(&base, KEY_EXTENSION), [9u8; 32]).unwrap();
    let mut addr = hash.to_vec();
    addr.extend_from_slice(&workchain.to_be_bytes());
    std::fs::write(with_suffix(&base, ADDRESS_EXTENSION), addr).unwrap();
    base
}

pub fn identity(dir: &Path) -> WalletIdentity {
    let base = write_key_files(dir, "C8", -1, [0x11; 32]);
    WalletIdentity::load(base, WALLET_ID).unwrap()
}

pub fn isolated_store(dir: &Path) -> ArtifactStore {
    ArtifactStore::new(WorkspaceMode::Isolated, dir.join("workspace"))
}

pub fn destination() -> Address {
    Address::parse(DESTINATION).unwrap()
}
