//! Cold wallet identity.
//!
//! # Security
//! - The private key file is only checked for existence, never read
//! - Key material never appears in logs; only the key path does
//! - The signer receives the key path, not the key

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::wallet::address::Address;
use crate::wallet::types::{ColdStorageError, ColdStorageResult};

/// Extension of the private key file.
pub const KEY_EXTENSION: &str = "pk";

/// Extension of the wallet address file written next to the key.
pub const ADDRESS_EXTENSION: &str = "addr";

/// Size of an `.addr` file: 32-byte account hash + 4-byte workchain.
const ADDR_FILE_LEN: usize = 36;

/// Who signs: key reference, wallet address and contract version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletIdentity {
    key_base: PathBuf,
    address: Address,
    wallet_id: u32,
}

impl WalletIdentity {
    /// Load the identity behind `<key_base>.pk` / `<key_base>.addr`.
    ///
    /// # Arguments
    /// * `key_base` - Key filename without extension (e.g. `C8`)
    /// * `wallet_id` - Subwallet id of the wallet contract
    pub fn load(key_base: impl AsRef<Path>, wallet_id: u32) -> ColdStorageResult<Self> {
        let key_base = key_base.as_ref().to_path_buf();
        let key_path = with_suffix(&key_base, KEY_EXTENSION);
        let addr_path = with_suffix(&key_base, ADDRESS_EXTENSION);

        if !key_path.is_file() {
            return Err(ColdStorageError::Configuration(format!(
                "private key file not found: {}",
                key_path.display()
            )));
        }
        if !addr_path.is_file() {
            return Err(ColdStorageError::Configuration(format!(
                "address file not found: {}",
                addr_path.display()
            )));
        }

        let raw = fs::read(&addr_path).map_err(|e| {
            ColdStorageError::Configuration(format!(
                "cannot read address file {}: {}",
                addr_path.display(),
                e
            ))
        })?;
        let address = decode_addr_file(&raw).ok_or_else(|| {
            ColdStorageError::Configuration(format!(
                "address file {} is {} bytes, expected {}",
                addr_path.display(),
                raw.len(),
                ADDR_FILE_LEN
            ))
        })?;

        tracing::info!(
            key = %key_base.display(),
            address = %address,
            wallet_id = wallet_id,
            "Wallet identity loaded"
        );

        Ok(Self {
            key_base,
            address,
            wallet_id,
        })
    }

    /// Key reference handed to the signer (path without extension).
    pub fn key_base(&self) -> &Path {
        &self.key_base
    }

    pub fn key_path(&self) -> PathBuf {
        with_suffix(&self.key_base, KEY_EXTENSION)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn wallet_id(&self) -> u32 {
        self.wallet_id
    }
}

/// `C8` + `pk` → `C8.pk`, keeping any dots already in the name.
pub fn with_suffix(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn decode_addr_file(raw: &[u8]) -> Option<Address> {
    if raw.len() != ADDR_FILE_LEN {
        return None;
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&raw[..32]);
    let workchain = i32::from_be_bytes([raw[32], raw[33], raw[34], raw[35]]);
    Some(Address::from_parts(workchain, hash))
}

/// Write a `.pk`/`.addr` pair, for tests.
#[cfg(test)]
pub(crate) fn write_test_identity(dir: &Path, name: &str, workchain: i32, hash: [u8; 32]) -> PathBuf {
    let base = dir.join(name);
    fs::write(with_suffix(&base, KEY_EXTENSION), [7u8; 32]).unwrap();
    let mut addr = hash.to_vec();
    addr.extend_from_slice(&workchain.to_be_bytes());
    fs::write(with_suffix(&base, ADDRESS_EXTENSION), addr).unwrap();
    base
}
