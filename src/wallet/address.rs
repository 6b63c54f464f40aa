//! Wallet address parsing.
//!
//! Accepts the two textual forms operators paste into the CLI:
//! - user-friendly: 48 chars of base64 or base64url over 36 bytes
//!   (flags, workchain, 32-byte hash, CRC16 checksum)
//! - raw: `<workchain>:<64 hex chars>`
//!
//! Only syntax is checked here. Normalization into the wallet's canonical
//! form is the job of the external resolver (see `tools::resolver`).

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use std::fmt;
use std::str::FromStr;

use crate::wallet::types::{ColdStorageError, ColdStorageResult};

const FRIENDLY_LEN: usize = 48;
const FRIENDLY_BYTES: usize = 36;

/// Flag bits of the first user-friendly byte.
const FLAG_BOUNCEABLE: u8 = 0x11;
const FLAG_NON_BOUNCEABLE: u8 = 0x51;
const FLAG_TESTNET: u8 = 0x80;

/// A syntactically valid address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Text exactly as given; this is what the tools receive.
    text: String,
    workchain: i32,
    hash: [u8; 32],
    bounceable: bool,
    testnet: bool,
}

impl Address {
    pub fn parse(input: &str) -> ColdStorageResult<Self> {
        let text = input.trim();
        if text.contains(':') {
            Self::parse_raw(text)
        } else {
            Self::parse_friendly(text)
        }
    }

    /// Build an address from its parts, rendered in raw form.
    pub fn from_parts(workchain: i32, hash: [u8; 32]) -> Self {
        Self {
            text: format!("{}:{}", workchain, hex::encode(hash)),
            workchain,
            hash,
            bounceable: true,
            testnet: false,
        }
    }

    fn parse_raw(text: &str) -> ColdStorageResult<Self> {
        let (wc, hash_hex) = text
            .split_once(':')
            .ok_or_else(|| invalid(text, "expected <workchain>:<hash>"))?;

        let workchain: i32 = wc
            .parse()
            .map_err(|_| invalid(text, "workchain is not an integer"))?;

        if hash_hex.len() != 64 {
            return Err(invalid(text, "hash must be 64 hex characters"));
        }
        let bytes = hex::decode(hash_hex).map_err(|_| invalid(text, "hash is not hex"))?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);

        Ok(Self {
            text: text.to_string(),
            workchain,
            hash,
            bounceable: true,
            testnet: false,
        })
    }

    fn parse_friendly(text: &str) -> ColdStorageResult<Self> {
        if text.len() != FRIENDLY_LEN {
            return Err(invalid(
                text,
                &format!("expected {} characters, got {}", FRIENDLY_LEN, text.len()),
            ));
        }

        let decoded = if text.contains('-') || text.contains('_') {
            URL_SAFE_NO_PAD.decode(text).or_else(|_| URL_SAFE.decode(text))
        } else {
            STANDARD_NO_PAD.decode(text).or_else(|_| STANDARD.decode(text))
        }
        .map_err(|e| invalid(text, &format!("base64 decode failed: {}", e)))?;

        if decoded.len() != FRIENDLY_BYTES {
            return Err(invalid(text, "decoded length is not 36 bytes"));
        }

        let expected = u16::from_be_bytes([decoded[34], decoded[35]]);
        if crc16_xmodem(&decoded[..34]) != expected {
            return Err(invalid(text, "checksum mismatch"));
        }

        let flags = decoded[0];
        let tag = flags & !FLAG_TESTNET;
        if tag != FLAG_BOUNCEABLE && tag != FLAG_NON_BOUNCEABLE {
            return Err(invalid(text, "unknown address flags"));
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&decoded[2..34]);

        Ok(Self {
            text: text.to_string(),
            workchain: i32::from(decoded[1] as i8),
            hash,
            bounceable: tag == FLAG_BOUNCEABLE,
            testnet: flags & FLAG_TESTNET != 0,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn workchain(&self) -> i32 {
        self.workchain
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn is_bounceable(&self) -> bool {
        self.bounceable
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    /// Raw `<workchain>:<hex>` rendering.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// Same account regardless of textual form or flags.
    pub fn same_account(&self, other: &Address) -> bool {
        self.workchain == other.workchain && self.hash == other.hash
    }

    /// Whether the operator wrote the user-friendly form, which carries
    /// the bounce and testnet flags. Raw addresses carry neither.
    pub fn is_friendly(&self) -> bool {
        !self.text.contains(':')
    }

    /// Same bounce and testnet flags.
    pub fn same_flags(&self, other: &Address) -> bool {
        self.bounceable == other.bounceable && self.testnet == other.testnet
    }
}

fn invalid(text: &str, reason: &str) -> ColdStorageError {
    ColdStorageError::InvalidRequest(format!("invalid address '{}': {}", text, reason))
}

/// CRC-16/XMODEM as used by user-friendly addresses.
pub(crate) fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for byte in data {
        crc ^= u16::from(*byte) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

impl FromStr for Address {
    type Err = ColdStorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOMINATOR: &str = "EQBd31Rl7zrpOjGuTA7PEwmuFPFvacTF8o1HDdcQDG30huZL";
    const ELECTOR_ZERO: &str = "Ef8AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAADAU";
    const URL_SAFE_MASTER: &str = "Ef_gsQlhGpspMFSfaOWGK-nH-VoNv9pMs9R9qJx5-eCZP_rl";
    const TESTNET: &str = "kQCBSL-sFQs_c6hL1FJLjWSQ-haHef12IK5j6AYtgxmiudIw";

    #[test]
    fn test_parse_friendly_basechain() {
        let addr = Address::parse(NOMINATOR).unwrap();
        assert_eq!(addr.workchain(), 0);
        assert!(addr.is_bounceable());
        assert!(!addr.is_testnet());
        assert_eq!(
            addr.to_raw(),
            "0:5ddf5465ef3ae93a31ae4c0ecf1309ae14f16f69c4c5f28d470dd7100c6df486"
        );
        assert_eq!(addr.as_str(), NOMINATOR);
    }

    #[test]
    fn test_parse_friendly_masterchain_and_url_safe() {
        let zero = Address::parse(ELECTOR_ZERO).unwrap();
        assert_eq!(zero.workchain(), -1);
        assert_eq!(zero.hash(), &[0u8; 32]);

        let master = Address::parse(URL_SAFE_MASTER).unwrap();
        assert_eq!(master.workchain(), -1);
    }

    #[test]
    fn test_parse_testnet_flag() {
        let addr = Address::parse(TESTNET).unwrap();
        assert!(addr.is_testnet());
        assert!(addr.is_bounceable());
    }

    #[test]
    fn test_raw_and_friendly_same_account() {
        let friendly = Address::parse(NOMINATOR).unwrap();
        let raw = Address::parse(&friendly.to_raw()).unwrap();
        assert!(friendly.same_account(&raw));
        assert_ne!(friendly, raw);
    }

    #[test]
    fn test_flags_compared_separately_from_account() {
        let bounceable = Address::parse(NOMINATOR).unwrap();
        let non_bounceable = Address::parse("UQBd31Rl7zrpOjGuTA7PEwmuFPFvacTF8o1HDdcQDG30hruO").unwrap();
        let raw = Address::parse(&bounceable.to_raw()).unwrap();

        assert!(bounceable.same_account(&non_bounceable));
        assert!(!bounceable.same_flags(&non_bounceable));
        assert!(bounceable.is_friendly());
        assert!(!raw.is_friendly());
    }

    #[test]
    fn test_rejects_checksum_mismatch() {
        // last character flipped
        let corrupted = "EQBd31Rl7zrpOjGuTA7PEwmuFPFvacTF8o1HDdcQDG30huZM";
        let err = Address::parse(corrupted).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "EQBd31", "0:zz", "x:00", "0:1234", "not an address at all, clearly not 48 chars!!"] {
            assert!(Address::parse(bad).is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_from_parts_renders_raw() {
        let addr = Address::from_parts(-1, [0xab; 32]);
        assert!(addr.as_str().starts_with("-1:abab"));
        assert_eq!(Address::parse(addr.as_str()).unwrap(), addr);
    }
}
