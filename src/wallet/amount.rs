//! Exact decimal coin amounts.
//!
//! Amounts are entered by the operator as decimal strings ("1", "1.5",
//! "250") and kept as integer nano-units so nothing is lost to float
//! rounding before the value reaches the signing scripts.

use std::fmt;
use std::str::FromStr;

use crate::wallet::types::{ColdStorageError, ColdStorageResult};

/// Number of decimal places in one coin.
pub const DECIMALS: u32 = 9;

/// Nano-units per whole coin.
pub const NANO_PER_COIN: u64 = 1_000_000_000;

/// A non-negative coin amount stored in nano-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    /// Amount from raw nano-units.
    pub const fn from_nano(nano: u64) -> Self {
        Self(nano)
    }

    /// Amount in nano-units.
    pub fn as_nano(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal string into an exact amount.
    pub fn parse(input: &str) -> ColdStorageResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid(input, "empty amount"));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid(input, "no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid(input, "only digits and a single '.' are allowed"));
        }
        if frac.len() > DECIMALS as usize {
            return Err(invalid(input, "more than 9 decimal places"));
        }

        let whole_units: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid(input, "amount too large"))?
        };

        let mut frac_units: u64 = 0;
        for (i, c) in frac.chars().enumerate() {
            let digit = u64::from(c as u8 - b'0');
            frac_units += digit * 10u64.pow(DECIMALS - 1 - i as u32);
        }

        whole_units
            .checked_mul(NANO_PER_COIN)
            .and_then(|n| n.checked_add(frac_units))
            .map(Self)
            .ok_or_else(|| invalid(input, "amount too large"))
    }
}

fn invalid(input: &str, reason: &str) -> ColdStorageError {
    ColdStorageError::InvalidRequest(format!("invalid amount '{}': {}", input, reason))
}

impl FromStr for Amount {
    type Err = ColdStorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical decimal form, trailing zeros trimmed ("1", "1.5", "0.000000001").
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / NANO_PER_COIN;
        let frac = self.0 % NANO_PER_COIN;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:09}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}
