//! Request types and error definitions.

use std::path::PathBuf;
use thiserror::Error;

use crate::wallet::address::Address;
use crate::wallet::amount::Amount;

/// Subwallet id of the wallet v3 contract the cold wallet was deployed with.
pub const DEFAULT_WALLET_ID: u32 = 698_983_191;

/// Default validity window of a signed transfer, in seconds.
pub const DEFAULT_VALIDITY_TIMEOUT_SECS: u64 = 86_400;

/// Errors surfaced to the operator. Every one of them aborts the run.
#[derive(Debug, Error)]
pub enum ColdStorageError {
    /// Missing or unusable input files or settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Action and parameters do not fit together.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The message builder did not leave its unsigned body behind.
    #[error("build failed at {step}: {reason}")]
    BuildFailed { step: String, reason: String },

    /// The signer did not leave the signed transaction behind.
    #[error("signing failed: {reason}")]
    SignFailed { reason: String },

    /// The signed artifact could not be read or rendered.
    #[error("export failed: {0}")]
    Export(String),
}

impl ColdStorageError {
    /// Stable name of the error kind, used in logs and the JSON summary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::InvalidRequest(_) => "invalid_request",
            Self::BuildFailed { .. } => "build_failed",
            Self::SignFailed { .. } => "sign_failed",
            Self::Export(_) => "export",
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidRequest(_) => 2,
            Self::Configuration(_) => 3,
            Self::BuildFailed { .. } => 4,
            Self::SignFailed { .. } => 5,
            Self::Export(_) => 6,
        }
    }
}

/// Result type for cold-storage operations.
pub type ColdStorageResult<T> = Result<T, ColdStorageError>;

/// What the signed transaction is meant to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ask the nominator contract to release `withdraw_amount`.
    Withdraw { withdraw_amount: Option<Amount> },
    /// Point the nominator contract at a new validator wallet.
    SetValidator { new_validator: Option<Address> },
    /// Plain transfer with an optional text comment.
    Transfer { comment: Option<String> },
    /// Touch the DNS item so its ownership does not expire.
    DnsRenewal,
}

impl Action {
    /// Selector name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Withdraw { .. } => "withdraw",
            Self::SetValidator { .. } => "set-validator",
            Self::Transfer { .. } => "transfer",
            Self::DnsRenewal => "dns-renewal",
        }
    }

    /// Whether the action's effect is carried by an internal message body
    /// that has to be built before signing.
    pub fn needs_message_body(&self) -> bool {
        !matches!(self, Self::Transfer { .. })
    }

    /// Check the action carries the parameters it requires.
    pub fn validate(&self) -> ColdStorageResult<()> {
        match self {
            Self::Withdraw { withdraw_amount: None } => Err(ColdStorageError::InvalidRequest(
                "withdraw requires a withdraw amount (--withdraw-amount)".into(),
            )),
            Self::Withdraw {
                withdraw_amount: Some(amount),
            } if amount.is_zero() => Err(ColdStorageError::InvalidRequest(
                "withdraw amount must be greater than zero".into(),
            )),
            Self::SetValidator { new_validator: None } => Err(ColdStorageError::InvalidRequest(
                "set-validator requires a new validator address (--new-validator-address)".into(),
            )),
            Self::Transfer {
                comment: Some(comment),
            } if comment.chars().any(char::is_control) => Err(ColdStorageError::InvalidRequest(
                "comment must not contain control characters".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// One transaction to prepare and sign.
///
/// `seqno` must equal the wallet's current on-chain seqno. This crate runs
/// offline and cannot check that; a wrong value produces a transaction the
/// wallet contract rejects.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub action: Action,
    pub seqno: u32,
    pub amount: Amount,
    pub destination: Address,
    /// Validity window of the signed message in seconds.
    pub timeout_secs: u64,
}

impl TransactionRequest {
    pub fn new(action: Action, seqno: u32, amount: Amount, destination: Address) -> Self {
        Self {
            action,
            seqno,
            amount,
            destination,
            timeout_secs: DEFAULT_VALIDITY_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Request-level checks that need no filesystem access.
    pub fn validate(&self) -> ColdStorageResult<()> {
        self.action.validate()?;
        if self.timeout_secs == 0 {
            return Err(ColdStorageError::InvalidRequest(
                "timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// The signed transaction file, the only artifact meant to leave the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransactionArtifact {
    pub path: PathBuf,
    pub run_id: String,
    pub len: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination() -> Address {
        Address::parse("EQBd31Rl7zrpOjGuTA7PEwmuFPFvacTF8o1HDdcQDG30huZL").unwrap()
    }

    #[test]
    fn test_withdraw_without_amount_is_invalid() {
        let action = Action::Withdraw { withdraw_amount: None };
        assert!(matches!(action.validate(), Err(ColdStorageError::InvalidRequest(_))));
    }

    #[test]
    fn test_withdraw_zero_is_invalid() {
        let action = Action::Withdraw {
            withdraw_amount: Some(Amount::from_nano(0)),
        };
        assert!(matches!(action.validate(), Err(ColdStorageError::InvalidRequest(_))));
    }

    #[test]
    fn test_set_validator_without_address_is_invalid() {
        let action = Action::SetValidator { new_validator: None };
        let err = action.validate().unwrap_err();
        assert!(err.to_string().contains("new validator"));
    }

    #[test]
    fn test_transfer_and_dns_need_nothing() {
        assert!(Action::Transfer { comment: None }.validate().is_ok());
        assert!(Action::DnsRenewal.validate().is_ok());
        assert!(!Action::Transfer { comment: None }.needs_message_body());
        assert!(Action::DnsRenewal.needs_message_body());
    }

    #[test]
    fn test_request_defaults() {
        let req = TransactionRequest::new(
            Action::Transfer { comment: None },
            3,
            Amount::parse("1.0").unwrap(),
            destination(),
        );
        assert_eq!(req.timeout_secs, DEFAULT_VALIDITY_TIMEOUT_SECS);
        assert!(req.validate().is_ok());
        assert!(req.with_timeout(0).validate().is_err());
    }

    #[test]
    fn test_error_display_and_codes() {
        let err = ColdStorageError::BuildFailed {
            step: "withdraw.fif".into(),
            reason: "withdraw.boc was not produced".into(),
        };
        assert_eq!(
            err.to_string(),
            "build failed at withdraw.fif: withdraw.boc was not produced"
        );
        assert_eq!(err.kind(), "build_failed");
        assert_eq!(err.exit_code(), 4);
        assert_eq!(ColdStorageError::InvalidRequest("x".into()).exit_code(), 2);
    }
}
