//! Message builder boundary.
//!
//! Builds the internal message body for actions whose effect is not a
//! plain transfer: withdraw, validator change and DNS renewal.

use std::path::PathBuf;

use crate::artifacts::{verify_artifact, RunScratch};
use crate::tools::fift::FiftToolchain;
use crate::tools::types::ToolError;
use crate::wallet::types::Action;

/// Produces the unsigned body for an action.
#[allow(async_fn_in_trait)]
pub trait MessageBuilder {
    /// Write the body for `action` into `scratch` and return its path.
    async fn build(&self, action: &Action, scratch: &RunScratch) -> Result<PathBuf, ToolError>;
}

impl FiftToolchain {
    /// Script and positional arguments for an action's body.
    fn body_invocation(&self, action: &Action) -> Result<(&str, Vec<String>), ToolError> {
        match action {
            Action::Withdraw {
                withdraw_amount: Some(amount),
            } => Ok((self.scripts.withdraw.as_str(), vec![amount.to_string()])),
            Action::SetValidator {
                new_validator: Some(address),
            } => Ok((
                self.scripts.change_validator.as_str(),
                vec![address.as_str().to_string()],
            )),
            Action::DnsRenewal => Ok((self.scripts.dns_renewal.as_str(), Vec::new())),
            Action::Transfer { .. } => Err(ToolError::Unsupported(
                "transfer carries no message body".into(),
            )),
            Action::Withdraw { .. } | Action::SetValidator { .. } => Err(ToolError::Unsupported(
                format!("{} is missing its parameter", action.name()),
            )),
        }
    }
}

impl MessageBuilder for FiftToolchain {
    async fn build(&self, action: &Action, scratch: &RunScratch) -> Result<PathBuf, ToolError> {
        let output = scratch
            .unsigned_body_path(action)
            .ok_or_else(|| ToolError::Unsupported(format!("{} has no body file", action.name())))?;
        let (script, args) = self.body_invocation(action)?;

        scratch.clear_stale(&output).await?;

        let command = self.command(script, Some(scratch.dir())).args(args);
        self.run_script(&command).await?;

        verify_artifact(&output).await?;
        tracing::info!(
            action = action.name(),
            body = %output.display(),
            "Unsigned message body built"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolchainConfig;
    use crate::wallet::{Address, Amount};

    fn toolchain() -> FiftToolchain {
        FiftToolchain::from_config(&ToolchainConfig::default()).unwrap()
    }

    #[test]
    fn test_body_invocations() {
        let fift = toolchain();

        let (script, args) = fift
            .body_invocation(&Action::Withdraw {
                withdraw_amount: Some(Amount::parse("250").unwrap()),
            })
            .unwrap();
        assert_eq!(script, "withdraw.fif");
        assert_eq!(args, vec!["250"]);

        let validator = "Ef8AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAADAU";
        let (script, args) = fift
            .body_invocation(&Action::SetValidator {
                new_validator: Some(Address::parse(validator).unwrap()),
            })
            .unwrap();
        assert_eq!(script, "change-validator.fif");
        assert_eq!(args, vec![validator]);

        let (script, args) = fift.body_invocation(&Action::DnsRenewal).unwrap();
        assert_eq!(script, "dns-renewal.fif");
        assert!(args.is_empty());
    }

    #[test]
    fn test_transfer_has_no_body() {
        let err = toolchain()
            .body_invocation(&Action::Transfer { comment: None })
            .unwrap_err();
        assert!(matches!(err, ToolError::Unsupported(_)));
    }
}
