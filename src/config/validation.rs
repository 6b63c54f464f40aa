//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check the export prefix is a usable URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ColdStorageConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::ColdStorageConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ColdStorageConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let toolchain = &config.toolchain;
    if toolchain.fift_binary.trim().is_empty() {
        errors.push(ValidationError::new("toolchain.fift_binary", "must not be empty"));
    }
    if toolchain.process_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "toolchain.process_timeout_secs",
            "must be greater than zero",
        ));
    }
    for (field, script) in [
        ("toolchain.wallet_script", &toolchain.wallet_script),
        ("toolchain.withdraw_script", &toolchain.withdraw_script),
        ("toolchain.change_validator_script", &toolchain.change_validator_script),
        ("toolchain.dns_renewal_script", &toolchain.dns_renewal_script),
        ("toolchain.resolver_script", &toolchain.resolver_script),
    ] {
        if script.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if config.wallet.validity_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "wallet.validity_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.workspace.root.as_os_str().is_empty() {
        errors.push(ValidationError::new("workspace.root", "must not be empty"));
    }

    match url::Url::parse(&config.export.viewer_prefix) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => errors.push(ValidationError::new(
            "export.viewer_prefix",
            format!("unsupported scheme '{}'", parsed.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "export.viewer_prefix",
            format!("not a valid URL: {}", e),
        )),
    }

    if config.export.render
        && config
            .export
            .renderer
            .first()
            .map_or(true, |cmd| cmd.trim().is_empty())
    {
        errors.push(ValidationError::new(
            "export.renderer",
            "rendering is enabled but no renderer command is set",
        ));
    }

    if config.observability.log_level.trim().is_empty() {
        errors.push(ValidationError::new("observability.log_level", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
