//! Destination address resolution.
//!
//! The resolver script gets the operator's destination string and either
//! confirms it or prints a normalized form. Any failure is fatal: signing
//! towards a malformed address yields an unusable or dangerous transaction.

use crate::tools::fift::FiftToolchain;
use crate::tools::types::ToolError;
use crate::wallet::Address;

/// Normalizes a destination before it reaches the builder or signer.
#[allow(async_fn_in_trait)]
pub trait AddressResolver {
    async fn resolve(&self, destination: &Address) -> Result<Address, ToolError>;
}

/// Accepts the syntactically checked address as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl AddressResolver for PassthroughResolver {
    async fn resolve(&self, destination: &Address) -> Result<Address, ToolError> {
        Ok(destination.clone())
    }
}

impl AddressResolver for FiftToolchain {
    async fn resolve(&self, destination: &Address) -> Result<Address, ToolError> {
        // No output file to check here, so the exit status is always enforced.
        let command = self
            .command(&self.scripts.resolver, None)
            .arg(destination.as_str());
        let output = command.run_checked(self.timeout()).await?;
        resolved_from_output(destination, &output.stdout)
    }
}

/// Pick the normalized address out of the resolver's stdout.
///
/// The last line that parses as an address wins. Silence means the script
/// accepted the input unchanged. A normalized address for a different
/// account is rejected.
pub fn resolved_from_output(destination: &Address, stdout: &str) -> Result<Address, ToolError> {
    let resolved = stdout
        .lines()
        .rev()
        .flat_map(|line| line.split_whitespace().rev())
        .find_map(|token| Address::parse(token).ok());

    match resolved {
        None => Ok(destination.clone()),
        Some(addr) if !addr.same_account(destination) => Err(ToolError::Rejected(format!(
            "resolver turned {} into a different account {}",
            destination, addr
        ))),
        // Flags typed by the operator are kept: a lost bounce flag means a
        // failing contract keeps the funds.
        Some(addr) if destination.is_friendly() && !addr.same_flags(destination) => {
            Err(ToolError::Rejected(format!(
                "resolver changed the flags of {} to {} (bounceable {} -> {}, testnet {} -> {})",
                destination,
                addr,
                destination.is_bounceable(),
                addr.is_bounceable(),
                destination.is_testnet(),
                addr.is_testnet()
            )))
        }
        Some(addr) => {
            if addr.as_str() != destination.as_str() {
                tracing::info!(
                    from = %destination,
                    to = %addr,
                    "Destination normalized"
                );
            }
            Ok(addr)
        }
    }
}

/// Resolver selected at runtime from configuration.
#[derive(Debug, Clone)]
pub enum DestinationResolver {
    Script(FiftToolchain),
    Passthrough,
}

impl AddressResolver for DestinationResolver {
    async fn resolve(&self, destination: &Address) -> Result<Address, ToolError> {
        match self {
            Self::Script(fift) => fift.resolve(destination).await,
            Self::Passthrough => PassthroughResolver.resolve(destination).await,
        }
    }
}
