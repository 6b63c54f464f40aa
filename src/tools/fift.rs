//! Fift interpreter invocation.
//!
//! All builder, signer and resolver scripts run through the same
//! interpreter: `fift -s <scripts_dir>/<script> <args...>`, with the
//! library path passed to the child as `FIFTPATH`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ToolchainConfig;
use crate::tools::process::{absolutize, absolutize_program, ToolCommand, ToolOutput};
use crate::tools::types::ToolError;

/// Environment variable the interpreter reads its include path from.
pub const FIFTPATH_ENV: &str = "FIFTPATH";

/// Script names for each step.
#[derive(Debug, Clone)]
pub struct FiftScripts {
    pub wallet: String,
    pub withdraw: String,
    pub change_validator: String,
    pub dns_renewal: String,
    pub resolver: String,
}

/// A configured interpreter.
#[derive(Debug, Clone)]
pub struct FiftToolchain {
    binary: PathBuf,
    lib_path: Option<PathBuf>,
    scripts_dir: PathBuf,
    pub(crate) scripts: FiftScripts,
    timeout: Duration,
    check_exit_status: bool,
}

impl FiftToolchain {
    /// Build from configuration, pinning every relative path to the
    /// current directory so tools can run from a run scratch directory.
    pub fn from_config(config: &ToolchainConfig) -> io::Result<Self> {
        Ok(Self {
            binary: absolutize_program(&config.fift_binary)?,
            lib_path: config.fift_lib_path.as_deref().map(absolutize).transpose()?,
            scripts_dir: absolutize(&config.scripts_dir)?,
            scripts: FiftScripts {
                wallet: config.wallet_script.clone(),
                withdraw: config.withdraw_script.clone(),
                change_validator: config.change_validator_script.clone(),
                dns_renewal: config.dns_renewal_script.clone(),
                resolver: config.resolver_script.clone(),
            },
            timeout: Duration::from_secs(config.process_timeout_secs),
            check_exit_status: config.check_exit_status,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn checks_exit_status(&self) -> bool {
        self.check_exit_status
    }

    pub fn script_path(&self, script: &str) -> PathBuf {
        self.scripts_dir.join(script)
    }

    /// `fift -s <script>` with `FIFTPATH` set, running in `cwd`.
    pub fn command(&self, script: &str, cwd: Option<&Path>) -> ToolCommand {
        let mut command = ToolCommand::new(self.binary.as_os_str())
            .arg("-s")
            .arg(self.script_path(script));
        if let Some(lib) = &self.lib_path {
            command = command.env(FIFTPATH_ENV, lib.as_os_str());
        }
        if let Some(cwd) = cwd {
            command = command.current_dir(cwd);
        }
        command
    }

    /// Run a script that is expected to leave a file behind.
    ///
    /// The exit status is enforced when `check_exit_status` is on; the
    /// output file's presence is always required by the caller.
    pub async fn run_script(&self, command: &ToolCommand) -> Result<ToolOutput, ToolError> {
        if self.check_exit_status {
            command.run_checked(self.timeout).await
        } else {
            let output = command.run(self.timeout).await?;
            if !output.success() {
                tracing::warn!(
                    command = %command.display(),
                    status = %output.status,
                    "Script exited unsuccessfully; relying on output file only"
                );
            }
            Ok(output)
        }
    }
}
