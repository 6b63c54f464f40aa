//! QR rendering boundary.
//!
//! The renderer draws straight onto the operator's terminal; nothing is
//! written to disk.

use std::time::Duration;

use crate::config::ExportConfig;
use crate::tools::process::ToolCommand;
use crate::tools::types::ToolError;

/// Draws a scannable code for a URL.
#[allow(async_fn_in_trait)]
pub trait QrRenderer {
    async fn render(&self, url: &str) -> Result<(), ToolError>;
}

/// Runs `<program> <args...> <url>` with the terminal as stdout.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn command(&self, url: &str) -> ToolCommand {
        ToolCommand::new(&self.program)
            .args(&self.args)
            .arg(url)
            .inherit_stdout()
    }
}

impl QrRenderer for CommandRenderer {
    async fn render(&self, url: &str) -> Result<(), ToolError> {
        self.command(url).run_checked(self.timeout).await?;
        Ok(())
    }
}

/// Renderer chosen from configuration.
#[derive(Debug, Clone)]
pub enum TerminalRenderer {
    Command(CommandRenderer),
    Disabled,
}

impl TerminalRenderer {
    pub fn from_config(config: &ExportConfig, timeout: Duration) -> Self {
        match config.renderer.split_first() {
            Some((program, args)) if config.render => {
                Self::Command(CommandRenderer::new(program.clone(), args.to_vec(), timeout))
            }
            _ => Self::Disabled,
        }
    }
}

impl QrRenderer for TerminalRenderer {
    async fn render(&self, url: &str) -> Result<(), ToolError> {
        match self {
            Self::Command(renderer) => renderer.render(url).await,
            Self::Disabled => {
                tracing::debug!("QR rendering disabled");
                Ok(())
            }
        }
    }
}
