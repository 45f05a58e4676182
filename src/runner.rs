//! External command execution
//!
//! This module provides the ONLY sanctioned way for provider adapters to run
//! external tools. Every package-manager, service-manager, and user-tool
//! invocation goes through `run_command` so output capture and logging are
//! uniform across adapters.

use anyhow::{Context, Result};
use log::{debug, info};
use std::process::{Command, Stdio};

/// Output from an external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Check that the command succeeded and return an error if not.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            let code = self.exit_code.unwrap_or(-1);
            anyhow::bail!(
                "{} failed (exit code {}): {}",
                context,
                code,
                self.stderr.trim()
            )
        }
    }
}

/// Run `program` with `args`, blocking until completion, capturing output.
///
/// A non-zero exit is NOT an error here; the caller decides whether the
/// exit status matters (idempotence probes like `dpkg-query -W` use non-zero as
/// their answer). Spawn failures are errors.
pub fn run_command(program: &str, args: &[&str]) -> Result<CommandOutput> {
    debug!("run_command: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to spawn: {} {}", program, args.join(" ")))?;

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
        success: output.status.success(),
    };

    if result.success {
        debug!("{} exited 0", program);
    } else {
        info!(
            "{} exited {} ({})",
            program,
            result.exit_code.unwrap_or(-1),
            result.stderr.trim()
        );
    }

    Ok(result)
}
