use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// netrig - declarative, idempotent workstation provisioning
#[derive(Parser)]
#[command(name = "netrig")]
#[command(about = "Provision a Linux machine for network-automation work")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: show what would be executed without making changes.
    ///
    /// Idempotence checks still run so the preview is realistic;
    /// every unsatisfied mutation is recorded as skipped.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Force the server profile, dropping desktop-only steps.
    #[arg(long, global = true)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe, plan, confirm, and apply the full provisioning run
    Provision {
        /// Skip the confirm gate (for unattended runs)
        #[arg(short, long)]
        yes: bool,

        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Target user (default: $SUDO_USER, then $USER)
        #[arg(long)]
        user: Option<String>,

        /// Target home directory (default: derived from the target user)
        #[arg(long)]
        home: Option<PathBuf>,

        /// Git identity name written into the gitconfig block
        /// (default: "Network Automation")
        #[arg(long)]
        git_name: Option<String>,

        /// Git identity email written into the gitconfig block
        /// (default: "netops@example.net")
        #[arg(long)]
        git_email: Option<String>,
    },
    /// Print the resolved plan for this host without mutating anything
    Plan {
        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        home: Option<PathBuf>,
    },
    /// Print the detected host profile
    Probe,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
