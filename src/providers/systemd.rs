//! systemd adapter (shared by every supported family)

use super::ServiceProvider;
use crate::runner::run_command;
use anyhow::Result;
use log::info;

/// Service provider shelling out to systemctl.
///
/// `systemctl enable`/`start` are themselves idempotent: re-enabling an
/// enabled unit and re-starting a running unit both exit 0.
pub struct SystemdProvider;

impl ServiceProvider for SystemdProvider {
    fn is_enabled(&self, name: &str) -> Result<bool> {
        // exit 0 for "enabled"/"static"; non-zero for disabled or unknown
        let out = run_command("systemctl", &["is-enabled", "--quiet", name])?;
        Ok(out.success)
    }

    fn is_active(&self, name: &str) -> Result<bool> {
        let out = run_command("systemctl", &["is-active", "--quiet", name])?;
        Ok(out.success)
    }

    fn enable(&self, name: &str) -> Result<()> {
        info!("systemctl enable {}", name);
        run_command("systemctl", &["enable", name])?
            .ensure_success(&format!("systemctl enable {}", name))
    }

    fn start(&self, name: &str) -> Result<()> {
        info!("systemctl start {}", name);
        run_command("systemctl", &["start", name])?
            .ensure_success(&format!("systemctl start {}", name))
    }
}
