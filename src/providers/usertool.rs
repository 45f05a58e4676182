//! usermod/id adapter for group membership

use super::UserProvider;
use crate::runner::run_command;
use anyhow::Result;
use log::info;

/// User provider shelling out to `id` and `usermod`.
pub struct UsermodProvider;

impl UserProvider for UsermodProvider {
    fn in_group(&self, user: &str, group: &str) -> Result<bool> {
        let out = run_command("id", &["-nG", user])?;
        out.ensure_success(&format!("id -nG {}", user))?;
        Ok(out.stdout.split_whitespace().any(|g| g == group))
    }

    fn add_to_group(&self, user: &str, group: &str) -> Result<()> {
        info!("usermod -aG {} {}", group, user);
        // -aG appends; never replaces the user's existing group set
        run_command("usermod", &["-aG", group, user])?
            .ensure_success(&format!("usermod -aG {} {}", group, user))
    }
}
