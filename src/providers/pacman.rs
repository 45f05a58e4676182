//! pacman adapter (Arch family)

use super::PackageProvider;
use crate::runner::run_command;
use anyhow::Result;
use log::info;

/// Package provider shelling out to pacman.
///
/// `--needed` makes installs idempotent at the tool level; the executor
/// still checks `is_installed` first so a satisfied step never mutates.
pub struct PacmanProvider;

impl PackageProvider for PacmanProvider {
    fn is_installed(&self, name: &str) -> Result<bool> {
        // `pacman -Qi` exits non-zero when the package is not installed
        let out = run_command("pacman", &["-Qi", name])?;
        Ok(out.success)
    }

    fn install(&self, names: &[String]) -> Result<()> {
        let mut args = vec!["-S", "--noconfirm", "--needed"];
        args.extend(names.iter().map(String::as_str));

        info!("pacman install: {}", names.join(" "));
        run_command("pacman", &args)?.ensure_success("pacman -S")
    }

    fn update(&self) -> Result<()> {
        info!("pacman full system upgrade");
        run_command("pacman", &["-Syu", "--noconfirm"])?.ensure_success("pacman -Syu")
    }
}
