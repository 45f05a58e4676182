//! dnf adapter (RedHat family)

use super::PackageProvider;
use crate::runner::run_command;
use anyhow::Result;
use log::info;

/// Package provider shelling out to dnf/rpm.
pub struct DnfProvider;

impl PackageProvider for DnfProvider {
    fn is_installed(&self, name: &str) -> Result<bool> {
        // `rpm -q` exits non-zero when the package is not installed
        let out = run_command("rpm", &["-q", name])?;
        Ok(out.success)
    }

    fn install(&self, names: &[String]) -> Result<()> {
        let mut args = vec!["install", "-y"];
        args.extend(names.iter().map(String::as_str));

        info!("dnf install: {}", names.join(" "));
        run_command("dnf", &args)?.ensure_success("dnf install")
    }

    fn update(&self) -> Result<()> {
        info!("dnf full system upgrade");
        run_command("dnf", &["upgrade", "-y"])?.ensure_success("dnf upgrade")
    }
}
