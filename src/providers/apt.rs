//! apt adapter (Debian family)

use super::PackageProvider;
use crate::runner::run_command;
use anyhow::Result;
use log::info;

/// Package provider shelling out to apt-get/dpkg-query.
///
/// apt-get (not apt) is used for the scripting-stable interface. All calls
/// pass `-y`; the engine's own confirm gate is the only prompt in a run.
pub struct AptProvider;

impl PackageProvider for AptProvider {
    fn is_installed(&self, name: &str) -> Result<bool> {
        // dpkg-query exits non-zero for unknown packages; a known but
        // removed package reports a status other than "install ok installed"
        let out = run_command("dpkg-query", &["-W", "-f=${Status}", name])?;
        Ok(out.success && out.stdout.contains("install ok installed"))
    }

    fn install(&self, names: &[String]) -> Result<()> {
        let mut args = vec!["install", "-y"];
        args.extend(names.iter().map(String::as_str));

        info!("apt-get install: {}", names.join(" "));
        run_command("apt-get", &args)?.ensure_success("apt-get install")
    }

    fn update(&self) -> Result<()> {
        info!("apt-get full system upgrade");
        run_command("apt-get", &["update"])?.ensure_success("apt-get update")?;
        run_command("apt-get", &["upgrade", "-y"])?.ensure_success("apt-get upgrade")
    }
}
