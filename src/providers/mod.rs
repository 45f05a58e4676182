//! Provider adapters
//!
//! The capability interface abstracting package managers, service managers,
//! and the user/group tool. The engine core issues only these calls; exit
//! status and stderr from the underlying tools are each adapter's error
//! source.
//!
//! # Contract
//!
//! - `is_installed` / `is_enabled` / `is_active` / `in_group` are
//!   idempotence checks and must not mutate state.
//! - Mutations are independently idempotent where the tool allows it
//!   (enabling an already-enabled unit is success, not error).
//! - Adapters block until the external tool completes; there is no
//!   cancellation mid-call.

mod apt;
mod dnf;
mod pacman;
mod systemd;
mod usertool;

pub use apt::AptProvider;
pub use dnf::DnfProvider;
pub use pacman::PacmanProvider;
pub use systemd::SystemdProvider;
pub use usertool::UsermodProvider;

use crate::probe::{HostProfile, PackageManagerKind, ServiceManagerKind};
use anyhow::Result;

/// Package-manager capability interface, implemented once per kind.
pub trait PackageProvider {
    /// Non-mutating: is `name` installed right now?
    fn is_installed(&self, name: &str) -> Result<bool>;

    /// Install packages in the given order. Delegates dependency
    /// resolution to the underlying tool.
    fn install(&self, names: &[String]) -> Result<()>;

    /// Bring the whole system up to date.
    fn update(&self) -> Result<()>;
}

/// Service-manager capability interface.
///
/// Structurally identical across families in practice (every supported
/// family runs systemd) but kept behind a trait so tests can simulate
/// hosts and future families can differ.
pub trait ServiceProvider {
    /// Non-mutating: is the unit enabled at boot?
    fn is_enabled(&self, name: &str) -> Result<bool>;

    /// Non-mutating: is the unit running right now?
    fn is_active(&self, name: &str) -> Result<bool>;

    /// Enable the unit at boot. Enabling an already-enabled unit succeeds.
    fn enable(&self, name: &str) -> Result<()>;

    /// Start the unit now. Starting an already-running unit succeeds.
    fn start(&self, name: &str) -> Result<()>;
}

/// User/group membership capability interface.
pub trait UserProvider {
    /// Non-mutating: is `user` a member of `group`?
    fn in_group(&self, user: &str, group: &str) -> Result<bool>;

    /// Add `user` to `group` (supplementary, preserving existing groups).
    fn add_to_group(&self, user: &str, group: &str) -> Result<()>;
}

/// The full adapter set the executor drives.
pub struct Providers {
    pub package: Box<dyn PackageProvider>,
    pub service: Box<dyn ServiceProvider>,
    pub user: Box<dyn UserProvider>,
}

impl Providers {
    /// Select the adapters matching a probed host profile.
    pub fn for_profile(profile: &HostProfile) -> Self {
        let package: Box<dyn PackageProvider> = match profile.package_manager {
            PackageManagerKind::Pacman => Box::new(PacmanProvider),
            PackageManagerKind::Apt => Box::new(AptProvider),
            PackageManagerKind::Dnf => Box::new(DnfProvider),
        };

        let service: Box<dyn ServiceProvider> = match profile.service_manager {
            ServiceManagerKind::Systemd => Box::new(SystemdProvider),
        };

        Self {
            package,
            service,
            user: Box::new(UsermodProvider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::DistroFamily;

    fn profile(family: DistroFamily) -> HostProfile {
        HostProfile {
            distro_id: "test".to_string(),
            package_manager: family.package_manager(),
            service_manager: family.service_manager(),
            family,
            desktop: false,
        }
    }

    #[test]
    fn test_adapter_selection_matches_family() {
        // Selection must not panic for any supported family; the concrete
        // types are erased behind the trait objects.
        for family in [DistroFamily::Arch, DistroFamily::Debian, DistroFamily::RedHat] {
            let _ = Providers::for_profile(&profile(family));
        }
    }
}
