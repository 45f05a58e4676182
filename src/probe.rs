//! Host environment detection
//!
//! Classifies the host into a distro family by reading `os-release` under a
//! caller-supplied root, and captures the capability set (package manager,
//! service manager, desktop session) as an immutable `HostProfile`.
//!
//! # Design
//!
//! - **No side effects**: probing is read-only; all mutation happens later
//!   through provider adapters.
//! - **Fail fast**: an unreadable or unrecognized OS identity is an
//!   `UnsupportedHost` error before anything else runs.
//! - **Testable**: the os-release root is a parameter so tests probe a
//!   tempdir instead of the live system.

use crate::error::{NetrigError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Distro family the host belongs to.
///
/// Each family maps to exactly one package-manager kind. All supported
/// families run systemd, so the service-manager kind does not vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DistroFamily {
    /// pacman-based (Arch, Manjaro, EndeavourOS)
    Arch,
    /// apt-based (Debian, Ubuntu, Mint)
    Debian,
    /// dnf-based (Fedora, RHEL, Rocky, Alma)
    RedHat,
}

/// Which package manager drives package assertions on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PackageManagerKind {
    Pacman,
    Apt,
    Dnf,
}

/// Which service manager drives service assertions on this host.
///
/// Every supported family ships systemd, so in practice one adapter is
/// shared; the kind stays explicit so the mapping is visible and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceManagerKind {
    Systemd,
}

impl DistroFamily {
    /// The package-manager kind this family uses.
    pub fn package_manager(self) -> PackageManagerKind {
        match self {
            Self::Arch => PackageManagerKind::Pacman,
            Self::Debian => PackageManagerKind::Apt,
            Self::RedHat => PackageManagerKind::Dnf,
        }
    }

    /// The service-manager kind this family uses.
    pub fn service_manager(self) -> ServiceManagerKind {
        ServiceManagerKind::Systemd
    }
}

/// Immutable description of the probed host.
///
/// Created once at startup and threaded through plan building and
/// execution; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct HostProfile {
    /// Raw `ID=` value from os-release (e.g. "arch", "ubuntu")
    pub distro_id: String,
    /// Classified distro family
    pub family: DistroFamily,
    /// Package manager kind for this family
    pub package_manager: PackageManagerKind,
    /// Service manager kind for this family
    pub service_manager: ServiceManagerKind,
    /// Whether a desktop session is present; gates desktop-only assertions
    pub desktop: bool,
}

impl fmt::Display for HostProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) pkg={} svc={} desktop={}",
            self.distro_id, self.family, self.package_manager, self.service_manager, self.desktop
        )
    }
}

/// Probe the host rooted at `root` (normally `/`).
///
/// Reads `etc/os-release` (falling back to `usr/lib/os-release`), classifies
/// the `ID`/`ID_LIKE` fields into a `DistroFamily`, and detects whether a
/// desktop session is running. `headless` forces the server profile
/// regardless of detection: one runtime flag, not a second code path.
///
/// # Errors
///
/// `UnsupportedHost` if no os-release file is readable or the identity does
/// not match a known family.
pub fn probe(root: &Path, headless: bool) -> Result<HostProfile> {
    let fields = read_os_release(root)?;

    let distro_id = fields
        .get("ID")
        .cloned()
        .ok_or_else(|| NetrigError::unsupported_host("os-release has no ID field"))?;

    let id_like = fields.get("ID_LIKE").cloned().unwrap_or_default();

    let family = classify(&distro_id, &id_like).ok_or_else(|| {
        NetrigError::unsupported_host(format!(
            "unrecognized distro: ID={} ID_LIKE={}",
            distro_id, id_like
        ))
    })?;

    let desktop = !headless && detect_desktop_session();

    let profile = HostProfile {
        distro_id,
        package_manager: family.package_manager(),
        service_manager: family.service_manager(),
        family,
        desktop,
    };

    log::info!("Host probe: {}", profile);

    Ok(profile)
}

/// Parse the first readable os-release file under `root` into a key/value map.
fn read_os_release(root: &Path) -> Result<HashMap<String, String>> {
    let candidates = [root.join("etc/os-release"), root.join("usr/lib/os-release")];

    for path in &candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            log::debug!("Read OS identity from {}", path.display());
            return Ok(parse_os_release(&content));
        }
    }

    Err(NetrigError::unsupported_host(format!(
        "no readable os-release under {}",
        root.display()
    )))
}

/// Parse os-release `KEY=value` lines, stripping optional quotes.
fn parse_os_release(content: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            fields.insert(key.trim().to_string(), value.to_string());
        }
    }
    fields
}

/// Map `ID`/`ID_LIKE` to a distro family.
///
/// `ID` is checked first; derivatives (e.g. Ubuntu, Manjaro, Rocky) are
/// caught through `ID_LIKE` tokens.
fn classify(id: &str, id_like: &str) -> Option<DistroFamily> {
    let matches_token = |token: &str| -> bool {
        id == token || id_like.split_whitespace().any(|t| t == token)
    };

    if matches_token("arch") {
        Some(DistroFamily::Arch)
    } else if matches_token("debian") || matches_token("ubuntu") {
        Some(DistroFamily::Debian)
    } else if matches_token("fedora") || matches_token("rhel") || matches_token("centos") {
        Some(DistroFamily::RedHat)
    } else {
        None
    }
}

/// Detect whether a graphical desktop session is present.
///
/// Checks the session environment the way display managers export it. This
/// is a heuristic: `--headless` on the CLI always wins.
fn detect_desktop_session() -> bool {
    std::env::var_os("XDG_CURRENT_DESKTOP").is_some()
        || std::env::var_os("XDG_SESSION_TYPE")
            .map(|v| v == "x11" || v == "wayland")
            .unwrap_or(false)
}
