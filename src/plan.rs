//! Plan builder
//!
//! Translates the ordered assertion catalog plus a probed `HostProfile` into
//! an ordered sequence of fully resolved `PlanStep`s the executor can apply.
//!
//! # Design
//!
//! - **Pure logic**: no I/O, no side effects, only parameter resolution.
//! - **Order preserving**: plan order is catalog order filtered by
//!   applicability; no reordering or dependency inference, ever.
//! - **Fail closed**: an assertion that resolves to a missing or empty
//!   parameter for the probed family is a `Build` error unless it is
//!   explicitly marked optional-for-family, in which case it is dropped.
//!   The executor can therefore never see an undefined argument.

use crate::assertion::{Assertion, AssertionKind, StepPolicy};
use crate::error::{NetrigError, Result};
use crate::probe::HostProfile;
use std::fmt;
use std::path::PathBuf;

/// A fully resolved mutation: concrete names and rendered content only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Full system upgrade through the package manager
    Upgrade,
    /// Install packages, in the given order
    InstallPackages { names: Vec<String> },
    /// Enable (and optionally start) a service unit
    EnableService { name: String, start: bool },
    /// Add a user to a group
    AddUserToGroup { user: String, group: String },
    /// Insert a marker-guarded block into a text file
    EnsureBlockInFile {
        path: PathBuf,
        marker: String,
        block: String,
    },
    /// Create a file with content and mode if absent
    WriteFileIfAbsent {
        path: PathBuf,
        content: String,
        mode: u32,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upgrade => write!(f, "Upgrade"),
            Self::InstallPackages { names } => write!(f, "InstallPackages({})", names.join(", ")),
            Self::EnableService { name, start } => {
                write!(f, "EnableService({}, start={})", name, start)
            }
            Self::AddUserToGroup { user, group } => {
                write!(f, "AddUserToGroup({} -> {})", user, group)
            }
            Self::EnsureBlockInFile { path, marker, .. } => {
                write!(f, "EnsureBlockInFile({}, marker={})", path.display(), marker)
            }
            Self::WriteFileIfAbsent { path, mode, .. } => {
                write!(f, "WriteFileIfAbsent({}, mode={:o})", path.display(), mode)
            }
        }
    }
}

/// One assertion bound to resolved, family-specific parameters.
///
/// Created by the plan builder, consumed once by the executor.
#[derive(Debug, Clone)]
pub struct PlanStep {
    /// Position in the plan (0-based, dense)
    pub index: usize,
    /// Label carried over from the assertion
    pub label: String,
    /// Resolved mutation
    pub action: Action,
    /// Required/Optional failure policy
    pub policy: StepPolicy,
}

/// An ordered, fully resolved provisioning plan.
#[derive(Debug, Clone)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Human-readable preview for the `plan` subcommand and logs.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Provisioning plan ({} steps):", self.steps.len())];
        for step in &self.steps {
            lines.push(format!(
                "  {}. [{}] {} - {}",
                step.index + 1,
                step.policy,
                step.label,
                step.action
            ));
        }
        lines.join("\n")
    }
}

/// Build an execution plan from `catalog` for the probed `profile`.
///
/// # Errors
///
/// `Build` when an assertion that is not optional-for-family has no (or an
/// empty) parameter for the profile's family.
pub fn build_plan(catalog: &[Assertion], profile: &HostProfile) -> Result<Plan> {
    let mut steps = Vec::new();

    for assertion in catalog {
        if assertion.desktop_only && !profile.desktop {
            log::debug!("Skipping desktop-only assertion: {}", assertion.label);
            continue;
        }

        let action = match resolve(assertion, profile)? {
            Some(action) => action,
            None => {
                // Only reachable for optional-for-family assertions
                log::debug!(
                    "Assertion '{}' not applicable to family {}, dropped",
                    assertion.label,
                    profile.family
                );
                continue;
            }
        };

        steps.push(PlanStep {
            index: steps.len(),
            label: assertion.label.clone(),
            action,
            policy: assertion.policy,
        });
    }

    log::info!("Built plan with {} steps for {}", steps.len(), profile.family);

    Ok(Plan { steps })
}

/// Resolve one assertion's family-specific parameters.
///
/// Returns `Ok(None)` only when the assertion is optional-for-family and has
/// no entry for this family. Missing or empty parameters on any other
/// assertion fail closed.
fn resolve(assertion: &Assertion, profile: &HostProfile) -> Result<Option<Action>> {
    let family = profile.family;

    let unresolved = |what: &str| -> NetrigError {
        NetrigError::build(format!(
            "assertion '{}' has no {} for family {}",
            assertion.label, what, family
        ))
    };

    let action = match &assertion.kind {
        AssertionKind::SystemUpgrade => Some(Action::Upgrade),

        AssertionKind::PackagePresent { packages } => match packages.get(family) {
            Some(names) if !names.is_empty() => Some(Action::InstallPackages {
                names: names.clone(),
            }),
            Some(_) => return Err(unresolved("non-empty package list")),
            None if assertion.optional_for_family => None,
            None => return Err(unresolved("package list")),
        },

        AssertionKind::ServiceEnabled { service, start } => match service.get(family) {
            Some(name) if !name.is_empty() => Some(Action::EnableService {
                name: name.clone(),
                start: *start,
            }),
            Some(_) => return Err(unresolved("non-empty service name")),
            None if assertion.optional_for_family => None,
            None => return Err(unresolved("service name")),
        },

        AssertionKind::GroupMembership { user, group } => {
            if user.is_empty() || group.is_empty() {
                return Err(unresolved("user and group"));
            }
            Some(Action::AddUserToGroup {
                user: user.clone(),
                group: group.clone(),
            })
        }

        AssertionKind::FileContains { path, marker, block } => match block.get(family) {
            Some(text) if !text.is_empty() => Some(Action::EnsureBlockInFile {
                path: path.clone(),
                marker: marker.clone(),
                block: text.clone(),
            }),
            Some(_) => return Err(unresolved("non-empty block text")),
            None if assertion.optional_for_family => None,
            None => return Err(unresolved("block text")),
        },

        AssertionKind::FileWithContent { path, content, mode } => match content.get(family) {
            Some(text) if !text.is_empty() => Some(Action::WriteFileIfAbsent {
                path: path.clone(),
                content: text.clone(),
                mode: *mode,
            }),
            Some(_) => return Err(unresolved("non-empty file content")),
            None if assertion.optional_for_family => None,
            None => return Err(unresolved("file content")),
        },
    };

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::FamilyTable;
    use crate::probe::{DistroFamily, HostProfile};

    fn profile(family: DistroFamily, desktop: bool) -> HostProfile {
        HostProfile {
            distro_id: "test".to_string(),
            package_manager: family.package_manager(),
            service_manager: family.service_manager(),
            family,
            desktop,
        }
    }

    fn pkg_assertion(label: &str, table: FamilyTable<Vec<String>>) -> Assertion {
        Assertion::new(
            label,
            AssertionKind::PackagePresent { packages: table },
            StepPolicy::Required,
        )
    }

    #[test]
    fn test_build_plan_resolves_family_names() {
        let catalog = vec![pkg_assertion(
            "ssh",
            FamilyTable::per_family(
                vec!["openssh".to_string()],
                vec!["openssh-server".to_string()],
                vec!["openssh-server".to_string()],
            ),
        )];

        let plan = build_plan(&catalog, &profile(DistroFamily::Arch, false)).expect("build failed");
        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan.steps[0].action,
            Action::InstallPackages {
                names: vec!["openssh".to_string()]
            }
        );

        let plan =
            build_plan(&catalog, &profile(DistroFamily::Debian, false)).expect("build failed");
        assert_eq!(
            plan.steps[0].action,
            Action::InstallPackages {
                names: vec!["openssh-server".to_string()]
            }
        );
    }

    #[test]
    fn test_build_plan_preserves_catalog_order() {
        let catalog = vec![
            Assertion::new("update", AssertionKind::SystemUpgrade, StepPolicy::Required),
            pkg_assertion("a", FamilyTable::uniform(vec!["a".to_string()])),
            pkg_assertion("b", FamilyTable::uniform(vec!["b".to_string()])),
        ];

        let plan = build_plan(&catalog, &profile(DistroFamily::Arch, false)).expect("build failed");
        let labels: Vec<&str> = plan.steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["update", "a", "b"]);
        // Indices are dense and ordered
        for (i, step) in plan.steps.iter().enumerate() {
            assert_eq!(step.index, i);
        }
    }

    #[test]
    fn test_missing_family_entry_fails_closed() {
        let catalog = vec![pkg_assertion(
            "arch only",
            FamilyTable {
                arch: Some(vec!["terraform".to_string()]),
                debian: None,
                redhat: None,
            },
        )];

        let err = build_plan(&catalog, &profile(DistroFamily::Debian, false))
            .expect_err("should fail closed");
        assert!(matches!(err, NetrigError::Build(_)));
        assert!(err.to_string().contains("arch only"));
    }

    #[test]
    fn test_optional_for_family_is_dropped_silently() {
        let catalog = vec![
            pkg_assertion(
                "arch only",
                FamilyTable {
                    arch: Some(vec!["terraform".to_string()]),
                    debian: None,
                    redhat: None,
                },
            )
            .optional_for_family(),
            pkg_assertion("everywhere", FamilyTable::uniform(vec!["git".to_string()])),
        ];

        let plan =
            build_plan(&catalog, &profile(DistroFamily::RedHat, false)).expect("build failed");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps[0].label, "everywhere");
        assert_eq!(plan.steps[0].index, 0);
    }

    #[test]
    fn test_empty_package_list_fails_closed_even_if_optional_for_family() {
        // An entry that exists but is empty is a catalog bug, not a gap
        let catalog = vec![pkg_assertion("broken", FamilyTable::uniform(vec![])).optional_for_family()];
        let err = build_plan(&catalog, &profile(DistroFamily::Arch, false))
            .expect_err("should fail closed");
        assert!(matches!(err, NetrigError::Build(_)));
    }

    #[test]
    fn test_desktop_only_filtered_on_headless_profile() {
        let catalog = vec![
            pkg_assertion("tweaks", FamilyTable::uniform(vec!["gnome-tweaks".to_string()]))
                .desktop_only(),
            pkg_assertion("git", FamilyTable::uniform(vec!["git".to_string()])),
        ];

        let headless =
            build_plan(&catalog, &profile(DistroFamily::Arch, false)).expect("build failed");
        assert_eq!(headless.len(), 1);
        assert_eq!(headless.steps[0].label, "git");

        let desktop =
            build_plan(&catalog, &profile(DistroFamily::Arch, true)).expect("build failed");
        assert_eq!(desktop.len(), 2);
        assert_eq!(desktop.steps[0].label, "tweaks");
    }

    #[test]
    fn test_default_catalog_builds_for_every_family_and_profile() {
        use crate::catalog::{default_catalog, RunContext};
        let ctx = RunContext {
            user: "rig".to_string(),
            home: std::path::PathBuf::from("/home/rig"),
            git_name: "Rig".to_string(),
            git_email: "rig@example.net".to_string(),
        };
        let catalog = default_catalog(&ctx).expect("catalog failed");

        for family in [DistroFamily::Arch, DistroFamily::Debian, DistroFamily::RedHat] {
            for desktop in [false, true] {
                let plan = build_plan(&catalog, &profile(family, desktop))
                    .expect("default catalog must build for every supported profile");
                assert!(!plan.is_empty());
                assert_eq!(plan.steps[0].action, Action::Upgrade);
            }
        }
    }

    #[test]
    fn test_plan_summary_lists_every_step() {
        let catalog = vec![
            Assertion::new("update", AssertionKind::SystemUpgrade, StepPolicy::Required),
            pkg_assertion("git", FamilyTable::uniform(vec!["git".to_string()])),
        ];
        let plan = build_plan(&catalog, &profile(DistroFamily::Arch, false)).expect("build failed");
        let summary = plan.summary();
        assert!(summary.contains("2 steps"));
        assert!(summary.contains("1. [required] update"));
        assert!(summary.contains("2. [required] git"));
    }
}
