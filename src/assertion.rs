//! Declarative state assertions
//!
//! An `Assertion` is pure data describing a desired end state: a package
//! present, a service enabled, a user in a group, a marker-guarded block in
//! a dotfile, or a whole generated file. Assertions carry no behavior;
//! the plan builder resolves them against a `HostProfile` and the executor
//! applies them through provider adapters.
//!
//! # Design
//!
//! - **Per-family parameter tables**: package and service names differ
//!   across distro families; a `FamilyTable` holds the variants so the
//!   engine never branches on family outside the plan builder.
//! - **Explicit failure policy**: every assertion is classified Required or
//!   Optional up front, replacing the source scripts' inconsistent
//!   `|| true` suppression.

use crate::probe::DistroFamily;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Whether a step's failure aborts the run or is merely logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StepPolicy {
    /// Failure aborts the remaining plan
    Required,
    /// Failure is recorded and execution continues
    Optional,
}

impl StepPolicy {
    /// Returns true if a failure under this policy is fatal.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Per-family lookup table for an assertion parameter.
///
/// A `None` entry means the assertion does not apply to that family; the
/// plan builder treats that as a `BuildError` unless the assertion is
/// marked optional-for-family.
#[derive(Debug, Clone, Default)]
pub struct FamilyTable<T> {
    pub arch: Option<T>,
    pub debian: Option<T>,
    pub redhat: Option<T>,
}

impl<T: Clone> FamilyTable<T> {
    /// Same value for every family.
    pub fn uniform(value: T) -> Self {
        Self {
            arch: Some(value.clone()),
            debian: Some(value.clone()),
            redhat: Some(value),
        }
    }

    /// Distinct value per family.
    pub fn per_family(arch: T, debian: T, redhat: T) -> Self {
        Self {
            arch: Some(arch),
            debian: Some(debian),
            redhat: Some(redhat),
        }
    }

    /// Look up the value for one family.
    pub fn get(&self, family: DistroFamily) -> Option<&T> {
        match family {
            DistroFamily::Arch => self.arch.as_ref(),
            DistroFamily::Debian => self.debian.as_ref(),
            DistroFamily::RedHat => self.redhat.as_ref(),
        }
    }
}

/// A single desired-state unit.
///
/// Identity is (kind, target key): the package table, service table, group
/// name, or file path. Read-only after catalog construction.
#[derive(Debug, Clone)]
pub enum AssertionKind {
    /// Bring the whole system up to date through the package manager
    SystemUpgrade,

    /// One or more packages present, names resolved per family
    PackagePresent {
        packages: FamilyTable<Vec<String>>,
    },

    /// A service enabled (and optionally started), name resolved per family
    ServiceEnabled {
        service: FamilyTable<String>,
        /// Also start the unit now, not just enable it at boot
        start: bool,
    },

    /// A user belongs to a group
    GroupMembership { user: String, group: String },

    /// A marker-guarded block present in a text file (append-once).
    /// Block text is per-family: the alias block embeds the family's
    /// package-manager command strings.
    FileContains {
        path: PathBuf,
        marker: String,
        block: FamilyTable<String>,
    },

    /// A whole file present with given content and mode (create if absent)
    FileWithContent {
        path: PathBuf,
        content: FamilyTable<String>,
        mode: u32,
    },
}

/// An assertion with its label, failure policy, and applicability flags.
#[derive(Debug, Clone)]
pub struct Assertion {
    /// Short human-readable label, stable across runs (used in the report)
    pub label: String,
    /// Desired end state
    pub kind: AssertionKind,
    /// Required: failure aborts; Optional: failure is logged
    pub policy: StepPolicy,
    /// Only applies when the host has a desktop session
    pub desktop_only: bool,
    /// Families without a table entry are silently skipped instead of
    /// failing the build
    pub optional_for_family: bool,
}

impl Assertion {
    /// Plain constructor with the common defaults (applies everywhere).
    pub fn new(label: impl Into<String>, kind: AssertionKind, policy: StepPolicy) -> Self {
        Self {
            label: label.into(),
            kind,
            policy,
            desktop_only: false,
            optional_for_family: false,
        }
    }

    /// Mark as desktop-session-only.
    pub fn desktop_only(mut self) -> Self {
        self.desktop_only = true;
        self
    }

    /// Mark as skippable on families with no table entry.
    pub fn optional_for_family(mut self) -> Self {
        self.optional_for_family = true;
        self
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            AssertionKind::SystemUpgrade => "system-upgrade".to_string(),
            AssertionKind::PackagePresent { .. } => "package-present".to_string(),
            AssertionKind::ServiceEnabled { .. } => "service-enabled".to_string(),
            AssertionKind::GroupMembership { user, group } => {
                format!("group-membership({} -> {})", user, group)
            }
            AssertionKind::FileContains { path, .. } => {
                format!("file-contains({})", path.display())
            }
            AssertionKind::FileWithContent { path, .. } => {
                format!("file-with-content({})", path.display())
            }
        };
        write!(f, "{} [{}] {}", self.label, self.policy, kind)
    }
}
