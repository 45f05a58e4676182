//! netrig library
//!
//! Core engine for declarative, idempotent provisioning of
//! network-automation workstations: probe the host, resolve a desired-state
//! catalog into a plan, apply only the deltas, report what changed.

pub mod assertion;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod executor;
pub mod fsops;
pub mod plan;
pub mod probe;
pub mod providers;
pub mod render;
pub mod report;
pub mod runner;
pub mod signals;

// Re-export main types for convenience
pub use assertion::{Assertion, AssertionKind, FamilyTable, StepPolicy};
pub use catalog::{default_catalog, RunContext};
pub use error::{NetrigError, Result};
pub use executor::{execute, ExecOptions, ExecutionLog, ExecutionResult, Outcome};
pub use plan::{build_plan, Action, Plan, PlanStep};
pub use probe::{probe, DistroFamily, HostProfile, PackageManagerKind, ServiceManagerKind};
pub use providers::{PackageProvider, Providers, ServiceProvider, UserProvider};
pub use report::{OutcomeCounts, Report};
pub use runner::{run_command, CommandOutput};
