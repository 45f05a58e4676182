//! Plan executor
//!
//! Applies a resolved plan step by step, strictly in order, single-threaded.
//! Later steps may depend on earlier ones (a service cannot be enabled
//! before its package is installed), so the design deliberately forbids
//! parallel execution.
//!
//! Per step:
//!
//! 1. Query current state through the adapter's idempotence check.
//! 2. Already satisfied → record `AlreadySatisfied`, no mutation.
//! 3. Otherwise mutate through the provider adapter or filesystem op.
//! 4. On failure: Optional steps record `Failed` (recoverable) and
//!    execution continues; Required steps record `Failed` (fatal) and the
//!    remaining plan is abandoned; trailing steps get no result and are
//!    reported as not attempted.
//!
//! The executor owns the result log for the duration of one run and holds
//! no other state. There is no mid-step cancellation and no rollback.

use crate::fsops;
use crate::plan::{Action, Plan, PlanStep};
use crate::providers::Providers;
use log::{info, warn};
use serde::Serialize;
use std::fmt;

/// Execution switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions {
    /// Skip every unsatisfied mutation, recording `Skipped("dry-run")`.
    /// Idempotence checks still run so the preview is realistic.
    pub dry_run: bool,
}

/// What happened to one plan step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Outcome {
    /// The mutation ran and succeeded
    Applied,
    /// The desired state already held; nothing was mutated
    AlreadySatisfied,
    /// The mutation was bypassed (e.g. dry-run)
    Skipped { reason: String },
    /// The mutation did not succeed
    Failed { error: String, fatal: bool },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::AlreadySatisfied => write!(f, "already satisfied"),
            Self::Skipped { reason } => write!(f, "skipped ({})", reason),
            Self::Failed { error, fatal } => {
                let class = if *fatal { "fatal" } else { "recoverable" };
                write!(f, "FAILED [{}]: {}", class, error)
            }
        }
    }
}

/// One step's recorded outcome. Appended in execution order, never mutated
/// after append.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub index: usize,
    pub label: String,
    /// True when this step granted a group membership; the grant only
    /// takes effect in fresh login sessions
    pub relogin_required: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// The ordered outcome log for one run.
#[derive(Debug, Clone)]
pub struct ExecutionLog {
    /// Total steps in the executed plan
    pub planned: usize,
    /// One result per executed step, in execution order
    pub results: Vec<ExecutionResult>,
}

impl ExecutionLog {
    /// True if a fatal failure abandoned the remaining plan.
    pub fn aborted(&self) -> bool {
        self.results
            .iter()
            .any(|r| matches!(r.outcome, Outcome::Failed { fatal: true, .. }))
    }

    /// Steps that never ran because of a fatal failure.
    pub fn not_attempted(&self) -> usize {
        self.planned - self.results.len()
    }
}

/// Apply `plan` through `providers`, returning the ordered result log.
///
/// Never returns early with an error: per-step failures land in the log,
/// and a fatal failure simply truncates it. Pre-mutation failures
/// (probe, build) are the caller's concern and happen before this point.
pub fn execute(plan: &Plan, providers: &Providers, opts: ExecOptions) -> ExecutionLog {
    let mut results = Vec::with_capacity(plan.len());

    for step in &plan.steps {
        let outcome = run_step(step, providers, opts);
        info!("[{}/{}] {}: {}", step.index + 1, plan.len(), step.label, outcome);

        let fatal = matches!(outcome, Outcome::Failed { fatal: true, .. });
        let relogin_required = matches!(outcome, Outcome::Applied)
            && matches!(step.action, Action::AddUserToGroup { .. });
        results.push(ExecutionResult {
            index: step.index,
            label: step.label.clone(),
            relogin_required,
            outcome,
        });

        if fatal {
            warn!(
                "Required step '{}' failed; abandoning {} remaining step(s)",
                step.label,
                plan.len() - results.len()
            );
            break;
        }
    }

    ExecutionLog {
        planned: plan.len(),
        results,
    }
}

/// Execute one step: idempotence check, then mutation.
fn run_step(step: &PlanStep, providers: &Providers, opts: ExecOptions) -> Outcome {
    // 1. Idempotence check. A failing check is a step failure: mutating
    //    blindly after a broken query could double-apply.
    match is_satisfied(&step.action, providers) {
        Ok(true) => return Outcome::AlreadySatisfied,
        Ok(false) => {}
        Err(e) => return failed(step, e),
    }

    // 2. Dry-run bypasses every mutation.
    if opts.dry_run {
        return Outcome::Skipped {
            reason: "dry-run".to_string(),
        };
    }

    // 3. Mutate.
    match apply(&step.action, providers) {
        Ok(()) => Outcome::Applied,
        Err(e) => failed(step, e),
    }
}

fn failed(step: &PlanStep, error: anyhow::Error) -> Outcome {
    Outcome::Failed {
        error: format!("{:#}", error),
        fatal: step.policy.is_fatal(),
    }
}

/// Non-mutating: does the step's desired state already hold?
///
/// `Upgrade` has no meaningful check (the package manager itself no-ops
/// on an up-to-date system) so it always reports unsatisfied.
fn is_satisfied(action: &Action, providers: &Providers) -> anyhow::Result<bool> {
    match action {
        Action::Upgrade => Ok(false),

        Action::InstallPackages { names } => {
            for name in names {
                if !providers.package.is_installed(name)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }

        Action::EnableService { name, start } => {
            if !providers.service.is_enabled(name)? {
                return Ok(false);
            }
            if *start && !providers.service.is_active(name)? {
                return Ok(false);
            }
            Ok(true)
        }

        Action::AddUserToGroup { user, group } => providers.user.in_group(user, group),

        Action::EnsureBlockInFile { path, marker, .. } => Ok(fsops::block_present(path, marker)?),

        Action::WriteFileIfAbsent { path, .. } => Ok(path.exists()),
    }
}

/// Perform the step's mutation.
fn apply(action: &Action, providers: &Providers) -> anyhow::Result<()> {
    match action {
        Action::Upgrade => providers.package.update(),

        Action::InstallPackages { names } => providers.package.install(names),

        Action::EnableService { name, start } => {
            providers.service.enable(name)?;
            if *start && !providers.service.is_active(name)? {
                providers.service.start(name)?;
            }
            Ok(())
        }

        Action::AddUserToGroup { user, group } => providers.user.add_to_group(user, group),

        Action::EnsureBlockInFile { path, marker, block } => {
            fsops::ensure_block(path, marker, block)?;
            Ok(())
        }

        Action::WriteFileIfAbsent { path, content, mode } => {
            fsops::write_if_absent(path, content, *mode)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::StepPolicy;
    use crate::providers::{PackageProvider, Providers, ServiceProvider, UserProvider};
    use anyhow::bail;
    use std::cell::RefCell;
    use std::collections::HashSet;

    // Minimal in-memory host for executor-level tests; the integration
    // suite carries the fuller simulated host.
    #[derive(Default)]
    struct MemPackages {
        installed: RefCell<HashSet<String>>,
        fail_install: bool,
    }

    impl PackageProvider for MemPackages {
        fn is_installed(&self, name: &str) -> anyhow::Result<bool> {
            Ok(self.installed.borrow().contains(name))
        }
        fn install(&self, names: &[String]) -> anyhow::Result<()> {
            if self.fail_install {
                bail!("simulated install failure");
            }
            let mut set = self.installed.borrow_mut();
            for n in names {
                set.insert(n.clone());
            }
            Ok(())
        }
        fn update(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemServices {
        enabled: RefCell<HashSet<String>>,
        active: RefCell<HashSet<String>>,
    }

    impl ServiceProvider for MemServices {
        fn is_enabled(&self, name: &str) -> anyhow::Result<bool> {
            Ok(self.enabled.borrow().contains(name))
        }
        fn is_active(&self, name: &str) -> anyhow::Result<bool> {
            Ok(self.active.borrow().contains(name))
        }
        fn enable(&self, name: &str) -> anyhow::Result<()> {
            self.enabled.borrow_mut().insert(name.to_string());
            Ok(())
        }
        fn start(&self, name: &str) -> anyhow::Result<()> {
            self.active.borrow_mut().insert(name.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemUsers {
        memberships: RefCell<HashSet<(String, String)>>,
    }

    impl UserProvider for MemUsers {
        fn in_group(&self, user: &str, group: &str) -> anyhow::Result<bool> {
            Ok(self
                .memberships
                .borrow()
                .contains(&(user.to_string(), group.to_string())))
        }
        fn add_to_group(&self, user: &str, group: &str) -> anyhow::Result<()> {
            self.memberships
                .borrow_mut()
                .insert((user.to_string(), group.to_string()));
            Ok(())
        }
    }

    fn mem_providers(fail_install: bool) -> Providers {
        Providers {
            package: Box::new(MemPackages {
                fail_install,
                ..Default::default()
            }),
            service: Box::new(MemServices::default()),
            user: Box::new(MemUsers::default()),
        }
    }

    fn step(index: usize, label: &str, action: Action, policy: StepPolicy) -> PlanStep {
        PlanStep {
            index,
            label: label.to_string(),
            action,
            policy,
        }
    }

    fn install_step(index: usize, name: &str, policy: StepPolicy) -> PlanStep {
        step(
            index,
            name,
            Action::InstallPackages {
                names: vec![name.to_string()],
            },
            policy,
        )
    }

    #[test]
    fn test_unsatisfied_step_is_applied() {
        let plan = Plan {
            steps: vec![install_step(0, "git", StepPolicy::Required)],
        };
        let log = execute(&plan, &mem_providers(false), ExecOptions::default());
        assert_eq!(log.results.len(), 1);
        assert_eq!(log.results[0].outcome, Outcome::Applied);
        assert!(!log.aborted());
    }

    #[test]
    fn test_second_run_is_already_satisfied() {
        let providers = mem_providers(false);
        let plan = Plan {
            steps: vec![install_step(0, "git", StepPolicy::Required)],
        };

        let first = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(first.results[0].outcome, Outcome::Applied);

        let second = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(second.results[0].outcome, Outcome::AlreadySatisfied);
    }

    #[test]
    fn test_fatal_failure_truncates_log() {
        let plan = Plan {
            steps: vec![
                install_step(0, "git", StepPolicy::Required),
                install_step(1, "vim", StepPolicy::Required),
            ],
        };
        // fail_install makes every mutation fail; step 0 fails fatally
        let log = execute(&plan, &mem_providers(true), ExecOptions::default());
        assert_eq!(log.results.len(), 1);
        assert_eq!(log.not_attempted(), 1);
        assert!(log.aborted());
        assert!(matches!(
            log.results[0].outcome,
            Outcome::Failed { fatal: true, .. }
        ));
    }

    #[test]
    fn test_optional_failure_continues() {
        let plan = Plan {
            steps: vec![
                install_step(0, "openrazer-daemon", StepPolicy::Optional),
                step(
                    1,
                    "docker group",
                    Action::AddUserToGroup {
                        user: "rig".to_string(),
                        group: "docker".to_string(),
                    },
                    StepPolicy::Required,
                ),
            ],
        };
        let log = execute(&plan, &mem_providers(true), ExecOptions::default());
        assert_eq!(log.results.len(), 2);
        assert!(!log.aborted());
        assert!(matches!(
            log.results[0].outcome,
            Outcome::Failed { fatal: false, .. }
        ));
        assert_eq!(log.results[1].outcome, Outcome::Applied);
    }

    #[test]
    fn test_applied_group_grant_flags_relogin_regardless_of_label() {
        let providers = mem_providers(false);
        let plan = Plan {
            steps: vec![
                step(
                    0,
                    "add rig to docker",
                    Action::AddUserToGroup {
                        user: "rig".to_string(),
                        group: "docker".to_string(),
                    },
                    StepPolicy::Required,
                ),
                install_step(1, "git", StepPolicy::Required),
            ],
        };

        let log = execute(&plan, &providers, ExecOptions::default());
        assert!(log.results[0].relogin_required);
        assert!(!log.results[1].relogin_required);

        // Second run: the membership already holds, no fresh grant
        let second = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(second.results[0].outcome, Outcome::AlreadySatisfied);
        assert!(!second.results[0].relogin_required);
    }

    #[test]
    fn test_dry_run_skips_unsatisfied_mutations() {
        let providers = mem_providers(false);
        let plan = Plan {
            steps: vec![install_step(0, "git", StepPolicy::Required)],
        };

        let log = execute(&plan, &providers, ExecOptions { dry_run: true });
        assert_eq!(
            log.results[0].outcome,
            Outcome::Skipped {
                reason: "dry-run".to_string()
            }
        );

        // Nothing was mutated: a real run afterwards still applies
        let real = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(real.results[0].outcome, Outcome::Applied);
    }

    #[test]
    fn test_enable_service_starts_when_requested() {
        let providers = mem_providers(false);
        let plan = Plan {
            steps: vec![step(
                0,
                "sshd",
                Action::EnableService {
                    name: "sshd".to_string(),
                    start: true,
                },
                StepPolicy::Required,
            )],
        };

        let log = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(log.results[0].outcome, Outcome::Applied);

        // Enabled and active now; re-run is a no-op
        let second = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(second.results[0].outcome, Outcome::AlreadySatisfied);
    }

    #[test]
    fn test_upgrade_never_reports_satisfied() {
        let providers = mem_providers(false);
        let plan = Plan {
            steps: vec![step(0, "system update", Action::Upgrade, StepPolicy::Required)],
        };

        for _ in 0..2 {
            let log = execute(&plan, &providers, ExecOptions::default());
            assert_eq!(log.results[0].outcome, Outcome::Applied);
        }
    }

    #[test]
    fn test_file_block_step_roundtrip() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let rc = dir.path().join(".bashrc");
        let providers = mem_providers(false);
        let plan = Plan {
            steps: vec![step(
                0,
                "aliases",
                Action::EnsureBlockInFile {
                    path: rc.clone(),
                    marker: "netrig managed aliases".to_string(),
                    block: "alias up='x'".to_string(),
                },
                StepPolicy::Required,
            )],
        };

        let first = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(first.results[0].outcome, Outcome::Applied);
        let content_after_first = std::fs::read_to_string(&rc).expect("read failed");

        let second = execute(&plan, &providers, ExecOptions::default());
        assert_eq!(second.results[0].outcome, Outcome::AlreadySatisfied);
        let content_after_second = std::fs::read_to_string(&rc).expect("read failed");

        assert_eq!(content_after_first, content_after_second);
    }
}
