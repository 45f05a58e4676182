//! Run summary
//!
//! Pure summarization of an execution log: counts per outcome, steps never
//! attempted, required manual follow-ups, and the full ordered log for
//! audit. No mutation, no I/O; presentation (console text, JSON) is built
//! from the returned structure.

use crate::executor::{ExecutionLog, ExecutionResult, Outcome};
use serde::Serialize;

/// Counts per outcome kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub applied: usize,
    pub already_satisfied: usize,
    pub skipped: usize,
    pub failed_recoverable: usize,
    pub failed_fatal: usize,
    /// Trailing steps with no result after a fatal failure
    pub not_attempted: usize,
}

/// Structured summary of one provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub counts: OutcomeCounts,
    /// True when a fatal failure abandoned the remaining plan
    pub aborted: bool,
    /// Manual actions the operator still owes the machine
    pub follow_ups: Vec<String>,
    /// Full ordered log, one entry per executed step
    pub log: Vec<ExecutionResult>,
}

impl Report {
    /// Summarize an execution log.
    ///
    /// The re-login follow-up is emitted unconditionally whenever any group
    /// membership step was applied: the new group only takes effect in
    /// fresh sessions. The executor records the grant on the result itself,
    /// so the notice does not depend on how the step is labeled.
    pub fn summarize(log: ExecutionLog) -> Self {
        let mut counts = OutcomeCounts {
            not_attempted: log.not_attempted(),
            ..Default::default()
        };
        let mut follow_ups = Vec::new();

        for result in &log.results {
            if result.relogin_required {
                let notice = "log out and back in for group membership changes to take effect"
                    .to_string();
                if !follow_ups.contains(&notice) {
                    follow_ups.push(notice);
                }
            }
            match &result.outcome {
                Outcome::Applied => counts.applied += 1,
                Outcome::AlreadySatisfied => counts.already_satisfied += 1,
                Outcome::Skipped { .. } => counts.skipped += 1,
                Outcome::Failed { fatal: false, .. } => counts.failed_recoverable += 1,
                Outcome::Failed { fatal: true, .. } => counts.failed_fatal += 1,
            }
        }

        Self {
            counts,
            aborted: log.aborted(),
            follow_ups,
            log: log.results,
        }
    }

    /// True when the run counts as a success for the exit status: no fatal
    /// failure. Recoverable failures on optional steps do not fail the run.
    pub fn succeeded(&self) -> bool {
        !self.aborted
    }

    /// Console rendering of the summary.
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();

        lines.push("Provisioning report".to_string());
        lines.push(format!(
            "  applied: {}  already satisfied: {}  skipped: {}",
            self.counts.applied, self.counts.already_satisfied, self.counts.skipped
        ));
        lines.push(format!(
            "  failed (recoverable): {}  failed (fatal): {}  not attempted: {}",
            self.counts.failed_recoverable, self.counts.failed_fatal, self.counts.not_attempted
        ));

        lines.push("  steps:".to_string());
        for entry in &self.log {
            lines.push(format!("    {}. {} - {}", entry.index + 1, entry.label, entry.outcome));
        }

        if !self.follow_ups.is_empty() {
            lines.push("  follow-ups:".to_string());
            for f in &self.follow_ups {
                lines.push(format!("    - {}", f));
            }
        }

        if self.aborted {
            lines.push(format!(
                "  ABORTED: {} step(s) were not attempted",
                self.counts.not_attempted
            ));
        }

        lines.join("\n")
    }
}
