//! Interrupt handling
//!
//! One rule: SIGINT before any mutation aborts the run cleanly; once
//! execution has begun, steps are never cancelled mid-flight (a step either
//! completes, fails recoverably, or fails fatally), so the interrupt is
//! deferred until the current run finishes.

use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};

static MUTATION_STARTED: AtomicBool = AtomicBool::new(false);

/// Install the SIGINT handler. Call once, before the confirm gate.
///
/// Exit code 130 mirrors the shell convention for interrupt.
pub fn install() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        if MUTATION_STARTED.load(Ordering::SeqCst) {
            warn!("Interrupt received mid-run; finishing the current plan (no mid-step cancellation)");
        } else {
            eprintln!("\nInterrupted before any changes were made; aborting.");
            std::process::exit(130);
        }
    })
}

/// Mark the start of plan execution; interrupts no longer abort.
pub fn mark_mutation_started() {
    MUTATION_STARTED.store(true, Ordering::SeqCst);
}
