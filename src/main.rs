//! netrig - Main entry point
//!
//! probe → build plan → confirm → execute → report, in that order. All
//! engine logic lives in the library; this binary wires the pipeline
//! together and owns presentation.

use log::{debug, error, info};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use netrig::catalog::{default_catalog, RunContext};
use netrig::cli::{Cli, Commands};
use netrig::executor::{execute, ExecOptions};
use netrig::plan::build_plan;
use netrig::probe::probe;
use netrig::providers::Providers;
use netrig::report::Report;
use netrig::signals;

/// Initialize the logger with appropriate settings
fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;

    Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env() // Allows RUST_LOG env var to override
        .init();
}

/// Main application entry point
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    info!("netrig starting up");

    if let Err(e) = signals::install() {
        log::warn!("Failed to install interrupt handler: {}", e);
        // Continue anyway - the default SIGINT behavior still terminates
    }
    debug!("Interrupt handler installed");

    let cli = Cli::parse_args();
    let opts = ExecOptions { dry_run: cli.dry_run };

    match cli.command {
        Some(Commands::Probe) => {
            let profile = probe(Path::new("/"), cli.headless)?;
            println!("{}", profile);
        }
        Some(Commands::Plan { user, home }) => {
            let profile = probe(Path::new("/"), cli.headless)?;
            let ctx = resolve_context(user, home, None, None)?;
            let catalog = default_catalog(&ctx)?;
            let plan = build_plan(&catalog, &profile)?;
            println!("Host: {}", profile);
            println!("{}", plan.summary());
        }
        Some(Commands::Provision {
            yes,
            json,
            user,
            home,
            git_name,
            git_email,
        }) => {
            run_provision(yes, json, user, home, git_name, git_email, cli.headless, opts)?;
        }
        None => {
            info!("No command specified, running full provisioning");
            run_provision(false, false, None, None, None, None, cli.headless, opts)?;
        }
    }

    Ok(())
}

/// The full provisioning pipeline.
#[allow(clippy::too_many_arguments)]
fn run_provision(
    yes: bool,
    json: bool,
    user: Option<String>,
    home: Option<PathBuf>,
    git_name: Option<String>,
    git_email: Option<String>,
    headless: bool,
    opts: ExecOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = probe(Path::new("/"), headless)?;
    println!("Host: {}", profile);

    let ctx = resolve_context(user, home, git_name, git_email)?;
    info!("Provisioning for user '{}' (home {})", ctx.user, ctx.home.display());

    let catalog = default_catalog(&ctx)?;
    let plan = build_plan(&catalog, &profile)?;
    println!("{}", plan.summary());

    if opts.dry_run {
        println!("(dry-run: no changes will be made)");
    } else if !yes && !confirm()? {
        println!("Aborted; no changes were made.");
        return Ok(());
    }

    signals::mark_mutation_started();
    let log = execute(&plan, &Providers::for_profile(&profile), opts);
    let report = Report::summarize(log);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }

    if !report.succeeded() {
        let aborted = netrig::NetrigError::Aborted {
            completed: report.log.len(),
            not_attempted: report.counts.not_attempted,
        };
        error!("{}", aborted);
        std::process::exit(1);
    }

    Ok(())
}

/// Single confirm gate: one blocking line read; any input proceeds,
/// end-of-input aborts.
fn confirm() -> Result<bool, Box<dyn std::error::Error>> {
    println!("Press Enter to apply this plan (Ctrl-C to abort):");
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    Ok(read > 0)
}

/// Resolve the run context from flags and the environment.
///
/// The source scripts read `$USER`/`$HOME` as ambient globals; here they
/// become explicit parameters with environment fallbacks. Under sudo the
/// invoking user (not root) is the provisioning target.
fn resolve_context(
    user: Option<String>,
    home: Option<PathBuf>,
    git_name: Option<String>,
    git_email: Option<String>,
) -> Result<RunContext, Box<dyn std::error::Error>> {
    let user = match user {
        Some(u) => u,
        None => std::env::var("SUDO_USER")
            .or_else(|_| std::env::var("USER"))
            .map_err(|_| "cannot determine target user: pass --user or set $USER")?,
    };

    let home = home.unwrap_or_else(|| {
        if user == "root" {
            PathBuf::from("/root")
        } else {
            Path::new("/home").join(&user)
        }
    });

    Ok(RunContext {
        user,
        home,
        git_name: git_name.unwrap_or_else(|| "Network Automation".to_string()),
        git_email: git_email.unwrap_or_else(|| "netops@example.net".to_string()),
    })
}
