//! patchgate - pre-merge commit gatekeeper
//!
//! `patchgate <BASE>` inspects every change introduced since the base
//! revision and exits non-zero when any project convention is violated.
//! CI consumes the exit status as a single pass/fail gate.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use patchgate_core::{
    default_rules, evaluate, Changeset, FsLineEndingInspector, GitChangesetProvider,
    LocaleDriftInspector, Report,
};

#[derive(Parser)]
#[command(name = "patchgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reject change sets that violate project conventions", long_about = None)]
struct Cli {
    /// Base reference (commit hash, tag, or branch) to diff against
    base: String,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {e:#}", "fatal:".red().bold());
            std::process::exit(1);
        }
    }
}

/// Build the changeset, evaluate the rule set, render the report.
///
/// Returns the process exit code on a completed run; an `Err` is a fatal
/// condition (unresolvable base, missing repository) with no partial report.
fn run(cli: &Cli) -> Result<i32> {
    let repo_root = std::env::current_dir().context("cannot determine repository root")?;
    debug!(base = %cli.base, repo = %repo_root.display(), "building changeset");

    let provider = GitChangesetProvider::new(&repo_root);
    let changeset = provider
        .build_changeset(&cli.base)
        .with_context(|| format!("cannot inspect changes since '{}'", cli.base))?;

    print_header(&changeset);

    let rules = default_rules(
        Box::new(FsLineEndingInspector::new(&repo_root)),
        Box::new(LocaleDriftInspector::new(&repo_root)),
    );
    let report = evaluate(&changeset, &rules);

    print_failures(&report);
    Ok(report.exit_code())
}

fn print_header(changeset: &Changeset) {
    println!(
        "Checking changes since {} ({})",
        changeset.base.short_hash.bold(),
        changeset.base.subject
    );
    println!();
    if changeset.commits.is_empty() {
        println!("No commits since base.");
    } else {
        println!("Commits:");
        for commit in &changeset.commits {
            println!("  {} {}", commit.short_hash.yellow(), commit.subject);
        }
    }
    println!();
}

/// Failed verdicts only; passing rules stay quiet.
fn print_failures(report: &Report) {
    for verdict in report.failures() {
        println!("{} {}", "FAILED".red().bold(), verdict.rule_id.bold());
        if let Some(message) = &verdict.message {
            for line in message.lines() {
                println!("  {line}");
            }
        }
        println!();
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .ok();
}
