//! Generated-artifact drift detection.
//!
//! The locale templates are generated output committed to the tree. The
//! inspector reruns the generator and diffs the directory; surviving
//! additions mean the committed artifacts are stale. Regeneration mutates the
//! working tree as a byproduct - this is the gate's one side-effecting step,
//! invoked at most once per run.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{GateError, Result};
use crate::git::run_git;
use crate::policy;

/// Produces the post-regeneration diff of a generated directory.
pub trait ArtifactDriftInspector {
    /// Run the regeneration step, then return the raw diff of the generated
    /// directory against its committed state.
    fn regenerate_and_diff(&self) -> Result<String>;
}

/// Shells out to the locale Makefile and diffs [`policy::LOCALE_DIR`].
pub struct LocaleDriftInspector {
    repo_root: PathBuf,
}

impl LocaleDriftInspector {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }
}

impl ArtifactDriftInspector for LocaleDriftInspector {
    fn regenerate_and_diff(&self) -> Result<String> {
        regenerate(&self.repo_root)?;
        run_git(&self.repo_root, &["diff", "--", policy::LOCALE_DIR])
    }
}

fn regenerate(repo_root: &Path) -> Result<()> {
    let exe = policy::REGEN_COMMAND[0];
    let args = &policy::REGEN_COMMAND[1..];
    debug!(command = ?policy::REGEN_COMMAND, "regenerating locale artifacts");

    let output = Command::new(exe)
        .args(args)
        .current_dir(repo_root)
        .output()
        .map_err(|e| GateError::Regen(format!("failed to run {exe}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GateError::Regen(format!(
            "{} exited with {}: {}",
            policy::REGEN_COMMAND.join(" "),
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Drop known-benign lines from a raw drift diff.
///
/// Keeps only additions, minus `+++` headers and lines carrying the
/// generator's timestamp marker. Whatever survives is real drift.
pub fn filter_drift(raw: &str) -> String {
    raw.lines()
        .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
        .filter(|l| !l.contains(policy::LOCALE_TIMESTAMP_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}
