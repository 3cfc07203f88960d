//! Git-backed changeset provider.
//!
//! Wraps the `git` binary with `std::process::Command` and turns the
//! base..HEAD range queries into one immutable [`Changeset`].

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::changeset::{ChangeKind, ChangedPath, Changeset, Commit};
use crate::error::{GateError, Result};
use crate::policy;

/// Builds a [`Changeset`] for a base reference by querying the repository.
pub struct GitChangesetProvider {
    repo_root: PathBuf,
}

impl GitChangesetProvider {
    /// Create a provider rooted at the given repository directory.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Build the snapshot for `base_ref..HEAD`.
    ///
    /// Fails with [`GateError::BaseNotFound`] if the reference does not
    /// resolve; any other git failure is [`GateError::Git`]. Both are fatal:
    /// no rule runs without a changeset.
    pub fn build_changeset(&self, base_ref: &str) -> Result<Changeset> {
        let base = self.resolve_base(base_ref)?;
        debug!(base = %base.short_hash, "resolved base reference");

        let range = format!("{base_ref}..HEAD");

        let commits = parse_commit_lines(&self.git(&[
            "log",
            "--no-merges",
            "--reverse",
            "--format=%h%x09%s",
            &range,
        ])?);
        let merge_commits = parse_commit_lines(&self.git(&[
            "log",
            "--merges",
            "--reverse",
            "--format=%h%x09%s",
            &range,
        ])?);

        let diff = self.git(&["diff", &range, "--", policy::SOURCE_GLOB])?;
        let added_lines = parse_added_lines(&diff);

        let name_status = self.git(&["diff", "--no-renames", "--name-status", &range])?;
        let changed_paths = parse_name_status(&name_status);

        debug!(
            commits = commits.len(),
            merges = merge_commits.len(),
            added_lines = added_lines.len(),
            changed_paths = changed_paths.len(),
            "built changeset"
        );

        Ok(Changeset {
            base,
            added_lines,
            commits,
            merge_commits,
            changed_paths,
        })
    }

    fn resolve_base(&self, base_ref: &str) -> Result<Commit> {
        let output = Command::new("git")
            .args(["log", "-1", "--format=%h%x09%s", base_ref, "--"])
            .current_dir(&self.repo_root)
            .output()
            .map_err(|e| GateError::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            return Err(GateError::BaseNotFound {
                base_ref: base_ref.to_string(),
            });
        }

        let line = String::from_utf8_lossy(&output.stdout);
        parse_commit_lines(&line)
            .into_iter()
            .next()
            .ok_or_else(|| GateError::BaseNotFound {
                base_ref: base_ref.to_string(),
            })
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        run_git(&self.repo_root, args)
    }
}

/// Run a git command and capture stdout, mapping failures to [`GateError::Git`].
pub(crate) fn run_git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| GateError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GateError::Git(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or(""),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn parse_commit_lines(log: &str) -> Vec<Commit> {
    log.lines()
        .filter(|l| !l.is_empty())
        .map(|l| match l.split_once('\t') {
            Some((hash, subject)) => Commit {
                short_hash: hash.to_string(),
                subject: subject.to_string(),
            },
            None => Commit {
                short_hash: l.to_string(),
                subject: String::new(),
            },
        })
        .collect()
}

/// Extract pure additions from unified diff output.
///
/// Keeps `+` lines with the marker stripped; `+++` file headers, removals,
/// and context never make it into the changeset.
fn parse_added_lines(diff: &str) -> Vec<String> {
    diff.lines()
        .filter(|l| l.starts_with('+') && !l.starts_with("+++"))
        .map(|l| l[1..].to_string())
        .collect()
}

fn parse_name_status(output: &str) -> Vec<ChangedPath> {
    output
        .lines()
        .filter_map(|l| {
            let (status, path) = l.split_once('\t')?;
            let kind = match status.chars().next()? {
                'A' => ChangeKind::Added,
                'D' => ChangeKind::Deleted,
                // M, T and anything else left by --no-renames.
                _ => ChangeKind::Modified,
            };
            Some(ChangedPath::new(path, kind))
        })
        .collect()
}
