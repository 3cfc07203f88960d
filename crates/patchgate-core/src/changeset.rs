//! Immutable snapshot of everything the rules may inspect.

use serde::{Deserialize, Serialize};

/// One commit in the base..HEAD range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Abbreviated commit hash.
    pub short_hash: String,

    /// First line of the commit message.
    pub subject: String,
}

/// How a path was touched since base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

/// A repository-relative path touched since base, with its change kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedPath {
    pub path: String,
    pub kind: ChangeKind,
}

impl ChangedPath {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Snapshot of a base..HEAD change set.
///
/// Built exactly once per run by the changeset provider and read-only from
/// then on; every rule takes `&Changeset` and contributes one verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    /// The resolved base revision.
    pub base: Commit,

    /// Pure `+` lines from the base..HEAD diff, restricted to source files.
    /// Never contains context lines, removals, or `+++` file headers.
    pub added_lines: Vec<String>,

    /// Non-merge commits strictly after base, oldest first.
    pub commits: Vec<Commit>,

    /// Merge commits strictly after base.
    pub merge_commits: Vec<Commit>,

    /// Paths touched since base.
    pub changed_paths: Vec<ChangedPath>,
}

impl Changeset {
    /// Paths of the given change kind.
    pub fn paths_with_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &ChangedPath> {
        self.changed_paths.iter().filter(move |p| p.kind == kind)
    }
}
