//! patchgate core - pre-merge commit gatekeeping
//!
//! Builds an immutable [`Changeset`] snapshot of everything introduced since a
//! base revision, runs a fixed ordered rule set over it, and folds the
//! per-rule verdicts into a single pass/fail [`Report`].

pub mod changeset;
pub mod drift;
pub mod error;
pub mod evaluator;
pub mod git;
pub mod lineending;
pub mod policy;
pub mod rules;

pub use changeset::{ChangeKind, ChangedPath, Changeset, Commit};
pub use drift::{filter_drift, ArtifactDriftInspector, LocaleDriftInspector};
pub use error::{GateError, Result};
pub use evaluator::{evaluate, Report, Verdict};
pub use git::GitChangesetProvider;
pub use lineending::{FsLineEndingInspector, LineEndingInspector};
pub use rules::{default_rules, Rule};
