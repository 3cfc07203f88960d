//! Rule evaluation and the aggregated report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::changeset::Changeset;
use crate::rules::Rule;

/// Outcome of one rule against one changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Identifier of the rule that produced this verdict.
    pub rule_id: String,

    /// Whether the rule passed.
    pub passed: bool,

    /// Failure detail; present iff the rule failed.
    pub message: Option<String>,
}

impl Verdict {
    pub fn pass(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            passed: true,
            message: None,
        }
    }

    pub fn fail(rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// Ordered verdicts for one run, one per rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub verdicts: Vec<Verdict>,
    pub evaluated_at: DateTime<Utc>,
}

impl Report {
    /// True when every verdict passed.
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    /// The failed verdicts, in rule order.
    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.passed)
    }

    /// Process exit status: 0 iff all verdicts passed.
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

/// Run every rule against the changeset, in order, without short-circuiting.
///
/// All violations in one run must be visible, so a failed rule never stops
/// the ones after it. Produces exactly one verdict per rule.
pub fn evaluate(changeset: &Changeset, rules: &[Box<dyn Rule>]) -> Report {
    let verdicts = rules
        .iter()
        .map(|rule| {
            let verdict = rule.evaluate(changeset);
            debug!(rule = rule.id(), passed = verdict.passed, "evaluated rule");
            verdict
        })
        .collect();

    Report {
        verdicts,
        evaluated_at: Utc::now(),
    }
}
