//! The rule set: one stateless policy predicate per project convention.
//!
//! Rules are textual. They match substrings and regular expressions over the
//! changeset, never a parsed AST; precision is deliberately traded for
//! simplicity. A collaborator error inside a rule becomes that rule's failed
//! verdict and never aborts the run.

use regex::Regex;

use crate::changeset::{ChangeKind, Changeset};
use crate::drift::{filter_drift, ArtifactDriftInspector};
use crate::evaluator::Verdict;
use crate::lineending::LineEndingInspector;
use crate::policy;

/// A single named policy predicate over a changeset.
pub trait Rule {
    /// Stable identifier, used in verdicts and reports.
    fn id(&self) -> &str;

    /// One-line statement of the convention.
    fn description(&self) -> &str;

    /// Check the changeset. Must not mutate anything.
    fn evaluate(&self, changeset: &Changeset) -> Verdict;
}

/// Rule matching a regular expression against every added line.
///
/// Fails when any added line matches; the verdict message lists the
/// offending lines. Deleted and context lines are never visible here, so
/// removing banned code can never trip a pattern rule.
struct PatternRule {
    id: &'static str,
    description: &'static str,
    pattern: String,
}

impl Rule for PatternRule {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn evaluate(&self, changeset: &Changeset) -> Verdict {
        let re = match Regex::new(&self.pattern) {
            Ok(re) => re,
            Err(e) => return Verdict::fail(self.id, format!("bad rule pattern: {e}")),
        };

        let hits: Vec<&String> = changeset
            .added_lines
            .iter()
            .filter(|line| re.is_match(line))
            .collect();

        if hits.is_empty() {
            return Verdict::pass(self.id);
        }

        let mut message = self.description.to_string();
        for line in hits {
            message.push_str("\n  + ");
            message.push_str(line);
        }
        Verdict::fail(self.id, message)
    }
}

/// Every changed file must use Unix line endings.
struct UnixLineEndings {
    inspector: Box<dyn LineEndingInspector>,
}

impl Rule for UnixLineEndings {
    fn id(&self) -> &str {
        "unix-line-endings"
    }

    fn description(&self) -> &str {
        "changed files must use Unix (LF) line endings"
    }

    fn evaluate(&self, changeset: &Changeset) -> Verdict {
        let mut crlf_paths = Vec::new();
        for changed in &changeset.changed_paths {
            // Deleted files leave nothing on disk to probe.
            if changed.kind == ChangeKind::Deleted {
                continue;
            }
            match self.inspector.uses_crlf(changed.path.as_ref()) {
                Ok(true) => crlf_paths.push(changed.path.clone()),
                Ok(false) => {}
                Err(e) => {
                    return Verdict::fail(
                        self.id(),
                        format!("could not probe {}: {e}", changed.path),
                    )
                }
            }
        }

        if crlf_paths.is_empty() {
            Verdict::pass(self.id())
        } else {
            Verdict::fail(
                self.id(),
                format!(
                    "{}: {}",
                    self.description(),
                    crlf_paths.join(", ")
                ),
            )
        }
    }
}

/// Contributions must be rebased, not merged.
struct NoMergeCommits;

impl Rule for NoMergeCommits {
    fn id(&self) -> &str {
        "no-merge-commits"
    }

    fn description(&self) -> &str {
        "change sets must not contain merge commits"
    }

    fn evaluate(&self, changeset: &Changeset) -> Verdict {
        if changeset.merge_commits.is_empty() {
            return Verdict::pass(self.id());
        }
        let hashes: Vec<&str> = changeset
            .merge_commits
            .iter()
            .map(|c| c.short_hash.as_str())
            .collect();
        Verdict::fail(
            self.id(),
            format!("{}: {}", self.description(), hashes.join(", ")),
        )
    }
}

/// Committed locale templates must match freshly regenerated output.
struct LocaleArtifactsCurrent {
    inspector: Box<dyn ArtifactDriftInspector>,
}

impl Rule for LocaleArtifactsCurrent {
    fn id(&self) -> &str {
        "locale-artifacts-current"
    }

    fn description(&self) -> &str {
        "generated locale templates must be regenerated and committed"
    }

    fn evaluate(&self, _changeset: &Changeset) -> Verdict {
        let raw = match self.inspector.regenerate_and_diff() {
            Ok(raw) => raw,
            Err(e) => return Verdict::fail(self.id(), e.to_string()),
        };

        let drift = filter_drift(&raw);
        if drift.is_empty() {
            Verdict::pass(self.id())
        } else {
            Verdict::fail(self.id(), format!("{}:\n{}", self.description(), drift))
        }
    }
}

/// A new driver must land with a test image.
struct NewDriverHasTestImage;

impl Rule for NewDriverHasTestImage {
    fn id(&self) -> &str {
        "new-driver-has-test-image"
    }

    fn description(&self) -> &str {
        "new drivers must include a test image"
    }

    fn evaluate(&self, changeset: &Changeset) -> Verdict {
        let new_drivers: Vec<&str> = changeset
            .paths_with_kind(ChangeKind::Added)
            .filter(|p| p.path.starts_with(policy::DRIVERS_DIR))
            .map(|p| p.path.as_str())
            .collect();

        if new_drivers.is_empty() {
            return Verdict::pass(self.id());
        }

        let has_image = changeset
            .paths_with_kind(ChangeKind::Added)
            .any(|p| p.path.starts_with(policy::TEST_IMAGES_DIR));

        if has_image {
            Verdict::pass(self.id())
        } else {
            Verdict::fail(
                self.id(),
                format!("{}: {}", self.description(), new_drivers.join(", ")),
            )
        }
    }
}

/// The fixed rule order. Evaluation and reporting preserve it.
pub fn default_rules(
    line_endings: Box<dyn LineEndingInspector>,
    drift: Box<dyn ArtifactDriftInspector>,
) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(PatternRule {
            id: "no-six-import",
            description: "new code must not import the six compatibility shim",
            pattern: r"(from|import)\s.*\bsix\b".to_string(),
        }),
        Box::new(PatternRule {
            id: "no-six-usage",
            description: "new code must not use the six compatibility shim",
            pattern: r"\bsix\b".to_string(),
        }),
        Box::new(PatternRule {
            id: "no-future-import",
            description: "new code must not import the future compatibility shim",
            pattern: r"(from|import)\s.*\bfuture\b".to_string(),
        }),
        Box::new(PatternRule {
            id: "no-future-usage",
            description: "new code must not use the future compatibility shim",
            pattern: r"\bfuture\b".to_string(),
        }),
        Box::new(PatternRule {
            id: "no-optparse-import",
            description: "new code must use argparse, not the deprecated optparse",
            pattern: r"(from|import)\s.*\boptparse\b".to_string(),
        }),
        Box::new(PatternRule {
            id: "no-raw-memorymap",
            description: "new code must construct MemoryMapBytes, not MemoryMap",
            pattern: r"\bMemoryMap\(".to_string(),
        }),
        Box::new(PatternRule {
            id: "literal-translation-strings",
            description: "translated strings must be literals, not computed values",
            pattern: r#"(?:^|\W)_\(\s*[^\s"']"#.to_string(),
        }),
        Box::new(PatternRule {
            id: "no-new-manifest-entries",
            description: "the legacy style manifest must not grow",
            pattern: regex::escape(policy::MANIFEST_FILE),
        }),
        Box::new(PatternRule {
            id: "no-new-blacklist-entries",
            description: "the legacy style blacklist must not grow",
            pattern: regex::escape(policy::BLACKLIST_FILE),
        }),
        Box::new(UnixLineEndings {
            inspector: line_endings,
        }),
        Box::new(NoMergeCommits),
        Box::new(LocaleArtifactsCurrent { inspector: drift }),
        Box::new(NewDriverHasTestImage),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::test_support::empty_changeset;
    use crate::changeset::{ChangedPath, Commit};
    use crate::drift::fakes::{FailingDriftInspector, FakeDriftInspector};
    use crate::lineending::fakes::{FailingLineEndingInspector, FakeLineEndingInspector};

    fn all_rules() -> Vec<Box<dyn Rule>> {
        default_rules(
            Box::new(FakeLineEndingInspector::new(&[])),
            Box::new(FakeDriftInspector::new("")),
        )
    }

    fn rule(id: &str) -> Box<dyn Rule> {
        all_rules()
            .into_iter()
            .find(|r| r.id() == id)
            .unwrap_or_else(|| panic!("no rule with id {id}"))
    }

    fn with_added_lines(lines: &[&str]) -> Changeset {
        let mut cs = empty_changeset();
        cs.added_lines = lines.iter().map(|s| s.to_string()).collect();
        cs
    }

    #[test]
    fn test_six_import_rejected() {
        let cs = with_added_lines(&["import six"]);
        let verdict = rule("no-six-import").evaluate(&cs);
        assert!(!verdict.passed);
        assert!(verdict.message.as_deref().unwrap().contains("import six"));
    }

    #[test]
    fn test_from_six_import_rejected() {
        let cs = with_added_lines(&["from six.moves import range"]);
        assert!(!rule("no-six-import").evaluate(&cs).passed);
    }

    #[test]
    fn test_six_usage_without_import_rejected() {
        let cs = with_added_lines(&["    value = six.text_type(raw)"]);
        assert!(!rule("no-six-usage").evaluate(&cs).passed);
    }

    #[test]
    fn test_six_token_is_word_anchored() {
        // "sixty" shares a prefix but is a different token.
        let cs = with_added_lines(&["sixty = 60"]);
        assert!(rule("no-six-usage").evaluate(&cs).passed);
    }

    #[test]
    fn test_future_import_rejected() {
        let cs = with_added_lines(&["from future.builtins import int"]);
        assert!(!rule("no-future-import").evaluate(&cs).passed);
    }

    #[test]
    fn test_dunder_future_is_a_different_token() {
        // `__future__` is the interpreter's own module, not the shim.
        let cs = with_added_lines(&["from __future__ import annotations"]);
        assert!(rule("no-future-import").evaluate(&cs).passed);
        assert!(rule("no-future-usage").evaluate(&cs).passed);
    }

    #[test]
    fn test_optparse_import_rejected() {
        let cs = with_added_lines(&["import optparse"]);
        assert!(!rule("no-optparse-import").evaluate(&cs).passed);
    }

    #[test]
    fn test_raw_memorymap_rejected() {
        let cs = with_added_lines(&["        self._mmap = memmap.MemoryMap(data)"]);
        assert!(!rule("no-raw-memorymap").evaluate(&cs).passed);
    }

    #[test]
    fn test_memorymapbytes_allowed() {
        let cs = with_added_lines(&["        self._mmap = memmap.MemoryMapBytes(data)"]);
        assert!(rule("no-raw-memorymap").evaluate(&cs).passed);
    }

    #[test]
    fn test_computed_translation_rejected() {
        let cs = with_added_lines(&["    label = _(name)"]);
        assert!(!rule("literal-translation-strings").evaluate(&cs).passed);
    }

    #[test]
    fn test_literal_translation_allowed() {
        let cs = with_added_lines(&["    label = _(\"Squelch\")", "    other = _('Power')"]);
        assert!(rule("literal-translation-strings").evaluate(&cs).passed);
    }

    #[test]
    fn test_identifier_ending_in_underscore_not_a_translation_call() {
        let cs = with_added_lines(&["    result = calc_(value)"]);
        assert!(rule("literal-translation-strings").evaluate(&cs).passed);
    }

    #[test]
    fn test_manifest_growth_rejected() {
        let cs = with_added_lines(&["tools/cpep8.manifest"]);
        assert!(!rule("no-new-manifest-entries").evaluate(&cs).passed);
    }

    #[test]
    fn test_blacklist_growth_rejected() {
        let cs = with_added_lines(&["see tools/cpep8.blacklist for exclusions"]);
        assert!(!rule("no-new-blacklist-entries").evaluate(&cs).passed);
    }

    #[test]
    fn test_crlf_file_rejected() {
        let mut cs = empty_changeset();
        cs.changed_paths = vec![ChangedPath::new("chirp/radio.py", ChangeKind::Modified)];

        let rule = UnixLineEndings {
            inspector: Box::new(FakeLineEndingInspector::new(&["chirp/radio.py"])),
        };
        let verdict = rule.evaluate(&cs);
        assert!(!verdict.passed);
        assert!(verdict.message.as_deref().unwrap().contains("chirp/radio.py"));
    }

    #[test]
    fn test_deleted_paths_never_probed() {
        let mut cs = empty_changeset();
        cs.changed_paths = vec![ChangedPath::new("gone.py", ChangeKind::Deleted)];

        // The failing inspector would error on any probe.
        let rule = UnixLineEndings {
            inspector: Box::new(FailingLineEndingInspector),
        };
        assert!(rule.evaluate(&cs).passed);
    }

    #[test]
    fn test_probe_error_fails_the_rule() {
        let mut cs = empty_changeset();
        cs.changed_paths = vec![ChangedPath::new("chirp/radio.py", ChangeKind::Modified)];

        let rule = UnixLineEndings {
            inspector: Box::new(FailingLineEndingInspector),
        };
        let verdict = rule.evaluate(&cs);
        assert!(!verdict.passed);
        assert!(verdict.message.as_deref().unwrap().contains("chirp/radio.py"));
    }

    #[test]
    fn test_merge_commit_rejected() {
        let mut cs = empty_changeset();
        cs.merge_commits = vec![Commit {
            short_hash: "feed123".to_string(),
            subject: "Merge branch 'main'".to_string(),
        }];
        let verdict = NoMergeCommits.evaluate(&cs);
        assert!(!verdict.passed);
        assert!(verdict.message.as_deref().unwrap().contains("feed123"));
    }

    #[test]
    fn test_timestamp_only_drift_passes() {
        let rule = LocaleArtifactsCurrent {
            inspector: Box::new(FakeDriftInspector::new(
                "+\"POT-Creation-Date: 2024-06-01\\n\"",
            )),
        };
        assert!(rule.evaluate(&empty_changeset()).passed);
    }

    #[test]
    fn test_real_drift_rejected() {
        let rule = LocaleArtifactsCurrent {
            inspector: Box::new(FakeDriftInspector::new("+msgid \"Squelch\"")),
        };
        let verdict = rule.evaluate(&empty_changeset());
        assert!(!verdict.passed);
        assert!(verdict.message.as_deref().unwrap().contains("Squelch"));
    }

    #[test]
    fn test_regen_failure_fails_the_rule() {
        let rule = LocaleArtifactsCurrent {
            inspector: Box::new(FailingDriftInspector),
        };
        let verdict = rule.evaluate(&empty_changeset());
        assert!(!verdict.passed);
        assert!(verdict.message.as_deref().unwrap().contains("make blew up"));
    }

    #[test]
    fn test_new_driver_without_image_rejected() {
        let mut cs = empty_changeset();
        cs.changed_paths = vec![ChangedPath::new(
            "chirp/drivers/newradio.py",
            ChangeKind::Added,
        )];
        let verdict = NewDriverHasTestImage.evaluate(&cs);
        assert!(!verdict.passed);
        assert!(verdict.message.as_deref().unwrap().contains("newradio.py"));
    }

    #[test]
    fn test_new_driver_with_image_allowed() {
        let mut cs = empty_changeset();
        cs.changed_paths = vec![
            ChangedPath::new("chirp/drivers/newradio.py", ChangeKind::Added),
            ChangedPath::new("tests/images/newradio.img", ChangeKind::Added),
        ];
        assert!(NewDriverHasTestImage.evaluate(&cs).passed);
    }

    #[test]
    fn test_modified_driver_needs_no_image() {
        let mut cs = empty_changeset();
        cs.changed_paths = vec![ChangedPath::new(
            "chirp/drivers/ts2000.py",
            ChangeKind::Modified,
        )];
        assert!(NewDriverHasTestImage.evaluate(&cs).passed);
    }

    #[test]
    fn test_default_rules_order_is_fixed() {
        let ids: Vec<String> = all_rules().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "no-six-import",
                "no-six-usage",
                "no-future-import",
                "no-future-usage",
                "no-optparse-import",
                "no-raw-memorymap",
                "literal-translation-strings",
                "no-new-manifest-entries",
                "no-new-blacklist-entries",
                "unix-line-endings",
                "no-merge-commits",
                "locale-artifacts-current",
                "new-driver-has-test-image",
            ]
        );
    }
}
