use rediff_engine::{char_diff, line_diff};
use rediff_patch::{apply, decode, make_patch, PatchConfig};
use rediff_types::LineDiff;
use tracing::debug;

use crate::config::RediffConfig;
use crate::results::{ApplyPatchResult, CharDiff};

/// A rediff session: configuration plus the four host operations.
#[derive(Clone, Debug, Default)]
pub struct Rediff {
    config: RediffConfig,
    patch: PatchConfig,
}

impl Rediff {
    pub fn new(config: RediffConfig) -> Self {
        let patch = config.effective_patch();
        Self { config, patch }
    }

    pub fn config(&self) -> &RediffConfig {
        &self.config
    }

    /// Cleaned character diff with statistics.
    pub fn char_diff(&self, old: &str, new: &str) -> CharDiff {
        CharDiff::new(char_diff(old, new, &self.config.diff))
    }

    /// Line diff with nested character diffs for replaced lines.
    pub fn line_diff(&self, old: &str, new: &str) -> LineDiff {
        line_diff(old, new, &self.config.diff)
    }

    /// Patch text turning `old` into `new`. Empty when the texts are equal.
    pub fn make_patch(&self, old: &str, new: &str) -> String {
        make_patch(old, new, &self.patch).to_string()
    }

    /// Apply patch text to `text`.
    ///
    /// Malformed patch text yields [`ApplyPatchResult::Rejected`]. Otherwise
    /// every hunk that can be placed is applied and the others are flagged.
    pub fn apply_patch(&self, text: &str, patch_text: &str) -> ApplyPatchResult {
        let patch = match decode(patch_text) {
            Ok(patch) => patch,
            Err(e) => {
                debug!(error = %e, "patch rejected");
                return ApplyPatchResult::Rejected {
                    error: e.to_string(),
                };
            }
        };
        let outcome = apply(text, &patch, &self.patch);
        if !outcome.is_clean() {
            debug!(hunks = ?outcome.hunks, "some hunks were rejected");
        }
        ApplyPatchResult::Applied {
            hunks: outcome.applied(),
            text: outcome.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rediff_engine::{CleanupMode, DiffConfig};
    use rediff_types::{OpKind, Operation};

    fn session() -> Rediff {
        Rediff::default()
    }

    #[test]
    fn char_diff_stats() {
        let diff = session().char_diff("The cat sat.", "The dog sat.");
        assert_eq!(diff.operations.old_text(), "The cat sat.");
        assert_eq!(diff.operations.new_text(), "The dog sat.");
        assert_eq!(diff.stats, diff.operations.stats());
        assert_eq!(diff.stats.additions, 3);
        assert_eq!(diff.stats.deletions, 3);
        assert_eq!(diff.stats.changes, 2);
    }

    #[test]
    fn char_diff_identical() {
        let diff = session().char_diff("same", "same");
        assert_eq!(diff.operations.as_slice(), &[Operation::equal("same")]);
        assert!(diff.stats.is_unchanged());
    }

    #[test]
    fn line_diff_scenario() {
        let diff = session().line_diff("cat\ndog\n", "cat\nfox\n");
        let kinds: Vec<OpKind> = diff.lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![OpKind::Equal, OpKind::Delete, OpKind::Insert]);
        assert!(diff.lines[1].sub_diff.is_some());
        assert_eq!(diff.stats.changes, 2);
    }

    #[test]
    fn make_and_apply() {
        let rediff = session();
        let patch = rediff.make_patch("a\nb\nc\n", "a\nX\nc\n");
        assert_eq!(patch, "@@ -1,3 +1,3 @@\n a\n-b\n+X\n c\n");

        let result = rediff.apply_patch("a\nb\nc\n", &patch);
        assert_eq!(
            result,
            ApplyPatchResult::Applied {
                text: "a\nX\nc\n".into(),
                hunks: vec![true],
            }
        );
        assert!(result.success());
    }

    #[test]
    fn identical_texts_make_empty_patch() {
        let rediff = session();
        let patch = rediff.make_patch("same\n", "same\n");
        assert!(patch.is_empty());
        let result = rediff.apply_patch("anything\n", &patch);
        assert_eq!(
            result,
            ApplyPatchResult::Applied {
                text: "anything\n".into(),
                hunks: vec![],
            }
        );
    }

    #[test]
    fn apply_with_extra_leading_lines() {
        let rediff = session();
        let patch = rediff.make_patch("a\nb\nc\n", "a\nX\nc\n");
        let result = rediff.apply_patch("p\nq\na\nb\nc\n", &patch);
        assert_eq!(
            result,
            ApplyPatchResult::Applied {
                text: "p\nq\na\nX\nc\n".into(),
                hunks: vec![true],
            }
        );
    }

    #[test]
    fn malformed_patch_is_rejected() {
        let result = session().apply_patch("text\n", "@@ broken\n");
        match &result {
            ApplyPatchResult::Rejected { error } => assert!(error.contains("line 1")),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(!result.success());
    }

    #[test]
    fn unplaceable_hunk_is_flagged() {
        let rediff = session();
        let patch = rediff.make_patch("a\nb\nc\n", "a\nX\nc\n");
        let result = rediff.apply_patch("nothing\nlike\nit\n", &patch);
        assert!(result.success());
        assert!(!result.is_clean());
    }

    #[test]
    fn session_config_reaches_operations() {
        let config = RediffConfig {
            diff: DiffConfig::default().cleanup(CleanupMode::None),
            ..Default::default()
        };
        let rediff = Rediff::new(config);
        assert_eq!(rediff.char_diff("dog", "fox").operations.len(), 5);
        assert_eq!(rediff.config().diff.cleanup, CleanupMode::None);
    }
}
