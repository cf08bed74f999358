//! Diff engine for rediff.
//!
//! Computes minimal edit scripts between two texts with Myers' O(N·D)
//! algorithm, reshapes them into human-legible scripts, and diffs at line
//! granularity by interning lines into symbols.
//!
//! # Entry points
//!
//! - [`diff`] -- merged minimal character script, no cleanup
//! - [`cleanup`] -- configured cleanup of any script
//! - [`char_diff`] -- [`diff`] followed by [`cleanup`]
//! - [`line_diff`] -- per-line records with nested character diffs
//! - [`line_script`] -- the cleaned line-level script before expansion
//!
//! All functions are pure: the only state is the [`DiffConfig`] passed in.

mod atom;
mod cleanup;
pub mod config;
pub mod error;
mod lines;
mod myers;

pub use config::{CleanupMode, DiffConfig};
pub use error::{EngineError, EngineResult};
pub use lines::line_diff;

use rediff_types::{EditScript, Operation};
use tracing::debug;

use crate::atom::{chunks_to_script, script_to_chunks};
use crate::myers::{diff_atoms, Budget};

/// Minimal character-level script turning `old` into `new`.
///
/// The script is merged but not cleaned up. With a configured budget the
/// result may be coarser than minimal on large, dissimilar inputs.
pub fn diff(old: &str, new: &str, config: &DiffConfig) -> EditScript {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();
    let mut budget = Budget::new(config.budget);
    let chunks = diff_atoms(&old, &new, &mut budget);
    if budget.is_exhausted() {
        debug!(budget = ?config.budget, old_len = old.len(), new_len = new.len(), "character diff hit its budget");
    }
    chunks_to_script(chunks)
}

/// Apply the configured cleanup to a script.
///
/// The result reconstructs the same old and new texts, has no more
/// operations than the input, and is unchanged by a second cleanup.
pub fn cleanup(script: &EditScript, config: &DiffConfig) -> EditScript {
    let chunks = cleanup::cleanup_chunks(script_to_chunks(script), config.cleanup, config.edit_cost);
    chunks_to_script(chunks)
}

/// Character diff followed by cleanup.
pub fn char_diff(old: &str, new: &str, config: &DiffConfig) -> EditScript {
    cleanup(&diff(old, new, config), config)
}

/// The cleaned line-level script.
///
/// Every operation holds whole lines, terminators included.
pub fn line_script(old: &str, new: &str, config: &DiffConfig) -> EditScript {
    lines::line_chunks(old, new, config)
        .into_iter()
        .map(|chunk| Operation::new(chunk.kind, chunk.items.concat()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rediff_types::OpKind;

    fn cfg() -> DiffConfig {
        DiffConfig::default()
    }

    #[test]
    fn symmetry_cases() {
        assert!(char_diff("", "", &cfg()).is_empty());
        assert_eq!(
            char_diff("same", "same", &cfg()).as_slice(),
            &[Operation::equal("same")]
        );
        assert_eq!(char_diff("", "X", &cfg()).as_slice(), &[Operation::insert("X")]);
        assert_eq!(char_diff("X", "", &cfg()).as_slice(), &[Operation::delete("X")]);
    }

    #[test]
    fn disjoint_is_delete_then_insert() {
        assert_eq!(
            char_diff("abc", "xyz", &cfg()).as_slice(),
            &[Operation::delete("abc"), Operation::insert("xyz")]
        );
    }

    #[test]
    fn cleanup_merges_noisy_script() {
        let raw = diff("mouse", "sofas", &cfg());
        let cleaned = cleanup(&raw, &cfg());
        assert!(cleaned.len() <= raw.len());
        assert_eq!(
            cleaned.as_slice(),
            &[Operation::delete("mouse"), Operation::insert("sofas")]
        );
    }

    #[test]
    fn word_level_change_is_legible() {
        let script = char_diff("The quick brown fox", "The quick red fox", &cfg());
        assert_eq!(
            script.as_slice(),
            &[
                Operation::equal("The quick "),
                Operation::delete("brown"),
                Operation::insert("red"),
                Operation::equal(" fox"),
            ]
        );
    }

    #[test]
    fn multibyte_text() {
        let script = char_diff("naïve café", "naive café", &cfg());
        assert_eq!(script.old_text(), "naïve café");
        assert_eq!(script.new_text(), "naive café");
        assert_eq!(script.stats().deletions, 1);
        assert_eq!(script.stats().additions, 1);
    }

    #[test]
    fn cleanup_none_keeps_minimal_script() {
        let config = DiffConfig::default().cleanup(CleanupMode::None);
        let script = char_diff("dog", "fox", &config);
        assert_eq!(script.len(), 5);
    }

    #[test]
    fn tiny_budget_still_reconstructs() {
        let old = "The quick brown fox jumps over the lazy dog.".repeat(4);
        let new = "A quick brown cat leaps over the lazy dogs!".repeat(4);
        let script = char_diff(&old, &new, &DiffConfig::with_budget(3));
        assert_eq!(script.old_text(), old);
        assert_eq!(script.new_text(), new);
    }

    #[test]
    fn line_script_holds_whole_lines() {
        let script = line_script("a\nb\nc\n", "a\nX\nc\n", &cfg());
        assert_eq!(
            script.as_slice(),
            &[
                Operation::equal("a\n"),
                Operation::delete("b\n"),
                Operation::insert("X\n"),
                Operation::equal("c\n"),
            ]
        );
    }

    fn adjacent_kinds_differ(script: &EditScript) -> bool {
        script
            .as_slice()
            .windows(2)
            .all(|w| w[0].kind != w[1].kind)
    }

    proptest! {
        #[test]
        fn reconstructs_both_texts(old in "[abc \n]{0,40}", new in "[abc \n]{0,40}") {
            for mode in [CleanupMode::None, CleanupMode::Semantic, CleanupMode::Efficiency] {
                let script = char_diff(&old, &new, &cfg().cleanup(mode));
                prop_assert_eq!(script.old_text(), old.clone());
                prop_assert_eq!(script.new_text(), new.clone());
                prop_assert!(script.iter().all(|op| !op.text.is_empty()));
            }
        }

        #[test]
        fn raw_script_is_merged(old in "\\PC{0,30}", new in "\\PC{0,30}") {
            let script = diff(&old, &new, &cfg());
            prop_assert_eq!(script.old_text(), old);
            prop_assert_eq!(script.new_text(), new);
            prop_assert!(adjacent_kinds_differ(&script));
        }

        #[test]
        fn cleanup_is_idempotent(old in "[ab. \n]{0,30}", new in "[ab. \n]{0,30}") {
            for mode in [CleanupMode::Semantic, CleanupMode::Efficiency] {
                let config = cfg().cleanup(mode);
                let raw = diff(&old, &new, &config);
                let once = cleanup(&raw, &config);
                let twice = cleanup(&once, &config);
                prop_assert!(once.len() <= raw.len());
                prop_assert!(adjacent_kinds_differ(&once));
                prop_assert_eq!(once, twice);
            }
        }

        #[test]
        fn cleanup_of_any_script_is_bounded(
            ops in prop::collection::vec((0u8..3, "[ab. \n]{1,4}"), 0..8),
        ) {
            let script: EditScript = ops
                .into_iter()
                .map(|(kind, text)| {
                    let kind = match kind {
                        0 => OpKind::Equal,
                        1 => OpKind::Delete,
                        _ => OpKind::Insert,
                    };
                    Operation::new(kind, text)
                })
                .collect();
            for mode in [CleanupMode::None, CleanupMode::Semantic, CleanupMode::Efficiency] {
                let config = cfg().cleanup(mode);
                let once = cleanup(&script, &config);
                prop_assert!(once.len() <= script.len());
                prop_assert_eq!(once.old_text(), script.old_text());
                prop_assert_eq!(once.new_text(), script.new_text());
                prop_assert_eq!(cleanup(&once, &config), once);
            }
        }

        #[test]
        fn budgeted_diff_reconstructs(old in "[abcd]{0,60}", new in "[abcd]{0,60}", budget in 0usize..50) {
            let script = char_diff(&old, &new, &DiffConfig::with_budget(budget));
            prop_assert_eq!(script.old_text(), old);
            prop_assert_eq!(script.new_text(), new);
        }

        #[test]
        fn identical_inputs_are_one_equal(text in "\\PC{1,30}") {
            let script = char_diff(&text, &text, &cfg());
            prop_assert_eq!(script.len(), 1);
            prop_assert_eq!(script.as_slice()[0].kind, OpKind::Equal);
        }
    }
}
