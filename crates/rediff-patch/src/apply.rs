//! Applying patches to text that may have drifted from the patch's source.
//!
//! Each hunk is looked for at its declared position, shifted by the net
//! line offset of the hunks applied before it. If the expected lines are not
//! there, the applier scans outward for an exact copy and then for the most
//! similar window. Hunks that cannot be placed are reported and skipped;
//! applying never fails.

use serde::{Deserialize, Serialize};
use similar::TextDiff;
use tracing::debug;

use rediff_types::OpKind;

use crate::config::PatchConfig;
use crate::hunk::{Hunk, Patch};

/// How a single hunk was applied.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum HunkOutcome {
    /// The hunk's old lines were found verbatim starting at `line` (1-based).
    Exact { line: usize },
    /// The most similar window, starting at `line`, was patched.
    Fuzzy { line: usize, similarity: f32 },
    /// No acceptable location was found; the text was left untouched.
    Rejected,
}

impl HunkOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// The patched text together with per-hunk results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchOutcome {
    pub text: String,
    pub hunks: Vec<HunkOutcome>,
}

impl PatchOutcome {
    /// One flag per hunk, `true` when the hunk was applied.
    pub fn applied(&self) -> Vec<bool> {
        self.hunks.iter().map(HunkOutcome::is_applied).collect()
    }

    /// Returns `true` if every hunk was applied.
    pub fn is_clean(&self) -> bool {
        self.hunks.iter().all(HunkOutcome::is_applied)
    }
}

/// Apply `patch` to `text`.
pub fn apply(text: &str, patch: &Patch, config: &PatchConfig) -> PatchOutcome {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(String::from).collect();
    let mut drift: isize = 0;
    let mut outcomes = Vec::with_capacity(patch.len());

    for (index, hunk) in patch.iter().enumerate() {
        let expected = isize::try_from(hunk.old_index())
            .unwrap_or(isize::MAX)
            .saturating_add(drift);
        let old = hunk.old_lines();

        let placement = if old.is_empty() {
            let at = expected.clamp(0, lines.len() as isize) as usize;
            Some((at, HunkOutcome::Exact { line: at + 1 }))
        } else {
            find_exact(&lines, &old, expected, config.search_radius)
                .map(|at| (at, HunkOutcome::Exact { line: at + 1 }))
                .or_else(|| {
                    find_fuzzy(&lines, &old, expected, config).map(|(at, similarity)| {
                        (at, HunkOutcome::Fuzzy { line: at + 1, similarity })
                    })
                })
        };

        let Some((at, outcome)) = placement else {
            debug!(hunk = index, expected, "hunk rejected");
            outcomes.push(HunkOutcome::Rejected);
            continue;
        };

        let window = at..at + old.len();
        let replacement = match outcome {
            HunkOutcome::Fuzzy { .. } => {
                merge_into_window(hunk, &lines[window.clone()], window.end < lines.len())
            }
            _ => hunk.new_lines().into_iter().map(String::from).collect(),
        };
        let new_len = replacement.len();
        lines.splice(window, replacement);

        debug!(hunk = index, expected, found = at, ?outcome, "hunk applied");
        drift = drift
            .saturating_add((at as isize).saturating_sub(expected))
            .saturating_add(new_len as isize - old.len() as isize);
        outcomes.push(outcome);
    }

    PatchOutcome {
        text: lines.concat(),
        hunks: outcomes,
    }
}

/// Candidate start positions within `radius` of `expected`, nearest first,
/// for a window of `width` lines.
fn candidates(len: usize, width: usize, expected: isize, radius: usize) -> impl Iterator<Item = usize> {
    let last = len as isize - width as isize;
    // Distances to the nearest and farthest valid start.
    let (near, far) = if last < 0 {
        (1, 0)
    } else {
        let near = if expected < 0 {
            expected.unsigned_abs()
        } else {
            expected.abs_diff(last.min(expected))
        };
        let far = expected.abs_diff(0).max(expected.abs_diff(last));
        (near, far.min(radius))
    };
    (near..=far)
        .flat_map(move |d| {
            if d == 0 {
                [Some(expected), None]
            } else {
                [expected.checked_add_unsigned(d), expected.checked_sub_unsigned(d)]
            }
        })
        .flatten()
        .filter(move |&pos| pos >= 0 && pos <= last)
        .map(|pos| pos as usize)
}

fn find_exact(lines: &[String], old: &[&str], expected: isize, radius: usize) -> Option<usize> {
    candidates(lines.len(), old.len(), expected, radius)
        .find(|&at| lines[at..at + old.len()].iter().zip(old).all(|(a, b)| a == b))
}

/// The most similar window, if it reaches the configured threshold. Ties go
/// to the window nearest the expected position.
fn find_fuzzy(lines: &[String], old: &[&str], expected: isize, config: &PatchConfig) -> Option<(usize, f32)> {
    let wanted = old.concat();
    let mut best: Option<(usize, f32)> = None;
    for at in candidates(lines.len(), old.len(), expected, config.search_radius) {
        let window = lines[at..at + old.len()].concat();
        let similarity = TextDiff::from_chars(wanted.as_str(), window.as_str()).ratio();
        if best.map_or(true, |(_, score)| similarity > score) {
            best = Some((at, similarity));
        }
    }
    best.filter(|&(_, similarity)| similarity >= config.min_similarity)
}

/// Apply the hunk's changes to a window of the text, keeping the window's
/// own lines where the hunk only has context.
///
/// When more text follows the window, an unterminated last line from the
/// hunk gets a line break so it does not run into the next line.
fn merge_into_window(hunk: &Hunk, window: &[String], followed: bool) -> Vec<String> {
    let mut current = window.iter();
    let mut merged = Vec::with_capacity(hunk.new_len);
    for (kind, line) in hunk.lines() {
        match kind {
            OpKind::Equal => merged.extend(current.next().cloned()),
            OpKind::Delete => {
                current.next();
            }
            OpKind::Insert => merged.push(line.to_string()),
        }
    }
    if followed {
        if let Some(last) = merged.last_mut().filter(|line| !line.ends_with('\n')) {
            last.push('\n');
        }
    }
    merged
}
