//! Building patches from two texts.

use rediff_engine::line_script;
use rediff_types::OpKind;
use tracing::debug;

use crate::config::PatchConfig;
use crate::hunk::{Hunk, Patch};

/// Build a patch turning `old` into `new`.
///
/// Hunks come from the cleaned line-level diff, with `context_lines`
/// unchanged lines kept on each side of every change. Changes separated by
/// no more than twice the context share a hunk.
pub fn make_patch(old: &str, new: &str, config: &PatchConfig) -> Patch {
    let script = line_script(old, new, &config.diff);
    let entries: Vec<(OpKind, &str)> = script
        .iter()
        .flat_map(|op| op.text.split_inclusive('\n').map(move |line| (op.kind, line)))
        .collect();

    let context = config.context_lines;
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for (i, _) in entries.iter().enumerate().filter(|(_, (kind, _))| *kind != OpKind::Equal) {
        match ranges.last_mut() {
            Some((_, end)) if i - *end <= 2 * context => *end = i + 1,
            _ => ranges.push((i, i + 1)),
        }
    }

    // Lines of each side preceding every entry.
    let mut old_before = Vec::with_capacity(entries.len() + 1);
    let mut new_before = Vec::with_capacity(entries.len() + 1);
    let (mut old_seen, mut new_seen) = (0, 0);
    for (kind, _) in &entries {
        old_before.push(old_seen);
        new_before.push(new_seen);
        old_seen += usize::from(kind.in_old());
        new_seen += usize::from(kind.in_new());
    }
    old_before.push(old_seen);
    new_before.push(new_seen);

    let hunks: Vec<Hunk> = ranges
        .into_iter()
        .map(|(first, last)| {
            let start = first.saturating_sub(context);
            let end = (last + context).min(entries.len());

            let mut hunk = Hunk::new(old_before[start], new_before[start]);
            for &(kind, line) in &entries[start..end] {
                hunk.push_line(kind, line);
            }
            if hunk.old_len > 0 {
                hunk.old_start += 1;
            }
            if hunk.new_len > 0 {
                hunk.new_start += 1;
            }
            hunk
        })
        .collect();

    debug!(hunks = hunks.len(), context, "built patch");
    Patch::new(hunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rediff_types::Operation;

    fn make(old: &str, new: &str) -> Patch {
        make_patch(old, new, &PatchConfig::default())
    }

    fn numbered(range: std::ops::Range<usize>) -> String {
        range.map(|n| format!("{n}\n")).collect()
    }

    fn replace_line(text: &str, line: usize, with: &str) -> String {
        text.split_inclusive('\n')
            .enumerate()
            .map(|(i, l)| if i + 1 == line { with } else { l })
            .collect()
    }

    #[test]
    fn identical_texts_have_no_hunks() {
        assert!(make("a\nb\n", "a\nb\n").is_empty());
        assert!(make("", "").is_empty());
    }

    #[test]
    fn single_replacement() {
        let patch = make("a\nb\nc\n", "a\nX\nc\n");
        assert_eq!(patch.len(), 1);
        let hunk = &patch.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_len), (1, 3));
        assert_eq!((hunk.new_start, hunk.new_len), (1, 3));
        assert_eq!(
            hunk.operations,
            vec![
                Operation::equal("a\n"),
                Operation::delete("b\n"),
                Operation::insert("X\n"),
                Operation::equal("c\n"),
            ]
        );
    }

    #[test]
    fn context_is_limited() {
        let old = numbered(1..21);
        let new = replace_line(&old, 10, "ten\n");
        let patch = make(&old, &new);
        assert_eq!(patch.len(), 1);
        let hunk = &patch.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_len), (7, 7));
        assert_eq!((hunk.new_start, hunk.new_len), (7, 7));
        assert_eq!(hunk.old_lines().first(), Some(&"7\n"));
        assert_eq!(hunk.old_lines().last(), Some(&"13\n"));
    }

    #[test]
    fn distant_changes_split_nearby_changes_join() {
        let old = numbered(1..41);
        let far = replace_line(&replace_line(&old, 5, "five\n"), 30, "thirty\n");
        assert_eq!(make(&old, &far).len(), 2);

        // Six unchanged lines between the changes: contexts touch.
        let near = replace_line(&replace_line(&old, 5, "five\n"), 12, "twelve\n");
        let patch = make(&old, &near);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.hunks[0].old_start, 2);
        assert_eq!(patch.hunks[0].old_len, 14);

        let apart = replace_line(&replace_line(&old, 5, "five\n"), 13, "thirteen\n");
        assert_eq!(make(&old, &apart).len(), 2);
    }

    #[test]
    fn insertion_into_empty_text() {
        let patch = make("", "one\ntwo\n");
        let hunk = &patch.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_len), (0, 0));
        assert_eq!((hunk.new_start, hunk.new_len), (1, 2));
    }

    #[test]
    fn deleting_everything() {
        let patch = make("one\ntwo\n", "");
        let hunk = &patch.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_len), (1, 2));
        assert_eq!((hunk.new_start, hunk.new_len), (0, 0));
    }

    #[test]
    fn zero_context() {
        let config = PatchConfig {
            context_lines: 0,
            ..Default::default()
        };
        let patch = make_patch("a\nb\nc\n", "a\nb\nX\nc\n", &config);
        let hunk = &patch.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_len), (2, 0));
        assert_eq!((hunk.new_start, hunk.new_len), (3, 1));
        assert_eq!(hunk.old_index(), 2);
    }
}
