//! Post-processing of edit scripts.
//!
//! A minimal script is not always a readable one. The passes here trade
//! strict minimality for edit boundaries a reader recognises: short
//! equalities wedged between edits are folded into them, and single edits
//! are slid along to word or line boundaries.

use std::mem;

use rediff_types::OpKind;

use crate::atom::{common_prefix_len, common_suffix_len, Atom, Chunk};
use crate::config::CleanupMode;

/// Upper bound on whole-script passes before settling on a result.
const MAX_PASSES: usize = 32;

/// Run the configured cleanup until the script stops changing.
///
/// Each pass is a pure function of the script, so the sequence of scripts
/// either reaches a fixed point or revisits an earlier script. In the
/// latter case the smallest script of the cycle is returned, which makes the
/// result the same whichever member of the cycle the caller started from.
pub(crate) fn cleanup_chunks<T: Atom>(
    input: Vec<Chunk<T>>,
    mode: CleanupMode,
    edit_cost: usize,
) -> Vec<Chunk<T>> {
    let limit = input.len();
    let mut merged = input.clone();
    merge(&mut merged);
    let cleaned = match mode {
        CleanupMode::None => merged.clone(),
        _ => run_passes(merged.clone(), mode, edit_cost),
    };

    // Factoring an affix out of a hand-built edit pair adds an equality, and
    // so can folding at the very start or end of the script. The result
    // never has more operations than the caller passed in.
    if cleaned.len() <= merged.len().min(limit) {
        cleaned
    } else if merged.len() <= limit {
        merged
    } else {
        input
    }
}

fn run_passes<T: Atom>(mut chunks: Vec<Chunk<T>>, mode: CleanupMode, edit_cost: usize) -> Vec<Chunk<T>> {
    let mut seen: Vec<Vec<Chunk<T>>> = Vec::new();
    for _ in 0..MAX_PASSES {
        let mut next = chunks.clone();
        match mode {
            CleanupMode::Semantic => semantic_pass(&mut next),
            CleanupMode::Efficiency => efficiency_pass(&mut next, edit_cost),
            CleanupMode::None => {}
        }
        if next == chunks {
            return chunks;
        }
        if let Some(pos) = seen.iter().position(|s| *s == next) {
            return canonical_of(seen.split_off(pos), chunks);
        }
        seen.push(mem::replace(&mut chunks, next));
    }
    chunks
}

fn canonical_of<T: Atom>(cycle: Vec<Vec<Chunk<T>>>, current: Vec<Chunk<T>>) -> Vec<Chunk<T>> {
    cycle
        .into_iter()
        .chain(std::iter::once(current))
        .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .unwrap_or_default()
}

fn semantic_pass<T: Atom>(chunks: &mut Vec<Chunk<T>>) {
    if eliminate_equalities(chunks) {
        merge(chunks);
    }
    semantic_lossless(chunks);
    merge(chunks);
}

/// Fold equalities no longer than the edits on both of their sides.
fn eliminate_equalities<T: Atom>(chunks: &mut Vec<Chunk<T>>) -> bool {
    let mut changed = false;
    // Indices of equalities seen so far, innermost last.
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    // Edit lengths before and after the last equality.
    let (mut ins_before, mut del_before) = (0usize, 0usize);
    let (mut ins_after, mut del_after) = (0usize, 0usize);

    let mut pointer = 0isize;
    while (pointer as usize) < chunks.len() {
        let idx = pointer as usize;
        match chunks[idx].kind {
            OpKind::Equal => {
                equalities.push(idx);
                ins_before = ins_after;
                del_before = del_after;
                ins_after = 0;
                del_after = 0;
                last_equality = Some(chunks[idx].items.len());
            }
            kind => {
                if kind == OpKind::Insert {
                    ins_after += chunks[idx].items.len();
                } else {
                    del_after += chunks[idx].items.len();
                }
                let foldable = last_equality.map_or(false, |len| {
                    len > 0
                        && len <= ins_before.max(del_before)
                        && len <= ins_after.max(del_after)
                });
                let target = if foldable { equalities.last().copied() } else { None };
                if let Some(eq) = target {
                    duplicate_as_edit(chunks, eq);
                    // Drop this equality and re-examine the one before it.
                    equalities.pop();
                    equalities.pop();
                    pointer = equalities.last().map_or(-1, |&i| i as isize);
                    ins_before = 0;
                    del_before = 0;
                    ins_after = 0;
                    del_after = 0;
                    last_equality = None;
                    changed = true;
                }
            }
        }
        pointer += 1;
    }
    changed
}

/// Replace the equality at `idx` with a delete and an insert of its text.
fn duplicate_as_edit<T: Atom>(chunks: &mut Vec<Chunk<T>>, idx: usize) {
    let items = chunks[idx].items.clone();
    chunks.insert(idx, Chunk::new(OpKind::Delete, items));
    chunks[idx + 1].kind = OpKind::Insert;
}

/// Slide single edits surrounded by equalities to the best-scoring boundary.
///
/// `The c<ins>at c</ins>ame.` becomes `The <ins>cat </ins>came.`
fn semantic_lossless<T: Atom>(chunks: &mut Vec<Chunk<T>>) {
    let mut i = 1;
    while i + 1 < chunks.len() {
        if chunks[i - 1].kind != OpKind::Equal || chunks[i + 1].kind != OpKind::Equal {
            i += 1;
            continue;
        }

        let eq1_len = chunks[i - 1].items.len();
        let edit_len = chunks[i].items.len();
        let mut joined = Vec::with_capacity(eq1_len + edit_len + chunks[i + 1].items.len());
        joined.extend_from_slice(&chunks[i - 1].items);
        joined.extend_from_slice(&chunks[i].items);
        joined.extend_from_slice(&chunks[i + 1].items);

        // The edit is the window joined[pos..pos + edit_len]. Start as far
        // left as the text allows, then walk right.
        let mut pos = eq1_len - common_suffix_len(&chunks[i - 1].items, &chunks[i].items);
        let score_at = |pos: usize| {
            let (before, rest) = joined.split_at(pos);
            let (edit, after) = rest.split_at(edit_len);
            T::boundary_score(before, edit) + T::boundary_score(edit, after)
        };
        let mut best_pos = pos;
        let mut best_score = score_at(pos);
        while pos + edit_len < joined.len() && joined[pos] == joined[pos + edit_len] {
            pos += 1;
            let score = score_at(pos);
            // Ties go to the rightmost position.
            if score >= best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        if best_pos != eq1_len {
            let eq2 = joined.split_off(best_pos + edit_len);
            let edit = joined.split_off(best_pos);
            let eq1 = joined;

            chunks[i].items = edit;
            if eq2.is_empty() {
                chunks.remove(i + 1);
            } else {
                chunks[i + 1].items = eq2;
            }
            if eq1.is_empty() {
                chunks.remove(i - 1);
                i -= 1;
            } else {
                chunks[i - 1].items = eq1;
            }
        }
        i += 1;
    }
}

/// Fold equalities too short to be worth their own pair of edits.
fn efficiency_pass<T: Atom>(chunks: &mut Vec<Chunk<T>>, edit_cost: usize) {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    // Whether there is an insertion/deletion before/after the last equality.
    let (mut pre_ins, mut pre_del) = (false, false);
    let (mut post_ins, mut post_del) = (false, false);

    let mut pointer = 0isize;
    while (pointer as usize) < chunks.len() {
        let idx = pointer as usize;
        match chunks[idx].kind {
            OpKind::Equal => {
                let len = chunks[idx].items.len();
                if len < edit_cost && (post_ins || post_del) {
                    equalities.push(idx);
                    pre_ins = post_ins;
                    pre_del = post_del;
                    last_equality = Some(len);
                } else {
                    equalities.clear();
                    last_equality = None;
                }
                post_ins = false;
                post_del = false;
            }
            kind => {
                if kind == OpKind::Delete {
                    post_del = true;
                } else {
                    post_ins = true;
                }
                // Fold when the equality is surrounded by all four kinds of
                // edit, or by three of them and shorter than half an edit.
                let sides = [pre_ins, pre_del, post_ins, post_del]
                    .iter()
                    .filter(|&&b| b)
                    .count();
                let foldable = last_equality.map_or(false, |len| {
                    sides == 4 || (len * 2 < edit_cost && sides == 3)
                });
                let target = if foldable { equalities.last().copied() } else { None };
                if let Some(eq) = target {
                    duplicate_as_edit(chunks, eq);
                    equalities.pop();
                    last_equality = None;
                    if pre_ins && pre_del {
                        // No later equality can be affected by this change.
                        post_ins = true;
                        post_del = true;
                        equalities.clear();
                    } else {
                        equalities.pop();
                        pointer = equalities.last().map_or(-1, |&i| i as isize);
                        post_ins = false;
                        post_del = false;
                    }
                    changed = true;
                }
            }
        }
        pointer += 1;
    }
    if changed {
        merge(chunks);
    }
}

/// Normalise a script: coalesce runs of edits, factor common affixes of
/// paired deletes and inserts into equalities, and shift single edits to
/// swallow a neighbouring equality where possible.
pub(crate) fn merge<T: Atom>(chunks: &mut Vec<Chunk<T>>) {
    loop {
        coalesce(chunks);
        if !shift_single_edits(chunks) {
            break;
        }
    }
}

fn coalesce<T: Atom>(chunks: &mut Vec<Chunk<T>>) {
    let mut out: Vec<Chunk<T>> = Vec::with_capacity(chunks.len());
    let mut deleted: Vec<T> = Vec::new();
    let mut inserted: Vec<T> = Vec::new();

    for chunk in chunks.drain(..) {
        match chunk.kind {
            OpKind::Delete => deleted.extend(chunk.items),
            OpKind::Insert => inserted.extend(chunk.items),
            OpKind::Equal => {
                let tail = flush_edits(&mut out, &mut deleted, &mut inserted, chunk.items);
                push_equal(&mut out, tail);
            }
        }
    }
    let tail = flush_edits(&mut out, &mut deleted, &mut inserted, Vec::new());
    push_equal(&mut out, tail);

    *chunks = out;
}

/// Emit the pending edit run. Returns the equality that follows it, with
/// any common suffix of the run prepended.
fn flush_edits<T: Atom>(
    out: &mut Vec<Chunk<T>>,
    deleted: &mut Vec<T>,
    inserted: &mut Vec<T>,
    mut following: Vec<T>,
) -> Vec<T> {
    if !deleted.is_empty() && !inserted.is_empty() {
        let prefix = common_prefix_len(deleted, inserted);
        if prefix > 0 {
            let common: Vec<T> = deleted.drain(..prefix).collect();
            inserted.drain(..prefix);
            push_equal(out, common);
        }
        let suffix = common_suffix_len(deleted, inserted);
        if suffix > 0 {
            let mut common = deleted.split_off(deleted.len() - suffix);
            inserted.truncate(inserted.len() - suffix);
            common.extend(following);
            following = common;
        }
    }
    if !deleted.is_empty() {
        out.push(Chunk::new(OpKind::Delete, mem::take(deleted)));
    }
    if !inserted.is_empty() {
        out.push(Chunk::new(OpKind::Insert, mem::take(inserted)));
    }
    following
}

fn push_equal<T: Atom>(out: &mut Vec<Chunk<T>>, items: Vec<T>) {
    if items.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.kind == OpKind::Equal => last.items.extend(items),
        _ => out.push(Chunk::new(OpKind::Equal, items)),
    }
}

/// `A<ins>BA</ins>C` becomes `<ins>AB</ins>AC`, `A<ins>BC</ins>B` becomes
/// `AB<ins>CB</ins>`.
fn shift_single_edits<T: Atom>(chunks: &mut Vec<Chunk<T>>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < chunks.len() {
        if chunks[i - 1].kind == OpKind::Equal
            && chunks[i + 1].kind == OpKind::Equal
            && chunks[i].kind != OpKind::Equal
        {
            let prev_len = chunks[i - 1].items.len();
            let next_len = chunks[i + 1].items.len();
            let edit_len = chunks[i].items.len();

            if chunks[i].items.ends_with(&chunks[i - 1].items) {
                // Shift the edit over the previous equality.
                let prev = mem::take(&mut chunks[i - 1].items);
                let mut edit = prev.clone();
                edit.extend_from_slice(&chunks[i].items[..edit_len - prev_len]);
                chunks[i].items = edit;
                let mut next = prev;
                next.append(&mut chunks[i + 1].items);
                chunks[i + 1].items = next;
                chunks.remove(i - 1);
                changed = true;
            } else if chunks[i].items.starts_with(&chunks[i + 1].items) {
                // Shift the edit over the next equality.
                let next = mem::take(&mut chunks[i + 1].items);
                chunks[i - 1].items.extend_from_slice(&next);
                let mut edit = chunks[i].items[next_len..].to_vec();
                edit.extend(next);
                chunks[i].items = edit;
                chunks.remove(i + 1);
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use OpKind::{Delete, Equal, Insert};

    fn c(kind: OpKind, s: &str) -> Chunk<char> {
        Chunk::new(kind, s.chars().collect())
    }

    fn texts(chunks: &[Chunk<char>]) -> Vec<(OpKind, String)> {
        chunks
            .iter()
            .map(|c| (c.kind, c.items.iter().collect()))
            .collect()
    }

    fn expect(list: &[(OpKind, &str)]) -> Vec<(OpKind, String)> {
        list.iter().map(|(k, s)| (*k, s.to_string())).collect()
    }

    fn semantic(chunks: Vec<Chunk<char>>) -> Vec<(OpKind, String)> {
        texts(&cleanup_chunks(chunks, CleanupMode::Semantic, 4))
    }

    #[test]
    fn merge_coalesces_same_kinds() {
        let mut chunks = vec![c(Equal, "a"), c(Delete, "b"), c(Insert, "c"), c(Delete, "d"), c(Insert, "e"), c(Equal, "f")];
        merge(&mut chunks);
        assert_eq!(
            texts(&chunks),
            expect(&[(Equal, "a"), (Delete, "bd"), (Insert, "ce"), (Equal, "f")])
        );
    }

    #[test]
    fn merge_factors_common_affixes() {
        let mut chunks = vec![c(Delete, "a"), c(Insert, "abc"), c(Delete, "dc")];
        merge(&mut chunks);
        assert_eq!(
            texts(&chunks),
            expect(&[(Equal, "a"), (Delete, "d"), (Insert, "b"), (Equal, "c")])
        );
    }

    #[test]
    fn merge_shifts_single_edits() {
        let mut chunks = vec![c(Equal, "a"), c(Insert, "ba"), c(Equal, "c")];
        merge(&mut chunks);
        assert_eq!(texts(&chunks), expect(&[(Insert, "ab"), (Equal, "ac")]));

        let mut chunks = vec![c(Equal, "a"), c(Insert, "bc"), c(Equal, "b")];
        merge(&mut chunks);
        assert_eq!(texts(&chunks), expect(&[(Equal, "ab"), (Insert, "cb")]));
    }

    #[test]
    fn merge_drops_empty_chunks() {
        let mut chunks = vec![c(Equal, ""), c(Delete, ""), c(Insert, "x")];
        merge(&mut chunks);
        assert_eq!(texts(&chunks), expect(&[(Insert, "x")]));
    }

    #[test]
    fn semantic_folds_short_equality() {
        let out = semantic(vec![c(Delete, "a"), c(Equal, "b"), c(Delete, "c")]);
        assert_eq!(out, expect(&[(Delete, "abc"), (Insert, "b")]));
    }

    #[test]
    fn semantic_folds_backwards() {
        // Folding "f" makes "cd" foldable in turn.
        let out = semantic(vec![
            c(Delete, "ab"),
            c(Equal, "cd"),
            c(Delete, "e"),
            c(Equal, "f"),
            c(Insert, "g"),
        ]);
        assert_eq!(out, expect(&[(Delete, "abcdef"), (Insert, "cdfg")]));
    }

    #[test]
    fn semantic_keeps_long_equality() {
        let input = vec![c(Delete, "ab"), c(Equal, "cdefgh"), c(Insert, "x")];
        let out = semantic(input);
        assert_eq!(
            out,
            expect(&[(Delete, "ab"), (Equal, "cdefgh"), (Insert, "x")])
        );
    }

    #[test]
    fn semantic_aligns_to_word_boundary() {
        let out = semantic(vec![c(Equal, "The c"), c(Insert, "ow and the c"), c(Equal, "at.")]);
        assert_eq!(
            out,
            expect(&[(Equal, "The "), (Insert, "cow and the "), (Equal, "cat.")])
        );
    }

    #[test]
    fn semantic_prefers_blank_lines() {
        let out = semantic(vec![
            c(Equal, "AAA\r\n\r\nBBB"),
            c(Insert, "\r\nDDD\r\n\r\nBBB"),
            c(Equal, "\r\nEEE"),
        ]);
        assert_eq!(
            out,
            expect(&[
                (Equal, "AAA\r\n\r\n"),
                (Insert, "BBB\r\nDDD\r\n\r\n"),
                (Equal, "BBB\r\nEEE"),
            ])
        );
    }

    #[test]
    fn semantic_prefers_line_breaks() {
        let out = semantic(vec![
            c(Equal, "AAA\r\nBBB"),
            c(Insert, " DDD\r\nBBB"),
            c(Equal, " EEE"),
        ]);
        assert_eq!(
            out,
            expect(&[(Equal, "AAA\r\n"), (Insert, "BBB DDD\r\n"), (Equal, "BBB EEE")])
        );
    }

    #[test]
    fn efficiency_folds_cheap_equalities() {
        let input = vec![
            c(Delete, "ab"),
            c(Insert, "12"),
            c(Equal, "xyz"),
            c(Delete, "cd"),
            c(Insert, "34"),
        ];
        let out = texts(&cleanup_chunks(input, CleanupMode::Efficiency, 4));
        assert_eq!(out, expect(&[(Delete, "abxyzcd"), (Insert, "12xyz34")]));
    }

    #[test]
    fn efficiency_keeps_long_equalities() {
        let input = vec![
            c(Delete, "ab"),
            c(Insert, "12"),
            c(Equal, "wxyz"),
            c(Delete, "cd"),
            c(Insert, "34"),
        ];
        let out = texts(&cleanup_chunks(input.clone(), CleanupMode::Efficiency, 4));
        assert_eq!(out, texts(&input));
    }

    #[test]
    fn none_mode_only_merges() {
        let input = vec![c(Delete, "a"), c(Delete, "b"), c(Equal, "c"), c(Insert, "d")];
        let out = texts(&cleanup_chunks(input, CleanupMode::None, 4));
        assert_eq!(out, expect(&[(Delete, "ab"), (Equal, "c"), (Insert, "d")]));
    }

    #[test]
    fn cleanup_never_adds_operations() {
        let input = vec![c(Delete, "ab"), c(Insert, "ac")];
        for mode in [CleanupMode::None, CleanupMode::Semantic, CleanupMode::Efficiency] {
            let out = texts(&cleanup_chunks(input.clone(), mode, 4));
            assert_eq!(out, expect(&[(Delete, "ab"), (Insert, "ac")]));
        }
    }

    #[test]
    fn cleanup_of_empty_script() {
        assert!(semantic(Vec::new()).is_empty());
    }
}
