//! Units the engine diffs over, and the working representation of a script.
//!
//! Character diffs run over `char`, line diffs run the search over interned
//! `u32` line symbols and the cleanup over `&str` lines.

use std::fmt::Debug;
use std::hash::Hash;

use rediff_types::{EditScript, OpKind, Operation};

/// Score for a boundary at the very start or end of a text.
pub(crate) const EDGE_SCORE: u32 = 6;

/// An indivisible unit of a diffed sequence.
pub(crate) trait Atom: Copy + Ord + Hash + Debug {
    /// How natural it is to put an edit boundary between `before` and
    /// `after`. Higher is better; used by the semantic lossless pass.
    fn boundary_score(before: &[Self], after: &[Self]) -> u32 {
        if before.is_empty() || after.is_empty() {
            EDGE_SCORE
        } else {
            0
        }
    }
}

impl Atom for u32 {}

impl Atom for char {
    fn boundary_score(before: &[char], after: &[char]) -> u32 {
        let (Some(&c1), Some(&c2)) = (before.last(), after.first()) else {
            return EDGE_SCORE;
        };

        let non_alnum1 = !c1.is_alphanumeric();
        let non_alnum2 = !c2.is_alphanumeric();
        let space1 = non_alnum1 && c1.is_whitespace();
        let space2 = non_alnum2 && c2.is_whitespace();
        let break1 = space1 && (c1 == '\n' || c1 == '\r');
        let break2 = space2 && (c2 == '\n' || c2 == '\r');
        let blank1 = break1 && ends_with_blank_line(before);
        let blank2 = break2 && starts_with_blank_line(after);

        if blank1 || blank2 {
            5
        } else if break1 || break2 {
            4
        } else if non_alnum1 && !space1 && space2 {
            // End of sentence.
            3
        } else if space1 || space2 {
            2
        } else if non_alnum1 || non_alnum2 {
            1
        } else {
            0
        }
    }
}

impl<'a> Atom for &'a str {
    fn boundary_score(before: &[&'a str], after: &[&'a str]) -> u32 {
        match (before.last(), after.first()) {
            (Some(a), Some(b)) if is_blank_line(a) || is_blank_line(b) => 5,
            (Some(_), Some(_)) => 4,
            _ => EDGE_SCORE,
        }
    }
}

fn ends_with_blank_line(s: &[char]) -> bool {
    matches!(s, [.., '\n', '\n'] | [.., '\n', '\r', '\n'])
}

fn starts_with_blank_line(s: &[char]) -> bool {
    matches!(
        s,
        ['\n', '\n', ..] | ['\n', '\r', '\n', ..] | ['\r', '\n', '\n', ..] | ['\r', '\n', '\r', '\n', ..]
    )
}

fn is_blank_line(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).is_empty()
}

/// A run of atoms with one edit kind: the engine's internal operation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Chunk<T> {
    pub kind: OpKind,
    pub items: Vec<T>,
}

impl<T: Atom> Chunk<T> {
    pub fn new(kind: OpKind, items: Vec<T>) -> Self {
        Self { kind, items }
    }

    pub fn equal(items: &[T]) -> Self {
        Self::new(OpKind::Equal, items.to_vec())
    }

    pub fn insert(items: &[T]) -> Self {
        Self::new(OpKind::Insert, items.to_vec())
    }

    pub fn delete(items: &[T]) -> Self {
        Self::new(OpKind::Delete, items.to_vec())
    }
}

pub(crate) fn common_prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

pub(crate) fn common_suffix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Position of the first occurrence of `needle` in `haystack` at or after
/// `from`.
pub(crate) fn find_from<T: PartialEq>(haystack: &[T], needle: &[T], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

pub(crate) fn script_to_chunks(script: &EditScript) -> Vec<Chunk<char>> {
    script
        .iter()
        .map(|op| Chunk::new(op.kind, op.text.chars().collect()))
        .collect()
}

pub(crate) fn chunks_to_script(chunks: Vec<Chunk<char>>) -> EditScript {
    chunks
        .into_iter()
        .map(|chunk| Operation::new(chunk.kind, chunk.items.into_iter().collect::<String>()))
        .collect()
}
