//! Patch model: a patch is an ordered list of hunks, each a window of
//! whole-line operations located by its position in the old and new texts.

use rediff_types::{OpKind, Operation};
use serde::{Deserialize, Serialize};

/// A contiguous region of line changes with surrounding context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// First old line covered (1-based), or the number of preceding lines
    /// when `old_len` is zero.
    pub old_start: usize,
    /// Number of old lines covered.
    pub old_len: usize,
    /// First new line covered (1-based), or the number of preceding lines
    /// when `new_len` is zero.
    pub new_start: usize,
    /// Number of new lines covered.
    pub new_len: usize,
    /// Whole-line operations. Every line keeps its terminator except the
    /// final line of a text that has none.
    pub operations: Vec<Operation>,
}

impl Hunk {
    /// An empty hunk positioned at the given starts.
    pub fn new(old_start: usize, new_start: usize) -> Self {
        Self {
            old_start,
            old_len: 0,
            new_start,
            new_len: 0,
            operations: Vec::new(),
        }
    }

    /// Append one line, merging it into the last operation when the kinds
    /// match, and update the side lengths.
    pub fn push_line(&mut self, kind: OpKind, line: &str) {
        if kind.in_old() {
            self.old_len += 1;
        }
        if kind.in_new() {
            self.new_len += 1;
        }
        match self.operations.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(line),
            _ => self.operations.push(Operation::new(kind, line)),
        }
    }

    /// Every line of the hunk with its kind, in order.
    pub fn lines(&self) -> impl Iterator<Item = (OpKind, &str)> {
        self.operations
            .iter()
            .flat_map(|op| op.text.split_inclusive('\n').map(move |line| (op.kind, line)))
    }

    /// Lines the hunk expects to find in the old text.
    pub fn old_lines(&self) -> Vec<&str> {
        self.lines()
            .filter(|(kind, _)| kind.in_old())
            .map(|(_, line)| line)
            .collect()
    }

    /// Lines the hunk leaves in the new text.
    pub fn new_lines(&self) -> Vec<&str> {
        self.lines()
            .filter(|(kind, _)| kind.in_new())
            .map(|(_, line)| line)
            .collect()
    }

    /// Zero-based line index the hunk's old side begins at.
    pub fn old_index(&self) -> usize {
        if self.old_len == 0 {
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }
}

/// An ordered list of hunks turning one text into another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub hunks: Vec<Hunk>,
}

impl Patch {
    pub fn new(hunks: Vec<Hunk>) -> Self {
        Self { hunks }
    }

    /// Returns `true` if the patch has no hunks.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hunk> {
        self.hunks.iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a Hunk;
    type IntoIter = std::slice::Iter<'a, Hunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.hunks.iter()
    }
}
