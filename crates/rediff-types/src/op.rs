use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stats::DiffStats;

/// The kind of an edit operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Text present in both the old and the new buffer.
    Equal,
    /// Text present only in the new buffer.
    Insert,
    /// Text present only in the old buffer.
    Delete,
}

impl OpKind {
    /// Single-character tag used by the unified patch format.
    pub fn tag(self) -> char {
        match self {
            Self::Equal => ' ',
            Self::Insert => '+',
            Self::Delete => '-',
        }
    }

    /// Inverse of [`Self::tag`].
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            ' ' => Some(Self::Equal),
            '+' => Some(Self::Insert),
            '-' => Some(Self::Delete),
            _ => None,
        }
    }

    /// Whether text of this kind belongs to the old buffer.
    pub fn in_old(self) -> bool {
        !matches!(self, Self::Insert)
    }

    /// Whether text of this kind belongs to the new buffer.
    pub fn in_new(self) -> bool {
        !matches!(self, Self::Delete)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "equal"),
            Self::Insert => write!(f, "insert"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A run of text with a single edit kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OpKind,
    pub text: String,
}

impl Operation {
    pub fn new(kind: OpKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(OpKind::Equal, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(OpKind::Insert, text)
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(OpKind::Delete, text)
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// An ordered sequence of operations transforming an old text into a new one.
///
/// Scripts are kept maximally merged: no empty operations and no two
/// adjacent operations of the same kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript(Vec<Operation>);

impl EditScript {
    /// Build a script, dropping empty operations and merging adjacent
    /// operations of the same kind.
    pub fn new(operations: Vec<Operation>) -> Self {
        let mut merged: Vec<Operation> = Vec::with_capacity(operations.len());
        for op in operations {
            if op.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.kind == op.kind => last.text.push_str(&op.text),
                _ => merged.push(op),
            }
        }
        Self(merged)
    }

    /// An empty script (the diff of two empty texts).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Operation] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Operation> {
        self.0
    }

    /// Returns `true` if the script contains no insertions or deletions.
    pub fn is_unchanged(&self) -> bool {
        self.0.iter().all(|op| op.kind == OpKind::Equal)
    }

    /// Reconstruct the old text (Equal + Delete operations).
    pub fn old_text(&self) -> String {
        self.collect_text(OpKind::in_old)
    }

    /// Reconstruct the new text (Equal + Insert operations).
    pub fn new_text(&self) -> String {
        self.collect_text(OpKind::in_new)
    }

    /// Statistics derived from this script.
    pub fn stats(&self) -> DiffStats {
        DiffStats::from_script(self)
    }

    fn collect_text(&self, keep: fn(OpKind) -> bool) -> String {
        self.0
            .iter()
            .filter(|op| keep(op.kind))
            .map(|op| op.text.as_str())
            .collect()
    }
}

impl FromIterator<Operation> for EditScript {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for EditScript {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
