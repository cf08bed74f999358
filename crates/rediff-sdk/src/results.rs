use serde::{Deserialize, Serialize};

use rediff_types::{DiffStats, EditScript};

/// A cleaned character diff and its statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharDiff {
    pub operations: EditScript,
    pub stats: DiffStats,
}

impl CharDiff {
    pub fn new(operations: EditScript) -> Self {
        let stats = operations.stats();
        Self { operations, stats }
    }
}

/// Result of applying patch text to a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ApplyPatchResult {
    /// The patch parsed. `hunks` has one flag per hunk; the text holds
    /// every hunk that could be placed.
    Applied { text: String, hunks: Vec<bool> },
    /// The patch text was malformed; nothing was applied.
    Rejected { error: String },
}

impl ApplyPatchResult {
    /// `false` only when the patch text could not be parsed.
    pub fn success(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Returns `true` if the patch parsed and every hunk applied.
    pub fn is_clean(&self) -> bool {
        match self {
            Self::Applied { hunks, .. } => hunks.iter().all(|&applied| applied),
            Self::Rejected { .. } => false,
        }
    }
}
