use rediff_engine::DiffConfig;
use serde::{Deserialize, Serialize};

/// Configuration for building and applying patches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Unchanged lines kept before and after every change.
    pub context_lines: usize,
    /// How far, in lines, the applier searches around a hunk's declared
    /// position when the text has drifted.
    pub search_radius: usize,
    /// Minimum similarity (0.0 to 1.0) between a hunk's expected lines and
    /// a window of the text for a fuzzy match to be accepted.
    pub min_similarity: f32,
    /// Settings for the line diff a patch is built from.
    pub diff: DiffConfig,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            search_radius: 100,
            min_similarity: 0.6,
            diff: DiffConfig::default(),
        }
    }
}

impl PatchConfig {
    /// Exact matching only: no fuzzy window search.
    pub fn strict() -> Self {
        Self {
            search_radius: 0,
            min_similarity: 1.0,
            ..Default::default()
        }
    }
}
