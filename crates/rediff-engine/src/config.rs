use serde::{Deserialize, Serialize};

/// Which post-processing pass runs over a raw edit script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupMode {
    /// Leave the merged minimal script untouched.
    None,
    /// Fold short equalities into surrounding edits and align edit
    /// boundaries with word and line breaks.
    #[default]
    Semantic,
    /// Fold equalities that cost more than the edits they separate.
    Efficiency,
}

/// Tunables for a diff computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Maximum number of diagonal steps the Myers search may take for one
    /// call. `None` searches until the script is minimal. Once exhausted the
    /// remaining regions are reported as a plain delete + insert.
    pub budget: Option<usize>,
    /// Cleanup applied to every script.
    pub cleanup: CleanupMode,
    /// Cost of an empty edit operation, in characters, used by
    /// [`CleanupMode::Efficiency`].
    pub edit_cost: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            budget: None,
            cleanup: CleanupMode::Semantic,
            edit_cost: 4,
        }
    }
}

impl DiffConfig {
    /// A configuration with a bounded search budget.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget: Some(budget),
            ..Default::default()
        }
    }

    /// Same configuration with a different cleanup mode.
    pub fn cleanup(mut self, cleanup: CleanupMode) -> Self {
        self.cleanup = cleanup;
        self
    }
}
