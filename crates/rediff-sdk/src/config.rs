use std::path::Path;

use rediff_engine::DiffConfig;
use rediff_patch::PatchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Configuration for a [`crate::Rediff`] session.
///
/// Loaded from TOML; every field is optional:
///
/// ```toml
/// [diff]
/// budget = 100000
/// cleanup = "semantic"
/// edit_cost = 4
///
/// [patch]
/// context_lines = 3
/// search_radius = 100
/// min_similarity = 0.6
/// ```
///
/// Patches are built with the `[diff]` settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RediffConfig {
    pub diff: DiffConfig,
    pub patch: PatchConfig,
}

impl RediffConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Reject values no computation can honour.
    pub fn validate(&self) -> SdkResult<()> {
        if self.diff.edit_cost == 0 {
            return Err(SdkError::Config("diff.edit_cost must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.patch.min_similarity) {
            return Err(SdkError::Config(format!(
                "patch.min_similarity must be between 0 and 1, got {}",
                self.patch.min_similarity
            )));
        }
        Ok(())
    }

    /// The patch settings with the session's diff settings applied.
    pub fn effective_patch(&self) -> PatchConfig {
        PatchConfig {
            diff: self.diff.clone(),
            ..self.patch.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rediff_engine::CleanupMode;

    #[test]
    fn default_config() {
        let c = RediffConfig::default();
        assert_eq!(c.diff, DiffConfig::default());
        assert_eq!(c.patch, PatchConfig::default());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(RediffConfig::from_toml_str("").unwrap(), RediffConfig::default());
    }

    #[test]
    fn partial_toml() {
        let c = RediffConfig::from_toml_str(
            "[diff]\ncleanup = \"efficiency\"\nbudget = 500\n\n[patch]\ncontext_lines = 1\n",
        )
        .unwrap();
        assert_eq!(c.diff.cleanup, CleanupMode::Efficiency);
        assert_eq!(c.diff.budget, Some(500));
        assert_eq!(c.diff.edit_cost, 4);
        assert_eq!(c.patch.context_lines, 1);
        assert_eq!(c.patch.search_radius, 100);

        let patch = c.effective_patch();
        assert_eq!(patch.diff.cleanup, CleanupMode::Efficiency);
        assert_eq!(patch.context_lines, 1);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = RediffConfig::from_toml_str("[patch]\nmin_similarity = 1.5\n").unwrap_err();
        assert!(matches!(err, SdkError::Config(msg) if msg.contains("min_similarity")));

        let err = RediffConfig::from_toml_str("[diff]\nedit_cost = 0\n").unwrap_err();
        assert!(matches!(err, SdkError::Config(msg) if msg.contains("edit_cost")));

        let err = RediffConfig::from_toml_str("[diff]\ncleanup = \"aggressive\"\n").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn missing_file() {
        let err = RediffConfig::load("/nonexistent/rediff.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rediff.toml"));
    }
}
