//! Error types for the patch crate.

use thiserror::Error;

/// Malformed patch text. Line numbers are 1-based positions in the patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A hunk header could not be parsed.
    #[error("line {line}: malformed hunk header {text:?}")]
    MalformedHeader { line: usize, text: String },

    /// A hunk body line starts with an unknown tag.
    #[error("line {line}: unrecognised line prefix {prefix:?}")]
    UnknownPrefix { line: usize, prefix: char },

    /// The hunk body does not match the lengths declared in its header.
    #[error(
        "line {line}: hunk declares -{declared_old} +{declared_new} lines \
         but its body has -{actual_old} +{actual_new}"
    )]
    LengthMismatch {
        line: usize,
        declared_old: usize,
        declared_new: usize,
        actual_old: usize,
        actual_new: usize,
    },

    /// Text outside of any hunk, or a marker with nothing to attach to.
    #[error("line {line}: unexpected line {text:?}")]
    UnexpectedLine { line: usize, text: String },
}

impl FormatError {
    /// The offending line of the patch text.
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedHeader { line, .. }
            | Self::UnknownPrefix { line, .. }
            | Self::LengthMismatch { line, .. }
            | Self::UnexpectedLine { line, .. } => *line,
        }
    }
}

/// Convenience alias for patch decoding results.
pub type PatchResult<T> = Result<T, FormatError>;
