//! Error types for the diff engine.

/// Errors raised inside the engine.
///
/// None of these reach callers of the public diff functions: they are
/// handled by degrading to a coarser script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The configured step budget ran out before the search finished.
    #[error("diff budget of {budget} steps exhausted")]
    BudgetExceeded { budget: usize },
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
