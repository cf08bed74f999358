//! Value types shared by every rediff crate.
//!
//! Everything here is a plain owned value: no shared state, no
//! back-references. Scripts own their operations and line records own their
//! nested character diffs.
//!
//! # Key Types
//!
//! - [`OpKind`] / [`Operation`] -- a single equal/insert/delete run of text
//! - [`EditScript`] -- an ordered, maximally merged sequence of operations
//! - [`DiffStats`] -- statistics derived from a script or a line diff
//! - [`LineRecord`] / [`LineDiff`] -- line-granularity diff output

pub mod line;
pub mod op;
pub mod stats;

pub use line::{LineDiff, LineRecord};
pub use op::{EditScript, OpKind, Operation};
pub use stats::DiffStats;
