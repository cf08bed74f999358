//! High-level SDK for rediff.
//!
//! A [`Rediff`] value holds the configuration for a host session and exposes
//! the four operations hosts call: [`Rediff::char_diff`],
//! [`Rediff::line_diff`], [`Rediff::make_patch`] and [`Rediff::apply_patch`].
//! Every result is serializable so hosts can hand it on as JSON.

pub mod config;
pub mod error;
pub mod results;
pub mod session;

pub use config::RediffConfig;
pub use error::{SdkError, SdkResult};
pub use results::{ApplyPatchResult, CharDiff};
pub use session::Rediff;

// Re-export key types
pub use rediff_engine::{CleanupMode, DiffConfig};
pub use rediff_patch::{FormatError, Patch, PatchConfig};
pub use rediff_types::{DiffStats, EditScript, LineDiff, LineRecord, OpKind, Operation};
