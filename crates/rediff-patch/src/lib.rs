//! Patches for rediff.
//!
//! Builds line-oriented patches from two texts, encodes them in a unified
//! diff style text form, and applies them to text that may have changed
//! since the patch was made.
//!
//! # Key Types
//!
//! - [`Patch`] / [`Hunk`] -- the patch model
//! - [`PatchConfig`] -- context size and fuzzy matching thresholds
//! - [`PatchOutcome`] / [`HunkOutcome`] -- what applying a patch did
//! - [`FormatError`] -- malformed patch text

pub mod apply;
pub mod codec;
pub mod config;
pub mod error;
pub mod hunk;
pub mod make;

pub use apply::{apply, HunkOutcome, PatchOutcome};
pub use codec::{decode, encode, NO_NEWLINE_MARKER};
pub use config::PatchConfig;
pub use error::{FormatError, PatchResult};
pub use hunk::{Hunk, Patch};
pub use make::make_patch;
