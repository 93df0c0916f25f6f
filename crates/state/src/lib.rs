//! File-based state persistence for keyhook.
//!
//! This crate provides synchronous JSON state that survives across hook
//! invocations:
//! - Whole-document state (`<name>.json`, read/replace)
//! - Append-only logs (`<name>.jsonl`, one JSON value per line)
//! - Project-local and user-global locations
//!
//! Every primitive is total: missing or malformed files degrade to
//! [`StateRead::Missing`] or an empty log, and write failures come back as a
//! [`WriteOutcome`] instead of an error.

pub mod handle;
pub mod location;
pub mod store;

// Re-export main types
pub use handle::StateHandle;
pub use location::StateLocation;
pub use store::{StateRead, StateStore, WriteOutcome};
