//! Debounced, race-free persistence for a stream of values.
//!
//! One [`Autosave`] instance guards one persisted value (for the task
//! editor, the encoded text of one note). Rapid changes coalesce behind a
//! quiet-period timer, explicit boundaries write immediately, and a
//! single-flight gate keeps writes strictly ordered: at most one is ever
//! running, a newer value arriving mid-write is written right after, and
//! a completed write for a stale value can never overwrite a newer one.
//!
//! Failures never lose data. The unsaved value stays recorded, the error
//! is published in [`SaveStatus`], and the next change, [`Autosave::retry`],
//! [`Autosave::flush`], or teardown re-attempts it.

pub mod coordinator;
pub mod error;
pub mod status;

pub use coordinator::{Autosave, AutosaveConfig, SaveFuture, SaveTarget};
pub use error::SaveError;
pub use status::SaveStatus;
