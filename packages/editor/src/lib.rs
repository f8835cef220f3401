//! # Taskdown Editor
//!
//! Block editing engine for plain-text task notes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: note text ⇄ block tree            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Load/decode a task's document            │
//! │  - Route text changes, commits, Enter       │
//! │  - Backspace-on-empty deletion arming       │
//! │  - Reconcile external document changes      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ autosave: debounced single-flight writes    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is source of truth**: the text form is derived, and
//!    re-encoding a decoded document is a fixed point
//! 2. **Typing is decoupled**: live text enters the tree at commit
//!    boundaries, but every save carries it
//! 3. **Snapshots, not locks**: mutation swaps an `Arc`'d tree; readers
//!    keep whatever snapshot they hold
//! 4. **Saves never race**: one write in flight at most, newest value
//!    wins, failures keep the unsaved value
//! 5. **Stale paths are harmless**: commands on missing blocks no-op
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taskdown_editor::{EditSession, FileStore};
//!
//! let store = Arc::new(FileStore::new("./notes"));
//! let mut session = EditSession::open(store, "groceries").await?;
//!
//! // The host streams text changes; the session handles structure.
//! session.start_edit(&[0]);
//! session.change_text(&[0], "- [ ] oat milk");   // Line becomes a Check
//! session.commit_edit(&[0]);
//!
//! // Flush pending work before shutdown.
//! let status = session.close().await;
//! assert!(status.error.is_none());
//! ```

mod empty_state;
mod errors;
mod session;
mod store;

pub use empty_state::{
    should_delete_on_erase, should_enter_empty_state, should_exit_empty_state, EmptyState,
};
pub use errors::{EditorError, EditorResult};
pub use session::{EditSession, TextChange};
pub use store::{FileStore, MemoryStore, StoreError, StoreFuture, TaskStore};

// Re-export common types for convenience
pub use taskdown_autosave::{AutosaveConfig, SaveStatus};
pub use taskdown_document::{decode, encode, normalize, Block, BlockKind, Document};
