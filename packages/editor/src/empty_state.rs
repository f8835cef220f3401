//! Deletion arming for the block under edit.
//!
//! Erasing all content must not delete a block by itself; only a second
//! erase on the already-empty block does. The state here tracks whether
//! that second erase is armed.

/// Arming state of the delete-on-erase convention for one edited block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The block has (or last had) visible content.
    Filled,
    /// Content was fully cleared; the next erase on blank text deletes
    /// the block.
    Empty,
}

impl EmptyState {
    /// Initial arming when editing begins on `content`.
    pub fn for_loaded(content: &str) -> EmptyState {
        if is_blank(content) {
            EmptyState::Empty
        } else {
            EmptyState::Filled
        }
    }

    /// Next arming state after the edited text changes.
    pub fn on_text(self, previous: &str, next: &str) -> EmptyState {
        if should_enter_empty_state(previous, next) {
            EmptyState::Empty
        } else if should_exit_empty_state(next) {
            EmptyState::Filled
        } else {
            self
        }
    }
}

/// Non-blank text was just cleared: arm the next erase.
pub fn should_enter_empty_state(previous: &str, next: &str) -> bool {
    !is_blank(previous) && is_blank(next)
}

/// Any non-blank text disarms.
pub fn should_exit_empty_state(next: &str) -> bool {
    !is_blank(next)
}

/// An erase while armed and still blank performs the deletion.
pub fn should_delete_on_erase(state: EmptyState, next: &str) -> bool {
    state == EmptyState::Empty && is_blank(next)
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
