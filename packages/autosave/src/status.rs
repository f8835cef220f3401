use std::time::SystemTime;

/// Snapshot of the persistence pipeline, published through a watch
/// channel after every state transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveStatus {
    /// A write is in flight right now.
    pub is_saving: bool,
    /// The newest known value differs from what the store last accepted.
    pub dirty: bool,
    /// Completion time of the most recent successful write.
    pub last_saved: Option<SystemTime>,
    /// Message from the most recent failed write, cleared on success.
    pub error: Option<String>,
}

impl SaveStatus {
    /// Neither saving nor holding unsaved work. A stale `error` from an
    /// attempt whose value was since superseded does not count.
    pub fn is_settled(&self) -> bool {
        !self.is_saving && !self.dirty
    }
}
