//! Storage boundary for task document text.
//!
//! The session never talks to a database or filesystem directly; it
//! loads and saves one opaque text blob per task id through [`TaskStore`].
//! [`FileStore`] keeps one UTF-8 file per task, [`MemoryStore`] backs
//! tests and previews and can simulate slow or failing storage.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use thiserror::Error;

/// Boxed future returned by store operations.
pub type StoreFuture<T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send>>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No document for task: {task_id}")]
    NotFound { task_id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for taskdown_autosave::SaveError {
    fn from(err: StoreError) -> Self {
        Self::new(err.to_string())
    }
}

/// Persistence backend for task documents, keyed by task id.
pub trait TaskStore: Send + Sync {
    fn load_document_text(&self, task_id: &str) -> StoreFuture<String>;
    fn save_document_text(&self, task_id: &str, text: &str) -> StoreFuture<()>;
}

/// Stores each task's document as a text file under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, task_id: &str) -> PathBuf {
        self.root.join(format!("{}.txt", task_id))
    }
}

impl TaskStore for FileStore {
    fn load_document_text(&self, task_id: &str) -> StoreFuture<String> {
        let path = self.path_for(task_id);
        let task_id = task_id.to_string();
        Box::pin(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => Ok(text),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    Err(StoreError::NotFound { task_id })
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    fn save_document_text(&self, task_id: &str, text: &str) -> StoreFuture<()> {
        let path = self.path_for(task_id);
        let text = text.to_string();
        Box::pin(async move {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, text).await?;
            Ok(())
        })
    }
}

/// In-memory store. Writes land in a shared map, so clones observe each
/// other; the hooks below simulate the failure modes a real backend has.
#[derive(Clone)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, String>>>,
    history: Arc<Mutex<Vec<(String, String)>>>,
    failures_left: Arc<AtomicUsize>,
    save_latency: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(Mutex::new(Vec::new())),
            failures_left: Arc::new(AtomicUsize::new(0)),
            save_latency: Duration::ZERO,
        }
    }

    /// Every save takes `latency` before completing.
    pub fn with_save_latency(latency: Duration) -> Self {
        Self {
            save_latency: latency,
            ..Self::new()
        }
    }

    /// Pre-populates a task document.
    pub fn seed(&self, task_id: &str, text: &str) {
        self.documents
            .write()
            .unwrap()
            .insert(task_id.to_string(), text.to_string());
    }

    /// Makes the next `count` saves fail with a backend error.
    pub fn fail_next_saves(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Current stored text for a task.
    pub fn contents(&self, task_id: &str) -> Option<String> {
        self.documents.read().unwrap().get(task_id).cloned()
    }

    /// Number of completed (successful) saves.
    pub fn save_count(&self) -> usize {
        self.history.lock().unwrap().len()
    }

    /// Completed saves in order: (task_id, text).
    pub fn saved_history(&self) -> Vec<(String, String)> {
        self.history.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore for MemoryStore {
    fn load_document_text(&self, task_id: &str) -> StoreFuture<String> {
        let documents = self.documents.clone();
        let task_id = task_id.to_string();
        Box::pin(async move {
            let found = documents.read().unwrap().get(&task_id).cloned();
            found.ok_or(StoreError::NotFound { task_id })
        })
    }

    fn save_document_text(&self, task_id: &str, text: &str) -> StoreFuture<()> {
        let documents = self.documents.clone();
        let history = self.history.clone();
        let failures = self.failures_left.clone();
        let latency = self.save_latency;
        let task_id = task_id.to_string();
        let text = text.to_string();
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if failures.load(Ordering::SeqCst) > 0 {
                failures.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::Backend("injected save failure".to_string()));
            }
            documents
                .write()
                .unwrap()
                .insert(task_id.clone(), text.clone());
            history.lock().unwrap().push((task_id, text));
            Ok(())
        })
    }
}
