//! # Edit Session Management
//!
//! One [`EditSession`] owns the editing state for a single task's
//! document: the current tree snapshot, the block being typed into, the
//! backspace-on-empty deletion arming, and the autosave pipeline.
//!
//! Text being typed stays out of the tree until a commit boundary
//! (commit, Enter, switching blocks, close). Scheduled saves still
//! include the live text, so the store never lags behind the screen by
//! more than the quiet period.

use std::sync::Arc;

use tokio::sync::watch;

use taskdown_autosave::{Autosave, AutosaveConfig, SaveFuture, SaveStatus};
use taskdown_document::{
    children_of_mut, decode, encode, find_by_path, find_by_path_mut, parent_array_of_mut, Block,
    BlockKind, Document,
};

use crate::empty_state::{should_delete_on_erase, EmptyState};
use crate::errors::EditorResult;
use crate::store::TaskStore;

/// The block currently being typed into.
#[derive(Debug, Clone)]
struct ActiveEdit {
    /// Path of the edited block when editing started. Positional: it can
    /// go stale if siblings shift underneath it.
    path: Vec<usize>,

    /// Live text, not yet written into the tree.
    value: String,

    /// Arming state for the backspace-on-empty deletion convention.
    empty: EmptyState,
}

impl ActiveEdit {
    fn at(path: Vec<usize>, value: String) -> Self {
        let empty = EmptyState::for_loaded(&value);
        Self { path, value, empty }
    }
}

/// What a call to [`EditSession::change_text`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextChange {
    /// The live edit value was updated.
    Updated,

    /// Typing a structural marker turned the block into another kind.
    Converted(BlockKind),

    /// The text carried newlines. Each segment before a newline was
    /// committed as its own block; `new_path` is the fresh line below
    /// them holding the final segment, still under edit.
    SplitBelow { new_path: Vec<usize> },

    /// Erasing an already-empty block removed it from the tree.
    Deleted,

    /// The change referred to a block that does not exist.
    Ignored,
}

/// A single user's editing session over one task document.
pub struct EditSession {
    /// Task whose document this session edits
    task_id: String,

    /// Current tree snapshot. Mutation clones the tree and swaps the
    /// whole `Arc`, so snapshots held by readers stay valid.
    doc: Arc<Document>,

    /// Bumped on every published tree change
    version: u64,

    /// In-progress edit, decoupled from the tree until a commit boundary
    edit: Option<ActiveEdit>,

    /// Set right after a block deletion; external sync is held off until
    /// the save it scheduled has settled.
    deleting: bool,

    /// Debounced persistence pipeline for the encoded document
    autosave: Autosave<String>,
}

impl EditSession {
    /// Load a task's document and start a session with default autosave
    /// timing.
    pub async fn open(store: Arc<dyn TaskStore>, task_id: &str) -> EditorResult<Self> {
        Self::open_with_config(store, task_id, AutosaveConfig::default()).await
    }

    /// Load a task's document and start a session.
    ///
    /// The loaded text becomes the persisted marker, so opening never
    /// triggers a write on its own.
    pub async fn open_with_config(
        store: Arc<dyn TaskStore>,
        task_id: &str,
        config: AutosaveConfig,
    ) -> EditorResult<Self> {
        let text = store.load_document_text(task_id).await?;
        let doc = decode(&text);
        tracing::debug!(
            "opened task {} ({} top-level blocks)",
            task_id,
            doc.blocks.len()
        );

        let save_task = task_id.to_string();
        let autosave = Autosave::new(
            move |content: String| -> SaveFuture {
                let store = store.clone();
                let task_id = save_task.clone();
                Box::pin(async move {
                    store.save_document_text(&task_id, &content).await?;
                    Ok(())
                })
            },
            config,
        );
        autosave.mark_persisted(text);

        Ok(Self {
            task_id: task_id.to_string(),
            doc: Arc::new(doc),
            version: 0,
            edit: None,
            deleting: false,
            autosave,
        })
    }

    /// Begin editing the block at `path`.
    ///
    /// Any other in-progress edit is committed first. Arming starts
    /// `Filled` unless the block's content is already blank.
    pub fn start_edit(&mut self, path: &[usize]) {
        if self.edit.as_ref().is_some_and(|e| e.path == path) {
            return;
        }
        self.commit_active();
        match find_by_path(&self.doc, path) {
            Some(block) => {
                let value = block.content().to_string();
                self.edit = Some(ActiveEdit::at(path.to_vec(), value));
            }
            None => tracing::debug!("start_edit: no block at {:?}", path),
        }
    }

    /// Route a text change from the host into the session.
    ///
    /// In order:
    /// 1. Newlines split the text. Every segment before a newline is
    ///    committed as its own block, Enter-style, and the final
    ///    segment becomes the live value of the fresh line below. A
    ///    bare trailing newline is a plain Enter keystroke.
    /// 2. If deletion is armed and the text is still blank, the block is
    ///    deleted. This check runs on the raw text, before conversion.
    /// 3. A `Line` whose text now starts with a structural marker is
    ///    converted in place; the marker is stripped from the edit value.
    /// 4. The arming state transitions, the edit value is updated, and a
    ///    debounced save (including the live value) is scheduled.
    pub fn change_text(&mut self, path: &[usize], text: &str) -> TextChange {
        // Hosts may stream changes without an explicit start_edit.
        if !self.edit.as_ref().is_some_and(|e| e.path == path) {
            self.start_edit(path);
        }
        let (previous, armed) = match self.edit.as_ref() {
            Some(edit) if edit.path == path => (edit.value.clone(), edit.empty),
            _ => return TextChange::Ignored,
        };

        if let Some((first, rest)) = text.split_once('\n') {
            if let Some(edit) = self.edit.as_mut() {
                edit.value = first.to_string();
            }
            let mut cursor = path.to_vec();
            let mut landed = None;
            for segment in rest.split('\n') {
                let Some(new_path) = self.press_enter(&cursor) else {
                    break;
                };
                if let Some(edit) = self.edit.as_mut() {
                    edit.empty = EmptyState::for_loaded(segment);
                    edit.value = segment.to_string();
                }
                cursor.clone_from(&new_path);
                landed = Some(new_path);
            }
            return match landed {
                Some(new_path) => {
                    // A non-empty final segment is live text the immediate
                    // saves above did not carry.
                    if self.edit.as_ref().is_some_and(|e| !e.value.is_empty()) {
                        self.schedule_save();
                    }
                    TextChange::SplitBelow { new_path }
                }
                None => TextChange::Updated,
            };
        }

        if should_delete_on_erase(armed, text) {
            self.delete_block(path);
            return TextChange::Deleted;
        }

        let mut outcome = TextChange::Updated;
        let mut new_value = text.to_string();

        let is_line = matches!(find_by_path(&self.doc, path), Some(Block::Line { .. }));
        if is_line {
            if let Some(converted) = Block::from_marker(text) {
                let kind = converted.kind();
                let content = converted.content().to_string();
                let replaced = self.try_mutate(|doc| {
                    let block = find_by_path_mut(doc, path)?;
                    *block = converted;
                    Some(())
                });
                if replaced.is_some() {
                    new_value = content;
                    outcome = TextChange::Converted(kind);
                }
            }
        }

        if let Some(edit) = self.edit.as_mut() {
            edit.empty = edit.empty.on_text(&previous, &new_value);
            edit.value = new_value;
        }
        self.schedule_save();
        outcome
    }

    /// Commit the in-progress edit on `path` into the tree and request an
    /// immediate save. A no-op if that block is not being edited.
    pub fn commit_edit(&mut self, path: &[usize]) {
        if self.edit.as_ref().is_some_and(|e| e.path == path) {
            self.commit_active();
        } else {
            tracing::debug!("commit_edit: not editing {:?}", path);
        }
    }

    /// Append an empty block to a parent's children and begin editing it.
    ///
    /// `None` targets the document root; otherwise the parent must be a
    /// Toggle. Returns the new block's path.
    pub fn insert_block(
        &mut self,
        parent_path: Option<&[usize]>,
        kind: BlockKind,
    ) -> Option<Vec<usize>> {
        self.commit_active();
        let inserted = self.try_mutate(|doc| {
            let children = children_of_mut(doc, parent_path)?;
            children.push(Block::empty(kind));
            let mut path = parent_path.map(|p| p.to_vec()).unwrap_or_default();
            path.push(children.len() - 1);
            Some(path)
        });
        match inserted {
            Some(path) => {
                self.edit = Some(ActiveEdit::at(path.clone(), String::new()));
                self.schedule_save();
                Some(path)
            }
            None => {
                tracing::debug!("insert_block: no toggle parent at {:?}", parent_path);
                None
            }
        }
    }

    /// Commit the current text, insert an empty line directly after the
    /// block at `path`, and begin editing the new line. One immediate
    /// save covers both steps. Returns the new line's path.
    pub fn press_enter(&mut self, path: &[usize]) -> Option<Vec<usize>> {
        let committed = self.edit.is_some();
        self.apply_active_edit();

        let new_path = self.insert_line_after(path);
        match &new_path {
            Some(p) => {
                self.edit = Some(ActiveEdit::at(p.clone(), String::new()));
                self.save_immediately();
            }
            None => {
                tracing::debug!("press_enter: no block at {:?}", path);
                if committed {
                    self.save_immediately();
                }
            }
        }
        new_path
    }

    /// Remove the block at `path` (and, for a Toggle, its subtree).
    ///
    /// Clears the editing cursor if it pointed into the removed subtree,
    /// arms the deletion guard against external sync, and schedules a
    /// save.
    pub fn delete_block(&mut self, path: &[usize]) {
        let removed = self.try_mutate(|doc| {
            let (last, _) = path.split_last()?;
            let siblings = parent_array_of_mut(doc, path)?;
            if *last >= siblings.len() {
                return None;
            }
            siblings.remove(*last);
            Some(())
        });
        if removed.is_none() {
            tracing::debug!("delete_block: no block at {:?}", path);
            return;
        }
        if self.edit.as_ref().is_some_and(|e| e.path.starts_with(path)) {
            self.edit = None;
        }
        self.deleting = true;
        self.schedule_save();
    }

    /// Flip a Toggle's expand state. View-only: never persisted and never
    /// encoded, so no save happens.
    pub fn toggle_open(&mut self, path: &[usize]) {
        let toggled = self.try_mutate(|doc| match find_by_path_mut(doc, path) {
            Some(Block::Toggle { is_open, .. }) => {
                *is_open = !*is_open;
                Some(())
            }
            _ => None,
        });
        if toggled.is_none() {
            tracing::debug!("toggle_open: no toggle at {:?}", path);
        }
    }

    /// Flip a checkbox. Part of the grammar, so a debounced save is
    /// scheduled; bursts of flips coalesce into one write.
    pub fn toggle_checked(&mut self, path: &[usize]) {
        let toggled = self.try_mutate(|doc| match find_by_path_mut(doc, path) {
            Some(Block::Check { checked, .. }) => {
                *checked = !*checked;
                Some(())
            }
            _ => None,
        });
        match toggled {
            Some(()) => self.schedule_save(),
            None => tracing::debug!("toggle_checked: no checkbox at {:?}", path),
        }
    }

    /// Replace the whole tree, drop any in-progress edit, and save
    /// immediately.
    pub fn replace_all(&mut self, doc: Document) {
        self.doc = Arc::new(doc);
        self.version += 1;
        self.edit = None;
        self.save_immediately();
    }

    /// Adopt document text that changed outside this session (another
    /// device, a file watcher, a server push).
    ///
    /// Skipped while an edit is in progress, while the deletion guard is
    /// armed, or while the save pipeline is busy; local work always wins
    /// the race. Otherwise the text is compared in canonical form and,
    /// when it differs, the tree is replaced and the text marked
    /// persisted. Returns whether a replacement happened.
    pub fn sync_from_external_text(&mut self, text: &str) -> bool {
        if self.edit.is_some() {
            tracing::debug!("external sync skipped: edit in progress");
            return false;
        }
        let status = self.save_status();
        if self.deleting {
            // The guard lifts once the deletion's save has settled.
            if status.is_settled() {
                self.deleting = false;
            }
            tracing::debug!("external sync skipped: deletion settling");
            return false;
        }
        if status.is_saving || status.dirty {
            tracing::debug!("external sync skipped: unsaved local work");
            return false;
        }

        let incoming_doc = decode(text);
        let incoming = encode(&incoming_doc);
        if incoming == encode(&self.doc) {
            return false;
        }
        tracing::info!("task {}: adopting external document change", self.task_id);
        self.doc = Arc::new(incoming_doc);
        self.version += 1;
        self.autosave.mark_persisted(incoming);
        true
    }

    /// Re-attempt the last failed save.
    pub fn retry_save(&self) {
        self.autosave.retry();
    }

    /// Commit any in-progress edit and flush the save pipeline. Returns
    /// the final status; an error in it means the last attempt failed and
    /// the store may be behind.
    pub async fn close(mut self) -> SaveStatus {
        self.commit_active();
        self.autosave.flush().await
    }

    // Read surface.

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Current tree snapshot. Cheap to take; later edits never mutate it.
    pub fn document(&self) -> Arc<Document> {
        self.doc.clone()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Path of the block being edited, if any.
    pub fn editing_path(&self) -> Option<&[usize]> {
        self.edit.as_ref().map(|e| e.path.as_slice())
    }

    /// Live text of the block being edited, if any.
    pub fn edit_value(&self) -> Option<&str> {
        self.edit.as_ref().map(|e| e.value.as_str())
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn watch_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.autosave.watch_status()
    }

    // Internals.

    /// Copy-on-write mutation: clone the tree, run `mutate`, and publish
    /// the clone as the new snapshot only if it returns `Some`.
    fn try_mutate<R>(&mut self, mutate: impl FnOnce(&mut Document) -> Option<R>) -> Option<R> {
        let mut next = (*self.doc).clone();
        let result = mutate(&mut next)?;
        self.doc = Arc::new(next);
        self.version += 1;
        Some(result)
    }

    /// Write the committed edit value into its block. A `Line` whose
    /// value carries a structural marker converts here; this is what
    /// keeps committed content free of marker tokens.
    fn apply_edit(&mut self, edit: ActiveEdit) {
        let ActiveEdit { path, value, .. } = edit;
        let applied = self.try_mutate(|doc| {
            let block = find_by_path_mut(doc, &path)?;
            if matches!(block, Block::Line { .. }) {
                if let Some(converted) = Block::from_marker(&value) {
                    *block = converted;
                    return Some(());
                }
            }
            *block.content_mut() = value.clone();
            Some(())
        });
        if applied.is_none() {
            tracing::debug!("commit target {:?} is gone, edit dropped", path);
        }
    }

    fn apply_active_edit(&mut self) {
        if let Some(edit) = self.edit.take() {
            self.apply_edit(edit);
        }
    }

    fn commit_active(&mut self) {
        if self.edit.is_some() {
            self.apply_active_edit();
            self.save_immediately();
        }
    }

    fn insert_line_after(&mut self, path: &[usize]) -> Option<Vec<usize>> {
        let (last, parents) = path.split_last()?;
        let insert_at = last.checked_add(1)?;
        self.try_mutate(|doc| {
            let siblings = parent_array_of_mut(doc, path)?;
            if insert_at > siblings.len() {
                return None;
            }
            siblings.insert(insert_at, Block::line(""));
            Some(())
        })?;
        let mut new_path = parents.to_vec();
        new_path.push(insert_at);
        Some(new_path)
    }

    /// The text a save would write right now: the tree with the live
    /// edit value, if any, applied at the edited path.
    fn save_payload(&self) -> String {
        match &self.edit {
            Some(edit) => {
                let mut snapshot = (*self.doc).clone();
                if let Some(block) = find_by_path_mut(&mut snapshot, &edit.path) {
                    *block.content_mut() = edit.value.clone();
                }
                encode(&snapshot)
            }
            None => encode(&self.doc),
        }
    }

    fn schedule_save(&self) {
        self.autosave.schedule(self.save_payload());
    }

    fn save_immediately(&self) {
        self.autosave.save_now(self.save_payload());
    }
}
