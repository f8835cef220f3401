use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};

use crate::error::SaveError;
use crate::status::SaveStatus;

/// Boxed future returned by a save target.
pub type SaveFuture = Pin<Box<dyn Future<Output = Result<(), SaveError>> + Send>>;

/// Destination for persisted values. Implemented by storage adapters and,
/// for convenience, by any matching closure.
pub trait SaveTarget<T>: Send + Sync {
    fn save(&self, value: T) -> SaveFuture;
}

impl<T, F> SaveTarget<T> for F
where
    F: Fn(T) -> SaveFuture + Send + Sync,
{
    fn save(&self, value: T) -> SaveFuture {
        (self)(value)
    }
}

/// Timing configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet period between the last change and the write it triggers.
    pub debounce: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
        }
    }
}

enum Command<T> {
    Schedule(T),
    SaveNow(T),
    MarkPersisted(T),
    Retry,
    Flush(oneshot::Sender<SaveStatus>),
}

/// Handle to a background save coordinator.
///
/// The coordinator owns the debounce timer and the single-flight write
/// gate for one persisted value stream. Handle calls never block: they
/// enqueue a command for the coordinator task and return. Progress is
/// observable through [`SaveStatus`] snapshots.
///
/// Guarantees:
///
/// - at most one write is in flight at any time; a request that arrives
///   during a write is recorded and performed afterwards, newest value
///   winning
/// - a value equal to the last successfully persisted one is never
///   written again
/// - a running write is never cancelled; only the not-yet-fired debounce
///   timer is rescheduled
/// - a failed write keeps the unsaved value: the next change, `retry`,
///   `flush`, or teardown attempts it again, and nothing retries on a
///   timer by itself
/// - dropping the handle lets the coordinator finish the in-flight write
///   and attempt one final write of whatever is still unsaved
pub struct Autosave<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    status_rx: watch::Receiver<SaveStatus>,
}

impl<T> Autosave<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Spawns the coordinator task. Must be called within a Tokio runtime.
    pub fn new(target: impl SaveTarget<T> + 'static, config: AutosaveConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveStatus::default());
        let (writes_tx, writes_rx) = mpsc::unbounded_channel();

        let coordinator = Coordinator {
            target: Arc::new(target),
            config,
            commands: rx,
            writes: writes_rx,
            writes_tx,
            status: status_tx,
            persisted: None,
            latest: None,
            in_flight: false,
            pending: None,
            deadline: None,
            last_saved: None,
            error: None,
            flush_waiters: Vec::new(),
        };
        tokio::spawn(coordinator.run());

        Self { tx, status_rx }
    }

    /// Records a changed value and resets the debounce timer.
    pub fn schedule(&self, value: T) {
        let _ = self.tx.send(Command::Schedule(value));
    }

    /// Requests a write immediately, skipping the quiet period.
    pub fn save_now(&self, value: T) {
        let _ = self.tx.send(Command::SaveNow(value));
    }

    /// Declares `value` as the store's current content (initial load or
    /// an external refresh). Clears any armed timer and any prior error.
    pub fn mark_persisted(&self, value: T) {
        let _ = self.tx.send(Command::MarkPersisted(value));
    }

    /// Re-attempts the latest unsaved value after a failure.
    pub fn retry(&self) {
        let _ = self.tx.send(Command::Retry);
    }

    /// Writes any unsaved value immediately and resolves once the
    /// coordinator has settled: clean, or the attempt failed (the error
    /// is in the returned status). Changes made after the flush call do
    /// not extend the wait.
    pub async fn flush(&self) -> SaveStatus {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return self.status();
        }
        ack_rx.await.unwrap_or_else(|_| self.status())
    }

    /// Current pipeline snapshot.
    pub fn status(&self) -> SaveStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscription to pipeline snapshots.
    pub fn watch_status(&self) -> watch::Receiver<SaveStatus> {
        self.status_rx.clone()
    }
}

/// The background task. All coordinator state lives here, on one task;
/// writes run on spawned tasks and report back over the `writes` channel.
struct Coordinator<T> {
    target: Arc<dyn SaveTarget<T>>,
    config: AutosaveConfig,
    commands: mpsc::UnboundedReceiver<Command<T>>,
    writes: mpsc::UnboundedReceiver<(T, Result<(), SaveError>)>,
    writes_tx: mpsc::UnboundedSender<(T, Result<(), SaveError>)>,
    status: watch::Sender<SaveStatus>,

    /// Last value the store is known to hold. Only advances on success,
    /// so a failed write can never be short-circuited as a no-op.
    persisted: Option<T>,
    /// Most recent value handed to us.
    latest: Option<T>,
    in_flight: bool,
    /// Request that arrived while a write was running; newest wins.
    pending: Option<T>,
    /// Armed debounce timer.
    deadline: Option<Instant>,
    last_saved: Option<SystemTime>,
    error: Option<String>,
    flush_waiters: Vec<oneshot::Sender<SaveStatus>>,
}

impl<T> Coordinator<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    async fn run(mut self) {
        loop {
            tokio::select! {
                Some((value, result)) = self.writes.recv() => {
                    self.finish_write(value, result);
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    // Handle dropped: no further commands can arrive.
                    None => break,
                },
                _ = sleep_until(self.deadline.unwrap_or_else(Instant::now)),
                    if self.deadline.is_some() =>
                {
                    self.deadline = None;
                    if let Some(value) = self.latest.clone() {
                        self.request_write(value);
                    }
                }
            }
        }
        self.drain().await;
    }

    fn handle_command(&mut self, command: Command<T>) {
        match command {
            Command::Schedule(value) => {
                self.latest = Some(value);
                self.deadline = Some(Instant::now() + self.config.debounce);
                tracing::debug!("change recorded, debounce timer reset");
                self.publish();
            }
            Command::SaveNow(value) => {
                self.latest = Some(value.clone());
                self.deadline = None;
                self.request_write(value);
            }
            Command::MarkPersisted(value) => {
                self.persisted = Some(value.clone());
                self.latest = Some(value);
                self.deadline = None;
                self.pending = None;
                self.error = None;
                self.publish();
                self.try_ack_flushes();
            }
            Command::Retry => {
                if let Some(value) = self.unsaved() {
                    tracing::debug!("retrying unsaved value");
                    self.request_write(value);
                }
            }
            Command::Flush(ack) => {
                self.deadline = None;
                match self.unsaved() {
                    Some(value) => {
                        self.flush_waiters.push(ack);
                        self.request_write(value);
                    }
                    None if self.in_flight => self.flush_waiters.push(ack),
                    None => {
                        let _ = ack.send(self.current_status());
                    }
                }
            }
        }
    }

    /// Starts a write unless the value is already persisted; while a
    /// write is running the value goes to the pending slot instead.
    fn request_write(&mut self, value: T) {
        if self.persisted.as_ref() == Some(&value) {
            self.publish();
            self.try_ack_flushes();
            return;
        }
        if self.in_flight {
            self.pending = Some(value);
            return;
        }

        self.in_flight = true;
        self.publish();
        tracing::debug!("write started");

        let target = self.target.clone();
        let writes = self.writes_tx.clone();
        tokio::spawn(async move {
            let result = target.save(value.clone()).await;
            let _ = writes.send((value, result));
        });
    }

    fn finish_write(&mut self, value: T, result: Result<(), SaveError>) {
        self.in_flight = false;
        match result {
            Ok(()) => {
                tracing::info!("write completed");
                self.persisted = Some(value);
                self.last_saved = Some(SystemTime::now());
                self.error = None;
            }
            Err(err) => {
                tracing::error!("write failed: {}", err);
                self.error = Some(err.to_string());
            }
        }

        if let Some(next) = self.pending.take() {
            // The spawn gives one yield between consecutive writes.
            self.request_write(next);
        }
        self.publish();
        self.try_ack_flushes();
    }

    fn unsaved(&self) -> Option<T> {
        if self.is_dirty() {
            self.latest.clone()
        } else {
            None
        }
    }

    fn is_dirty(&self) -> bool {
        match (&self.latest, &self.persisted) {
            (Some(latest), Some(persisted)) => latest != persisted,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn current_status(&self) -> SaveStatus {
        SaveStatus {
            is_saving: self.in_flight,
            dirty: self.is_dirty(),
            last_saved: self.last_saved,
            error: self.error.clone(),
        }
    }

    fn publish(&self) {
        let _ = self.status.send(self.current_status());
    }

    fn try_ack_flushes(&mut self) {
        if self.in_flight || self.pending.is_some() || self.flush_waiters.is_empty() {
            return;
        }
        let status = self.current_status();
        for waiter in self.flush_waiters.drain(..) {
            let _ = waiter.send(status.clone());
        }
    }

    /// Shutdown path, entered when the handle is dropped: wait out the
    /// write chain, then make one last attempt at anything unsaved.
    async fn drain(mut self) {
        while self.in_flight {
            match self.writes.recv().await {
                Some((value, result)) => self.finish_write(value, result),
                None => break,
            }
        }
        if let Some(value) = self.unsaved() {
            tracing::debug!("final write on teardown");
            match self.target.save(value.clone()).await {
                Ok(()) => {
                    tracing::info!("write completed");
                    self.persisted = Some(value);
                    self.last_saved = Some(SystemTime::now());
                    self.error = None;
                }
                Err(err) => {
                    tracing::error!("final write failed: {}", err);
                    self.error = Some(err.to_string());
                }
            }
            self.publish();
        }
        self.try_ack_flushes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quiet_period() {
        assert_eq!(
            AutosaveConfig::default().debounce,
            Duration::from_millis(1500)
        );
    }

    #[tokio::test]
    async fn test_closures_are_save_targets() {
        let target = |_value: String| -> SaveFuture { Box::pin(async { Ok(()) }) };
        let autosave = Autosave::new(target, AutosaveConfig::default());
        autosave.save_now("v".to_string());
        let status = autosave.flush().await;
        assert!(status.is_settled());
    }
}
