//! Sync-decorated store: change logging, reconciliation, orchestration.

use crate::client::{Connectivity, SyncClient};
use crate::config::SyncSettings;
use crate::conflict;
use crate::error::SyncResult;
use crate::http::HttpClient;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use ticklist_model::{unix_now, Change, ChangeKind, EntityKind, Task, TodoList};
use ticklist_store::{DataStore, LocalStore, StoreResult};
use tracing::{debug, info, warn};

/// What the status line should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// A sync cycle is in flight.
    Syncing,
    /// Server unreachable.
    Offline,
    /// Last probe or sync cycle failed.
    Error(String),
    /// Healthy, with the seconds elapsed since the last successful sync.
    Synced {
        /// Seconds since the last successful sync.
        seconds_ago: i64,
    },
    /// Healthy but never synced yet.
    Ready,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Syncing => write!(f, "syncing"),
            SyncStatus::Offline => write!(f, "offline"),
            SyncStatus::Error(msg) => write!(f, "error: {msg}"),
            SyncStatus::Synced { seconds_ago } => write!(f, "synced {seconds_ago}s ago"),
            SyncStatus::Ready => write!(f, "ready"),
        }
    }
}

#[derive(Default)]
struct Worker {
    running: bool,
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

struct Inner<C> {
    local: Arc<LocalStore>,
    client: Arc<SyncClient<C>>,
    settings: SyncSettings,
    syncing: AtomicBool,
    last_error: RwLock<Option<String>>,
    worker: Mutex<Worker>,
}

/// A [`DataStore`] decorator adding synchronization to a [`LocalStore`].
///
/// Every mutating call delegates to the local store first, then appends a
/// change-log entry, then — when sync-on-change is enabled and the client
/// currently reports online — dispatches a fire-and-forget full sync. The
/// mutating call returns the local outcome immediately; sync failures are
/// visible only through [`SyncStore::sync_status`].
///
/// Cloning is cheap and shares all state; background threads hold a clone.
pub struct SyncStore<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for SyncStore<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: HttpClient + 'static> SyncStore<C> {
    /// Creates a sync store over a local store and client.
    pub fn new(local: Arc<LocalStore>, client: SyncClient<C>, settings: SyncSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                local,
                client: Arc::new(client),
                settings,
                syncing: AtomicBool::new(false),
                last_error: RwLock::new(None),
                worker: Mutex::new(Worker::default()),
            }),
        }
    }

    /// Returns the underlying sync client.
    pub fn client(&self) -> &SyncClient<C> {
        &self.inner.client
    }

    /// Runs one full pull-then-push cycle.
    ///
    /// Overlapping invocations (background timer vs. sync-on-change) are
    /// not mutually excluded here; they serialize through the store's
    /// single-writer connection.
    pub fn full_sync(&self) -> SyncResult<()> {
        self.inner.full_sync()
    }

    /// Reports what the status line should show right now.
    pub fn sync_status(&self) -> SyncStatus {
        if self.inner.syncing.load(Ordering::SeqCst) {
            return SyncStatus::Syncing;
        }
        match self.inner.client.check_connectivity() {
            Connectivity::Offline => SyncStatus::Offline,
            Connectivity::Error => SyncStatus::Error(
                self.inner
                    .client
                    .last_error()
                    .unwrap_or_else(|| "sync server error".into()),
            ),
            Connectivity::Online => {
                if let Some(message) = self.inner.last_error.read().clone() {
                    return SyncStatus::Error(message);
                }
                match self.inner.local.last_sync_time() {
                    Ok(last) if last > 0 => SyncStatus::Synced {
                        seconds_ago: (unix_now() - last).max(0),
                    },
                    Ok(_) => SyncStatus::Ready,
                    Err(err) => SyncStatus::Error(err.to_string()),
                }
            }
        }
    }

    /// Starts the background sync loop; calling it again while running is
    /// a no-op.
    pub fn start_background_sync(&self) {
        let mut worker = self.inner.worker.lock();
        if worker.running {
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let interval = self.inner.settings.sync_interval();
        let inner = Arc::clone(&self.inner);

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if inner.client.is_online() {
                        if let Err(err) = inner.full_sync() {
                            warn!(%err, "background sync failed");
                        }
                    }
                }
                // Stop signal, or the store was dropped.
                _ => return,
            }
        });

        worker.running = true;
        worker.stop_tx = Some(stop_tx);
        worker.handle = Some(handle);
        info!(interval_secs = interval.as_secs(), "background sync started");
    }

    /// Stops the background sync loop and waits for the worker to exit.
    pub fn stop_background_sync(&self) {
        let mut worker = self.inner.worker.lock();
        if !worker.running {
            return;
        }
        worker.running = false;
        if let Some(tx) = worker.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = worker.handle.take() {
            let _ = handle.join();
        }
        info!("background sync stopped");
    }

    /// Fire-and-forget sync after a local mutation. The spawned cycle is
    /// deliberately not awaited; its outcome reaches the user only through
    /// the status line.
    fn maybe_sync_on_change(&self) {
        if !self.inner.settings.auto_sync_on_change {
            return;
        }
        if !self.inner.client.is_online() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            if let Err(err) = inner.full_sync() {
                debug!(%err, "sync-on-change failed");
            }
        });
    }
}

impl<C: HttpClient> Inner<C> {
    fn full_sync(&self) -> SyncResult<()> {
        self.syncing.store(true, Ordering::SeqCst);
        let result = self.full_sync_cycle();
        self.syncing.store(false, Ordering::SeqCst);

        match &result {
            Ok(()) => {
                *self.last_error.write() = None;
                debug!("full sync completed");
            }
            Err(err) => {
                *self.last_error.write() = Some(err.to_string());
                warn!(%err, "full sync failed");
            }
        }
        result
    }

    fn full_sync_cycle(&self) -> SyncResult<()> {
        let since = self.local.last_sync_time()?;

        // Pull failure aborts before any push: never push against a stale
        // view of the remote. Writes already applied from a completed pull
        // stay; reapplying the same payload converges.
        self.pull_changes(since)?;
        self.push_changes()?;

        self.local.set_last_sync_time(unix_now())?;
        Ok(())
    }

    fn pull_changes(&self, since: i64) -> SyncResult<()> {
        let resp = self.client.pull(since)?;
        debug!(
            tasks = resp.tasks.len(),
            lists = resp.lists.len(),
            since,
            "pulled remote changes"
        );

        for payload in &resp.tasks {
            match self.local.item_by_client_id(&payload.client_id) {
                Ok(mut task) => {
                    if conflict::remote_wins(payload.updated_at, task.date_added) {
                        conflict::apply_remote_fields(&mut task, payload);
                        self.local.update_item(&task)?;
                    }
                    // Otherwise the local task is newer (or tied) and wins
                    // silently.
                }
                Err(err) if err.is_not_found() => {
                    self.local.save_item(&conflict::task_from_payload(payload))?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        if !resp.lists.is_empty() {
            // Inbound list payloads are not merged; archived-list conflict
            // semantics across devices are still unresolved.
            debug!(count = resp.lists.len(), "skipping inbound list payloads");
        }

        Ok(())
    }

    fn push_changes(&self) -> SyncResult<()> {
        let tasks = self.local.items()?;
        let lists = self.local.todo_lists()?;
        self.client.push(&tasks, &lists)?;

        // Push sends full state, so every pending entry is covered.
        for change in self.local.pending_changes()? {
            self.local.mark_change_synced(change.id)?;
        }
        Ok(())
    }
}

impl<C: HttpClient + 'static> DataStore for SyncStore<C> {
    fn todo_lists(&self) -> StoreResult<Vec<TodoList>> {
        self.inner.local.todo_lists()
    }

    fn create_todo_list(&self, name: &str) -> StoreResult<i64> {
        let id = self.inner.local.create_todo_list(name)?;
        self.inner
            .local
            .log_change(EntityKind::List, id, ChangeKind::Create)?;
        self.maybe_sync_on_change();
        Ok(id)
    }

    fn update_todo_list_name(&self, id: i64, name: &str) -> StoreResult<()> {
        self.inner.local.update_todo_list_name(id, name)?;
        self.inner
            .local
            .log_change(EntityKind::List, id, ChangeKind::Update)?;
        self.maybe_sync_on_change();
        Ok(())
    }

    fn delete_todo_list(&self, id: i64) -> StoreResult<()> {
        self.inner.local.delete_todo_list(id)?;
        self.inner
            .local
            .log_change(EntityKind::List, id, ChangeKind::Delete)?;
        self.maybe_sync_on_change();
        Ok(())
    }

    fn archive_todo_list(&self, id: i64) -> StoreResult<()> {
        self.inner.local.archive_todo_list(id)?;
        self.inner
            .local
            .log_change(EntityKind::List, id, ChangeKind::Update)?;
        self.maybe_sync_on_change();
        Ok(())
    }

    fn unarchive_todo_list(&self, id: i64) -> StoreResult<()> {
        self.inner.local.unarchive_todo_list(id)?;
        self.inner
            .local
            .log_change(EntityKind::List, id, ChangeKind::Update)?;
        self.maybe_sync_on_change();
        Ok(())
    }

    fn items(&self) -> StoreResult<Vec<Task>> {
        self.inner.local.items()
    }

    fn item_by_id(&self, id: i64) -> StoreResult<Task> {
        self.inner.local.item_by_id(id)
    }

    fn item_by_client_id(&self, client_id: &str) -> StoreResult<Task> {
        self.inner.local.item_by_client_id(client_id)
    }

    fn save_item(&self, task: &Task) -> StoreResult<i64> {
        let id = self.inner.local.save_item(task)?;
        self.inner
            .local
            .log_change(EntityKind::Task, id, ChangeKind::Create)?;
        self.maybe_sync_on_change();
        Ok(id)
    }

    fn update_item(&self, task: &Task) -> StoreResult<()> {
        self.inner.local.update_item(task)?;
        self.inner
            .local
            .log_change(EntityKind::Task, task.id, ChangeKind::Update)?;
        self.maybe_sync_on_change();
        Ok(())
    }

    fn delete_item(&self, id: i64) -> StoreResult<()> {
        self.inner.local.delete_item(id)?;
        self.inner
            .local
            .log_change(EntityKind::Task, id, ChangeKind::Delete)?;
        self.maybe_sync_on_change();
        Ok(())
    }

    fn last_sync_time(&self) -> StoreResult<i64> {
        self.inner.local.last_sync_time()
    }

    fn set_last_sync_time(&self, timestamp: i64) -> StoreResult<()> {
        self.inner.local.set_last_sync_time(timestamp)
    }

    fn pending_changes(&self) -> StoreResult<Vec<Change>> {
        self.inner.local.pending_changes()
    }

    fn mark_change_synced(&self, change_id: i64) -> StoreResult<()> {
        self.inner.local.mark_change_synced(change_id)
    }

    fn log_change(&self, entity: EntityKind, entity_id: i64, kind: ChangeKind) -> StoreResult<()> {
        self.inner.local.log_change(entity, entity_id, kind)
    }
}
