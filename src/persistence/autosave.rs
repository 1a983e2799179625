//! Debounced background saving
//!
//! Every content change restarts a single timer. When the timer runs out
//! without another change, the latest snapshot is handed to the persistence
//! collaborator once. Failures are logged and dropped; the next change
//! simply schedules another attempt.

use crate::config::AutosaveConfig;
use crate::document::DocumentFields;
use crate::persistence::store::Persistence;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Whether a save is waiting on the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Pending,
}

/// Restartable one-shot save timer for a single document
pub struct AutosaveScheduler<P: Persistence> {
    persistence: Arc<P>,
    document_id: String,
    delay: Duration,
    enabled: bool,
    pending: Option<JoinHandle<()>>,
}

impl<P: Persistence> AutosaveScheduler<P> {
    pub fn new(persistence: Arc<P>, document_id: impl Into<String>, config: &AutosaveConfig) -> Self {
        Self {
            persistence,
            document_id: document_id.into(),
            delay: Duration::from_millis(config.delay_ms),
            enabled: config.enabled,
            pending: None,
        }
    }

    pub fn state(&self) -> AutosaveState {
        match &self.pending {
            Some(handle) if !handle.is_finished() => AutosaveState::Pending,
            _ => AutosaveState::Idle,
        }
    }

    /// Restart the timer with a new snapshot.
    ///
    /// A blank snapshot only cancels the pending timer.
    pub fn notify_change(&mut self, fields: DocumentFields) {
        if !self.enabled {
            return;
        }

        self.cancel();

        if fields.content.trim().is_empty() || fields.title.trim().is_empty() {
            log::debug!("Autosave skipped for {}: title or content is blank", self.document_id);
            return;
        }

        let persistence = Arc::clone(&self.persistence);
        let document_id = self.document_id.clone();
        let delay = self.delay;

        // Only the sleep is abortable; once it expires the save runs detached
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(async move {
                match persistence.save(&document_id, fields).await {
                    Ok(()) => log::info!("Autosaved document {}", document_id),
                    Err(e) => log::warn!("Autosave failed for {}: {}", document_id, e),
                }
            });
        }));
    }

    /// Stop the timer. A save that already started is left to finish.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<P: Persistence> Drop for AutosaveScheduler<P> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Tags;
    use crate::error::PersistenceResult;
    use crate::persistence::MemoryStore;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    /// Backend whose saves take five seconds
    #[derive(Default)]
    struct SlowStore {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl Persistence for SlowStore {
        fn save(
            &self,
            _document_id: &str,
            _fields: DocumentFields,
        ) -> impl Future<Output = PersistenceResult<()>> + Send {
            self.started.fetch_add(1, Ordering::SeqCst);
            async move {
                sleep(Duration::from_secs(5)).await;
                self.finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    fn fields(title: &str, content: &str) -> DocumentFields {
        DocumentFields::for_autosave(title, content, &Tags::new())
    }

    fn scheduler(store: &MemoryStore) -> AutosaveScheduler<MemoryStore> {
        AutosaveScheduler::new(Arc::new(store.clone()), "doc", &AutosaveConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_change_saves_after_delay() {
        let store = MemoryStore::new();
        let mut autosave = scheduler(&store);

        autosave.notify_change(fields("T", "hello"));
        assert_eq!(autosave.state(), AutosaveState::Pending);

        sleep(Duration::from_millis(29_000)).await;
        assert_eq!(store.save_count(), 0);

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(store.save_count(), 1);
        assert_eq!(autosave.state(), AutosaveState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_within_delay_save_once() {
        let store = MemoryStore::new();
        let mut autosave = scheduler(&store);

        autosave.notify_change(fields("T", "one"));
        sleep(Duration::from_secs(10)).await;
        autosave.notify_change(fields("T", "two"));

        // 30s after the first change, nothing yet
        sleep(Duration::from_secs(25)).await;
        assert_eq!(store.save_count(), 0);

        // 30s after the second change
        sleep(Duration::from_secs(6)).await;
        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "doc");
        assert_eq!(saves[0].1.content, "two");

        sleep(Duration::from_secs(120)).await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_content_cancels_pending() {
        let store = MemoryStore::new();
        let mut autosave = scheduler(&store);

        autosave.notify_change(fields("T", "draft"));
        autosave.notify_change(fields("T", ""));
        assert_eq!(autosave.state(), AutosaveState::Idle);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_title_is_not_saved() {
        let store = MemoryStore::new();
        let mut autosave = scheduler(&store);

        autosave.notify_change(fields("   ", "content"));
        sleep(Duration::from_secs(60)).await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let store = MemoryStore::new();
        {
            let mut autosave = scheduler(&store);
            autosave.notify_change(fields("T", "content"));
        }
        sleep(Duration::from_secs(60)).await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.reject_saves("offline");
        let mut autosave = scheduler(&store);

        autosave.notify_change(fields("T", "content"));
        sleep(Duration::from_secs(31)).await;
        assert_eq!(store.save_count(), 0);
        assert_eq!(autosave.state(), AutosaveState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_schedules() {
        let store = MemoryStore::new();
        let config = AutosaveConfig {
            enabled: false,
            ..AutosaveConfig::default()
        };
        let mut autosave = AutosaveScheduler::new(Arc::new(store.clone()), "doc", &config);

        autosave.notify_change(fields("T", "content"));
        assert_eq!(autosave.state(), AutosaveState::Idle);
        sleep(Duration::from_secs(60)).await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_running_save_lets_it_finish() {
        let store = Arc::new(SlowStore::default());
        let mut autosave = AutosaveScheduler::new(Arc::clone(&store), "doc", &AutosaveConfig::default());

        autosave.notify_change(fields("T", "one"));
        sleep(Duration::from_secs(31)).await;
        assert_eq!(store.started.load(Ordering::SeqCst), 1);
        assert_eq!(autosave.state(), AutosaveState::Idle);

        // The first save is still writing; a new edit restarts the timer only
        autosave.notify_change(fields("T", "two"));
        assert_eq!(autosave.state(), AutosaveState::Pending);
        sleep(Duration::from_secs(10)).await;
        assert_eq!(store.finished.load(Ordering::SeqCst), 1);
        assert_eq!(store.started.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(store.started.load(Ordering::SeqCst), 2);
        assert_eq!(store.finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_expiry_keeps_running_save() {
        let store = Arc::new(SlowStore::default());
        let mut autosave = AutosaveScheduler::new(Arc::clone(&store), "doc", &AutosaveConfig::default());

        autosave.notify_change(fields("T", "one"));
        sleep(Duration::from_secs(31)).await;
        autosave.cancel();
        drop(autosave);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(store.finished.load(Ordering::SeqCst), 1);
    }
}
