//! Config change watcher: listener registry and per-identity poll loops
//!
//! Each watched [`ConfigKey`] gets one background task. The task sleeps a
//! jittered interval, fetches the current content, compares its md5
//! fingerprint against the last observed one, and invokes the registered
//! listeners on a real change. Registration seeds the fingerprint with a
//! synchronous fetch, so the initial content never counts as a change.
//!
//! A failed poll is logged and skipped; the loop and its listeners survive.
//! Removing the last listener of a key cancels its loop at the next sleep
//! point, and no listener is invoked after cancellation completes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use md5::{Digest, Md5};
use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::model::ConfigKey;

/// Compute the md5 fingerprint of config content, as the server does.
pub(crate) fn compute_md5(content: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(content.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Content plus its fingerprint, the unit of change detection.
#[derive(Clone, Debug)]
pub(crate) struct ConfigSnapshot {
    pub content: String,
    pub md5: String,
}

impl ConfigSnapshot {
    pub fn new(content: String) -> Self {
        let md5 = compute_md5(&content);
        Self { content, md5 }
    }
}

/// Fetches the current snapshot of a config. The client supplies an
/// HTTP-backed implementation; tests supply scripted ones.
#[async_trait]
pub(crate) trait ConfigFetcher: Send + Sync + 'static {
    /// `Ok(None)` means the config does not exist (deleted or never
    /// published); the watcher treats that as "no change".
    async fn fetch(&self, key: &ConfigKey) -> Result<Option<ConfigSnapshot>>;
}

/// A config change delivered to listeners.
#[derive(Clone, Debug)]
pub struct ConfigChangeEvent {
    pub key: ConfigKey,
    /// The new content.
    pub content: String,
    /// The previously observed content, for diffing by the caller.
    pub previous: Option<String>,
}

/// Trait for receiving config change notifications.
///
/// A listener is never invoked concurrently with itself for the same key:
/// the key's single poll task calls listeners one after another.
pub trait ConfigChangeListener: Send + Sync + 'static {
    fn on_change(&self, event: ConfigChangeEvent);
}

/// A listener that invokes a closure.
pub struct FnConfigChangeListener<F>
where
    F: Fn(ConfigChangeEvent) + Send + Sync + 'static,
{
    f: F,
}

impl<F> FnConfigChangeListener<F>
where
    F: Fn(ConfigChangeEvent) + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ConfigChangeListener for FnConfigChangeListener<F>
where
    F: Fn(ConfigChangeEvent) + Send + Sync + 'static,
{
    fn on_change(&self, event: ConfigChangeEvent) {
        (self.f)(event);
    }
}

/// Opaque handle identifying one registration; removal goes through the
/// handle, never through listener identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

struct WatchEntry {
    listeners: Vec<(u64, Arc<dyn ConfigChangeListener>)>,
    stop: watch::Sender<bool>,
}

struct WatcherInner {
    fetcher: Arc<dyn ConfigFetcher>,
    interval: Duration,
    jitter: Duration,
    entries: DashMap<ConfigKey, WatchEntry>,
    handles: DashMap<u64, ConfigKey>,
    next_handle: AtomicU64,
    closed: AtomicBool,
}

impl WatcherInner {
    /// One poll interval with bounded random jitter in either direction.
    fn jittered_interval(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.interval;
        }
        let jitter_ms = self.jitter.as_millis() as i64;
        let offset = rand::rng().random_range(-jitter_ms..=jitter_ms);
        let base = self.interval.as_millis() as i64;
        Duration::from_millis((base + offset).max(1) as u64)
    }
}

/// Registry of config listeners and their poll loops.
pub struct ConfigWatcher {
    inner: Arc<WatcherInner>,
}

impl ConfigWatcher {
    pub(crate) fn new(fetcher: Arc<dyn ConfigFetcher>, interval: Duration, jitter: Duration) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                fetcher,
                interval,
                jitter,
                entries: DashMap::new(),
                handles: DashMap::new(),
                next_handle: AtomicU64::new(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Register a listener for a config key. The first listener of a key
    /// fetches the current snapshot synchronously (so only later changes
    /// are reported) and starts the key's poll loop.
    pub async fn subscribe(
        &self,
        key: ConfigKey,
        listener: Arc<dyn ConfigChangeListener>,
    ) -> Result<ListenerHandle> {
        let inner = &self.inner;
        if inner.closed.load(Ordering::Acquire) {
            return Err(ClientError::Closed);
        }

        let id = inner.next_handle.fetch_add(1, Ordering::Relaxed);

        if let Some(mut entry) = inner.entries.get_mut(&key) {
            entry.listeners.push((id, listener));
            inner.handles.insert(id, key);
            return Ok(ListenerHandle(id));
        }

        // First listener for this key: seed the fingerprint before
        // registering, outside of any map lock.
        let seed = inner.fetcher.fetch(&key).await?;

        match inner.entries.entry(key.clone()) {
            dashmap::Entry::Occupied(mut occupied) => {
                // A concurrent subscribe won the race and started the loop.
                occupied.get_mut().listeners.push((id, listener));
            }
            dashmap::Entry::Vacant(vacant) => {
                let (stop_tx, stop_rx) = watch::channel(false);
                vacant.insert(WatchEntry {
                    listeners: vec![(id, listener)],
                    stop: stop_tx,
                });
                debug!("starting poll loop for {}", key);
                tokio::spawn(poll_loop(inner.clone(), key.clone(), seed, stop_rx));
            }
        }
        inner.handles.insert(id, key);
        Ok(ListenerHandle(id))
    }

    /// Remove one registration. When the last listener of a key is removed,
    /// the key's poll loop is cancelled.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        let Some((_, key)) = self.inner.handles.remove(&handle.0) else {
            return false;
        };

        if let Some(mut entry) = self.inner.entries.get_mut(&key) {
            entry.listeners.retain(|(id, _)| *id != handle.0);
        }
        // Emptiness is re-checked under the entry lock: a concurrent
        // subscribe may have added a listener since the retain above, and
        // its registration must not be torn down.
        if let Some((_, entry)) = self
            .inner
            .entries
            .remove_if(&key, |_, e| e.listeners.is_empty())
        {
            debug!("stopping poll loop for {}", key);
            let _ = entry.stop.send(true);
        }
        true
    }

    /// Number of listeners currently registered for a key.
    pub fn listener_count(&self, key: &ConfigKey) -> usize {
        self.inner
            .entries
            .get(key)
            .map(|e| e.listeners.len())
            .unwrap_or(0)
    }

    /// Cancel every poll loop and reject further subscriptions.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let keys: Vec<ConfigKey> = self.inner.entries.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, entry)) = self.inner.entries.remove(&key) {
                let _ = entry.stop.send(true);
            }
        }
        self.inner.handles.clear();
    }
}

async fn poll_loop(
    inner: Arc<WatcherInner>,
    key: ConfigKey,
    mut last: Option<ConfigSnapshot>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        let sleep_for = inner.jittered_interval();
        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = stop.changed() => {
                debug!("poll loop for {} cancelled", key);
                return;
            }
        }

        let snapshot = match inner.fetcher.fetch(&key).await {
            Ok(Some(snapshot)) => snapshot,
            // Deleted or never published: not a change, keep polling.
            Ok(None) => continue,
            Err(e) => {
                // One failed poll never cancels the loop or drops
                // listeners; the next tick retries.
                warn!("poll for {} failed, skipping this round: {}", key, e);
                continue;
            }
        };

        // Cancellation may have happened during the fetch; no listener may
        // run after that.
        if *stop.borrow() {
            return;
        }

        let changed = last.as_ref().map(|l| l.md5 != snapshot.md5).unwrap_or(true);
        if changed {
            let previous = last.map(|l| l.content);
            // Clone the listener set out of the map; the lock is never held
            // while listeners run.
            let listeners: Vec<Arc<dyn ConfigChangeListener>> = inner
                .entries
                .get(&key)
                .map(|e| e.listeners.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default();
            let event = ConfigChangeEvent {
                key: key.clone(),
                content: snapshot.content.clone(),
                previous,
            };
            debug!("config {} changed, notifying {} listeners", key, listeners.len());
            for listener in listeners {
                listener.on_change(event.clone());
            }
        }
        last = Some(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    struct ScriptedFetcher {
        content: Mutex<Option<String>>,
        failing: AtomicBool,
        fetches: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(content: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                content: Mutex::new(content.map(str::to_string)),
                failing: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
            })
        }

        fn set_content(&self, content: Option<&str>) {
            *self.content.lock().unwrap() = content.map(str::to_string);
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ConfigFetcher for ScriptedFetcher {
        async fn fetch(&self, _key: &ConfigKey) -> Result<Option<ConfigSnapshot>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ClientError::Server {
                    endpoint: "/v1/cs/configs".to_string(),
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }
            Ok(self
                .content
                .lock()
                .unwrap()
                .clone()
                .map(ConfigSnapshot::new))
        }
    }

    struct Recorder {
        events: Mutex<Vec<ConfigChangeEvent>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn contents(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.content.clone())
                .collect()
        }
    }

    impl ConfigChangeListener for Recorder {
        fn on_change(&self, event: ConfigChangeEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn watcher(fetcher: Arc<ScriptedFetcher>) -> ConfigWatcher {
        ConfigWatcher::new(fetcher, Duration::from_millis(20), Duration::from_millis(5))
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    #[tokio::test]
    async fn test_initial_content_is_not_a_change() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let recorder = Recorder::new();
        w.subscribe(ConfigKey::new("app.properties"), recorder.clone())
            .await
            .unwrap();

        settle().await;
        assert!(recorder.contents().is_empty());
    }

    #[tokio::test]
    async fn test_change_invokes_listener_with_new_content() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let recorder = Recorder::new();
        w.subscribe(ConfigKey::new("app.properties"), recorder.clone())
            .await
            .unwrap();

        fetcher.set_content(Some("B"));
        settle().await;

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1, "listener invoked exactly once");
        assert_eq!(events[0].content, "B");
        assert_eq!(events[0].previous.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_invocations() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let recorder = Recorder::new();
        let key = ConfigKey::new("app.properties");
        let handle = w.subscribe(key.clone(), recorder.clone()).await.unwrap();

        assert!(w.unsubscribe(handle));
        assert_eq!(w.listener_count(&key), 0);

        fetcher.set_content(Some("B"));
        fetcher.set_content(Some("C"));
        settle().await;
        assert!(recorder.contents().is_empty());

        // A handle can only be removed once.
        assert!(!w.unsubscribe(handle));
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_listeners_and_polling() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let recorder = Recorder::new();
        let key = ConfigKey::new("app.properties");
        w.subscribe(key.clone(), recorder.clone()).await.unwrap();

        fetcher.set_failing(true);
        settle().await;
        assert_eq!(w.listener_count(&key), 1);
        assert!(recorder.contents().is_empty());

        fetcher.set_failing(false);
        fetcher.set_content(Some("B"));
        settle().await;
        assert_eq!(recorder.contents(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_deleted_config_is_no_change() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let recorder = Recorder::new();
        w.subscribe(ConfigKey::new("app.properties"), recorder.clone())
            .await
            .unwrap();

        fetcher.set_content(None);
        settle().await;
        assert!(recorder.contents().is_empty());

        // Reappearing with the same content is still not a change.
        fetcher.set_content(Some("A"));
        settle().await;
        assert!(recorder.contents().is_empty());

        fetcher.set_content(Some("B"));
        settle().await;
        assert_eq!(recorder.contents(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_two_listeners_share_one_loop() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let first = Recorder::new();
        let second = Recorder::new();
        let key = ConfigKey::new("app.properties");

        let h1 = w.subscribe(key.clone(), first.clone()).await.unwrap();
        let h2 = w.subscribe(key.clone(), second.clone()).await.unwrap();
        assert_ne!(h1, h2);
        assert_eq!(w.listener_count(&key), 2);

        fetcher.set_content(Some("B"));
        settle().await;
        assert_eq!(first.contents(), vec!["B"]);
        assert_eq!(second.contents(), vec!["B"]);

        // Removing one listener keeps the loop alive for the other.
        w.unsubscribe(h1);
        fetcher.set_content(Some("C"));
        settle().await;
        assert_eq!(first.contents(), vec!["B"]);
        assert_eq!(second.contents(), vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_resubscribe_right_after_last_unsubscribe() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let key = ConfigKey::new("app.properties");
        let first = Recorder::new();
        let h1 = w.subscribe(key.clone(), first.clone()).await.unwrap();

        // Removing the last listener and registering a new one back to back
        // must leave exactly the new registration live and polling.
        assert!(w.unsubscribe(h1));
        let second = Recorder::new();
        let h2 = w.subscribe(key.clone(), second.clone()).await.unwrap();
        assert_eq!(w.listener_count(&key), 1);

        fetcher.set_content(Some("B"));
        settle().await;
        assert!(first.contents().is_empty());
        assert_eq!(second.contents(), vec!["B"]);
        assert!(w.unsubscribe(h2));
    }

    #[tokio::test]
    async fn test_subscribe_fails_when_seed_fetch_fails() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        fetcher.set_failing(true);
        let w = watcher(fetcher.clone());
        let recorder = Recorder::new();
        let key = ConfigKey::new("app.properties");

        assert!(w.subscribe(key.clone(), recorder).await.is_err());
        assert_eq!(w.listener_count(&key), 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_everything() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let recorder = Recorder::new();
        w.subscribe(ConfigKey::new("app.properties"), recorder.clone())
            .await
            .unwrap();

        w.shutdown();
        fetcher.set_content(Some("B"));
        settle().await;
        assert!(recorder.contents().is_empty());

        let err = w
            .subscribe(ConfigKey::new("other"), recorder.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Closed));
    }

    #[tokio::test]
    async fn test_closure_listener() {
        let fetcher = ScriptedFetcher::new(Some("A"));
        let w = watcher(fetcher.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let listener = Arc::new(FnConfigChangeListener::new(move |event: ConfigChangeEvent| {
            seen_clone.lock().unwrap().push(event.content);
        }));

        w.subscribe(ConfigKey::new("app.properties"), listener)
            .await
            .unwrap();
        fetcher.set_content(Some("B"));
        settle().await;
        assert_eq!(*seen.lock().unwrap(), vec!["B"]);
    }

    #[test]
    fn test_compute_md5() {
        assert_eq!(compute_md5("hello world"), "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(compute_md5(""), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
