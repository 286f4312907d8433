//! In-process change feed keyed by store path.
//!
//! Services publish every successful write to the [`SyncHub`]; each connected
//! client drives a [`SyncSession`] that keeps at most one tournament and one
//! score-card subscription alive at a time.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use dashmap::DashMap;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::dao::kv_store::StorePath;

/// Callback invoked with the full value stored at a path.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

struct ListenerEntry {
    active: Arc<AtomicBool>,
    callback: Listener,
}

#[derive(Default)]
struct HubInner {
    listeners: DashMap<String, IndexMap<u64, ListenerEntry>>,
    latest: DashMap<String, Value>,
    next_id: AtomicU64,
}

impl HubInner {
    /// Drop listener `id`; the cached value goes with the last listener of `key`.
    fn unregister(&self, key: &str, id: u64) {
        let now_empty = match self.listeners.get_mut(key) {
            Some(mut entries) => {
                entries.shift_remove(&id);
                entries.is_empty()
            }
            None => false,
        };
        if now_empty && self.listeners.remove_if(key, |_, entries| entries.is_empty()).is_some() {
            self.latest.remove(key);
        }
    }
}

/// Registry of listeners per store path.
///
/// The last value of a path is cached only while someone listens to it.
#[derive(Clone, Default)]
pub struct SyncHub {
    inner: Arc<HubInner>,
}

impl SyncHub {
    /// Empty hub with no listeners and nothing cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `path`. The cached value, if any, is delivered right away.
    pub fn subscribe<F>(&self, path: &StorePath, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let key = path.to_string();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let callback: Listener = Arc::new(callback);

        self.inner.listeners.entry(key.clone()).or_default().insert(
            id,
            ListenerEntry {
                active: active.clone(),
                callback: callback.clone(),
            },
        );
        debug!(path = %key, listener = id, "sync subscription opened");

        let cached = self.inner.latest.get(&key).map(|value| value.value().clone());
        if let Some(value) = cached {
            callback(&value);
        }

        Subscription {
            hub: self.inner.clone(),
            key,
            id,
            active,
        }
    }

    /// Hand `value` to every listener of `path` and cache it for later subscribers.
    ///
    /// Paths nobody listens to are not cached. Returns how many listeners were called.
    pub fn publish(&self, path: &StorePath, value: Value) -> usize {
        let key = path.to_string();

        // Callbacks run after the registry guard is released so they may subscribe.
        let targets = match self.inner.listeners.get(&key) {
            Some(entries) => {
                self.inner.latest.insert(key.clone(), value.clone());
                entries
                    .values()
                    .map(|entry| (entry.active.clone(), entry.callback.clone()))
                    .collect::<Vec<_>>()
            }
            None => Vec::new(),
        };

        let mut delivered = 0;
        for (active, callback) in targets {
            if active.load(Ordering::Acquire) {
                callback(&value);
                delivered += 1;
            }
        }
        delivered
    }

    /// Replace the cached value of `path` with a snapshot read from the store.
    ///
    /// Meant to be followed by [`SyncHub::subscribe`]; the snapshot is dropped with the
    /// last listener like any published value.
    pub fn prime(&self, path: &StorePath, value: Value) {
        self.inner.latest.insert(path.to_string(), value);
    }

    /// Listeners currently registered for `path`.
    pub fn listener_count(&self, path: &StorePath) -> usize {
        self.inner
            .listeners
            .get(&path.to_string())
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

/// Handle on a registered listener. Dropping it unsubscribes.
pub struct Subscription {
    hub: Arc<HubInner>,
    key: String,
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Unregister the listener. Returns `false` if it was already disposed.
    pub fn dispose(&self) -> bool {
        if !self.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.hub.unregister(&self.key, self.id);
        debug!(path = %self.key, listener = self.id, "sync subscription closed");
        true
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Store path the listener follows.
    pub fn path(&self) -> &str {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Misuse of a [`SyncSession`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    /// A match feed was requested before any tournament.
    #[error("no tournament is being watched")]
    NoTournament,
}

/// What a [`SyncSession`] is currently following.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing followed.
    Idle,
    /// Tournament record only.
    Tournament {
        /// Tournament id.
        id: String,
    },
    /// Tournament record plus one match score card.
    Match {
        /// Tournament id.
        id: String,
        /// Match whose score card is followed.
        match_id: Uuid,
    },
}

/// Per-client view onto the hub: one tournament, optionally one of its matches.
pub struct SyncSession {
    hub: SyncHub,
    tournament: Option<(String, Subscription)>,
    scores: Option<(Uuid, Subscription)>,
}

impl SyncSession {
    /// Idle session on `hub`.
    pub fn new(hub: SyncHub) -> Self {
        Self {
            hub,
            tournament: None,
            scores: None,
        }
    }

    /// What the session currently follows.
    pub fn phase(&self) -> SyncPhase {
        match (&self.tournament, &self.scores) {
            (None, _) => SyncPhase::Idle,
            (Some((id, _)), None) => SyncPhase::Tournament { id: id.clone() },
            (Some((id, _)), Some((match_id, _))) => SyncPhase::Match {
                id: id.clone(),
                match_id: *match_id,
            },
        }
    }

    /// Follow tournament `id`, dropping whatever was followed before.
    pub fn watch_tournament<F>(&mut self, id: &str, callback: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.reset();
        let subscription = self.hub.subscribe(&StorePath::tournament(id), callback);
        self.tournament = Some((id.to_string(), subscription));
    }

    /// Follow the score card of `match_id`, replacing the previous match feed.
    pub fn open_match<F>(&mut self, match_id: Uuid, callback: F) -> Result<(), SyncError>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let tournament_id = match &self.tournament {
            Some((id, _)) => id.clone(),
            None => return Err(SyncError::NoTournament),
        };
        self.close_match();
        let path = StorePath::scores(tournament_id, match_id);
        let subscription = self.hub.subscribe(&path, callback);
        self.scores = Some((match_id, subscription));
        Ok(())
    }

    /// Stop following the current match, keeping the tournament feed.
    pub fn close_match(&mut self) {
        if let Some((_, subscription)) = self.scores.take() {
            subscription.dispose();
        }
    }

    /// Tear down every subscription and return to [`SyncPhase::Idle`].
    pub fn reset(&mut self) {
        self.close_match();
        if let Some((_, subscription)) = self.tournament.take() {
            subscription.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<Value>>>, impl Fn(&Value) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value: &Value| {
            sink.lock().unwrap().push(value.clone())
        })
    }

    #[test]
    fn publish_reaches_listeners_of_the_same_path_only() {
        let hub = SyncHub::new();
        let (seen, callback) = recorder();
        let _sub = hub.subscribe(&StorePath::tournament("AAAAAA"), callback);

        assert_eq!(hub.publish(&StorePath::tournament("AAAAAA"), json!(1)), 1);
        assert_eq!(hub.publish(&StorePath::tournament("BBBBBB"), json!(2)), 0);
        assert_eq!(*seen.lock().unwrap(), vec![json!(1)]);
    }

    #[test]
    fn late_subscriber_receives_cached_value() {
        let hub = SyncHub::new();
        let path = StorePath::tournament("AAAAAA");
        let _first = hub.subscribe(&path, |_| {});
        hub.publish(&path, json!({"name": "cup"}));

        let (seen, callback) = recorder();
        let _second = hub.subscribe(&path, callback);
        assert_eq!(*seen.lock().unwrap(), vec![json!({"name": "cup"})]);
    }

    #[test]
    fn unwatched_paths_are_not_cached() {
        let hub = SyncHub::new();
        let path = StorePath::scores("AAAAAA", Uuid::new_v4());
        assert_eq!(hub.publish(&path, json!({"holes": {}})), 0);

        let (seen, callback) = recorder();
        let _sub = hub.subscribe(&path, callback);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn cache_is_dropped_with_the_last_listener() {
        let hub = SyncHub::new();
        let path = StorePath::tournament("AAAAAA");
        let first = hub.subscribe(&path, |_| {});
        let second = hub.subscribe(&path, |_| {});
        hub.publish(&path, json!(1));

        drop(first);
        let (seen, callback) = recorder();
        let third = hub.subscribe(&path, callback);
        assert_eq!(*seen.lock().unwrap(), vec![json!(1)]);

        drop(second);
        drop(third);
        let (seen, callback) = recorder();
        let _fourth = hub.subscribe(&path, callback);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn prime_replaces_an_out_of_order_publish() {
        let hub = SyncHub::new();
        let path = StorePath::tournament("AAAAAA");
        let _watcher = hub.subscribe(&path, |_| {});
        hub.publish(&path, json!("v2"));
        hub.publish(&path, json!("v1"));
        hub.prime(&path, json!("v2"));

        let (seen, callback) = recorder();
        let _sub = hub.subscribe(&path, callback);
        assert_eq!(*seen.lock().unwrap(), vec![json!("v2")]);
    }

    #[test]
    fn dispose_runs_once_and_drop_after_dispose_is_harmless() {
        let hub = SyncHub::new();
        let path = StorePath::tournament("AAAAAA");
        let (seen, callback) = recorder();
        let sub = hub.subscribe(&path, callback);

        assert!(sub.dispose());
        assert!(!sub.dispose());
        assert!(!sub.is_active());
        drop(sub);

        assert_eq!(hub.listener_count(&path), 0);
        hub.publish(&path, json!(1));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn open_match_requires_a_tournament() {
        let mut session = SyncSession::new(SyncHub::new());
        let result = session.open_match(Uuid::new_v4(), |_| {});
        assert_eq!(result, Err(SyncError::NoTournament));
        assert_eq!(session.phase(), SyncPhase::Idle);
    }

    #[test]
    fn switching_match_tears_down_previous_feed() {
        let hub = SyncHub::new();
        let mut session = SyncSession::new(hub.clone());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let first_path = StorePath::scores("AAAAAA", first);
        let second_path = StorePath::scores("AAAAAA", second);

        session.watch_tournament("AAAAAA", |_| {});
        let (old_seen, old_callback) = recorder();
        session.open_match(first, old_callback).unwrap();
        hub.publish(&first_path, json!("before"));

        let (new_seen, new_callback) = recorder();
        session.open_match(second, new_callback).unwrap();

        assert_eq!(hub.listener_count(&first_path), 0);
        assert_eq!(hub.listener_count(&second_path), 1);

        hub.publish(&first_path, json!("after"));
        hub.publish(&second_path, json!("other"));

        assert_eq!(*old_seen.lock().unwrap(), vec![json!("before")]);
        assert_eq!(*new_seen.lock().unwrap(), vec![json!("other")]);
        assert_eq!(
            session.phase(),
            SyncPhase::Match {
                id: "AAAAAA".to_string(),
                match_id: second
            }
        );
    }

    #[test]
    fn watching_another_tournament_drops_everything() {
        let hub = SyncHub::new();
        let mut session = SyncSession::new(hub.clone());
        let match_id = Uuid::new_v4();

        session.watch_tournament("AAAAAA", |_| {});
        session.open_match(match_id, |_| {}).unwrap();
        session.watch_tournament("BBBBBB", |_| {});

        assert_eq!(hub.listener_count(&StorePath::tournament("AAAAAA")), 0);
        assert_eq!(hub.listener_count(&StorePath::scores("AAAAAA", match_id)), 0);
        assert_eq!(hub.listener_count(&StorePath::tournament("BBBBBB")), 1);
        assert_eq!(
            session.phase(),
            SyncPhase::Tournament {
                id: "BBBBBB".to_string()
            }
        );
    }

    #[test]
    fn dropping_session_unsubscribes() {
        let hub = SyncHub::new();
        let match_id = Uuid::new_v4();
        {
            let mut session = SyncSession::new(hub.clone());
            session.watch_tournament("AAAAAA", |_| {});
            session.open_match(match_id, |_| {}).unwrap();
            assert_eq!(hub.listener_count(&StorePath::tournament("AAAAAA")), 1);
        }
        assert_eq!(hub.listener_count(&StorePath::tournament("AAAAAA")), 0);
        assert_eq!(hub.listener_count(&StorePath::scores("AAAAAA", match_id)), 0);
    }
}
