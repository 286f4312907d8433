/// Passcode-based roles.
pub mod access;
/// Courses, tees and holes.
pub mod course;
/// Match format catalog.
pub mod format;
/// Change feed between store writes and connected clients.
pub mod sync;
/// Tournament aggregate, matches and score cards.
pub mod tournament;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::kv_store::KvStore, error::ServiceError,
    services::oracle::CourseOracle,
};

use self::sync::SyncHub;

/// Handle on the application state shared by every request.
pub type SharedState = Arc<AppState>;

/// Central application state holding the store handle, the change feed and configuration.
pub struct AppState {
    store: RwLock<Option<Arc<dyn KvStore>>>,
    degraded: watch::Sender<bool>,
    sync: SyncHub,
    config: AppConfig,
    oracle: Option<Arc<dyn CourseOracle>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a store is installed.
    pub fn new(config: AppConfig, oracle: Option<Arc<dyn CourseOracle>>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            degraded: degraded_tx,
            sync: SyncHub::new(),
            config,
            oracle,
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn KvStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] while none is usable.
    pub async fn require_store(&self) -> Result<Arc<dyn KvStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn KvStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Whether store-backed operations are currently refused.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag, notifying watchers only when it changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Hub fanning store writes out to connected clients.
    pub fn sync(&self) -> &SyncHub {
        &self.sync
    }

    /// Loaded application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Course-data oracle, absent when no API credential is configured.
    pub fn oracle(&self) -> Option<Arc<dyn CourseOracle>> {
        self.oracle.clone()
    }
}
