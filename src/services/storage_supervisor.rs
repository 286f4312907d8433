use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{kv_store::KvStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

fn backoff(delay: Duration) -> Duration {
    (delay * 2).min(MAX_DELAY)
}

/// Try to revive a store whose health check failed.
///
/// Enters degraded mode after the first failed attempt; returns whether the store recovered.
async fn recover(state: &SharedState, store: &Arc<dyn KvStore>) -> bool {
    let mut delay = INITIAL_DELAY;
    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(backend = store.backend(), attempt, "storage reconnected");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(backend = store.backend(), error = %err, "storage reconnect failed; entering degraded mode");
                    state.update_degraded(true);
                } else {
                    warn!(backend = store.backend(), attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(delay).await;
                delay = backoff(delay);
            }
        }
    }
    false
}

/// Poll a connected store until it cannot be revived.
async fn watch_store(state: &SharedState, store: Arc<dyn KvStore>) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!(backend = store.backend(), "storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
            }
            Err(err) => {
                warn!(backend = store.backend(), error = %err, "storage health check failed");
                if !recover(state, &store).await {
                    warn!(backend = store.backend(), "exhausted storage reconnect attempts; staying in degraded mode");
                    return;
                }
                state.update_degraded(false);
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Connect to the storage backend and keep the shared state in degraded mode while it is unavailable.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn KvStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_store(store.clone()).await;
                info!(backend = store.backend(), "storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;
                watch_store(&state, store).await;
            }
            Err(err) => warn!(error = %err, "storage connection attempt failed"),
        }
        sleep(delay).await;
        delay = backoff(delay);
    }
}
