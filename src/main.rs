//! Links Cup Back binary entrypoint wiring REST, SSE, the course oracle and the store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use links_cup_back::{
    config::AppConfig,
    dao::kv_store::{KvStore, memory::MemoryStore},
    routes,
    services::oracle::{AnthropicOracle, CourseOracle},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let oracle = match AnthropicOracle::from_config(config.course_search()) {
        Ok(oracle) => Some(Arc::new(oracle) as Arc<dyn CourseOracle>),
        Err(err) => {
            warn!(error = %err, "course search disabled");
            None
        }
    };

    let app_state = AppState::new(config, oracle);
    install_store(&app_state).await?;

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Supervise CouchDB when it is configured, otherwise keep everything in memory.
#[cfg(feature = "couch-store")]
async fn install_store(state: &SharedState) -> anyhow::Result<()> {
    use links_cup_back::{
        dao::{
            kv_store::couchdb::{CouchConfig, CouchKvStore},
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let Some(couch) = CouchConfig::from_env().context("reading CouchDB settings")? else {
        return install_memory_store(state).await;
    };

    info!(base_url = %couch.base_url, database = %couch.database, "using CouchDB store");
    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let couch = couch.clone();
        async move {
            CouchKvStore::connect(couch)
                .await
                .map(|store| Arc::new(store) as Arc<dyn KvStore>)
                .map_err(StorageError::from)
        }
    }));
    Ok(())
}

#[cfg(not(feature = "couch-store"))]
async fn install_store(state: &SharedState) -> anyhow::Result<()> {
    install_memory_store(state).await
}

async fn install_memory_store(state: &SharedState) -> anyhow::Result<()> {
    warn!("no remote store configured; tournaments live in memory only");
    state.set_store(Arc::new(MemoryStore::new())).await;
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
