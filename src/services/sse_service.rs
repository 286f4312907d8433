use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::kv_store::StorePath,
    dto::{
        sse::{Handshake, ServerEvent, SystemStatus},
        tournament::TournamentView,
    },
    error::ServiceError,
    services::{score_service, tournament_service},
    state::{SharedState, access::Role, sync::SyncSession},
};

/// Event name carrying the tournament record.
pub const TOURNAMENT_EVENT: &str = "tournament";
/// Event name carrying a match score card.
pub const SCORES_EVENT: &str = "scores";

/// Forward every value of a subscription as an SSE event named `event`.
fn forward(
    tx: mpsc::UnboundedSender<ServerEvent>,
    event: &'static str,
) -> impl Fn(&Value) + Send + Sync + 'static {
    move |value: &Value| {
        let payload = ServerEvent {
            event: Some(event.to_string()),
            data: value.to_string(),
        };
        // The receiver is gone once the client disconnected; teardown follows.
        let _ = tx.send(payload);
    }
}

/// Open a live feed of a tournament and, optionally, one of its match score cards.
///
/// The current snapshots are loaded from the store first so the client receives them
/// immediately, then every subsequent write is streamed until the client disconnects.
pub async fn open_tournament_stream(
    state: &SharedState,
    tournament_id: &str,
    match_id: Option<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + use<>>, ServiceError> {
    let tournament_id = tournament_service::normalize_id(tournament_id)?;
    let tournament = tournament_service::require_tournament(state, &tournament_id).await?;
    let card = match match_id {
        Some(match_id) => {
            let card = score_service::load_scores(state, &tournament_id, match_id).await?;
            Some((match_id, card))
        }
        None => None,
    };

    // Nothing below can fail, so every primed path gets its subscriber.
    let hub = state.sync().clone();
    if let Ok(view) = serde_json::to_value(TournamentView::for_role(&tournament, Role::Scorer)) {
        hub.prime(&StorePath::tournament(tournament_id.as_str()), view);
    }
    if let Some((match_id, card)) = card {
        if let Ok(value) = serde_json::to_value(&card) {
            hub.prime(&StorePath::scores(tournament_id.as_str(), match_id), value);
        }
    }

    let (tx, rx) = mpsc::unbounded_channel::<ServerEvent>();
    if let Ok(handshake) = ServerEvent::json(
        Some("handshake".to_string()),
        &Handshake {
            tournament_id: tournament_id.clone(),
            match_id,
            degraded: state.is_degraded(),
        },
    ) {
        let _ = tx.send(handshake);
    }

    let mut session = SyncSession::new(hub);
    session.watch_tournament(&tournament_id, forward(tx.clone(), TOURNAMENT_EVENT));
    if let Some(match_id) = match_id {
        session
            .open_match(match_id, forward(tx.clone(), SCORES_EVENT))
            .map_err(|err| ServiceError::InvalidState(err.to_string()))?;
    }
    info!(tournament_id = %tournament_id, match_id = ?match_id, "tournament stream opened");

    Ok(to_sse_stream(state, session, tx, rx, tournament_id))
}

/// Convert the session feed into an SSE response, forwarding events and tearing the
/// session down once the client disconnects.
fn to_sse_stream(
    state: &SharedState,
    mut session: SyncSession,
    status_tx: mpsc::UnboundedSender<ServerEvent>,
    mut receiver: mpsc::UnboundedReceiver<ServerEvent>,
    tournament_id: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);
    let mut degraded = state.degraded_watcher();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                changed = degraded.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let value = *degraded.borrow_and_update();
                    match ServerEvent::json(Some("system".to_string()), &SystemStatus { degraded: value }) {
                        Ok(event) => {
                            let _ = status_tx.send(event);
                        }
                        Err(err) => warn!(error = %err, "failed to encode system status"),
                    }
                }
                payload = receiver.recv() => {
                    let Some(payload) = payload else { break };
                    let mut event = Event::default().data(payload.data);
                    if let Some(name) = payload.event {
                        event = event.event(name);
                    }
                    if tx.send(Ok(event)).await.is_err() {
                        break;
                    }
                }
            }
        }

        session.reset();
        info!(tournament_id = %tournament_id, "tournament stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use serde_json::json;

    use crate::{dto::tournament::CreateTournamentRequest, state::testing::memory_state};

    async fn created(state: &SharedState) -> String {
        let request = CreateTournamentRequest {
            name: "Cup".to_string(),
            team_names: None,
        };
        tournament_service::create_tournament(state, request)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn unknown_tournament_or_match_is_refused() {
        let state = memory_state().await;
        assert!(matches!(
            open_tournament_stream(&state, "ZZZZZZ", None).await,
            Err(ServiceError::NotFound(_))
        ));

        let id = created(&state).await;
        assert!(matches!(
            open_tournament_stream(&state, &id, Some(Uuid::new_v4())).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn refused_stream_leaves_nothing_cached() {
        let state = memory_state().await;
        let id = created(&state).await;
        assert!(open_tournament_stream(&state, &id, Some(Uuid::new_v4())).await.is_err());

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let _sub = state.sync().subscribe(&StorePath::tournament(id.as_str()), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn subscriptions_end_with_the_client() {
        let state = memory_state().await;
        let id = created(&state).await;
        let path = StorePath::tournament(id.as_str());

        let stream = open_tournament_stream(&state, &id, None).await.unwrap();
        assert_eq!(state.sync().listener_count(&path), 1);

        drop(stream);
        for _ in 0..50 {
            if state.sync().listener_count(&path) == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(state.sync().listener_count(&path), 0);
    }

    #[test]
    fn forwarded_values_become_named_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let callback = forward(tx, SCORES_EVENT);
        callback(&json!({"holes": {}}));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("scores"));
        assert_eq!(event.data, r#"{"holes":{}}"#);
    }

    #[test]
    fn forwarding_after_disconnect_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        forward(tx, TOURNAMENT_EVENT)(&json!(1));
    }
}
