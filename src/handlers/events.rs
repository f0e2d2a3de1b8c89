use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::identity::Role;
use crate::services::notify::Audience;
use crate::state::AppState;

// GET /api/events
#[derive(Deserialize)]
pub struct EventsQuery {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Identity via query params (EventSource can't set headers)
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::Unauthorized)?
        .to_string();
    let role = query
        .role
        .as_deref()
        .and_then(Role::try_parse)
        .ok_or(AppError::Unauthorized)?;

    let rx = state.events_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(envelope) => {
            let wanted = match &envelope.audience {
                Audience::Providers => role == Role::Provider,
                Audience::User(id) => *id == user_id,
            };
            if !wanted {
                return None;
            }
            let data = serde_json::to_string(&envelope.event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("notification")))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(
            30,
        ))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let merged = StreamExt::merge(live_stream, keepalive_stream);

    Ok(Sse::new(merged))
}
