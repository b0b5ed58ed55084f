use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kartalla::simulation::{Inbox, LiveMessage, live};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    dto::{LiveUsageDto, SnapshotDto},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LiveBody {
    pub topic: String,
    pub payload: Value,
}

fn push(inbox: &Inbox, topic: &str, payload: &Value) -> Result<(), live::Error> {
    let route_id = live::route_id_from_topic(topic).inspect_err(|err| {
        warn!("Dropped live message: {err}");
    })?;
    let message = LiveMessage::from_json(&payload.to_string()).inspect_err(|err| {
        warn!("Dropped live message for route {route_id}: {err}");
    })?;
    inbox.push_live(route_id, &message)
}

/// Queues one vehicle position for the next tick.
pub async fn vehicle_position(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LiveBody>,
) -> Result<StatusCode, StatusCode> {
    if !state.is_live_enabled() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let inbox = state.inbox.read().await;
    push(&inbox, &body.topic, &body.payload).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(StatusCode::ACCEPTED)
}

/// Queues every position of a `{ topic: payload }` snapshot, the state of
/// the feed before streaming starts. Invalid entries are skipped.
pub async fn vehicle_snapshot(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<HashMap<String, Value>>,
) -> Result<Response, StatusCode> {
    if !state.is_live_enabled() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let inbox = state.inbox.read().await;
    let accepted = snapshot
        .iter()
        .filter(|(topic, payload)| push(&inbox, topic, payload).is_ok())
        .count();
    let rejected = snapshot.len() - accepted;
    info!("Queued a snapshot of {accepted} positions, {rejected} rejected");
    Ok(Json(SnapshotDto { accepted, rejected }).into_response())
}

/// Reads or sets whether live positions are used. `enabled=false` also
/// drops every cached position.
pub async fn live_usage(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    if let Some(enabled) = params.get("enabled") {
        let enabled = enabled.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
        state.set_live_enabled(enabled).await;
    }
    Ok(Json(LiveUsageDto {
        enabled: state.is_live_enabled(),
    })
    .into_response())
}
