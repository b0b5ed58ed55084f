use std::{collections::HashMap, str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kartalla::simulation::Viewport;

use crate::{dto::SubscriptionDto, state::AppState};

fn param<T: FromStr>(params: &HashMap<String, String>, name: &str) -> Result<T, StatusCode> {
    params
        .get(name)
        .and_then(|value| value.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)
}

/// Recomputes the live subscription filters for a new viewport.
pub async fn subscriptions(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let viewport = Viewport {
        zoom: param(&params, "zoom")?,
        south: param(&params, "south")?,
        west: param(&params, "west")?,
        north: param(&params, "north")?,
        east: param(&params, "east")?,
    };
    let change = state.subscriptions.lock().await.update(&viewport);
    Ok(Json(SubscriptionDto::from(change)).into_response())
}
