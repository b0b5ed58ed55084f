use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

pub async fn positions(State(state): State<Arc<AppState>>) -> Response {
    let report = state.report.read().await.clone();
    Json(report.as_ref()).into_response()
}
