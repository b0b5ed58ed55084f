use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Local;
use futures_util::StreamExt;
use kartalla::timetable::Timetable;
use reqwest::header::ACCEPT_ENCODING;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{error, info};

use crate::{api::parse_start, dto::DatasetDto, state::AppState};

pub async fn dataset(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let path = state.dataset_path.read().await.display().to_string();
    let simulation = state.simulation.lock().await;
    Ok(Json(DatasetDto::from(path, simulation.timetable())).into_response())
}

/// Loads a new payload and restarts the simulation on it.
///
/// `path` names the payload file, defaulting to the current one. With `url`
/// set the payload is downloaded to that path first. `start` restarts at a
/// given simulated time instead of the local time.
pub async fn reload(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let path = match params.get("path") {
        Some(path) => PathBuf::from(path),
        None => state.dataset_path.read().await.clone(),
    };
    let sim_start = match params.get("start") {
        Some(start) => parse_start(start).ok_or(StatusCode::BAD_REQUEST)?,
        None => Local::now().naive_local(),
    };
    if let Some(url) = params.get("url") {
        download(url, &path).await?;
    }

    info!("Loading timetable from {}...", path.display());
    let now = Instant::now();
    let timetable = Timetable::from_path(&path).map_err(|err| {
        error!("Failed to load timetable: {err}");
        StatusCode::UNPROCESSABLE_ENTITY
    })?;
    info!("Loading timetable took {:?}", now.elapsed());

    let mut dto = DatasetDto::from(path.display().to_string(), &timetable);
    *state.dataset_path.write().await = path;
    dto.unsubscribe = state.restart(timetable, sim_start).await;
    Ok(Json(dto).into_response())
}

async fn download(url: &str, path: &Path) -> Result<(), StatusCode> {
    let response = reqwest::Client::new()
        .get(url)
        .header(ACCEPT_ENCODING, "gzip, deflate")
        .send()
        .await
        .map_err(|err| {
            error!("Failed to fetch: {err}");
            StatusCode::BAD_REQUEST
        })?;

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Response is not success: {body}");
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut file = File::create(path).await.map_err(|err| {
        error!("Failed to create file: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let data = chunk.map_err(|err| {
            error!("Failed to fetch chunk: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        file.write_all(&data).await.map_err(|err| {
            error!("Failed to write to file: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    }
    file.flush().await.map_err(|err| {
        error!("Failed to flush file: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
