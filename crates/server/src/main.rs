mod api;
mod dto;
mod state;
mod tasks;

use crate::state::AppState;
use axum::routing::{get, post};
use chrono::Local;
use kartalla::{simulation::Config, timetable::Timetable};
use std::{sync::Arc, time::Instant};
use tracing::{error, info};

const PORT: u32 = 3000;

fn load_config(path: &str) -> Result<Config, String> {
    let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&text).map_err(|err| err.to_string())
}

fn exit_with(message: String) -> ! {
    error!("{message}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let args: Vec<_> = std::env::args().collect();
    if args.len() < 2 {
        exit_with("Usage: kartalla-server <payload.json> [YYYYMMDDTHHMMSS] [config.json]".into());
    }
    let path = std::path::PathBuf::from(&args[1]);
    let sim_start = match args.get(2) {
        Some(start) => api::parse_start(start)
            .unwrap_or_else(|| exit_with(format!("Invalid start time {start:?}"))),
        None => Local::now().naive_local(),
    };
    let config = match args.get(3) {
        Some(config) => load_config(config)
            .unwrap_or_else(|err| exit_with(format!("Failed to read config: {err}"))),
        None => Config::default(),
    };

    info!("Loading data...");
    let now = Instant::now();
    let timetable = Timetable::from_path(&path)
        .unwrap_or_else(|err| exit_with(format!("Failed to load timetable: {err}")));
    info!("Loading data took {:?}", now.elapsed());

    let alert_url = config.alert_url.clone();
    let state = Arc::new(AppState::new(path, timetable, config, sim_start));
    tokio::spawn(tasks::run_ticks(state.clone()));
    if let Some(url) = alert_url {
        tokio::spawn(tasks::run_alerts(state.clone(), url));
    }

    let app = axum::Router::new()
        .route("/positions", get(api::positions))
        .route("/vp", post(api::vehicle_position))
        .route("/vp/snapshot", post(api::vehicle_snapshot))
        .route("/vp/usage", get(api::live_usage).post(api::live_usage))
        .route("/subscriptions", get(api::subscriptions))
        .route("/dataset", get(api::dataset).post(api::reload))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT))
        .await
        .unwrap_or_else(|err| exit_with(format!("Failed to bind port {PORT}: {err}")));
    info!("Listening to port {PORT}");
    if let Err(err) = axum::serve(listener, app).await {
        exit_with(format!("Server failed: {err}"));
    }
}
