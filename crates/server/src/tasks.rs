use std::sync::Arc;

use kartalla::simulation::{
    Alert, AlertResponse, AlertSummary, TransportStatus, alerts::ALERT_QUERY,
};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Ticks the simulation once per configured period and publishes every report.
pub async fn run_ticks(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(state.config.tick_period());
    let mut stopped = false;
    loop {
        interval.tick().await;
        let report = state.simulation.lock().await.tick();
        match report {
            Some(report) => {
                stopped = false;
                *state.report.write().await = Arc::new(report);
            }
            None if !stopped => {
                info!("Simulation clock stopped, waiting for a restart");
                stopped = true;
            }
            None => {}
        }
    }
}

/// Polls the alert service once per configured period. Failures are reported
/// as a status change and retried on the next period.
pub async fn run_alerts(state: Arc<AppState>, url: String) {
    let client = reqwest::Client::new();
    let mut interval = tokio::time::interval(state.config.alert_period());
    let mut available: Option<bool> = None;
    let mut generation = None;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = state.restarted.notified() => interval.reset(),
        }
        let inbox = state.inbox.read().await.clone();
        if generation != Some(inbox.generation()) {
            // a restarted session starts without alerts or status
            generation = Some(inbox.generation());
            available = None;
        }
        match fetch_alerts(&client, &url, &state.config.alert_language).await {
            Ok((alerts, summaries)) => {
                debug!("Fetched {} alerts", alerts.len());
                inbox.push_alerts(alerts, summaries);
                if available != Some(true) {
                    inbox.push_status(TransportStatus::AlertsAvailable);
                }
                available = Some(true);
            }
            Err(err) => {
                error!("Failed to fetch alerts: {err}");
                if available != Some(false) {
                    inbox.push_status(TransportStatus::AlertsUnavailable);
                }
                available = Some(false);
            }
        }
    }
}

async fn fetch_alerts(
    client: &reqwest::Client,
    url: &str,
    language: &str,
) -> Result<(Vec<Alert>, Vec<AlertSummary>), String> {
    let response = client
        .post(url)
        .json(&serde_json::json!({ "query": ALERT_QUERY }))
        .send()
        .await
        .map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("Response is not success: {}", response.status()));
    }
    let body = response.text().await.map_err(|err| err.to_string())?;
    AlertResponse::from_json(&body)
        .and_then(|response| response.into_alerts(language))
        .map_err(|err| err.to_string())
}
