use serde::{Deserialize, Serialize};

use crate::shared::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Real time between ticks in milliseconds.
    pub tick: u64,
    /// Simulated seconds per real second.
    pub speed_multiplier: f64,
    /// How far ahead trips are activated, also the period of the rolling window.
    pub lookahead_minutes: u32,
    /// Length of the opacity ramp before start and after the last arrival.
    pub fade_seconds: u32,
    pub live_max_age_seconds: u32,
    /// Whether live position reports are used at all.
    pub live_positions: bool,
    /// Measured positions further than this from the path are ignored.
    pub projection_tolerance_meters: f64,
    /// Simulated seconds between marker updates of one trip.
    pub marker_update_seconds: u32,
    /// Yesterday's services stay active until this hour.
    pub service_eviction_hour: u32,
    pub stop_after_minutes: Option<u32>,
    /// Route short names to simulate, every route when unset.
    pub only_routes: Option<Vec<String>>,
    pub inbox_capacity: usize,
    pub max_subscription_cells: usize,
    pub alert_language: String,
    pub alert_url: Option<String>,
    pub alert_period_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick: 1000,
            speed_multiplier: 1.0,
            lookahead_minutes: 10,
            fade_seconds: 60,
            live_max_age_seconds: 120,
            live_positions: true,
            projection_tolerance_meters: 100.0,
            marker_update_seconds: 3,
            service_eviction_hour: 6,
            stop_after_minutes: None,
            only_routes: None,
            inbox_capacity: 4096,
            max_subscription_cells: 64,
            alert_language: "en".into(),
            alert_url: None,
            alert_period_seconds: 60,
        }
    }
}

impl Config {
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick)
    }

    pub fn lookahead(&self) -> Duration {
        Duration::from_minutes(self.lookahead_minutes)
    }

    pub fn alert_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.alert_period_seconds)
    }
}

#[test]
fn partial_config_test() {
    let config: Config = serde_json::from_str(r#"{ "speed_multiplier": 15, "only_routes": ["550"] }"#).unwrap();
    assert_eq!(config.speed_multiplier, 15.0);
    assert_eq!(config.only_routes, Some(vec!["550".to_string()]));
    assert_eq!(config.fade_seconds, 60);
    assert!(config.live_positions);
}
