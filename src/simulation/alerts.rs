use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{shared::time::Time, timetable::VehicleType};

pub const ALERT_QUERY: &str = "{ alerts { \
    route { gtfsId type shortName longName } \
    trip { gtfsId directionId stoptimes { scheduledArrival } } \
    alertDescriptionTextTranslations { language text } } }";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Alert response is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Alert response has no data")]
    MissingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertResponse {
    pub data: Option<AlertData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertData {
    #[serde(default)]
    pub alerts: Vec<RawAlert>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAlert {
    pub route: Option<RawRoute>,
    pub trip: Option<RawTrip>,
    #[serde(rename = "alertDescriptionTextTranslations", default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoute {
    pub gtfs_id: String,
    #[serde(rename = "type")]
    pub route_type: Option<i64>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrip {
    pub gtfs_id: Option<String>,
    /// Sent as a string by some servers and as a number by others.
    pub direction_id: Option<Value>,
    #[serde(default)]
    pub stoptimes: Vec<RawStopTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStopTime {
    /// Seconds after midnight.
    pub scheduled_arrival: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Translation {
    pub language: Option<String>,
    pub text: Option<String>,
}

/// One disruption text for a route, optionally narrowed to a single trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub route_id: Arc<str>,
    pub direction: Option<u8>,
    /// Scheduled start as minute of the day.
    pub start: Option<u32>,
    pub text: Arc<str>,
}

/// A distinct alert text for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub text: Arc<str>,
    pub vehicle_type: Option<VehicleType>,
}

impl RawTrip {
    fn direction(&self) -> Option<u8> {
        match self.direction_id.as_ref()? {
            Value::Number(number) => number.as_u64().and_then(|n| u8::try_from(n).ok()),
            Value::String(text) => text.parse().ok(),
            _ => None,
        }
    }

    fn start(&self) -> Option<u32> {
        self.stoptimes
            .first()?
            .scheduled_arrival
            .map(|seconds| Time::from_seconds(seconds).minute_of_day())
    }
}

impl AlertResponse {
    pub fn from_json(text: &str) -> Result<Self, self::Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// Alerts in `language`, fanned out per route, plus the distinct texts.
    /// Alerts without a route only reach the summary list.
    pub fn into_alerts(self, language: &str) -> Result<(Vec<Alert>, Vec<AlertSummary>), Error> {
        let data = self.data.ok_or(Error::MissingData)?;
        let mut alerts = Vec::new();
        let mut summaries: Vec<AlertSummary> = Vec::new();
        for raw in data.alerts {
            let texts = raw.translations.iter().filter_map(|translation| {
                (translation.language.as_deref() == Some(language))
                    .then_some(translation.text.as_deref())
                    .flatten()
            });
            for text in texts {
                let text: Arc<str> = text.into();
                if !summaries.iter().any(|summary| summary.text == text) {
                    summaries.push(AlertSummary {
                        text: text.clone(),
                        vehicle_type: raw
                            .route
                            .as_ref()
                            .and_then(|route| route.route_type)
                            .and_then(VehicleType::from_route_type),
                    });
                }
                let Some(route) = &raw.route else {
                    continue;
                };
                let route_id = route
                    .gtfs_id
                    .split_once(':')
                    .map_or(route.gtfs_id.as_str(), |(_, id)| id);
                alerts.push(Alert {
                    route_id: route_id.into(),
                    direction: raw.trip.as_ref().and_then(RawTrip::direction),
                    start: raw.trip.as_ref().and_then(RawTrip::start),
                    text,
                });
            }
        }
        Ok((alerts, summaries))
    }
}

#[derive(Debug, Clone, Default)]
struct RouteAlerts {
    trips: HashMap<(u8, u32), Arc<str>>,
    general: Option<Arc<str>>,
}

/// Disruption texts by route, with trip specific entries and a route wide fallback.
/// The cache is rebuilt as a whole on every update.
#[derive(Debug, Clone, Default)]
pub struct AlertCache {
    routes: HashMap<Arc<str>, RouteAlerts>,
    summaries: Box<[AlertSummary]>,
}

fn join(texts: Vec<Arc<str>>) -> Arc<str> {
    if texts.len() == 1 {
        return texts[0].clone();
    }
    texts
        .iter()
        .map(|text| text.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
        .into()
}

impl AlertCache {
    pub fn new(alerts: Vec<Alert>, summaries: Vec<AlertSummary>) -> Self {
        let mut trips: HashMap<Arc<str>, HashMap<(u8, u32), Vec<Arc<str>>>> = HashMap::new();
        let mut general: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
        for alert in alerts {
            let texts = match (alert.direction, alert.start) {
                (Some(direction), Some(start)) => trips
                    .entry(alert.route_id)
                    .or_default()
                    .entry((direction, start))
                    .or_default(),
                _ => general.entry(alert.route_id).or_default(),
            };
            if !texts.contains(&alert.text) {
                texts.push(alert.text);
            }
        }

        let mut routes: HashMap<Arc<str>, RouteAlerts> = HashMap::new();
        for (route_id, by_trip) in trips {
            routes.entry(route_id).or_default().trips = by_trip
                .into_iter()
                .map(|(key, texts)| (key, join(texts)))
                .collect();
        }
        for (route_id, texts) in general {
            routes.entry(route_id).or_default().general = Some(join(texts));
        }
        Self {
            routes,
            summaries: summaries.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.summaries.is_empty()
    }

    pub fn summaries(&self) -> &[AlertSummary] {
        &self.summaries
    }

    /// The trip specific text if one exists, otherwise the route wide text.
    pub fn lookup(&self, route_id: &str, direction: u8, start: Time) -> Option<Arc<str>> {
        let route = self.routes.get(route_id)?;
        route
            .trips
            .get(&(direction, start.minute_of_day()))
            .or(route.general.as_ref())
            .cloned()
    }
}

#[test]
fn lookup_fallback_test() {
    let alert = |direction, start, text: &str| Alert {
        route_id: "1012".into(),
        direction,
        start,
        text: text.into(),
    };
    let cache = AlertCache::new(
        vec![
            alert(None, None, "Detour"),
            alert(Some(0), Some(480), "Cancelled"),
            alert(Some(0), Some(480), "Replaced by bus"),
        ],
        Vec::new(),
    );
    let eight = Time::from_minutes(480);
    assert_eq!(
        cache.lookup("1012", 0, eight).as_deref(),
        Some("Cancelled\nReplaced by bus")
    );
    assert_eq!(cache.lookup("1012", 1, eight).as_deref(), Some("Detour"));
    assert_eq!(cache.lookup("2000", 0, eight), None);
}
