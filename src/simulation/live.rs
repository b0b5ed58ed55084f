use std::{collections::HashMap, sync::Arc};

use chrono::DateTime;
use serde::Deserialize;
use thiserror::Error;

use crate::shared::{Coordinate, time::Time};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Live message is not valid json: {0}")]
    Json(String),
    #[error("Live message is missing field {0}")]
    MissingField(&'static str),
    #[error("Live message direction {0:?} is not 1 or 2")]
    InvalidDirection(String),
    #[error("Live message start time {0:?} is not HH:MM")]
    InvalidStart(String),
    #[error("Live message timestamp {0} is out of range")]
    InvalidTimestamp(i64),
    #[error("Live message coordinate is not finite")]
    InvalidCoordinate,
    #[error("Topic {0:?} does not name a route")]
    InvalidTopic(String),
}

/// A vehicle position report as it arrives from the feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveMessage {
    #[serde(alias = "dir")]
    pub direction: Option<String>,
    pub start: Option<String>,
    pub tsi: Option<i64>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped {
        #[serde(rename = "VP")]
        vp: LiveMessage,
    },
    Bare(LiveMessage),
}

/// Identifies the trip a report belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiveKey {
    pub route_id: Arc<str>,
    /// 0 or 1.
    pub direction: u8,
    /// Scheduled start as minute of the day.
    pub start: u32,
}

impl LiveKey {
    pub fn new(route_id: Arc<str>, direction: u8, start: Time) -> Self {
        Self {
            route_id,
            direction,
            start: start.minute_of_day(),
        }
    }
}

/// A report that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveReport {
    pub key: LiveKey,
    pub timestamp: i64,
    pub coordinate: Coordinate,
}

/// Route id from a topic of the form
/// `/hfp/journey/<mode>/<operator>/<vehicle>/<route>/...`.
pub fn route_id_from_topic(topic: &str) -> Result<&str, self::Error> {
    topic
        .split('/')
        .nth(6)
        .filter(|route| !route.is_empty() && *route != "+")
        .ok_or_else(|| Error::InvalidTopic(topic.into()))
}

impl LiveMessage {
    pub fn from_json(payload: &str) -> Result<Self, self::Error> {
        match serde_json::from_str::<Envelope>(payload) {
            Ok(Envelope::Wrapped { vp }) | Ok(Envelope::Bare(vp)) => Ok(vp),
            Err(err) => Err(Error::Json(err.to_string())),
        }
    }

    pub fn validate(&self, route_id: &str) -> Result<LiveReport, self::Error> {
        let direction = self
            .direction
            .as_deref()
            .ok_or(Error::MissingField("dir"))?;
        let start = self.start.as_deref().ok_or(Error::MissingField("start"))?;
        let timestamp = self.tsi.ok_or(Error::MissingField("tsi"))?;
        let latitude = self.lat.ok_or(Error::MissingField("lat"))?;
        let longitude = self.long.ok_or(Error::MissingField("long"))?;

        let direction = match direction {
            "1" => 0,
            "2" => 1,
            other => return Err(Error::InvalidDirection(other.into())),
        };
        let start = Time::from_hm(start).ok_or_else(|| Error::InvalidStart(start.into()))?;
        if timestamp < 0 || DateTime::from_timestamp(timestamp, 0).is_none() {
            return Err(Error::InvalidTimestamp(timestamp));
        }
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(Error::InvalidCoordinate);
        }
        Ok(LiveReport {
            key: LiveKey::new(route_id.into(), direction, start),
            timestamp,
            coordinate: Coordinate::new(latitude, longitude),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveEntry {
    /// Timestamp of the newest report, drives validity.
    pub timestamp: i64,
    pub coordinate: Coordinate,
    /// Timestamp of the report that last moved the vehicle, drives freshness.
    pub changed_at: i64,
}

impl LiveEntry {
    pub fn freshness_age(&self, now: i64) -> i64 {
        now.saturating_sub(self.changed_at).max(0)
    }
}

/// Newest measured position per trip, entries expire by age.
#[derive(Debug, Clone)]
pub struct LivePositionCache {
    entries: HashMap<LiveKey, LiveEntry>,
    max_age: i64,
}

impl LivePositionCache {
    pub fn new(max_age_seconds: u32) -> Self {
        Self {
            entries: HashMap::new(),
            max_age: max_age_seconds as i64,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last write wins. A report at the same coordinate refreshes the
    /// timestamp but keeps the time the vehicle last moved.
    pub fn insert(&mut self, report: LiveReport) {
        let changed_at = match self.entries.get(&report.key) {
            Some(previous) if previous.coordinate == report.coordinate => previous.changed_at,
            _ => report.timestamp,
        };
        self.entries.insert(
            report.key,
            LiveEntry {
                timestamp: report.timestamp,
                coordinate: report.coordinate,
                changed_at,
            },
        );
    }

    fn is_valid(&self, entry: &LiveEntry, now: i64) -> bool {
        now.saturating_sub(entry.timestamp) < self.max_age
    }

    /// The entry for `key` if younger than the max age. Stale entries are removed.
    pub fn get(&mut self, key: &LiveKey, now: i64) -> Option<LiveEntry> {
        let entry = *self.entries.get(key)?;
        if self.is_valid(&entry, now) {
            Some(entry)
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub fn purge(&mut self, now: i64) {
        let max_age = self.max_age;
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.timestamp) < max_age);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
fn report(timestamp: i64, latitude: f64) -> LiveReport {
    LiveReport {
        key: LiveKey::new("1012".into(), 0, Time::from_minutes(480)),
        timestamp,
        coordinate: Coordinate::new(latitude, 24.9),
    }
}

#[test]
fn topic_test() {
    let topic = "/hfp/journey/bus/0012/01234/1012/1/Kamppi/08:00/1234567/3/60;24/19/73/#";
    assert_eq!(route_id_from_topic(topic).unwrap(), "1012");
    assert!(route_id_from_topic("/hfp/journey/bus").is_err());
}

#[test]
fn expiry_test() {
    let mut cache = LivePositionCache::new(120);
    let key = report(1000, 60.1).key;
    cache.insert(report(1000, 60.1));
    assert!(cache.get(&key, 1119).is_some());
    assert!(cache.get(&key, 1120).is_none());
    assert!(cache.is_empty());
}

#[test]
fn same_position_test() {
    let mut cache = LivePositionCache::new(120);
    let key = report(1000, 60.1).key;
    cache.insert(report(1000, 60.1));
    cache.insert(report(1100, 60.1));
    let entry = cache.get(&key, 1150).unwrap();
    assert_eq!(entry.timestamp, 1100);
    assert_eq!(entry.changed_at, 1000);

    cache.insert(report(1110, 60.2));
    assert_eq!(cache.get(&key, 1150).unwrap().changed_at, 1110);
}

#[test]
fn extreme_timestamp_test() {
    let mut cache = LivePositionCache::new(120);
    let key = report(0, 60.1).key;
    cache.insert(report(i64::MIN, 60.1));
    assert!(cache.get(&key, i64::MAX).is_none());
    cache.insert(report(i64::MIN, 60.1));
    cache.purge(i64::MAX);
    assert!(cache.is_empty());
}
