use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use rand::Rng;
use serde::Serialize;

use crate::{
    shared::{Coordinate, Distance, Heading, Path, time::Time},
    simulation::{
        Config,
        live::{LiveEntry, LiveKey},
        schedule::{self, TimedDistance},
    },
    timetable::{Direction, Route, ServiceDate, Trip, VehicleType},
};

/// Identity of one trip on one service date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TripKey {
    pub route: u32,
    pub service: u32,
    pub direction: u8,
    pub trip: u32,
    pub date: ServiceDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripState {
    /// More than one fade window before the start, nothing is drawn.
    Waiting,
    Active,
    /// Past the last arrival and its fade window with no measured position.
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    Measured,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripUpdate {
    pub key: TripKey,
    pub route_id: Arc<str>,
    pub route_name: Arc<str>,
    pub vehicle_type: VehicleType,
    pub direction: u8,
    pub start: String,
    pub coordinate: Coordinate,
    pub heading: Heading,
    /// Meters along the shape.
    pub distance: f64,
    pub opacity: f64,
    pub source: PositionSource,
    /// Seconds behind schedule, negative when early. Only known for measured positions.
    pub delay: Option<i64>,
    pub alert: Option<Arc<str>>,
}

/// What one trip did during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Idle,
    Moved(Box<TripUpdate>),
    /// Was drawn but went back to waiting.
    Hidden,
    Exited,
}

/// Everything a trip reads during one tick.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub now: NaiveDateTime,
    /// Seconds since midnight of the trip's service date.
    pub seconds: i64,
    /// Current time as seconds since the epoch, for live entry ages.
    pub epoch: i64,
    pub path: &'a Path,
    pub live: Option<LiveEntry>,
    pub config: &'a Config,
}

#[derive(Debug, Clone)]
pub struct ActiveTrip {
    pub key: TripKey,
    pub route_id: Arc<str>,
    pub route_name: Arc<str>,
    pub vehicle_type: VehicleType,
    pub shape: u32,
    pub start: Time,
    pub table: Box<[TimedDistance]>,
    pub live_key: LiveKey,
    state: TripState,
    next_update: NaiveDateTime,
    source: Option<PositionSource>,
    last_distance: Option<f64>,
    last_opacity: f64,
}

/// Linear ramp over the fade window before start and after the last arrival.
pub fn fade_opacity(seconds_from_start: f64, last_arrival: f64, fade: f64) -> f64 {
    let opacity = if seconds_from_start < 0.0 {
        (fade + seconds_from_start) / fade
    } else if seconds_from_start > last_arrival {
        (fade - (seconds_from_start - last_arrival)) / fade
    } else {
        1.0
    };
    opacity.clamp(0.0, 1.0)
}

impl ActiveTrip {
    pub fn new<R: Rng>(
        key: TripKey,
        route: &Route,
        direction: &Direction,
        trip: &Trip,
        now: NaiveDateTime,
        config: &Config,
        rng: &mut R,
    ) -> Option<Self> {
        let group = route.trip_group_by_trip(trip)?;
        let times = direction.stop_times_by_trip(trip)?;
        let table = schedule::merge_stop_times(times, &group.distances);
        if table.is_empty() {
            return None;
        }
        let interval = config.marker_update_seconds.max(1) as i64 * 1000;
        let jitter = TimeDelta::milliseconds(rng.random_range(0..interval));
        Some(Self {
            key,
            route_id: route.id.clone(),
            route_name: route.name.clone(),
            vehicle_type: route.vehicle_type,
            shape: group.shape,
            start: trip.start,
            table: table.into(),
            live_key: LiveKey::new(route.id.clone(), key.direction, trip.start),
            state: TripState::Waiting,
            next_update: now + jitter,
            source: None,
            last_distance: None,
            last_opacity: 0.0,
        })
    }

    pub fn state(&self) -> TripState {
        self.state
    }

    pub fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }

    pub fn last_opacity(&self) -> f64 {
        self.last_opacity
    }

    /// Last arrival in seconds after the start.
    pub fn last_arrival(&self) -> f64 {
        self.table
            .last()
            .map(|row| row.arrival as f64 * 60.0)
            .unwrap_or_default()
    }

    fn advance_deadline(&mut self, now: NaiveDateTime, config: &Config) {
        let interval = TimeDelta::seconds(config.marker_update_seconds.max(1) as i64);
        self.next_update += interval;
        if self.next_update <= now {
            self.next_update = now + interval;
        }
    }

    pub fn update(&mut self, observation: &Observation) -> Step {
        let config = observation.config;
        let fade = config.fade_seconds as f64;
        let seconds_from_start = (observation.seconds - self.start.as_seconds() as i64) as f64;
        let last_arrival = self.last_arrival();

        // nothing is drawn before the fade in, live data or not
        if seconds_from_start < -fade {
            let was_drawn = self.state == TripState::Active;
            self.state = TripState::Waiting;
            self.source = None;
            return if was_drawn { Step::Hidden } else { Step::Idle };
        }

        let measured = observation.live.and_then(|entry| {
            let projection = observation.path.project(&entry.coordinate)?;
            (projection.offset.as_meters() <= config.projection_tolerance_meters)
                .then_some((entry, projection))
        });

        if measured.is_none() && seconds_from_start > last_arrival + fade {
            self.state = TripState::Exited;
            return Step::Exited;
        }
        self.state = TripState::Active;

        let source = if measured.is_some() {
            PositionSource::Measured
        } else {
            PositionSource::Computed
        };
        if self.source == Some(source) && observation.now < self.next_update {
            return Step::Idle;
        }
        self.advance_deadline(observation.now, config);

        let (coordinate, heading, distance, opacity, delay) = match measured {
            Some((entry, projection)) => {
                let age = entry.freshness_age(observation.epoch) as f64;
                let max_age = config.live_max_age_seconds.max(1) as f64;
                let distance = projection.distance.as_meters();
                let schedule_seconds = schedule::time_at(distance, &self.table);
                (
                    entry.coordinate,
                    projection.heading,
                    distance,
                    f64::max(0.2, 1.0 - age / max_age),
                    Some((seconds_from_start - schedule_seconds).round() as i64),
                )
            }
            None => {
                let distance = schedule::distance_at(seconds_from_start, &self.table);
                let Some((coordinate, heading)) =
                    observation.path.position_at(Distance::from_meters(distance))
                else {
                    return Step::Idle;
                };
                (
                    coordinate,
                    heading,
                    distance,
                    fade_opacity(seconds_from_start, last_arrival, fade),
                    None,
                )
            }
        };

        self.source = Some(source);
        self.last_distance = Some(distance);
        self.last_opacity = opacity;
        Step::Moved(Box::new(TripUpdate {
            key: self.key,
            route_id: self.route_id.clone(),
            route_name: self.route_name.clone(),
            vehicle_type: self.vehicle_type,
            direction: self.key.direction,
            start: self.start.to_hm_string(),
            coordinate,
            heading,
            distance,
            opacity,
            source,
            delay,
            alert: None,
        }))
    }
}

#[test]
fn fade_opacity_test() {
    assert_eq!(fade_opacity(-60.0, 600.0, 60.0), 0.0);
    assert_eq!(fade_opacity(-30.0, 600.0, 60.0), 0.5);
    assert_eq!(fade_opacity(300.0, 600.0, 60.0), 1.0);
    assert_eq!(fade_opacity(615.0, 600.0, 60.0), 0.75);
    assert_eq!(fade_opacity(700.0, 600.0, 60.0), 0.0);
}
