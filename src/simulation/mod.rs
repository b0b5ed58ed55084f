use std::{sync::Arc, time::Instant};

use chrono::{Local, NaiveDateTime};
use crossbeam::queue::ArrayQueue;
use serde::Serialize;
use tracing::{debug, info, warn};

pub mod active;
pub mod alerts;
pub mod clock;
pub mod config;
pub mod live;
pub mod schedule;
pub mod subscription;
pub mod trip;

pub use active::ActiveSet;
pub use alerts::{Alert, AlertCache, AlertResponse, AlertSummary};
pub use clock::SimulationClock;
pub use config::Config;
pub use live::{LiveEntry, LiveKey, LiveMessage, LivePositionCache, LiveReport};
pub use subscription::{SubscriptionChange, SubscriptionIndex, Viewport};
pub use trip::{ActiveTrip, Observation, PositionSource, Step, TripKey, TripState, TripUpdate};

use crate::timetable::{Timetable, VehicleType};

/// Seconds since the epoch of a simulated local time, the scale live
/// timestamps are measured in.
pub fn epoch_seconds(time: NaiveDateTime) -> i64 {
    time.and_local_timezone(Local)
        .earliest()
        .map(|local| local.timestamp())
        .unwrap_or_else(|| time.and_utc().timestamp())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    AlertsAvailable,
    AlertsUnavailable,
}

#[derive(Debug)]
enum Message {
    Live(LiveReport),
    LiveUsage(bool),
    Alerts(AlertCache),
    Status(TransportStatus),
}

#[derive(Debug)]
struct Envelope {
    generation: u64,
    message: Message,
}

/// Producer handle for a running session. Messages take effect on the next
/// tick and are ignored once the session they were created for restarts.
#[derive(Debug, Clone)]
pub struct Inbox {
    queue: Arc<ArrayQueue<Envelope>>,
    generation: u64,
}

impl Inbox {
    fn push(&self, message: Message) {
        let envelope = Envelope {
            generation: self.generation,
            message,
        };
        if self.queue.force_push(envelope).is_some() {
            warn!("Inbox is full, dropped the oldest message");
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn push_live(&self, route_id: &str, message: &LiveMessage) -> Result<(), live::Error> {
        let report = message.validate(route_id).map_err(|err| {
            warn!("Dropped live message for route {route_id}: {err}");
            err
        })?;
        self.push(Message::Live(report));
        Ok(())
    }

    /// Replaces the whole alert set on the next tick.
    pub fn push_alerts(&self, alerts: Vec<Alert>, summaries: Vec<AlertSummary>) {
        self.push(Message::Alerts(AlertCache::new(alerts, summaries)));
    }

    pub fn push_status(&self, status: TransportStatus) {
        self.push(Message::Status(status));
    }

    /// Switches live positions on or off. Switching off drops every cached
    /// position and ignores reports until switched on again.
    pub fn push_live_usage(&self, enabled: bool) {
        self.push(Message::LiveUsage(enabled));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VehicleCount {
    pub vehicle_type: VehicleType,
    pub count: usize,
}

/// Everything that changed during one tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub now: NaiveDateTime,
    pub generation: u64,
    pub updates: Vec<TripUpdate>,
    /// Trips that exited, went back to waiting or lost their service.
    pub removed: Vec<TripKey>,
    /// Visible trips per vehicle type.
    pub counts: Vec<VehicleCount>,
    pub status: Vec<TransportStatus>,
    pub alerts: Vec<AlertSummary>,
}

/// One simulation run over one timetable.
pub struct Simulation {
    timetable: Arc<Timetable>,
    config: Config,
    clock: SimulationClock,
    active: ActiveSet,
    live: LivePositionCache,
    alerts: AlertCache,
    queue: Arc<ArrayQueue<Envelope>>,
    generation: u64,
    live_enabled: bool,
}

impl Simulation {
    pub fn new(timetable: Arc<Timetable>, config: Config, sim_start: NaiveDateTime) -> Self {
        Self::new_at(timetable, config, sim_start, Instant::now())
    }

    /// Same as [`Simulation::new`] with the real time anchor given explicitly.
    pub fn new_at(
        timetable: Arc<Timetable>,
        config: Config,
        sim_start: NaiveDateTime,
        real_start: Instant,
    ) -> Self {
        info!(
            "Starting simulation at {sim_start} with {} routes and {} trips",
            timetable.routes.len(),
            timetable.trip_count()
        );
        let clock = SimulationClock::new(sim_start, config.speed_multiplier, config.tick_period())
            .with_stop_after(config.stop_after_minutes)
            .anchored_at(real_start);
        Self {
            timetable,
            clock,
            active: ActiveSet::new(),
            live: LivePositionCache::new(config.live_max_age_seconds),
            alerts: AlertCache::default(),
            queue: Arc::new(ArrayQueue::new(config.inbox_capacity.max(1))),
            generation: 0,
            live_enabled: config.live_positions,
            config,
        }
    }

    pub fn inbox(&self) -> Inbox {
        Inbox {
            queue: self.queue.clone(),
            generation: self.generation,
        }
    }

    pub fn timetable(&self) -> &Arc<Timetable> {
        &self.timetable
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    pub fn live(&self) -> &LivePositionCache {
        &self.live
    }

    pub fn alerts(&self) -> &AlertCache {
        &self.alerts
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn live_enabled(&self) -> bool {
        self.live_enabled
    }

    /// Drops every cache and active trip and starts over on `timetable`.
    /// Inbox handles created before the restart stop having any effect.
    pub fn restart(&mut self, timetable: Arc<Timetable>, sim_start: NaiveDateTime) {
        self.restart_at(timetable, sim_start, Instant::now());
    }

    pub fn restart_at(
        &mut self,
        timetable: Arc<Timetable>,
        sim_start: NaiveDateTime,
        real_start: Instant,
    ) {
        self.generation += 1;
        info!(
            "Restarting simulation at {sim_start}, generation {}",
            self.generation
        );
        self.timetable = timetable;
        self.clock.restart(sim_start, real_start);
        self.active.clear();
        self.live.clear();
        self.alerts = AlertCache::default();
    }

    pub fn tick(&mut self) -> Option<TickReport> {
        self.tick_at(Instant::now())
    }

    /// Runs one tick at real time `real`. Returns `None` once the clock stopped.
    pub fn tick_at(&mut self, real: Instant) -> Option<TickReport> {
        let now = self.clock.tick_at(real)?;
        let epoch = epoch_seconds(now);
        let mut report = TickReport {
            now,
            generation: self.generation,
            ..Default::default()
        };

        self.drain_inbox(&mut report.status);
        self.live.purge(epoch);

        let mut rng = rand::rng();
        report.removed = self
            .active
            .update(&self.timetable, now, &self.config, &mut rng);

        let mut exited = Vec::new();
        for trip in self.active.trips_mut() {
            let Some(path) = self
                .timetable
                .route_by_index(trip.key.route)
                .and_then(|route| route.shapes.get(trip.shape as usize))
            else {
                continue;
            };
            let observation = Observation {
                now,
                seconds: (now - trip.key.date.midnight()).num_seconds(),
                epoch,
                path,
                live: self.live.get(&trip.live_key, epoch),
                config: &self.config,
            };
            match trip.update(&observation) {
                Step::Idle => {}
                Step::Moved(mut update) => {
                    update.alert = self
                        .alerts
                        .lookup(&trip.route_id, trip.key.direction, trip.start);
                    report.updates.push(*update);
                }
                Step::Hidden => report.removed.push(trip.key),
                Step::Exited => exited.push(trip.key),
            }
        }
        for key in exited {
            self.active.remove(&key);
            report.removed.push(key);
        }
        if !report.removed.is_empty() {
            debug!("Removed {} trips at {now}", report.removed.len());
        }

        report.counts = VehicleType::ALL
            .into_iter()
            .map(|vehicle_type| VehicleCount {
                vehicle_type,
                count: self
                    .active
                    .trips()
                    .filter(|trip| {
                        trip.vehicle_type == vehicle_type && trip.state() == TripState::Active
                    })
                    .count(),
            })
            .collect();
        report.alerts = self.alerts.summaries().to_vec();
        Some(report)
    }

    fn drain_inbox(&mut self, status: &mut Vec<TransportStatus>) {
        let mut stale = 0;
        while let Some(envelope) = self.queue.pop() {
            if envelope.generation != self.generation {
                stale += 1;
                continue;
            }
            match envelope.message {
                Message::Live(report) if self.live_enabled => self.live.insert(report),
                Message::Live(_) => {}
                Message::LiveUsage(enabled) => {
                    if enabled != self.live_enabled {
                        info!("Live positions switched {}", if enabled { "on" } else { "off" });
                    }
                    self.live_enabled = enabled;
                    if !enabled {
                        self.live.clear();
                    }
                }
                Message::Alerts(alerts) => self.alerts = alerts,
                Message::Status(change) => status.push(change),
            }
        }
        if stale > 0 {
            warn!("Discarded {stale} messages from an earlier session");
        }
    }
}
