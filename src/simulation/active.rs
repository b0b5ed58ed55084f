use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    simulation::{
        Config,
        trip::{ActiveTrip, TripKey},
    },
    timetable::{ServiceDate, ServiceRef, Timetable},
};

/// Services running around the current simulated time and the trips of those
/// services that intersect the lookahead window.
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    services: BTreeSet<ServiceRef>,
    trips: BTreeMap<TripKey, ActiveTrip>,
    /// Date and "before eviction hour" flag the service set was built for.
    service_day: Option<(ServiceDate, bool)>,
    next_window: Option<NaiveDateTime>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn services(&self) -> &BTreeSet<ServiceRef> {
        &self.services
    }

    pub fn trip_by_key(&self, key: &TripKey) -> Option<&ActiveTrip> {
        self.trips.get(key)
    }

    pub fn trips(&self) -> impl Iterator<Item = &ActiveTrip> {
        self.trips.values()
    }

    pub fn trips_mut(&mut self) -> impl Iterator<Item = &mut ActiveTrip> {
        self.trips.values_mut()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn remove(&mut self, key: &TripKey) -> Option<ActiveTrip> {
        self.trips.remove(key)
    }

    pub fn clear(&mut self) {
        self.services.clear();
        self.trips.clear();
        self.service_day = None;
        self.next_window = None;
    }

    /// Brings services and trips up to date with `now`. Returns the keys of
    /// trips dropped together with their service.
    pub fn update<R: Rng>(
        &mut self,
        timetable: &Timetable,
        now: NaiveDateTime,
        config: &Config,
        rng: &mut R,
    ) -> Vec<TripKey> {
        let evicted = self.update_services(timetable, now, config);
        if evicted.is_some() || self.next_window.is_none_or(|next| now >= next) {
            self.activate_window(timetable, now, config, rng);
            self.next_window = Some(now + TimeDelta::seconds(config.lookahead().as_seconds() as i64));
        }
        evicted.unwrap_or_default()
    }

    /// Rebuilds the service set when the date or the eviction hour boundary
    /// changes. Before the eviction hour yesterday's services stay active so
    /// trips running past midnight keep moving.
    pub fn update_services(
        &mut self,
        timetable: &Timetable,
        now: NaiveDateTime,
        config: &Config,
    ) -> Option<Vec<TripKey>> {
        let today = ServiceDate::from_naive_date(now.date());
        let early = now.hour() < config.service_eviction_hour;
        if self.service_day == Some((today, early)) {
            return None;
        }
        self.service_day = Some((today, early));

        let only_routes = config.only_routes.as_deref();
        let mut services: BTreeSet<ServiceRef> = timetable
            .services_by_date(&today, only_routes)
            .into_iter()
            .collect();
        if early && let Some(yesterday) = today.previous() {
            services.extend(timetable.services_by_date(&yesterday, only_routes));
        }

        let evicted: Vec<TripKey> = self
            .trips
            .keys()
            .filter(|key| {
                !services.contains(&ServiceRef {
                    route: key.route,
                    service: key.service,
                    date: key.date,
                })
            })
            .copied()
            .collect();
        for key in &evicted {
            self.trips.remove(key);
        }

        info!(
            "Active services for {today}: {} ({} trips evicted)",
            services.len(),
            evicted.len()
        );
        self.services = services;
        Some(evicted)
    }

    /// Activates every trip of the active services whose run, including the
    /// fade windows, intersects `[now, now + lookahead]`. Returns how many trips
    /// were added.
    pub fn activate_window<R: Rng>(
        &mut self,
        timetable: &Timetable,
        now: NaiveDateTime,
        config: &Config,
        rng: &mut R,
    ) -> usize {
        let fade = TimeDelta::seconds(config.fade_seconds as i64);
        let to = now + TimeDelta::seconds(config.lookahead().as_seconds() as i64) + fade;
        let mut added = 0;

        for service_ref in &self.services {
            let Some(route) = timetable.route_by_index(service_ref.route) else {
                continue;
            };
            let Some(service) = route.services.get(service_ref.service as usize) else {
                continue;
            };
            let midnight = service_ref.date.midnight();
            for direction_id in 0..2u8 {
                let Some(direction) = route.direction_by_service(service, direction_id) else {
                    continue;
                };
                let trips = direction.trips.iter().take_while(|trip| {
                    midnight + TimeDelta::seconds(trip.start.as_seconds() as i64) <= to
                });
                for trip in trips {
                    let start = midnight + TimeDelta::seconds(trip.start.as_seconds() as i64);
                    let duration = direction.duration_by_trip(&trip).unwrap_or_default();
                    let end = start + TimeDelta::minutes(duration as i64) + fade;
                    if end <= now {
                        continue;
                    }
                    let key = TripKey {
                        route: service_ref.route,
                        service: service_ref.service,
                        direction: direction_id,
                        trip: trip.index,
                        date: service_ref.date,
                    };
                    if self.trips.contains_key(&key) {
                        continue;
                    }
                    if let Some(active) =
                        ActiveTrip::new(key, route, direction, &trip, now, config, rng)
                    {
                        self.trips.insert(key, active);
                        added += 1;
                    }
                }
            }
        }

        debug!(
            "Activated {added} trips until {to}, {} trips active",
            self.trips.len()
        );
        added
    }
}
