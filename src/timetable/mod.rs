use std::{collections::HashMap, path::Path, sync::Arc};

mod calendar;
mod entities;
mod source;
mod vehicle;
pub use calendar::*;
pub use entities::*;
pub use vehicle::*;

use crate::payload::{self, Payload};

/// Read-only, decoded view of a timetable payload.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    /// When the source feed was published, seconds since the epoch.
    pub gtfs_epoch: Option<i64>,
    /// When the payload was packed, seconds since the epoch.
    pub json_epoch: Option<i64>,
    pub dates: Box<[ServiceDate]>,
    pub route_types: Box<[VehicleType]>,
    pub routes: Box<[Route]>,

    route_lookup: HashMap<Arc<str>, u32>,
    name_lookup: HashMap<Arc<str>, Box<[u32]>>,
}

/// A route service that runs on a concrete date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceRef {
    pub route: u32,
    pub service: u32,
    pub date: ServiceDate,
}

impl Timetable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, payload::Error> {
        let payload = Payload::from_path(path)?;
        Self::new().load_payload(&payload)
    }

    pub fn from_str(text: &str) -> Result<Self, payload::Error> {
        let payload = Payload::from_str(text)?;
        Self::new().load_payload(&payload)
    }

    pub fn route_by_index(&self, index: u32) -> Option<&Route> {
        self.routes.get(index as usize)
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        let index = self.route_lookup.get(id)?;
        self.routes.get(*index as usize)
    }

    pub fn routes_by_name(&self, name: &str) -> Vec<&Route> {
        self.name_lookup
            .get(name)
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|i| self.routes.get(*i as usize))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every service running on `date`. With `only_routes` set, routes whose
    /// short name is not listed are skipped.
    pub fn services_by_date(
        &self,
        date: &ServiceDate,
        only_routes: Option<&[String]>,
    ) -> Vec<ServiceRef> {
        self.routes
            .iter()
            .filter(|route| {
                only_routes.is_none_or(|names| names.iter().any(|name| **name == *route.name))
            })
            .flat_map(|route| {
                route
                    .services
                    .iter()
                    .enumerate()
                    .filter(|(_, service)| {
                        route
                            .calendar_by_service(service)
                            .is_some_and(|calendar| calendar.is_active(date))
                    })
                    .map(|(i, _)| ServiceRef {
                        route: route.index,
                        service: i as u32,
                        date: *date,
                    })
            })
            .collect()
    }

    pub fn trip_count(&self) -> usize {
        self.routes
            .iter()
            .flat_map(|route| route.directions.iter())
            .flatten()
            .flatten()
            .map(|direction| direction.trips.len())
            .sum()
    }
}
