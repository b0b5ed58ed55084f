use std::sync::Arc;

use crate::{
    shared::{Path, time::Time},
    timetable::{Calendar, VehicleType},
};

/// Schedule of one transit line.
#[derive(Debug, Clone)]
pub struct Route {
    /// Position of the route in the timetable, used for O(1) lookups.
    pub index: u32,
    /// External identifier, the same id live feeds and alerts refer to.
    pub id: Arc<str>,
    /// Short public name such as "550" or "M1".
    pub name: Arc<str>,
    pub long_name: Arc<str>,
    pub vehicle_type: VehicleType,
    /// Decoded shapes, trip groups point into this list.
    pub shapes: Box<[Path]>,
    /// Shape point index of every stop, per stop distance table.
    pub stop_distances: Box<[Box<[u32]>]>,
    pub trip_groups: Box<[TripGroup]>,
    pub calendars: Box<[Calendar]>,
    /// Direction pairs shared between services. Either slot may be empty.
    pub directions: Box<[[Option<Direction>; 2]]>,
    pub services: Box<[Service]>,
}

/// Shape and stop spacing shared by trips that follow the same path.
#[derive(Debug, Clone)]
pub struct TripGroup {
    pub shape: u32,
    pub stop_distances: u32,
    /// Distance in meters from the start of the shape to every stop.
    pub distances: Arc<[u32]>,
}

/// Calendar plus the direction pair it runs.
#[derive(Debug, Clone, Copy)]
pub struct Service {
    pub calendar: u32,
    pub directions: u32,
}

#[derive(Debug, Clone)]
pub struct Direction {
    pub is_departure_times: bool,
    /// Arrival and departure minutes relative to trip start, as pairs.
    pub stop_times: Box<[Arc<[u32]>]>,
    pub trips: TripBlock,
}

/// Parallel per trip lists, all of equal length.
#[derive(Debug, Clone, Default)]
pub struct TripBlock {
    /// Absolute start minute after midnight of the service date.
    pub start_times: Box<[u32]>,
    pub stop_times: Box<[u32]>,
    pub trip_groups: Box<[u32]>,
}

/// A single scheduled run, resolved from a [`TripBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trip {
    pub index: u32,
    pub start: Time,
    pub stop_times: u32,
    pub trip_group: u32,
}

impl TripBlock {
    pub fn len(&self) -> usize {
        self.start_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_times.is_empty()
    }

    pub fn trip(&self, index: usize) -> Option<Trip> {
        Some(Trip {
            index: index as u32,
            start: Time::from_minutes(*self.start_times.get(index)?),
            stop_times: *self.stop_times.get(index)?,
            trip_group: *self.trip_groups.get(index)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Trip> + '_ {
        (0..self.len()).filter_map(|i| self.trip(i))
    }
}

impl Direction {
    pub fn stop_times_by_trip(&self, trip: &Trip) -> Option<&Arc<[u32]>> {
        self.stop_times.get(trip.stop_times as usize)
    }

    /// Last arrival in minutes after the trip start.
    pub fn duration_by_trip(&self, trip: &Trip) -> Option<u32> {
        let times = self.stop_times_by_trip(trip)?;
        times.len().checked_sub(2).map(|i| times[i])
    }
}

impl Route {
    pub fn calendar_by_service(&self, service: &Service) -> Option<&Calendar> {
        self.calendars.get(service.calendar as usize)
    }

    pub fn direction_by_service(&self, service: &Service, direction: u8) -> Option<&Direction> {
        self.directions
            .get(service.directions as usize)?
            .get(direction as usize)?
            .as_ref()
    }

    pub fn trip_group_by_trip(&self, trip: &Trip) -> Option<&TripGroup> {
        self.trip_groups.get(trip.trip_group as usize)
    }

    pub fn shape_by_trip_group(&self, group: &TripGroup) -> Option<&Path> {
        self.shapes.get(group.shape as usize)
    }
}
