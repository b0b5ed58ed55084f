#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use kartalla::{
    shared::{Coordinate, EARTH_RADIUS, codec, polyline},
    timetable::Timetable,
};
use serde_json::{Value, json};

pub const ROUTE_ID: &str = "1012";
pub const ROUTE_NAME: &str = "12";

pub fn array_keys() -> Value {
    json!({
        "root": {
            "array_keys": 0, "gtfs_epoch": 1, "json_epoch": 2,
            "dates": 3, "route_types": 4, "routes": 5
        },
        "route": {
            "id": 0, "name": 1, "long_name": 2, "type": 3, "shapes": 4,
            "stop_distances": 5, "trip_groups": 6, "trip_dates": 7,
            "directions": 8, "services": 9
        },
        "trip_group": { "shape_i": 0, "stop_distances_i": 1 },
        "trip_dates": {
            "start_date_i": 0, "end_date_i": 1, "weekdays": 2, "exception_dates": 3
        },
        "exception_dates": { "added": 0, "removed": 1 },
        "service": { "trip_dates_i": 0, "directions_i": 1 },
        "direction": { "is_departure_times": 0, "stop_times": 1, "trips": 2 },
        "trips": {
            "first_start_time": 0, "start_times": 1,
            "stop_times_indexes": 2, "trip_group_indexes": 3
        }
    })
}

/// Codec string of the deltas of `values`, which must start at zero.
pub fn deltas(values: &[u32]) -> String {
    codec::encode_integer_list(&codec::delta_list(values).unwrap())
}

pub fn trips(starts: &[u32], stop_times: &[u32], trip_groups: &[u32]) -> Value {
    let first = starts.first().copied().unwrap_or_default();
    let offsets: Vec<u32> = starts.iter().map(|start| start - first).collect();
    json!([
        first,
        deltas(&offsets),
        codec::encode_integer_list(stop_times),
        codec::encode_integer_list(trip_groups)
    ])
}

pub fn direction(is_departure_times: bool, stop_times: &[&[u32]], trips: Value) -> Value {
    let stop_times: Vec<String> = stop_times.iter().map(|times| deltas(times)).collect();
    json!([is_departure_times as u32, stop_times, trips])
}

pub fn calendar(start: u32, end: u32, weekdays: Value, added: &[u32], removed: &[u32]) -> Value {
    json!([start, end, weekdays, [added, removed]])
}

/// Points due north of `origin` at the given distances in meters.
pub fn meridian(origin: Coordinate, distances: &[f64]) -> Vec<Coordinate> {
    distances
        .iter()
        .map(|meters| {
            let degrees = (meters / EARTH_RADIUS.as_meters()).to_degrees();
            Coordinate::new(origin.latitude + degrees, origin.longitude)
        })
        .collect()
}

pub fn origin() -> Coordinate {
    Coordinate::new(60.16, 24.94)
}

pub struct RouteFixture {
    pub id: String,
    pub name: String,
    pub route_type: u32,
    pub shapes: Vec<Vec<Coordinate>>,
    pub stop_points: Vec<Vec<u32>>,
    pub trip_groups: Vec<(u32, u32)>,
    pub calendars: Vec<Value>,
    pub directions: Vec<[Value; 2]>,
    pub services: Vec<(u32, u32)>,
}

impl RouteFixture {
    /// Route "12" running weekdays from 08:00 every hour until 10:00, three
    /// stops at 0, 1000 and 2500 meters reached after 0, 10 and 20 minutes.
    pub fn sample() -> Self {
        Self {
            id: ROUTE_ID.into(),
            name: ROUTE_NAME.into(),
            route_type: 0,
            shapes: vec![meridian(origin(), &[0.0, 1000.0, 2500.0])],
            stop_points: vec![vec![0, 1, 2]],
            trip_groups: vec![(0, 0)],
            calendars: vec![calendar(0, 1, json!("1111100"), &[2], &[3])],
            directions: vec![[
                direction(
                    true,
                    &[&[0, 0, 10, 10, 20, 22]],
                    trips(&[480, 540, 600], &[0, 0, 0], &[0, 0, 0]),
                ),
                json!([]),
            ]],
            services: vec![(0, 0)],
        }
    }

    pub fn to_value(&self) -> Value {
        let shapes: Vec<String> = self
            .shapes
            .iter()
            .map(|points| polyline::encode(points).unwrap())
            .collect();
        let stop_distances: Vec<String> = self.stop_points.iter().map(|p| deltas(p)).collect();
        let trip_groups: Vec<Value> = self
            .trip_groups
            .iter()
            .map(|(shape, distances)| json!([shape, distances]))
            .collect();
        let services: Vec<Value> = self
            .services
            .iter()
            .map(|(calendar, directions)| json!([calendar, directions]))
            .collect();
        json!([
            self.id,
            self.name,
            format!("Route {}", self.name),
            self.route_type,
            shapes,
            stop_distances,
            trip_groups,
            self.calendars,
            self.directions,
            services
        ])
    }
}

/// Dates: 0 = 2024-05-01, 1 = 2024-06-30, 2 = 2024-05-12 (a Sunday),
/// 3 = 2024-05-08 (a Wednesday).
pub const DATES: [&str; 4] = ["20240501", "20240630", "20240512", "20240508"];

pub fn payload(routes: &[RouteFixture]) -> Value {
    let routes: Vec<Value> = routes.iter().map(RouteFixture::to_value).collect();
    json!([
        array_keys(),
        1714521600,
        1714608000,
        DATES,
        ["bus", "tram"],
        routes
    ])
}

pub fn sample_payload() -> Value {
    payload(&[RouteFixture::sample()])
}

pub fn load(value: &Value) -> Timetable {
    Timetable::from_str(&value.to_string()).unwrap()
}

pub fn sample_timetable() -> Timetable {
    load(&sample_payload())
}

pub fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}
