mod common;

use common::*;
use kartalla::{
    payload::{self, Payload},
    shared::codec,
    timetable::{Timetable, VehicleType},
};
use serde_json::{Value, json};

fn load_err(value: &Value) -> payload::Error {
    Timetable::from_str(&value.to_string()).unwrap_err()
}

#[test]
fn load_sample_test() {
    let timetable = sample_timetable();
    assert_eq!(timetable.gtfs_epoch, Some(1714521600));
    assert_eq!(timetable.dates.len(), 4);
    assert_eq!(timetable.routes.len(), 1);
    assert_eq!(timetable.trip_count(), 3);

    let route = timetable.route_by_id(ROUTE_ID).unwrap();
    assert_eq!(&*route.name, ROUTE_NAME);
    assert_eq!(route.vehicle_type, VehicleType::Bus);
    assert_eq!(timetable.routes_by_name(ROUTE_NAME).len(), 1);
    assert!(timetable.route_by_id("missing").is_none());

    let service = route.services[0];
    let direction = route.direction_by_service(&service, 0).unwrap();
    assert!(route.direction_by_service(&service, 1).is_none());
    assert_eq!(&*direction.trips.start_times, &[480, 540, 600]);
    assert_eq!(&*direction.stop_times[0], &[0, 0, 10, 10, 20, 22]);

    let trip = direction.trips.trip(1).unwrap();
    assert_eq!(trip.start.as_minutes(), 540);
    assert_eq!(direction.duration_by_trip(&trip), Some(20));
}

#[test]
fn stop_distances_test() {
    let timetable = sample_timetable();
    let group = &timetable.routes[0].trip_groups[0];
    // shapes are stored with five decimals, about a meter of slack
    for (found, expected) in group.distances.iter().zip([0, 1000, 2500]) {
        assert!((*found as i64 - expected).abs() <= 2, "{found} != {expected}");
    }
}

#[test]
fn arrivals_only_test() {
    let mut route = RouteFixture::sample();
    route.directions = vec![[
        json!([]),
        direction(false, &[&[0, 10, 20]], trips(&[500], &[0], &[0])),
    ]];
    let timetable = load(&payload(&[route]));
    let route = &timetable.routes[0];
    let direction = route.direction_by_service(&route.services[0], 1).unwrap();
    assert!(!direction.is_departure_times);
    assert_eq!(&*direction.stop_times[0], &[0, 0, 10, 10, 20, 20]);
}

#[test]
fn array_keys_position_test() {
    let mut value = sample_payload();
    value[0]["root"]["array_keys"] = json!(1);
    assert!(Payload::from_value(value).is_err());
}

#[test]
fn missing_key_test() {
    let mut value = sample_payload();
    value[0]["route"].as_object_mut().unwrap().remove("long_name");
    assert!(matches!(
        load_err(&value),
        payload::Error::MissingKey {
            kind: "route",
            field: "long_name"
        }
    ));
}

#[test]
fn short_record_test() {
    let mut value = sample_payload();
    value[5][0].as_array_mut().unwrap().pop();
    assert!(matches!(load_err(&value), payload::Error::Arity { .. }));
}

#[test]
fn invalid_date_test() {
    let mut value = sample_payload();
    value[3][1] = json!("20240631");
    assert!(matches!(load_err(&value), payload::Error::InvalidDate(_)));
}

#[test]
fn unknown_vehicle_type_test() {
    let mut value = sample_payload();
    value[4][1] = json!("zeppelin");
    assert!(matches!(
        load_err(&value),
        payload::Error::UnknownVehicleType(_)
    ));
}

#[test]
fn out_of_range_test() {
    let mut route = RouteFixture::sample();
    route.trip_groups = vec![(3, 0)];
    assert!(matches!(
        load_err(&payload(&[route])),
        payload::Error::OutOfRange { what: "shape", .. }
    ));

    let mut route = RouteFixture::sample();
    route.stop_points = vec![vec![0, 1, 7]];
    assert!(matches!(
        load_err(&payload(&[route])),
        payload::Error::OutOfRange {
            what: "shape point",
            ..
        }
    ));

    let mut route = RouteFixture::sample();
    route.calendars = vec![calendar(0, 9, json!(0), &[], &[])];
    assert!(matches!(
        load_err(&payload(&[route])),
        payload::Error::OutOfRange { what: "date", .. }
    ));
}

#[test]
fn trip_list_length_test() {
    let mut route = RouteFixture::sample();
    route.directions = vec![[
        direction(
            true,
            &[&[0, 0, 10, 10, 20, 22]],
            trips(&[480, 540], &[0], &[0, 0]),
        ),
        json!([]),
    ]];
    assert!(matches!(
        load_err(&payload(&[route])),
        payload::Error::TripListLength { .. }
    ));
}

#[test]
fn stop_count_test() {
    let mut route = RouteFixture::sample();
    route.directions = vec![[
        direction(true, &[&[0, 0, 10, 10]], trips(&[480], &[0], &[0])),
        json!([]),
    ]];
    assert!(matches!(
        load_err(&payload(&[route])),
        payload::Error::StopCount {
            stops: 2,
            distances: 3,
            ..
        }
    ));
}

#[test]
fn invalid_codec_test() {
    let mut value = sample_payload();
    value[5][0][5][0] = json!("#\u{7f}");
    assert!(matches!(load_err(&value), payload::Error::Codec { .. }));
}

#[test]
fn start_time_overflow_test() {
    let mut route = RouteFixture::sample();
    let trips = json!([
        u32::MAX,
        deltas(&[0, 60]),
        codec::encode_integer_list(&[0, 0]),
        codec::encode_integer_list(&[0, 0])
    ]);
    route.directions = vec![[
        direction(true, &[&[0, 0, 10, 10, 20, 22]], trips),
        json!([]),
    ]];
    assert!(matches!(
        load_err(&payload(&[route])),
        payload::Error::Codec {
            field: "start_times",
            source: codec::Error::Overflow(1),
            ..
        }
    ));
}

#[test]
fn invalid_json_test() {
    assert!(matches!(
        Timetable::from_str("[{").unwrap_err(),
        payload::Error::Json(_)
    ));
}
