mod common;

use common::*;
use kartalla::timetable::{Calendar, ServiceDate, WeekdayRule};

fn date(text: &str) -> ServiceDate {
    ServiceDate::parse(text).unwrap()
}

fn weekday_calendar() -> Calendar {
    Calendar {
        start: date("20240501"),
        end: date("20240630"),
        weekdays: WeekdayRule::from_mask("1111100").unwrap(),
        added: vec![date("20240512"), date("20240801")].into(),
        removed: vec![date("20240508")].into(),
    }
}

#[test]
fn weekday_in_range_test() {
    let calendar = weekday_calendar();
    assert!(calendar.is_active(&date("20240506")));
    assert!(calendar.is_active(&date("20240501")));
    assert!(calendar.is_active(&date("20240628")));
    assert!(!calendar.is_active(&date("20240511")));
}

#[test]
fn out_of_range_test() {
    let calendar = weekday_calendar();
    assert!(!calendar.is_active(&date("20240430")));
    assert!(!calendar.is_active(&date("20240701")));
}

#[test]
fn added_always_runs_test() {
    let calendar = weekday_calendar();
    // a Sunday and a date after the range
    assert!(calendar.is_active(&date("20240512")));
    assert!(calendar.is_active(&date("20240801")));
}

#[test]
fn removed_never_runs_test() {
    let calendar = weekday_calendar();
    assert!(!calendar.is_active(&date("20240508")));
}

#[test]
fn single_weekday_test() {
    let calendar = Calendar {
        weekdays: WeekdayRule::Single(6),
        ..weekday_calendar()
    };
    assert!(calendar.is_active(&date("20240505")));
    assert!(!calendar.is_active(&date("20240506")));
}

#[test]
fn services_by_date_test() {
    let timetable = sample_timetable();
    assert_eq!(timetable.services_by_date(&date("20240506"), None).len(), 1);
    assert_eq!(timetable.services_by_date(&date("20240512"), None).len(), 1);
    assert!(timetable.services_by_date(&date("20240508"), None).is_empty());
    assert!(timetable.services_by_date(&date("20240511"), None).is_empty());
}

#[test]
fn only_routes_test() {
    let timetable = sample_timetable();
    let monday = date("20240506");
    let listed = vec![ROUTE_NAME.to_string()];
    let other = vec!["550".to_string()];
    assert_eq!(timetable.services_by_date(&monday, Some(&listed)).len(), 1);
    assert!(timetable.services_by_date(&monday, Some(&other)).is_empty());
}
