use kartalla::{
    shared::Time,
    simulation::{
        LiveKey, LiveMessage, LivePositionCache,
        live::{self, route_id_from_topic},
    },
};

const TOPIC: &str = "/hfp/journey/bus/0022/00817/1012/2/Kamppi/08:00/1130104/4/60;24/19/73/55";

fn message(direction: &str, start: &str) -> LiveMessage {
    LiveMessage {
        direction: Some(direction.into()),
        start: Some(start.into()),
        tsi: Some(1_714_975_200),
        lat: Some(60.1975),
        long: Some(24.9355),
    }
}

#[test]
fn wrapped_message_test() {
    let payload = r#"{"VP":{"dir":"2","start":"08:00","tsi":1714975200,"lat":60.1975,"long":24.9355,"spd":8.2}}"#;
    let parsed = LiveMessage::from_json(payload).unwrap();
    assert_eq!(parsed, message("2", "08:00"));
}

#[test]
fn bare_message_test() {
    let payload = r#"{"direction":"1","start":"23:55","tsi":1714975200,"lat":60.1975,"long":24.9355}"#;
    let parsed = LiveMessage::from_json(payload).unwrap();
    assert_eq!(parsed.direction.as_deref(), Some("1"));
}

#[test]
fn validate_test() {
    let route_id = route_id_from_topic(TOPIC).unwrap();
    let report = message("2", "08:00").validate(route_id).unwrap();
    assert_eq!(
        report.key,
        LiveKey::new("1012".into(), 1, Time::from_minutes(480))
    );
    assert_eq!(report.timestamp, 1_714_975_200);
}

#[test]
fn invalid_direction_test() {
    assert!(matches!(
        message("3", "08:00").validate("1012"),
        Err(live::Error::InvalidDirection(_))
    ));
}

#[test]
fn invalid_start_test() {
    assert!(matches!(
        message("1", "8h").validate("1012"),
        Err(live::Error::InvalidStart(_))
    ));
    assert!(matches!(
        message("1", "08:75").validate("1012"),
        Err(live::Error::InvalidStart(_))
    ));
}

#[test]
fn missing_field_test() {
    let mut incomplete = message("1", "08:00");
    incomplete.lat = None;
    assert_eq!(
        incomplete.validate("1012"),
        Err(live::Error::MissingField("lat"))
    );
    assert!(LiveMessage::from_json("not json").is_err());
}

#[test]
fn start_after_midnight_test() {
    // a trip scheduled at 24:10 reports its start as 00:10
    let key = LiveKey::new("1012".into(), 0, Time::from_minutes(24 * 60 + 10));
    let report = message("1", "00:10").validate("1012").unwrap();
    assert_eq!(report.key, key);
}

#[test]
fn cache_last_write_wins_test() {
    let mut cache = LivePositionCache::new(120);
    let mut first = message("1", "08:00").validate("1012").unwrap();
    let mut second = first.clone();
    second.timestamp += 5;
    second.coordinate.latitude += 0.001;
    let key = first.key.clone();
    first.timestamp -= 5;
    cache.insert(first);
    cache.insert(second.clone());
    assert_eq!(cache.len(), 1);
    let entry = cache.get(&key, second.timestamp).unwrap();
    assert_eq!(entry.coordinate, second.coordinate);
}

#[test]
fn cache_purge_test() {
    let mut cache = LivePositionCache::new(120);
    let report = message("1", "08:00").validate("1012").unwrap();
    let timestamp = report.timestamp;
    cache.insert(report);
    cache.purge(timestamp + 119);
    assert_eq!(cache.len(), 1);
    cache.purge(timestamp + 120);
    assert!(cache.is_empty());
}

#[test]
fn oversized_start_test() {
    assert!(matches!(
        message("1", "1193047:00").validate("1012"),
        Err(live::Error::InvalidStart(_))
    ));
}

#[test]
fn invalid_timestamp_test() {
    let mut negative = message("1", "08:00");
    negative.tsi = Some(i64::MIN);
    assert_eq!(
        negative.validate("1012"),
        Err(live::Error::InvalidTimestamp(i64::MIN))
    );
    let mut far = message("1", "08:00");
    far.tsi = Some(i64::MAX);
    assert!(far.validate("1012").is_err());
}
