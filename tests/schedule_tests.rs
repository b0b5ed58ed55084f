use kartalla::simulation::schedule::{TimedDistance, distance_at, merge_stop_times, time_at};

fn sample_table() -> Vec<TimedDistance> {
    vec![
        TimedDistance::new(0, 0, 0),
        TimedDistance::new(10, 10, 1000),
        TimedDistance::new(20, 22, 2500),
    ]
}

#[test]
fn end_to_end_test() {
    // trip starting at 08:00, observed at 08:15
    let start = 480 * 60;
    let now = 495 * 60;
    let seconds = (now - start) as f64;
    assert_eq!(seconds, 900.0);
    assert_eq!(distance_at(seconds, &sample_table()), 1750.0);
}

#[test]
fn interior_run_test() {
    let merged = merge_stop_times(&[0, 0, 5, 5, 5, 5, 10, 10], &[0, 300, 380, 1000]);
    assert_eq!(
        merged,
        vec![
            TimedDistance::new(0, 0, 0),
            TimedDistance::new(5, 5, 340),
            TimedDistance::new(10, 10, 1000),
        ]
    );
}

#[test]
fn interior_run_rounding_test() {
    let merged = merge_stop_times(&[0, 0, 5, 5, 5, 7, 10, 10], &[0, 300, 401, 1000]);
    assert_eq!(merged[1], TimedDistance::new(5, 7, 351));
}

#[test]
fn trailing_run_test() {
    let merged = merge_stop_times(&[0, 0, 8, 8, 12, 12, 12, 12], &[0, 500, 900, 950]);
    assert_eq!(
        merged,
        vec![
            TimedDistance::new(0, 0, 0),
            TimedDistance::new(8, 8, 500),
            TimedDistance::new(12, 12, 950),
        ]
    );
}

#[test]
fn leading_run_test() {
    let merged = merge_stop_times(&[0, 0, 0, 1, 6, 6], &[0, 120, 800]);
    assert_eq!(
        merged,
        vec![TimedDistance::new(0, 0, 0), TimedDistance::new(6, 6, 800)]
    );
}

#[test]
fn no_adjacent_duplicates_test() {
    let merged = merge_stop_times(
        &[0, 0, 0, 0, 3, 3, 3, 3, 3, 3, 9, 9, 9, 9],
        &[0, 10, 200, 260, 300, 700, 720],
    );
    for pair in merged.windows(2) {
        assert!(pair[0].arrival < pair[1].arrival);
    }
}

#[test]
fn clamp_test() {
    let table = sample_table();
    assert_eq!(distance_at(-120.0, &table), 0.0);
    assert_eq!(distance_at(0.0, &table), 0.0);
    assert_eq!(distance_at(1200.0, &table), 2500.0);
    assert_eq!(distance_at(10_000.0, &table), 2500.0);
}

#[test]
fn monotonic_test() {
    let table = sample_table();
    let mut previous = 0.0;
    for seconds in (0..1400).step_by(15) {
        let distance = distance_at(seconds as f64, &table);
        assert!(distance >= previous);
        previous = distance;
    }
}

#[test]
fn inverse_test() {
    let table = sample_table();
    for distance in [0.0, 250.0, 999.0, 1000.0, 1750.0, 2499.0] {
        let seconds = time_at(distance, &table);
        assert!((distance_at(seconds, &table) - distance).abs() < 1e-6);
    }
    assert_eq!(time_at(1750.0, &table), 900.0);
}
