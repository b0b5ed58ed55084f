//! Time to distance tables for a single trip.

use crate::shared::time::SECONDS_PER_MINUTE;

/// One row of a merged table: minutes after trip start and meters along the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedDistance {
    pub arrival: u32,
    pub departure: u32,
    pub distance: u32,
}

impl TimedDistance {
    pub const fn new(arrival: u32, departure: u32, distance: u32) -> Self {
        Self {
            arrival,
            departure,
            distance,
        }
    }

    fn arrival_seconds(&self) -> f64 {
        (self.arrival * SECONDS_PER_MINUTE) as f64
    }

    fn departure_seconds(&self) -> f64 {
        (self.departure * SECONDS_PER_MINUTE) as f64
    }
}

/// Merges arrival and departure pairs with the distance of every stop.
///
/// Stops sharing the first arrival collapse into the first stop, stops sharing
/// the last arrival collapse into the last stop and any other run of equal
/// arrivals becomes one row halfway between the first and last stop of the run.
/// Adjacent rows never share an arrival.
pub fn merge_stop_times(times: &[u32], distances: &[u32]) -> Vec<TimedDistance> {
    let stops: Vec<TimedDistance> = times
        .chunks_exact(2)
        .zip(distances)
        .map(|(pair, distance)| TimedDistance::new(pair[0], pair[1], *distance))
        .collect();
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Vec::new();
    };
    if first.arrival == last.arrival {
        return vec![*first];
    }

    let mut merged = Vec::with_capacity(stops.len());
    let mut i = 0;
    while i < stops.len() {
        let run = stops[i..]
            .iter()
            .take_while(|stop| stop.arrival == stops[i].arrival)
            .count();
        let (head, tail) = (stops[i], stops[i + run - 1]);
        let row = if head.arrival == first.arrival {
            head
        } else if head.arrival == last.arrival {
            tail
        } else {
            TimedDistance::new(
                head.arrival,
                tail.departure,
                (head.distance + tail.distance + 1) / 2,
            )
        };
        merged.push(row);
        i += run;
    }
    merged
}

/// Meters travelled `seconds` after the trip started.
pub fn distance_at(seconds: f64, table: &[TimedDistance]) -> f64 {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return 0.0;
    };
    if seconds <= first.departure_seconds() {
        return first.distance as f64;
    }
    if seconds >= last.arrival_seconds() {
        return last.distance as f64;
    }
    for pair in table.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        if seconds <= next.arrival_seconds() {
            let span = next.arrival_seconds() - previous.departure_seconds();
            if span <= 0.0 {
                return next.distance as f64;
            }
            let fraction = (seconds - previous.departure_seconds()) / span;
            return previous.distance as f64
                + fraction * (next.distance as f64 - previous.distance as f64);
        }
        if seconds <= next.departure_seconds() {
            return next.distance as f64;
        }
    }
    last.distance as f64
}

/// Seconds after trip start at which the schedule reaches `distance` meters.
pub fn time_at(distance: f64, table: &[TimedDistance]) -> f64 {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return 0.0;
    };
    if distance <= first.distance as f64 {
        return first.departure_seconds();
    }
    if distance >= last.distance as f64 {
        return last.arrival_seconds();
    }
    for pair in table.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        if distance <= next.distance as f64 {
            let span = next.distance as f64 - previous.distance as f64;
            if span <= 0.0 {
                return next.arrival_seconds();
            }
            let fraction = (distance - previous.distance as f64) / span;
            return previous.departure_seconds()
                + fraction * (next.arrival_seconds() - previous.departure_seconds());
        }
    }
    last.arrival_seconds()
}

#[test]
fn merge_plain_test() {
    let merged = merge_stop_times(&[0, 0, 5, 6, 10, 10], &[0, 400, 900]);
    assert_eq!(
        merged,
        vec![
            TimedDistance::new(0, 0, 0),
            TimedDistance::new(5, 6, 400),
            TimedDistance::new(10, 10, 900),
        ]
    );
}

#[test]
fn merge_single_run_test() {
    let merged = merge_stop_times(&[3, 3, 3, 3], &[0, 50]);
    assert_eq!(merged, vec![TimedDistance::new(3, 3, 0)]);
    assert!(merge_stop_times(&[], &[]).is_empty());
}

#[test]
fn distance_dwell_test() {
    let table = [
        TimedDistance::new(0, 0, 0),
        TimedDistance::new(10, 12, 1000),
        TimedDistance::new(20, 20, 2000),
    ];
    assert_eq!(distance_at(660.0, &table), 1000.0);
    assert_eq!(distance_at(720.0, &table), 1000.0);
    assert_eq!(distance_at(960.0, &table), 1500.0);
    assert_eq!(distance_at(-30.0, &table), 0.0);
    assert_eq!(distance_at(5000.0, &table), 2000.0);
}
