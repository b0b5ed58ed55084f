use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use kartalla::{
    prelude::*,
    shared::{Coordinate, codec, polyline},
    simulation::schedule::{TimedDistance, distance_at, merge_stop_times, time_at},
};
use std::{env, hint::black_box, sync::Arc, time::Duration};

fn sample_table() -> Vec<TimedDistance> {
    let times: Vec<u32> = (0..40).flat_map(|stop| [stop * 2, stop * 2 + 1]).collect();
    let distances: Vec<u32> = (0..40).map(|stop| stop * 450).collect();
    merge_stop_times(&times, &distances)
}

fn sample_path() -> Path {
    Path::new(
        (0..200)
            .map(|i| Coordinate::new(60.16 + i as f64 * 0.0005, 24.94 + (i % 7) as f64 * 0.0003))
            .collect(),
    )
}

fn interpolation(c: &mut Criterion) {
    let table = sample_table();
    let path = sample_path();
    let target = Coordinate::new(60.21, 24.941);
    let mut group = c.benchmark_group("Interpolation");
    group.bench_function("Distance at", |b| {
        b.iter(|| distance_at(black_box(2345.0), &table))
    });
    group.bench_function("Time at", |b| b.iter(|| time_at(black_box(9000.0), &table)));
    group.bench_function("Position at", |b| {
        b.iter(|| path.position_at(black_box(Distance::from_meters(5000.0))))
    });
    group.bench_function("Project", |b| b.iter(|| path.project(black_box(&target))));
    group.finish();
}

fn decoding(c: &mut Criterion) {
    let values: Vec<u32> = (0..2000).map(|i| (i * 37) % 400).collect();
    let packed = codec::encode_integer_list(&values);
    let shape = polyline::encode(sample_path().points()).unwrap();
    let mut group = c.benchmark_group("Decoding");
    group.bench_function("Integer list", |b| {
        b.iter(|| codec::decode_integer_list(black_box(&packed)))
    });
    group.bench_function("Polyline", |b| b.iter(|| polyline::decode(black_box(&shape))));
    group.finish();
}

fn payload(c: &mut Criterion) {
    let payload_path = match env::var("PAYLOAD_PATH") {
        Ok(path) => path,
        Err(err) => {
            println!("Missing PAYLOAD_PATH environment variable: {err}");
            return;
        }
    };
    let text = std::fs::read_to_string(&payload_path).expect("Failed to read payload");
    let timetable = Arc::new(Timetable::from_str(&text).expect("Failed to load payload"));
    let sim_start = NaiveDate::from_ymd_opt(2024, 5, 6)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .expect("Invalid start");

    let mut group = c.benchmark_group("Payload");
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(20));
    group.bench_function("Load", |b| b.iter(|| Timetable::from_str(black_box(&text))));
    group.bench_function("Tick", |b| {
        let mut simulation = Simulation::new(timetable.clone(), Config::default(), sim_start);
        b.iter(|| simulation.tick())
    });
    group.finish();
}

criterion_group!(benches, interpolation, decoding, payload);
criterion_main!(benches);
