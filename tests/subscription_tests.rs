use kartalla::simulation::{
    SubscriptionIndex, Viewport,
    subscription::{filters, geohash},
};

fn helsinki(zoom: u8) -> Viewport {
    Viewport {
        zoom,
        south: 60.165,
        west: 24.935,
        north: 60.171,
        east: 24.949,
    }
}

#[test]
fn geohash_deterministic_test() {
    assert_eq!(geohash(60169, 24941), geohash(60169, 24941));
    assert_eq!(geohash(60169, 24941), "60;24/19/64/91");
}

#[test]
fn coarse_zoom_test() {
    assert!(filters(&helsinki(8), 64).is_empty());
}

#[test]
fn zoom_tier_filters_test() {
    let filters = filters(&helsinki(14), 64);
    // 6016..=6017 by 2493..=2494
    assert_eq!(filters.len(), 4);
    assert!(filters.contains("/hfp/journey/+/+/+/+/+/+/+/+/2/60;24/19/63/#"));
    assert!(filters.contains("/hfp/journey/+/+/+/+/+/+/+/+/2/60;24/19/64/#"));
}

#[test]
fn too_many_cells_test() {
    let wide = Viewport {
        zoom: 16,
        south: 60.0,
        west: 24.0,
        north: 60.5,
        east: 25.0,
    };
    assert!(filters(&wide, 64).is_empty());
}

#[test]
fn unchanged_viewport_test() {
    let mut index = SubscriptionIndex::new(64);
    let change = index.update(&helsinki(14)).unwrap();
    assert!(change.unsubscribe.is_empty());
    assert_eq!(change.subscribe.len(), 4);
    assert!(index.update(&helsinki(14)).is_none());

    // a small pan inside the same cells does not resubscribe
    let mut panned = helsinki(14);
    panned.south += 0.001;
    assert!(index.update(&panned).is_none());
}

#[test]
fn changed_viewport_test() {
    let mut index = SubscriptionIndex::new(64);
    index.update(&helsinki(14));
    let change = index.update(&helsinki(11)).unwrap();
    assert_eq!(change.unsubscribe.len(), 4);
    assert_eq!(
        change.subscribe,
        vec!["/hfp/journey/+/+/+/+/+/+/+/+/1/60;24/19/#".to_string()]
    );
    assert_eq!(index.current().count(), 1);
    assert_eq!(index.clear().len(), 1);
}

#[test]
fn invalid_bounds_test() {
    let huge = Viewport {
        zoom: 16,
        south: -1e300,
        west: 24.0,
        north: 1e300,
        east: 24.001,
    };
    assert!(filters(&huge, 64).is_empty());

    let mut nan = helsinki(14);
    nan.north = f64::NAN;
    assert!(filters(&nan, 64).is_empty());
    let mut infinite = helsinki(14);
    infinite.east = f64::INFINITY;
    assert!(filters(&infinite, 64).is_empty());
}
