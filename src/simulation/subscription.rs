use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Visible map area in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: u8,
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Coordinate multiplier and geohash digit count for a zoom level.
/// A zero multiplier means nothing is subscribed.
pub fn tier(zoom: u8) -> (u32, u32) {
    match zoom {
        16..=u8::MAX => (1000, 3),
        13..=15 => (100, 2),
        10..=12 => (10, 1),
        _ => (0, 0),
    }
}

/// Geohash cell of a scaled coordinate pair, for example `60;24/19/73`.
pub fn geohash(latitude: i64, longitude: i64) -> String {
    let (mut lat, mut lng) = (latitude.unsigned_abs(), longitude.unsigned_abs());
    let mut levels = Vec::new();
    while lat >= 100 || lng >= 100 {
        levels.push(format!("{}{}", lat % 10, lng % 10));
        lat /= 10;
        lng /= 10;
    }
    let sign = |value: i64| if value < 0 { "-" } else { "" };
    let mut cell = format!("{}{};{}{}", sign(latitude), lat, sign(longitude), lng);
    for level in levels.iter().rev() {
        cell.push('/');
        cell.push_str(level);
    }
    cell
}

impl Viewport {
    /// Finite bounds inside the valid latitude and longitude ranges.
    pub fn is_valid(&self) -> bool {
        let latitude = -90.0..=90.0;
        let longitude = -180.0..=180.0;
        latitude.contains(&self.south)
            && latitude.contains(&self.north)
            && longitude.contains(&self.west)
            && longitude.contains(&self.east)
    }
}

pub fn filter(digits: u32, cell: &str) -> String {
    format!("/hfp/journey/+/+/+/+/+/+/+/+/{digits}/{cell}/#")
}

/// Every subscription filter covering `viewport`, empty when zoomed out too
/// far or when more than `max_cells` cells would be needed.
pub fn filters(viewport: &Viewport, max_cells: usize) -> BTreeSet<String> {
    let (multiplier, digits) = tier(viewport.zoom);
    if multiplier == 0 || !viewport.is_valid() {
        return BTreeSet::new();
    }
    let scale = |value: f64| (value * multiplier as f64).floor() as i64;
    let (lat_min, lat_max) = (scale(viewport.south), scale(viewport.north));
    let (lng_min, lng_max) = (scale(viewport.west), scale(viewport.east));
    if lat_min > lat_max || lng_min > lng_max {
        return BTreeSet::new();
    }
    let count = lat_max
        .checked_sub(lat_min)
        .zip(lng_max.checked_sub(lng_min))
        .and_then(|(lat, lng)| (lat + 1).checked_mul(lng + 1));
    match count {
        Some(count) if count as u64 <= max_cells as u64 => {}
        _ => return BTreeSet::new(),
    }
    (lat_min..=lat_max)
        .flat_map(|lat| (lng_min..=lng_max).map(move |lng| filter(digits, &geohash(lat, lng))))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionChange {
    /// Unsubscribe these before subscribing the new set.
    pub unsubscribe: Vec<String>,
    pub subscribe: Vec<String>,
}

/// Active live position subscriptions for the current viewport.
#[derive(Debug, Clone)]
pub struct SubscriptionIndex {
    current: BTreeSet<String>,
    max_cells: usize,
}

impl SubscriptionIndex {
    pub fn new(max_cells: usize) -> Self {
        Self {
            current: BTreeSet::new(),
            max_cells,
        }
    }

    pub fn current(&self) -> impl Iterator<Item = &str> {
        self.current.iter().map(String::as_str)
    }

    /// Returns a change only when the filter set differs from the current one.
    pub fn update(&mut self, viewport: &Viewport) -> Option<SubscriptionChange> {
        let next = filters(viewport, self.max_cells);
        if next == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, next);
        Some(SubscriptionChange {
            unsubscribe: previous.into_iter().collect(),
            subscribe: self.current.iter().cloned().collect(),
        })
    }

    /// Drops every subscription, returning the filters to unsubscribe.
    pub fn clear(&mut self) -> Vec<String> {
        std::mem::take(&mut self.current).into_iter().collect()
    }
}

#[test]
fn geohash_test() {
    assert_eq!(geohash(6017, 2493), "60;24/19/73");
    assert_eq!(geohash(601, 249), "60;24/19");
    assert_eq!(geohash(60, 24), "60;24");
    assert_eq!(geohash(-3345, 1512), "-33;15/41/52");
}

#[test]
fn tier_test() {
    assert_eq!(tier(9), (0, 0));
    assert_eq!(tier(10), (10, 1));
    assert_eq!(tier(14), (100, 2));
    assert_eq!(tier(17), (1000, 3));
}
