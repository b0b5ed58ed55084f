use std::{
    cmp,
    fmt::Display,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS: Distance = Distance::from_kilometers(6371.0);

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

/// Compass heading in degrees, 0 is north and values grow clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Heading(f64);

impl Heading {
    pub fn from_degrees(degrees: f64) -> Self {
        Self(degrees.rem_euclid(360.0))
    }

    pub const fn as_degrees(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great circle distance using the haversine formula.
    pub fn distance(&self, coord: &Self) -> Distance {
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::powi(f64::sin(dist_lon / 2.0), 2);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_meters(EARTH_RADIUS.as_meters() * c)
    }

    /// Initial bearing of the great circle from `self` towards `coord`.
    pub fn heading_to(&self, coord: &Self) -> Heading {
        let lat_a = self.latitude.to_radians();
        let lat_b = coord.latitude.to_radians();
        let dist_lon = (coord.longitude - self.longitude).to_radians();
        let y = dist_lon.sin() * lat_b.cos();
        let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * dist_lon.cos();
        Heading::from_degrees(y.atan2(x).to_degrees())
    }

    /// Spherical interpolation, `fraction` 0 gives `self` and 1 gives `coord`.
    pub fn interpolate(&self, coord: &Self, fraction: f64) -> Self {
        let lat_a = self.latitude.to_radians();
        let lon_a = self.longitude.to_radians();
        let lat_b = coord.latitude.to_radians();
        let lon_b = coord.longitude.to_radians();

        let angle = self.distance(coord).as_meters() / EARTH_RADIUS.as_meters();
        let sin_angle = angle.sin();
        if sin_angle.abs() < 1e-12 {
            return Self::new(
                self.latitude + (coord.latitude - self.latitude) * fraction,
                self.longitude + (coord.longitude - self.longitude) * fraction,
            );
        }

        let a = ((1.0 - fraction) * angle).sin() / sin_angle;
        let b = (fraction * angle).sin() / sin_angle;
        let x = a * lat_a.cos() * lon_a.cos() + b * lat_b.cos() * lon_b.cos();
        let y = a * lat_a.cos() * lon_a.sin() + b * lat_b.cos() * lon_b.sin();
        let z = a * lat_a.sin() + b * lat_b.sin();
        Self::new(
            z.atan2((x * x + y * y).sqrt()).to_degrees(),
            y.atan2(x).to_degrees(),
        )
    }

    /// Fraction along the segment `a`..`b` closest to `self`, clamped to 0..=1.
    /// Uses a local flat projection, which holds for segments of a few kilometers.
    pub fn segment_fraction(&self, a: &Self, b: &Self) -> f64 {
        let scale = a.latitude.to_radians().cos();
        let (ax, ay) = (a.longitude * scale, a.latitude);
        let (bx, by) = (b.longitude * scale, b.latitude);
        let (px, py) = (self.longitude * scale, self.latitude);
        let (dx, dy) = (bx - ax, by - ay);
        let length = dx * dx + dy * dy;
        if length == 0.0 {
            return 0.0;
        }
        (((px - ax) * dx + (py - ay) * dy) / length).clamp(0.0, 1.0)
    }
}

#[test]
fn distance_test() {
    let paris = Coordinate::new(48.85800943005911, 2.3514350059357927);
    let london = Coordinate::new(51.5052389927712, -0.12495407345099824);
    let d = paris.distance(&london);
    assert!((d.as_kilometers() - 343.0).abs() < 5.0);
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn heading_test() {
    let origin = Coordinate::new(60.0, 24.0);
    let north = Coordinate::new(60.1, 24.0);
    let east = Coordinate::new(60.0, 24.1);
    assert!(origin.heading_to(&north).as_degrees().abs() < 1e-6);
    assert!((origin.heading_to(&east).as_degrees() - 90.0).abs() < 0.1);
    assert!((north.heading_to(&origin).as_degrees() - 180.0).abs() < 1e-6);
}

#[test]
fn interpolate_test() {
    let a = Coordinate::new(60.0, 24.0);
    let b = Coordinate::new(60.0, 25.0);
    let mid = a.interpolate(&b, 0.5);
    let half = a.distance(&b).as_meters() / 2.0;
    assert!((a.distance(&mid).as_meters() - half).abs() < 1.0);
    assert!(a.interpolate(&b, 0.0).distance(&a).as_meters() < 1e-6);
}
