use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;
/// Upper bound for the hour field of `HH:MM` times.
pub const MAX_HOURS: u32 = 48;

/// Seconds since midnight of a service date. Values past 24:00 are valid,
/// trips that start late in the evening keep running on the same service date.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Sub<Time> for Time {
    type Output = i64;

    /// Signed difference in seconds.
    fn sub(self, rhs: Self) -> Self::Output {
        self.0 as i64 - rhs.0 as i64
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Time {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * SECONDS_PER_MINUTE)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub const fn as_minutes(&self) -> u32 {
        self.0 / SECONDS_PER_MINUTE
    }

    /// Minute of the day, wrapping times past midnight back into 0..1440.
    pub const fn minute_of_day(&self) -> u32 {
        (self.0 % SECONDS_PER_DAY) / SECONDS_PER_MINUTE
    }

    pub fn to_hm_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        format!("{:02}:{:02}", h, m)
    }

    /// Parses `HH:MM`. Hours may run past 24 but stay below [`MAX_HOURS`].
    pub fn from_hm(time: &str) -> Option<Self> {
        let mut split = time.split(':');
        let hours: u32 = split.next()?.trim().parse().ok()?;
        let minutes: u32 = split.next()?.trim().parse().ok()?;
        if split.next().is_some() || minutes >= 60 || hours >= MAX_HOURS {
            return None;
        }
        hours
            .checked_mul(3600)?
            .checked_add(minutes * SECONDS_PER_MINUTE)
            .map(Self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration(u32);

impl From<u32> for Duration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * SECONDS_PER_MINUTE)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours * 60 * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.0 as u64)
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

#[test]
fn parse_unparse_test() {
    for time in ["00:00", "00:30", "12:00", "25:15"] {
        assert_eq!(time, Time::from_hm(time).unwrap().to_hm_string());
    }
}

#[test]
fn invalid_time_test() {
    assert!(Time::from_hm("0a:00").is_none());
    assert!(Time::from_hm("12").is_none());
    assert!(Time::from_hm("12:60").is_none());
    assert!(Time::from_hm("12:00:00").is_none());
    assert!(Time::from_hm("48:00").is_none());
    assert!(Time::from_hm("1193047:00").is_none());
    assert_eq!(Time::from_hm("47:59").unwrap().as_seconds(), 47 * 3600 + 59 * 60);
}

#[test]
fn minute_of_day_test() {
    assert_eq!(Time::from_hm("08:00").unwrap().minute_of_day(), 480);
    assert_eq!(Time::from_hm("25:15").unwrap().minute_of_day(), 75);
}
