use std::fmt::Display;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

/// A calendar date stored as its zero padded `YYYYMMDD` text.
///
/// Ordering is lexicographic on the text, which matches chronological order
/// only because every value is exactly eight digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceDate([u8; 8]);

impl ServiceDate {
    pub fn parse(text: &str) -> Option<Self> {
        let bytes: [u8; 8] = text.as_bytes().try_into().ok()?;
        if !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        NaiveDate::parse_from_str(text, "%Y%m%d").ok()?;
        Some(Self(bytes))
    }

    pub fn from_naive_date(date: NaiveDate) -> Self {
        let text = format!(
            "{:04}{:02}{:02}",
            date.year().clamp(0, 9999),
            date.month(),
            date.day()
        );
        let mut bytes = [b'0'; 8];
        bytes.copy_from_slice(&text.as_bytes()[..8]);
        Self(bytes)
    }

    pub fn as_str(&self) -> &str {
        // only ascii digits are ever stored
        std::str::from_utf8(&self.0).unwrap_or("00000000")
    }

    pub fn to_naive_date(&self) -> NaiveDate {
        NaiveDate::parse_from_str(self.as_str(), "%Y%m%d").unwrap_or_default()
    }

    /// Start of the service day. Stop times count from here, even past 24:00.
    pub fn midnight(&self) -> NaiveDateTime {
        self.to_naive_date().and_time(NaiveTime::MIN)
    }

    pub fn previous(&self) -> Option<Self> {
        self.to_naive_date().pred_opt().map(Self::from_naive_date)
    }

    /// Monday is 0.
    pub fn weekday(&self) -> u8 {
        self.to_naive_date().weekday().num_days_from_monday() as u8
    }
}

impl Display for ServiceDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServiceDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayRule {
    /// Runs on one weekday only, Monday is 0.
    Single(u8),
    /// Runs on every weekday whose flag is set, Monday first.
    Mask([bool; 7]),
}

impl WeekdayRule {
    pub fn from_mask(mask: &str) -> Option<Self> {
        let flags: Vec<bool> = mask
            .chars()
            .map(|c| match c {
                '1' => Some(true),
                '0' => Some(false),
                _ => None,
            })
            .collect::<Option<_>>()?;
        Some(Self::Mask(flags.try_into().ok()?))
    }

    pub fn matches(&self, weekday: u8) -> bool {
        match self {
            Self::Single(day) => *day == weekday,
            Self::Mask(flags) => flags.get(weekday as usize).copied().unwrap_or(false),
        }
    }
}

/// Weekday rule and date range of a service, with added and removed dates.
#[derive(Debug, Clone)]
pub struct Calendar {
    pub start: ServiceDate,
    pub end: ServiceDate,
    pub weekdays: WeekdayRule,
    pub added: Box<[ServiceDate]>,
    pub removed: Box<[ServiceDate]>,
}

impl Calendar {
    /// Added dates always run and removed dates never do, otherwise the date
    /// must fall inside the range on a matching weekday.
    pub fn is_active(&self, date: &ServiceDate) -> bool {
        if self.added.contains(date) {
            return true;
        }
        if self.removed.contains(date) {
            return false;
        }
        self.weekdays.matches(date.weekday()) && self.start <= *date && *date <= self.end
    }
}

#[cfg(test)]
fn date(text: &str) -> ServiceDate {
    ServiceDate::parse(text).unwrap()
}

#[test]
fn service_date_parse_test() {
    assert!(ServiceDate::parse("20240229").is_some());
    assert!(ServiceDate::parse("20230229").is_none());
    assert!(ServiceDate::parse("2024022").is_none());
    assert!(ServiceDate::parse("2024-2-29").is_none());
    assert_eq!(date("20240101").weekday(), 0);
    assert_eq!(date("20240107").weekday(), 6);
}

#[test]
fn service_date_order_test() {
    assert!(date("20231231") < date("20240101"));
    let from_chrono = ServiceDate::from_naive_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    assert_eq!(from_chrono.as_str(), "20240305");
}

#[test]
fn weekday_mask_test() {
    let rule = WeekdayRule::from_mask("1111100").unwrap();
    assert!(rule.matches(0));
    assert!(rule.matches(4));
    assert!(!rule.matches(5));
    assert!(WeekdayRule::from_mask("111110").is_none());
    assert!(WeekdayRule::from_mask("11111a0").is_none());
}
