use serde_json::Value;
use std::{fs::File, io, io::BufReader, path::Path};
use thiserror::Error;

mod keys;
mod record;
pub use keys::*;
pub use record::*;

use crate::shared::{codec, polyline};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Index table has no position for {kind}.{field}")]
    MissingKey {
        kind: &'static str,
        field: &'static str,
    },
    #[error("{kind} record holds {found} fields, expected at least {expected}")]
    Arity {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{kind}.{field} is not a valid {expected}")]
    WrongType {
        kind: &'static str,
        field: &'static str,
        expected: &'static str,
    },
    #[error("{kind}.{field} could not be decoded: {source}")]
    Codec {
        kind: &'static str,
        field: &'static str,
        #[source]
        source: codec::Error,
    },
    #[error("Shape could not be decoded: {0}")]
    Polyline(#[from] polyline::Error),
    #[error("Invalid date {0:?}, expected YYYYMMDD")]
    InvalidDate(String),
    #[error("Unknown vehicle type {0:?}")]
    UnknownVehicleType(String),
    #[error("Invalid weekday rule {0:?}")]
    InvalidWeekdays(String),
    #[error("Route {route}: {what} index {index} is out of range ({len} entries)")]
    OutOfRange {
        route: String,
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Route {route}: trip lists have unequal lengths ({start_times}, {stop_times}, {trip_groups})")]
    TripListLength {
        route: String,
        start_times: usize,
        stop_times: usize,
        trip_groups: usize,
    },
    #[error("Route {route}: stop times cover {stops} stops but the trip group has {distances} distances")]
    StopCount {
        route: String,
        stops: usize,
        distances: usize,
    },
}

/// A parsed timetable payload: the index table plus the raw root array.
#[derive(Debug, Clone)]
pub struct Payload {
    keys: ArrayKeys,
    root: Value,
}

impl Payload {
    pub fn from_value(root: Value) -> Result<Self, self::Error> {
        let first = root
            .as_array()
            .and_then(|values| values.first())
            .ok_or(Error::WrongType {
                kind: "root",
                field: "array_keys",
                expected: "non-empty array",
            })?;
        let keys: ArrayKeys = serde_json::from_value(first.clone())?;
        let payload = Self { keys, root };
        // array_keys must point at the table it was read from
        let position = payload.keys.position("root", "array_keys")?;
        if position != 0 {
            return Err(Error::WrongType {
                kind: "root",
                field: "array_keys",
                expected: "first element",
            });
        }
        Ok(payload)
    }

    pub fn from_str(text: &str) -> Result<Self, self::Error> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, self::Error> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, self::Error> {
        let reader = BufReader::new(File::open(path)?);
        Self::from_value(serde_json::from_reader(reader)?)
    }

    pub fn keys(&self) -> &ArrayKeys {
        &self.keys
    }

    pub fn root(&self) -> Result<Record<'_>, self::Error> {
        Record::new("root", &self.keys, &self.root)
    }
}
