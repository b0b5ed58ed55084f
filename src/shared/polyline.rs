//! Encoded polyline shapes with five decimal places of precision.

use geo_types::Coord;
use thiserror::Error;

use crate::shared::geo::Coordinate;

const PRECISION: u32 = 5;
const OFFSET: u32 = 63;
const CONTINUE: u32 = 0x20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Polyline ends in the middle of a value")]
    Truncated,
    #[error("Invalid polyline: {0}")]
    Invalid(String),
}

pub fn decode(text: &str) -> Result<Vec<Coordinate>, self::Error> {
    // the last character of a complete polyline always ends a value
    let truncated = text
        .chars()
        .last()
        .is_some_and(|last| (last as u32).saturating_sub(OFFSET) & CONTINUE != 0);
    if truncated {
        return Err(Error::Truncated);
    }
    let line = ::polyline::decode_polyline(text, PRECISION)
        .map_err(|err| Error::Invalid(err.to_string()))?;
    Ok(line
        .coords()
        .map(|coord| Coordinate::new(coord.y, coord.x))
        .collect())
}

pub fn encode(coordinates: &[Coordinate]) -> Result<String, self::Error> {
    let coords = coordinates.iter().map(|coordinate| Coord {
        x: coordinate.longitude,
        y: coordinate.latitude,
    });
    ::polyline::encode_coordinates(coords, PRECISION).map_err(|err| Error::Invalid(err.to_string()))
}

#[test]
fn decode_reference_test() {
    let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
    let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
    assert_eq!(points.len(), expected.len());
    for (point, (lat, lng)) in points.iter().zip(expected) {
        assert!((point.latitude - lat).abs() < 1e-9);
        assert!((point.longitude - lng).abs() < 1e-9);
    }
}

#[test]
fn encode_reference_test() {
    let points = [
        Coordinate::new(38.5, -120.2),
        Coordinate::new(40.7, -120.95),
        Coordinate::new(43.252, -126.453),
    ];
    assert_eq!(encode(&points).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
}

#[test]
fn decode_truncated_test() {
    assert_eq!(decode("_p~iF~ps|U_").unwrap_err(), Error::Truncated);
}

#[test]
fn encode_out_of_range_test() {
    assert!(encode(&[Coordinate::new(95.0, 24.9)]).is_err());
}
