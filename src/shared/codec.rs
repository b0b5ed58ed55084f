//! Packed integer strings used throughout the timetable payload.
//!
//! Every value is written as a run of characters. `!` adds one full unit
//! without ending the value, any character between `#` and `~` adds its
//! offset from `#` and ends it.

use thiserror::Error;

pub const CARRY: char = '!';
pub const MIN: char = '#';
pub const MAX: char = '~';
pub const UNIT: u32 = MAX as u32 - MIN as u32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("Value is not terminated, input ends with a carry")]
    UnterminatedValue,
    #[error("Value overflows at position {0}")]
    Overflow(usize),
    #[error("Values decrease at position {0}")]
    Unsorted(usize),
}

pub fn decode_integer_list(text: &str) -> Result<Vec<u32>, self::Error> {
    let mut values = Vec::with_capacity(text.len());
    let mut value: u32 = 0;
    let mut pending = false;
    for (position, character) in text.chars().enumerate() {
        let step = match character {
            CARRY => {
                pending = true;
                value = value.checked_add(UNIT).ok_or(Error::Overflow(position))?;
                continue;
            }
            MIN..=MAX => character as u32 - MIN as u32,
            _ => {
                return Err(Error::InvalidCharacter {
                    character,
                    position,
                });
            }
        };
        value = value.checked_add(step).ok_or(Error::Overflow(position))?;
        values.push(value);
        value = 0;
        pending = false;
    }
    if pending {
        return Err(Error::UnterminatedValue);
    }
    Ok(values)
}

/// Running sum starting at zero, one element longer than the input.
pub fn undelta_list(deltas: &[u32]) -> Result<Vec<u32>, self::Error> {
    let mut values = Vec::with_capacity(deltas.len() + 1);
    let mut sum: u32 = 0;
    values.push(sum);
    for (position, delta) in deltas.iter().enumerate() {
        sum = sum.checked_add(*delta).ok_or(Error::Overflow(position))?;
        values.push(sum);
    }
    Ok(values)
}

/// Inverse of [`undelta_list`]. The leading value is dropped and the values
/// must not decrease.
pub fn delta_list(values: &[u32]) -> Result<Vec<u32>, self::Error> {
    values
        .windows(2)
        .enumerate()
        .map(|(position, pair)| {
            pair[1]
                .checked_sub(pair[0])
                .ok_or(Error::Unsorted(position + 1))
        })
        .collect()
}

pub fn encode_integer_list(values: &[u32]) -> String {
    let mut text = String::with_capacity(values.len());
    for &value in values {
        let carries = value.saturating_sub(1) / UNIT;
        (0..carries).for_each(|_| text.push(CARRY));
        let rest = value - carries * UNIT;
        // rest is at most UNIT so this stays within MIN..=MAX
        text.push(char::from_u32(MIN as u32 + rest).unwrap_or(MAX));
    }
    text
}

#[test]
fn decode_mixed_test() {
    let values = decode_integer_list("#$%1~!$2!~!!$3").unwrap();
    assert_eq!(values, vec![0, 1, 2, 14, 91, 92, 15, 182, 183, 16]);
}

#[test]
fn decode_empty_test() {
    assert!(decode_integer_list("").unwrap().is_empty());
}

#[test]
fn decode_invalid_test() {
    assert_eq!(
        decode_integer_list("#\"").unwrap_err(),
        Error::InvalidCharacter {
            character: '"',
            position: 1
        }
    );
    assert_eq!(
        decode_integer_list("#!").unwrap_err(),
        Error::UnterminatedValue
    );
}

#[test]
fn undelta_test() {
    assert_eq!(undelta_list(&[]).unwrap(), vec![0]);
    assert_eq!(undelta_list(&[10, 1, 11, 3]).unwrap(), vec![0, 10, 11, 22, 25]);
    assert_eq!(undelta_list(&[u32::MAX, 1]).unwrap_err(), Error::Overflow(1));
}

#[test]
fn delta_unsorted_test() {
    assert_eq!(delta_list(&[0, 10, 25]).unwrap(), vec![10, 15]);
    assert_eq!(delta_list(&[0, 10, 5]).unwrap_err(), Error::Unsorted(2));
}

#[test]
fn encode_boundaries_test() {
    assert_eq!(encode_integer_list(&[0, 1, 91, 92, 182, 183]), "#$~!$!~!!$");
}
