use serde_json::Value;

use crate::{
    payload::{ArrayKeys, Error},
    shared::codec,
};

/// A positional JSON array read through the index table.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    kind: &'static str,
    keys: &'a ArrayKeys,
    values: &'a [Value],
}

impl<'a> Record<'a> {
    pub fn new(kind: &'static str, keys: &'a ArrayKeys, value: &'a Value) -> Result<Self, Error> {
        let values = value.as_array().ok_or(Error::WrongType {
            kind,
            field: "*",
            expected: "array",
        })?;
        let arity = keys.arity(kind)?;
        if values.len() < arity {
            return Err(Error::Arity {
                kind,
                expected: arity,
                found: values.len(),
            });
        }
        Ok(Self { kind, keys, values })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn keys(&self) -> &'a ArrayKeys {
        self.keys
    }

    pub fn value(&self, field: &'static str) -> Result<&'a Value, Error> {
        let position = self.keys.position(self.kind, field)?;
        self.values.get(position).ok_or(Error::Arity {
            kind: self.kind,
            expected: position + 1,
            found: self.values.len(),
        })
    }

    fn wrong_type(&self, field: &'static str, expected: &'static str) -> Error {
        Error::WrongType {
            kind: self.kind,
            field,
            expected,
        }
    }

    pub fn u32(&self, field: &'static str) -> Result<u32, Error> {
        self.value(field)?
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .ok_or_else(|| self.wrong_type(field, "unsigned integer"))
    }

    pub fn optional_i64(&self, field: &'static str) -> Result<Option<i64>, Error> {
        match self.value(field)? {
            Value::Null => Ok(None),
            value => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(field, "integer")),
        }
    }

    pub fn str(&self, field: &'static str) -> Result<&'a str, Error> {
        self.value(field)?
            .as_str()
            .ok_or_else(|| self.wrong_type(field, "string"))
    }

    pub fn array(&self, field: &'static str) -> Result<&'a [Value], Error> {
        self.value(field)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.wrong_type(field, "array"))
    }

    pub fn record(&self, field: &'static str, kind: &'static str) -> Result<Record<'a>, Error> {
        Record::new(kind, self.keys, self.value(field)?)
    }

    /// Every element of an array field, each read as a record of `kind`.
    pub fn records(
        &self,
        field: &'static str,
        kind: &'static str,
    ) -> Result<Vec<Record<'a>>, Error> {
        self.array(field)?
            .iter()
            .map(|value| Record::new(kind, self.keys, value))
            .collect()
    }

    pub fn u32_list(&self, field: &'static str) -> Result<Vec<u32>, Error> {
        self.array(field)?
            .iter()
            .map(|value| {
                value
                    .as_u64()
                    .and_then(|value| u32::try_from(value).ok())
                    .ok_or_else(|| self.wrong_type(field, "array of unsigned integers"))
            })
            .collect()
    }

    pub fn str_list(&self, field: &'static str) -> Result<Vec<&'a str>, Error> {
        self.array(field)?
            .iter()
            .map(|value| {
                value
                    .as_str()
                    .ok_or_else(|| self.wrong_type(field, "array of strings"))
            })
            .collect()
    }

    /// A codec string decoded into plain integers.
    pub fn integers(&self, field: &'static str) -> Result<Vec<u32>, Error> {
        codec::decode_integer_list(self.str(field)?).map_err(|source| Error::Codec {
            kind: self.kind,
            field,
            source,
        })
    }

    /// A codec string of deltas decoded into absolute values.
    pub fn undelta_integers(&self, field: &'static str) -> Result<Vec<u32>, Error> {
        codec::undelta_list(&self.integers(field)?).map_err(|source| Error::Codec {
            kind: self.kind,
            field,
            source,
        })
    }
}
