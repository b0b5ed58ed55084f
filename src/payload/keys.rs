use std::collections::HashMap;

use serde::Deserialize;

use crate::payload::Error;

/// Field name to array position, per record kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ArrayKeys(HashMap<String, HashMap<String, usize>>);

impl ArrayKeys {
    pub fn position(&self, kind: &'static str, field: &'static str) -> Result<usize, Error> {
        self.0
            .get(kind)
            .and_then(|fields| fields.get(field))
            .copied()
            .ok_or(Error::MissingKey { kind, field })
    }

    /// Number of fields a record of `kind` is expected to hold.
    pub fn arity(&self, kind: &'static str) -> Result<usize, Error> {
        self.0
            .get(kind)
            .and_then(|fields| fields.values().max())
            .map(|max| max + 1)
            .ok_or(Error::MissingKey { kind, field: "*" })
    }

    pub fn insert(&mut self, kind: &str, fields: &[&str]) {
        let entry = self.0.entry(kind.to_owned()).or_default();
        for (i, field) in fields.iter().enumerate() {
            entry.insert((*field).to_owned(), i);
        }
    }
}

#[test]
fn arity_test() {
    let mut keys = ArrayKeys::default();
    keys.insert("trip_group", &["shape_i", "stop_distances_i"]);
    assert_eq!(keys.position("trip_group", "stop_distances_i").unwrap(), 1);
    assert_eq!(keys.arity("trip_group").unwrap(), 2);
    assert!(keys.position("trip_group", "missing").is_err());
    assert!(keys.arity("route").is_err());
}
