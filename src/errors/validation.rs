use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";

/// Failure reasons keyed by field name, ordered by field so payloads and log
/// lines come out stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, reason: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(reason.to_string());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "{}", fields.join(", "))
    }
}
