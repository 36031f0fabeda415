use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Login credentials supplied per call. Never persisted, never logged.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Binary verdict derived from the post-submit URL. `Indeterminate` is
/// part of the model but is never produced; the URL substring test only
/// distinguishes two cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Rejected,
    Indeterminate,
}

/// One table row as a flat label -> trimmed text mapping.
///
/// Key order follows column order (serde_json's preserve_order map), and
/// a duplicate label overwrites the earlier value within the same record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: String, text: String) {
        self.0.insert(label, Value::String(text));
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).and_then(Value::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered sequence of records produced by one extraction pass.
pub type RecordSet = Vec<Record>;
