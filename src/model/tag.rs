//! Key/value labels attached to photos.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A free-form `key: value` label.
///
/// Equality, ordering and hashing are structural over both fields, so
/// `Location: Paris` and `Location: Rome` are distinct tags and a photo
/// may carry both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    key: String,
    value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Display label, `"key: value"`. Never parsed back into a tag.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}
