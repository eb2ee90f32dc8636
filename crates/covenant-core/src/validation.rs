//! # Validation Module
//!
//! Structured validation failures for API responses.
//!
//! ## Design Principles (SOLID)
//!
//! - **S**: Only handles validation failure representation
//! - **O**: Issue paths extend to arbitrary nesting without changes here
//! - **L**: Validation failures travel as ordinary errors

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// A single schema violation at one location in a validated value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Path segments into the validated structure (empty for the root)
    pub path: Vec<String>,
    /// Human-readable error message
    pub message: String,
}

impl Issue {
    /// Create an issue at the given path
    pub fn new(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Create an issue at the root of the validated value
    pub fn root(message: impl Into<String>) -> Self {
        Self::new(Vec::new(), message)
    }

    /// Dot-joined path key ("user.email"; "" for the root)
    #[must_use]
    pub fn path_key(&self) -> String {
        self.path.join(".")
    }
}

/// Flatten issues into the field-path to message map the error envelope
/// carries. Later issues on the same path overwrite earlier ones.
#[must_use]
pub fn issue_map(issues: &[Issue]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for issue in issues {
        map.insert(issue.path_key(), issue.message.clone());
    }
    map
}

/// Request data failed contract validation
///
/// Carries the per-section message ("Invalid URL parameters", ...) and the
/// flattened field map. Always rendered to the client as a 400.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationException {
    /// Which section of the request failed, in client-facing words
    pub message: String,
    /// Field path to message
    pub issues: BTreeMap<String, String>,
}

impl ValidationException {
    /// Build from the issues a schema parse produced
    pub fn new(message: impl Into<String>, issues: &[Issue]) -> Self {
        Self {
            message: message.into(),
            issues: issue_map(issues),
        }
    }
}
