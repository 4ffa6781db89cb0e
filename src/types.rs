//! Common type definitions used throughout the ridepool library
//!
//! This module provides newtype wrappers for type-safe identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a user, assigned by the messaging transport
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a transport-assigned user identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Sequential identifier for a persisted reservation record
///
/// Assigned by the repository on insert; strictly increasing with insert
/// order, so scan results ordered by id are oldest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a repository-assigned record id
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying numeric id
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_str() {
        let id = UserId::from("U1234");
        assert_eq!(id.as_str(), "U1234");
        assert_eq!(format!("{}", id), "U1234");
    }

    #[test]
    fn test_user_id_equality() {
        assert_eq!(UserId::from("a"), UserId::new("a"));
        assert_ne!(UserId::from("a"), UserId::from("b"));
    }

    #[test]
    fn test_user_id_serialization() {
        let id = UserId::from("U1234");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"U1234\"");

        let deserialized: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_record_id_ordering() {
        let first = RecordId::new(1);
        let second = RecordId::new(2);
        assert!(first < second);
        assert_eq!(second.as_i64(), 2);
    }

    #[test]
    fn test_record_id_serialization() {
        let id = RecordId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
