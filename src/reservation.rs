//! Reservation data model
//!
//! This module provides the in-progress reservation draft, the finalized
//! reservation record, and the parsing helpers for the route and time inputs.
//!
//! The draft is a tagged union whose variant encodes exactly which fields are
//! known, so setting a field out of order is unrepresentable: a mode can only
//! be attached to a `Route` draft, a time only to a `Mode` draft, and payment
//! consumes a `Time` draft into a [`NewReservation`].

use crate::error::DialogueError;
use crate::geo::{self, Coordinates};
use crate::types::{RecordId, UserId};
use chrono::{DateTime, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Whether a reservation is eligible for pooled-ride matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideMode {
    /// Eligible for matching with other pooled reservations
    Pooled,
    /// Rides alone; never matched
    Solo,
}

impl std::fmt::Display for RideMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RideMode::Pooled => write!(f, "pooled"),
            RideMode::Solo => write!(f, "solo"),
        }
    }
}

/// Origin and destination of a reservation, with resolved coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub origin: String,
    pub destination: String,
    pub origin_coord: Coordinates,
    pub dest_coord: Coordinates,
}

impl RouteLeg {
    /// Parse `"ORIGIN <separator> DESTINATION"` text into a route
    ///
    /// Requires exactly one separator occurrence; both sides are trimmed.
    /// Coordinates are resolved immediately, unknown names degrading to the
    /// sentinel.
    pub fn parse(text: &str, separator: &str) -> Result<Self, DialogueError> {
        let mut parts = text.split(separator);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(origin), Some(destination), None) => {
                let origin = origin.trim().to_string();
                let destination = destination.trim().to_string();
                let origin_coord = geo::resolve(&origin);
                let dest_coord = geo::resolve(&destination);
                Ok(Self {
                    origin,
                    destination,
                    origin_coord,
                    dest_coord,
                })
            }
            _ => Err(DialogueError::MalformedRoute(text.to_string())),
        }
    }
}

/// Stage of an in-progress draft, for logging and prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStage {
    HaveRoute,
    HaveMode,
    HaveTime,
}

/// In-progress reservation, one per user, owned by the draft store
///
/// Fields are populated strictly in the order route -> mode -> time; the
/// variant carries everything known so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ReservationDraft {
    /// Route chosen; waiting for the pooled/solo decision
    Route { route: RouteLeg },
    /// Mode chosen; waiting for the reservation time
    Mode { route: RouteLeg, mode: RideMode },
    /// Time chosen; waiting for the payment method
    Time {
        route: RouteLeg,
        mode: RideMode,
        time: String,
    },
}

impl ReservationDraft {
    /// Start a draft from a parsed route
    pub fn with_route(route: RouteLeg) -> Self {
        Self::Route { route }
    }

    /// Current stage of the draft
    pub fn stage(&self) -> DraftStage {
        match self {
            Self::Route { .. } => DraftStage::HaveRoute,
            Self::Mode { .. } => DraftStage::HaveMode,
            Self::Time { .. } => DraftStage::HaveTime,
        }
    }

    /// The route, known at every stage
    pub fn route(&self) -> &RouteLeg {
        match self {
            Self::Route { route } | Self::Mode { route, .. } | Self::Time { route, .. } => route,
        }
    }
}

/// Validate reservation-time text as wall-clock `HH:MM` (24-hour)
///
/// Returns the trimmed original text so the record stores exactly what the
/// user sent. The shape gate insists on two-digit hours and minutes; chrono
/// checks the ranges.
pub fn parse_time(text: &str) -> Result<String, DialogueError> {
    let trimmed = text.trim();
    let shape = Regex::new(r"^\d{2}:\d{2}$").expect("static pattern");
    if !shape.is_match(trimmed) {
        return Err(DialogueError::InvalidTime(text.to_string()));
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| DialogueError::InvalidTime(text.to_string()))?;
    Ok(trimmed.to_string())
}

/// Convert a stored `HH:MM` string to minutes since midnight
///
/// `None` for malformed stored values; matching treats those as
/// unmatchable rather than failing the turn.
pub fn minutes_since_midnight(time: &str) -> Option<i64> {
    let parsed = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
    Some(parsed.signed_duration_since(NaiveTime::MIN).num_minutes())
}

/// A complete, not-yet-persisted reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub user_id: UserId,
    pub route: RouteLeg,
    pub mode: RideMode,
    pub time: String,
    pub payment: String,
}

impl NewReservation {
    /// Freeze into a record with the repository-assigned id
    pub fn into_record(self, id: RecordId) -> ReservationRecord {
        ReservationRecord {
            id,
            user_id: self.user_id,
            route: self.route,
            mode: self.mode,
            time: self.time,
            payment: self.payment,
            created_at: Utc::now(),
        }
    }
}

/// A finalized reservation, immutable once inserted
///
/// Created only at draft completion; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub route: RouteLeg,
    pub mode: RideMode,
    pub time: String,
    pub payment: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parse_trims_both_sides() {
        let route = RouteLeg::parse("  台北車站 到 松山機場 ", "到").unwrap();
        assert_eq!(route.origin, "台北車站");
        assert_eq!(route.destination, "松山機場");
        assert!(!route.origin_coord.is_unknown());
        assert!(!route.dest_coord.is_unknown());
    }

    #[test]
    fn test_route_parse_unknown_origin_gets_sentinel() {
        let route = RouteLeg::parse("Mars Base 到 台大", "到").unwrap();
        assert_eq!(route.origin, "Mars Base");
        assert!(route.origin_coord.is_unknown());
        assert!(!route.dest_coord.is_unknown());
    }

    #[test]
    fn test_route_parse_rejects_double_separator() {
        let result = RouteLeg::parse("A 到 B 到 C", "到");
        assert!(matches!(result, Err(DialogueError::MalformedRoute(_))));
    }

    #[test]
    fn test_route_parse_rejects_missing_separator() {
        assert!(RouteLeg::parse("just some text", "到").is_err());
    }

    #[test]
    fn test_draft_stage_progression() {
        let route = RouteLeg::parse("台北車站 到 台大", "到").unwrap();
        let draft = ReservationDraft::with_route(route.clone());
        assert_eq!(draft.stage(), DraftStage::HaveRoute);

        let draft = ReservationDraft::Mode {
            route: route.clone(),
            mode: RideMode::Pooled,
        };
        assert_eq!(draft.stage(), DraftStage::HaveMode);
        assert_eq!(draft.route().origin, "台北車站");

        let draft = ReservationDraft::Time {
            route,
            mode: RideMode::Pooled,
            time: "15:30".to_string(),
        };
        assert_eq!(draft.stage(), DraftStage::HaveTime);
    }

    #[test]
    fn test_parse_time_accepts_valid() {
        assert_eq!(parse_time("15:30").unwrap(), "15:30");
        assert_eq!(parse_time(" 08:05 ").unwrap(), "08:05");
    }

    #[test]
    fn test_parse_time_rejects_invalid() {
        assert!(parse_time("half past three").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("12:60").is_err());
        assert!(parse_time("5:30").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn test_minutes_since_midnight() {
        assert_eq!(minutes_since_midnight("00:00"), Some(0));
        assert_eq!(minutes_since_midnight("15:30"), Some(930));
        assert_eq!(minutes_since_midnight("23:59"), Some(1439));
        assert_eq!(minutes_since_midnight("garbage"), None);
    }

    #[test]
    fn test_into_record_freezes_fields() {
        let route = RouteLeg::parse("台北車站 到 松山機場", "到").unwrap();
        let new = NewReservation {
            user_id: UserId::from("U1"),
            route,
            mode: RideMode::Pooled,
            time: "15:30".to_string(),
            payment: "cash".to_string(),
        };
        let record = new.clone().into_record(RecordId::new(1));
        assert_eq!(record.id, RecordId::new(1));
        assert_eq!(record.user_id, new.user_id);
        assert_eq!(record.time, "15:30");
        assert_eq!(record.payment, "cash");
    }

    #[test]
    fn test_ride_mode_serialization() {
        assert_eq!(serde_json::to_string(&RideMode::Pooled).unwrap(), "\"pooled\"");
        let mode: RideMode = serde_json::from_str("\"solo\"").unwrap();
        assert_eq!(mode, RideMode::Solo);
    }

    #[test]
    fn test_draft_serialization_round_trip() {
        let route = RouteLeg::parse("台大 到 松山機場", "到").unwrap();
        let draft = ReservationDraft::Mode {
            route,
            mode: RideMode::Solo,
        };
        let json = serde_json::to_string(&draft).unwrap();
        let deserialized: ReservationDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(draft, deserialized);
    }
}
