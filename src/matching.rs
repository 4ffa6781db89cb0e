//! Ride-compatibility matching engine
//!
//! Given a finalized pooled reservation, scans the repository for pooled
//! candidates from other users and returns the first compatible one in
//! repository order (oldest first). There is no ranking: first match wins,
//! and the full candidate set is scanned without time or distance
//! pre-filters. The scan is read-only and best-effort; internal failures
//! degrade to "no match" with a log line rather than failing the caller's
//! turn.

use crate::classifier::{CompatibilityClassifier, FeatureVector};
use crate::geo;
use crate::repository::ReservationRepository;
use crate::reservation::{minutes_since_midnight, ReservationRecord, RideMode};
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How candidate compatibility is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Geographic matching: feature vector fed to the trained classifier
    Classifier,
    /// Exact origin string and exact time string must both match
    ExactOriginTime,
}

/// The matching engine, read-only against the repository
pub struct MatchEngine {
    repository: Arc<dyn ReservationRepository>,
    classifier: CompatibilityClassifier,
    strategy: MatchStrategy,
}

impl MatchEngine {
    /// Create an engine over a repository
    ///
    /// The classifier is trained here, once; it is read-only afterwards.
    pub fn new(repository: Arc<dyn ReservationRepository>, strategy: MatchStrategy) -> Self {
        Self {
            repository,
            classifier: CompatibilityClassifier::train(),
            strategy,
        }
    }

    /// Find a compatible rideshare partner for a finalized reservation
    ///
    /// Returns the first compatible candidate's user id in scan order, or
    /// `None`. Non-pooled reservations are rejected immediately.
    pub async fn find_match(&self, record: &ReservationRecord) -> Option<UserId> {
        if record.mode != RideMode::Pooled {
            debug!(user_id = %record.user_id, "Not a pooled reservation, skipping match");
            return None;
        }

        let candidates = match self.repository.scan_pooled_excluding(&record.user_id).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(user_id = %record.user_id, error = %e, "Candidate scan failed");
                return None;
            }
        };

        debug!(
            user_id = %record.user_id,
            candidate_count = candidates.len(),
            strategy = ?self.strategy,
            "Scanning pooled candidates"
        );

        let matched = match self.strategy {
            MatchStrategy::Classifier => self.first_classifier_match(record, &candidates),
            MatchStrategy::ExactOriginTime => candidates
                .iter()
                .find(|c| c.route.origin == record.route.origin && c.time == record.time)
                .map(|c| c.user_id.clone()),
        };

        if let Some(ref partner) = matched {
            info!(
                user_id = %record.user_id,
                partner = %partner,
                "Compatible rideshare partner found"
            );
        }

        matched
    }

    fn first_classifier_match(
        &self,
        record: &ReservationRecord,
        candidates: &[ReservationRecord],
    ) -> Option<UserId> {
        let own_minutes = match minutes_since_midnight(&record.time) {
            Some(minutes) => minutes,
            None => {
                warn!(
                    user_id = %record.user_id,
                    time = %record.time,
                    "Stored reservation time is malformed, treating as no match"
                );
                return None;
            }
        };

        for candidate in candidates {
            let candidate_minutes = match minutes_since_midnight(&candidate.time) {
                Some(minutes) => minutes,
                None => {
                    warn!(
                        candidate_id = %candidate.id,
                        time = %candidate.time,
                        "Candidate time is malformed, skipping"
                    );
                    continue;
                }
            };

            let features = FeatureVector {
                distance_km: geo::distance_km(
                    record.route.origin_coord,
                    candidate.route.origin_coord,
                ),
                time_diff_minutes: (own_minutes - candidate_minutes).abs(),
                payment_matches: record.payment == candidate.payment,
            };

            if self.classifier.predict(&features) {
                return Some(candidate.user_id.clone());
            }
        }

        None
    }
}
