//! Reservation repository
//!
//! This module provides the trait-based abstraction over the durable store
//! of finalized reservations, plus the in-memory implementation used by
//! tests and single-instance runs. The store is append-only: records are
//! inserted once and never updated or deleted.

use crate::error::StorageError;
use crate::reservation::{NewReservation, ReservationRecord, RideMode};
use crate::types::{RecordId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Trait for reservation storage backends
///
/// Implementors must assign strictly increasing ids on insert and return
/// scan results ordered by id ascending (oldest first).
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a finalized reservation and return the assigned id
    async fn insert(&self, reservation: NewReservation) -> Result<RecordId, StorageError>;

    /// All records for one user, oldest first
    async fn scan_by_user(&self, user_id: &UserId)
        -> Result<Vec<ReservationRecord>, StorageError>;

    /// All pooled records belonging to other users, oldest first
    ///
    /// This is the matching engine's candidate set; no time or origin
    /// pre-filter is applied.
    async fn scan_pooled_excluding(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ReservationRecord>, StorageError>;
}

/// In-memory reservation repository
///
/// Records live in a Vec protected by an async RwLock; insert order is id
/// order, so scans come back oldest first for free. Suitable for
/// development, testing, and single-instance deployments.
///
/// # Examples
///
/// ```
/// use ridepool::{MemoryRepository, NewReservation, ReservationRepository, RideMode, RouteLeg, UserId};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repo = MemoryRepository::new();
///     let reservation = NewReservation {
///         user_id: UserId::from("U1"),
///         route: RouteLeg::parse("台北車站 到 台大", "到")?,
///         mode: RideMode::Pooled,
///         time: "15:30".to_string(),
///         payment: "cash".to_string(),
///     };
///     let id = repo.insert(reservation).await?;
///
///     let records = repo.scan_by_user(&UserId::from("U1")).await?;
///     assert_eq!(records.len(), 1);
///     assert_eq!(records[0].id, id);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    records: Arc<RwLock<Vec<ReservationRecord>>>,
}

impl MemoryRepository {
    /// Create a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of records currently stored
    ///
    /// This is useful for monitoring and testing purposes.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the repository is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for MemoryRepository {
    async fn insert(&self, reservation: NewReservation) -> Result<RecordId, StorageError> {
        let mut records = self.records.write().await;
        let id = RecordId::new(records.len() as i64 + 1);
        let record = reservation.into_record(id);
        debug!(
            record_id = %id,
            user_id = %record.user_id,
            mode = %record.mode,
            "Reservation inserted"
        );
        records.push(record);
        Ok(id)
    }

    async fn scan_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ReservationRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn scan_pooled_excluding(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ReservationRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| &r.user_id != user_id && r.mode == RideMode::Pooled)
            .cloned()
            .collect())
    }
}
