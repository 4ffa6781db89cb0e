//! Per-user draft session store
//!
//! Holds at most one in-progress [`ReservationDraft`] per user, in memory
//! only (an interrupted dialogue restarts from scratch after a process
//! restart). The outer RwLock guards only the user-to-slot map; each slot
//! carries its own async Mutex, so turns for different users proceed
//! concurrently while duplicate deliveries for the same user serialize.
//!
//! Callers hold the [`DraftGuard`] for the inspect-and-mutate section of a
//! turn and must drop it before any repository call.

use crate::reservation::ReservationDraft;
use crate::types::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::trace;

type Slot = Arc<Mutex<Option<ReservationDraft>>>;

/// In-memory store of in-progress drafts, one slot per user
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    slots: Arc<RwLock<HashMap<UserId, Slot>>>,
}

impl DraftStore {
    /// Create a new empty draft store
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Acquire the exclusive per-user section
    ///
    /// Creates the slot on first use. The returned guard serializes all
    /// access to that user's draft until dropped.
    pub async fn lock_user(&self, user_id: &UserId) -> DraftGuard {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(user_id).cloned()
        };

        let slot = match slot {
            Some(slot) => slot,
            None => {
                let mut slots = self.slots.write().await;
                slots
                    .entry(user_id.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(None)))
                    .clone()
            }
        };

        trace!(user_id = %user_id, "Acquiring draft slot");
        DraftGuard {
            inner: slot.lock_owned().await,
        }
    }

    /// Number of users with a slot (present or cleared)
    ///
    /// This is useful for monitoring and testing purposes.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Check if no slots exist
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

/// Exclusive handle on one user's draft slot
///
/// Dropping the guard releases the per-user section unconditionally.
pub struct DraftGuard {
    inner: OwnedMutexGuard<Option<ReservationDraft>>,
}

impl DraftGuard {
    /// The current draft, if any (get-or-absent)
    pub fn get(&self) -> Option<&ReservationDraft> {
        self.inner.as_ref()
    }

    /// Replace the draft (upsert)
    pub fn upsert(&mut self, draft: ReservationDraft) {
        *self.inner = Some(draft);
    }

    /// Remove and return the draft, leaving the slot empty
    pub fn take(&mut self) -> Option<ReservationDraft> {
        self.inner.take()
    }

    /// Remove the draft unconditionally
    pub fn clear(&mut self) {
        *self.inner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::{DraftStage, RouteLeg};
    use std::time::Duration;

    fn route_draft() -> ReservationDraft {
        ReservationDraft::with_route(RouteLeg::parse("台北車站 到 台大", "到").unwrap())
    }

    #[tokio::test]
    async fn test_get_absent_for_new_user() {
        let store = DraftStore::new();
        let guard = store.lock_user(&UserId::from("U1")).await;
        assert!(guard.get().is_none());
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = DraftStore::new();
        {
            let mut guard = store.lock_user(&UserId::from("U1")).await;
            guard.upsert(route_draft());
        }
        let guard = store.lock_user(&UserId::from("U1")).await;
        assert_eq!(guard.get().unwrap().stage(), DraftStage::HaveRoute);
    }

    #[tokio::test]
    async fn test_clear_removes_draft() {
        let store = DraftStore::new();
        let mut guard = store.lock_user(&UserId::from("U1")).await;
        guard.upsert(route_draft());
        guard.clear();
        assert!(guard.get().is_none());
    }

    #[tokio::test]
    async fn test_take_empties_slot() {
        let store = DraftStore::new();
        {
            let mut guard = store.lock_user(&UserId::from("U1")).await;
            guard.upsert(route_draft());
            let taken = guard.take();
            assert!(taken.is_some());
            assert!(guard.get().is_none());
        }
        let guard = store.lock_user(&UserId::from("U1")).await;
        assert!(guard.get().is_none());
    }

    #[tokio::test]
    async fn test_drafts_are_isolated_per_user() {
        let store = DraftStore::new();
        {
            let mut guard = store.lock_user(&UserId::from("U1")).await;
            guard.upsert(route_draft());
        }
        let guard = store.lock_user(&UserId::from("U2")).await;
        assert!(guard.get().is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_same_user_turns_serialize() {
        let store = DraftStore::new();
        let user = UserId::from("U1");

        let guard = store.lock_user(&user).await;

        let store_clone = store.clone();
        let user_clone = user.clone();
        let contender = tokio::spawn(async move {
            let mut guard = store_clone.lock_user(&user_clone).await;
            guard.upsert(ReservationDraft::with_route(
                RouteLeg::parse("台大 到 松山機場", "到").unwrap(),
            ));
        });

        // The second turn cannot proceed while the first guard is held
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();

        let guard = store.lock_user(&user).await;
        assert_eq!(guard.get().unwrap().route().origin, "台大");
    }

    #[tokio::test]
    async fn test_different_users_do_not_block() {
        let store = DraftStore::new();
        let _held = store.lock_user(&UserId::from("U1")).await;

        // A different user's turn must complete while U1's guard is held
        let other = tokio::time::timeout(Duration::from_secs(1), async {
            let mut guard = store.lock_user(&UserId::from("U2")).await;
            guard.upsert(route_draft());
        })
        .await;
        assert!(other.is_ok());
    }
}
