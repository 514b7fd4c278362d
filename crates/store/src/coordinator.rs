//! Ref-counted subscription seats.
//!
//! At most one live gateway subscription may exist per (family, key) pair no
//! matter how many consumers asked for it. Each slice owns one coordinator;
//! the steps slice keys seats by instance id, every other family uses the
//! unit key. A seat is one record per key — `count > 0` implies the handle
//! field is where a live handle would be — so the two can never drift apart.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use gangway_gateway::Unsubscribe;

/// One live (or opening) subscription for a key.
struct Seat {
    count: usize,
    unsubscribe: Option<Unsubscribe>,
}

/// Outcome of releasing one consumer.
pub enum Released {
    /// Other consumers remain; nothing to tear down.
    NotLast,
    /// This was the last consumer. Carries the stored unsubscribe handle
    /// (absent when the subscription never opened successfully); the caller
    /// invokes it outside the coordinator lock and resets slice state.
    Last(Option<Unsubscribe>),
}

/// Ref-counts consumers per key.
///
/// Explicitly constructed and owned by its slice (not module-global) so
/// tests get clean isolation; [`dispose`](Self::dispose) drains every seat.
pub struct SubscriptionCoordinator<K = ()> {
    seats: Mutex<HashMap<K, Seat>>,
}

impl<K: Eq + Hash> SubscriptionCoordinator<K> {
    pub fn new() -> Self {
        Self {
            seats: Mutex::new(HashMap::new()),
        }
    }

    fn seats(&self) -> MutexGuard<'_, HashMap<K, Seat>> {
        self.seats.lock().expect("subscription coordinator lock poisoned")
    }

    /// Register one consumer for `key`.
    ///
    /// Returns `true` when this consumer is the first and the caller must
    /// open the gateway subscription. Any later consumer is a pure
    /// ref-count increment with no further side effects.
    pub fn acquire(&self, key: K) -> bool {
        let mut seats = self.seats();
        let seat = seats.entry(key).or_insert(Seat {
            count: 0,
            unsubscribe: None,
        });
        seat.count += 1;
        seat.count == 1
    }

    /// Store the live unsubscribe handle for `key` after a successful open.
    ///
    /// When every consumer already left while the open was in flight, the
    /// handle is invoked immediately instead of leaking a live subscription.
    pub fn attach(&self, key: &K, unsubscribe: Unsubscribe) {
        let orphaned = {
            let mut seats = self.seats();
            match seats.get_mut(key) {
                Some(seat) => {
                    seat.unsubscribe = Some(unsubscribe);
                    None
                }
                None => Some(unsubscribe),
            }
        };
        if let Some(unsubscribe) = orphaned {
            unsubscribe();
        }
    }

    /// Drop one consumer for `key`.
    ///
    /// When the last consumer leaves the seat is removed and its stored
    /// handle handed back; a brand-new subscription must be opened by the
    /// next first consumer (no stale handle reuse across cycles).
    pub fn release(&self, key: &K) -> Released {
        let mut seats = self.seats();
        let Some(seat) = seats.get_mut(key) else {
            tracing::debug!("release on an already-empty seat");
            return Released::NotLast;
        };
        seat.count -= 1;
        if seat.count > 0 {
            return Released::NotLast;
        }
        let seat = seats.remove(key).expect("seat present above");
        Released::Last(seat.unsubscribe)
    }

    /// Current consumer count for `key`.
    pub fn consumer_count(&self, key: &K) -> usize {
        self.seats().get(key).map_or(0, |seat| seat.count)
    }

    /// Drain every seat, returning the live handles for the caller to
    /// invoke. Used for whole-store teardown and test isolation.
    pub fn dispose(&self) -> Vec<Unsubscribe> {
        self.seats()
            .drain()
            .filter_map(|(_, seat)| seat.unsubscribe)
            .collect()
    }
}

impl<K: Eq + Hash> Default for SubscriptionCoordinator<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ReleaseHandle
// ---------------------------------------------------------------------------

/// Cleanup returned to every subscription consumer.
///
/// [`release`](Self::release) drops this consumer's claim exactly once;
/// further calls are no-ops (the guard is captured per handle, not shared).
/// Dropping an unreleased handle releases it too, so a consumer that goes
/// away without explicit cleanup cannot pin a subscription open.
pub struct ReleaseHandle {
    action: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseHandle")
            .field("released", &self.action.is_none())
            .finish()
    }
}

impl ReleaseHandle {
    pub(crate) fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// Idempotent release of this consumer's claim.
    pub fn release(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    pub fn is_released(&self) -> bool {
        self.action.is_none()
    }
}

impl Drop for ReleaseHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting_unsubscribe(closed: &Arc<AtomicUsize>) -> Unsubscribe {
        let closed = Arc::clone(closed);
        Box::new(move || {
            closed.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_first_acquire_only() {
        let coordinator = SubscriptionCoordinator::<()>::new();
        assert!(coordinator.acquire(()));
        assert!(!coordinator.acquire(()));
        assert!(!coordinator.acquire(()));
        assert_eq!(coordinator.consumer_count(&()), 3);
    }

    #[test]
    fn test_unsubscribe_returned_only_to_last_release() {
        let coordinator = SubscriptionCoordinator::<()>::new();
        let closed = Arc::new(AtomicUsize::new(0));

        coordinator.acquire(());
        coordinator.attach(&(), counting_unsubscribe(&closed));
        coordinator.acquire(());

        assert!(matches!(coordinator.release(&()), Released::NotLast));
        assert_eq!(closed.load(Ordering::SeqCst), 0);

        match coordinator.release(&()) {
            Released::Last(Some(unsubscribe)) => unsubscribe(),
            _ => panic!("expected the stored handle"),
        }
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.consumer_count(&()), 0);
    }

    #[test]
    fn test_fresh_cycle_after_teardown() {
        let coordinator = SubscriptionCoordinator::<()>::new();
        coordinator.acquire(());
        coordinator.attach(&(), Box::new(|| {}));
        assert!(matches!(coordinator.release(&()), Released::Last(Some(_))));

        // A brand-new cycle: first consumer again.
        assert!(coordinator.acquire(()));
        // No stale handle survived the teardown.
        assert!(matches!(coordinator.release(&()), Released::Last(None)));
    }

    #[test]
    fn test_keys_are_independent() {
        let coordinator = SubscriptionCoordinator::<i64>::new();
        let closed_a = Arc::new(AtomicUsize::new(0));
        let closed_b = Arc::new(AtomicUsize::new(0));

        coordinator.acquire(1);
        coordinator.attach(&1, counting_unsubscribe(&closed_a));
        coordinator.acquire(2);
        coordinator.attach(&2, counting_unsubscribe(&closed_b));

        match coordinator.release(&1) {
            Released::Last(Some(unsubscribe)) => unsubscribe(),
            _ => panic!("expected A's handle"),
        }
        assert_eq!(closed_a.load(Ordering::SeqCst), 1);
        assert_eq!(closed_b.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.consumer_count(&2), 1);
    }

    #[test]
    fn test_attach_after_full_release_closes_immediately() {
        let coordinator = SubscriptionCoordinator::<()>::new();
        let closed = Arc::new(AtomicUsize::new(0));

        coordinator.acquire(());
        let _ = coordinator.release(&());
        // The open completed after everyone left.
        coordinator.attach(&(), counting_unsubscribe(&closed));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_handle_is_idempotent() {
        let ran = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&ran);
        let mut handle = ReleaseHandle::new(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!handle.is_released());
        handle.release();
        handle.release();
        assert!(handle.is_released());
        drop(handle);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_handle_fires_on_drop() {
        let ran = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&ran);
        drop(ReleaseHandle::new(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispose_drains_every_seat() {
        let coordinator = SubscriptionCoordinator::<i64>::new();
        let closed = Arc::new(AtomicUsize::new(0));
        for key in [1, 2, 3] {
            coordinator.acquire(key);
            coordinator.attach(&key, counting_unsubscribe(&closed));
        }

        for unsubscribe in coordinator.dispose() {
            unsubscribe();
        }
        assert_eq!(closed.load(Ordering::SeqCst), 3);
        assert_eq!(coordinator.consumer_count(&1), 0);
    }
}
