//! Suggestions slice.
//!
//! Subscription plus three composable primitives instead of full CRUD:
//! apply a status in place, remove in place, and roll back to a snapshot.
//! Each primitive returns (or consumes) an explicit snapshot so feature
//! code can wrap its own optimistic sequence around a gateway call and
//! whatever else belongs to it — reviewing a suggestion also writes an
//! audit activity, and these helpers deliberately know nothing about that.

use std::sync::Arc;

use tokio::sync::watch;

use gangway_core::suggestion::{Suggestion, SuggestionStatus};
use gangway_core::types::DbId;
use gangway_gateway::{Gateway, Push, SuggestionGateway};

use crate::coordinator::{Released, ReleaseHandle, SubscriptionCoordinator};
use crate::state::{SliceError, SliceState};

/// Pre-mutation copy of the suggestions array, fed back to
/// [`rollback`](SuggestionsSlice::rollback) on failure.
pub type SuggestionsSnapshot = Vec<Suggestion>;

pub struct SuggestionsSlice {
    gateway: Arc<dyn Gateway>,
    state: Arc<watch::Sender<SliceState<Suggestion>>>,
    coordinator: Arc<SubscriptionCoordinator>,
}

impl SuggestionsSlice {
    pub(crate) fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (state, _) = watch::channel(SliceState::default());
        Self {
            gateway,
            state: Arc::new(state),
            coordinator: Arc::new(SubscriptionCoordinator::new()),
        }
    }

    /// Start (or join) the suggestions subscription.
    pub fn subscribe(&self) -> (watch::Receiver<SliceState<Suggestion>>, ReleaseHandle) {
        if self.coordinator.acquire(()) {
            self.state.send_modify(|s| {
                s.loading = true;
                s.error = None;
            });
            let sink = Arc::clone(&self.state);
            let push: Push<Suggestion> = Arc::new(move |items| {
                sink.send_modify(|s| {
                    s.data = items;
                    s.loading = false;
                });
            });
            match self.gateway.subscribe_suggestions(push) {
                Ok(unsubscribe) => self.coordinator.attach(&(), unsubscribe),
                Err(error) => {
                    tracing::warn!(error = %error, "suggestions subscription setup failed");
                    self.state.send_modify(|s| {
                        s.error = Some(SliceError::Subscription(error.to_string()));
                        s.loading = false;
                    });
                }
            }
        }

        let coordinator = Arc::clone(&self.coordinator);
        let sink = Arc::clone(&self.state);
        let handle = ReleaseHandle::new(move || {
            if let Released::Last(unsubscribe) = coordinator.release(&()) {
                if let Some(unsubscribe) = unsubscribe {
                    unsubscribe();
                }
                sink.send_modify(|s| *s = SliceState::default());
            }
        });
        (self.state.subscribe(), handle)
    }

    /// Clone of the currently published state.
    pub fn current(&self) -> SliceState<Suggestion> {
        self.state.borrow().clone()
    }

    /// Optimistically set a suggestion's status in place.
    ///
    /// Returns the pre-mutation snapshot; the caller holds it across its
    /// gateway call and feeds it to [`rollback`](Self::rollback) on failure.
    pub fn apply_status(&self, id: DbId, status: SuggestionStatus) -> SuggestionsSnapshot {
        let mut snapshot = Vec::new();
        self.state.send_modify(|s| {
            snapshot = s.data.clone();
            if let Some(suggestion) = s.data.iter_mut().find(|item| item.id == id) {
                suggestion.status = status;
            }
        });
        snapshot
    }

    /// Optimistically remove a suggestion in place.
    ///
    /// Returns the pre-mutation snapshot, like [`apply_status`](Self::apply_status).
    pub fn apply_remove(&self, id: DbId) -> SuggestionsSnapshot {
        let mut snapshot = Vec::new();
        self.state.send_modify(|s| {
            snapshot = s.data.clone();
            s.data.retain(|item| item.id != id);
        });
        snapshot
    }

    /// Restore a snapshot returned by one of the apply primitives.
    pub fn rollback(&self, snapshot: SuggestionsSnapshot) {
        self.state.send_modify(|s| s.data = snapshot);
    }

    /// Tear down the live subscription (if any) and reset the state.
    pub(crate) fn dispose(&self) {
        for unsubscribe in self.coordinator.dispose() {
            unsubscribe();
        }
        self.state.send_modify(|s| *s = SliceState::default());
    }
}
