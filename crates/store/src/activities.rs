//! Activity-feed slice: subscription only.
//!
//! Activities are append-only audit entries; nothing in the client ever
//! mutates one. New entries are written through the gateway by feature
//! code (see [`Session`](crate::session::Session)) and arrive here via the
//! subscription like everything else.

use std::sync::Arc;

use tokio::sync::watch;

use gangway_core::activity::Activity;
use gangway_gateway::{ActivityGateway, Gateway, Push};

use crate::coordinator::{Released, ReleaseHandle, SubscriptionCoordinator};
use crate::state::{SliceError, SliceState};

pub struct ActivitiesSlice {
    gateway: Arc<dyn Gateway>,
    state: Arc<watch::Sender<SliceState<Activity>>>,
    coordinator: Arc<SubscriptionCoordinator>,
}

impl ActivitiesSlice {
    pub(crate) fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (state, _) = watch::channel(SliceState::default());
        Self {
            gateway,
            state: Arc::new(state),
            coordinator: Arc::new(SubscriptionCoordinator::new()),
        }
    }

    /// Start (or join) the activity-feed subscription.
    pub fn subscribe(&self) -> (watch::Receiver<SliceState<Activity>>, ReleaseHandle) {
        if self.coordinator.acquire(()) {
            self.state.send_modify(|s| {
                s.loading = true;
                s.error = None;
            });
            let sink = Arc::clone(&self.state);
            let push: Push<Activity> = Arc::new(move |items| {
                sink.send_modify(|s| {
                    s.data = items;
                    s.loading = false;
                });
            });
            match self.gateway.subscribe_activities(push) {
                Ok(unsubscribe) => self.coordinator.attach(&(), unsubscribe),
                Err(error) => {
                    tracing::warn!(error = %error, "activities subscription setup failed");
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
    pub fn current(&self) -> SliceState<Activity> {
        self.state.borrow().clone()
    }

    /// Tear down the live subscription (if any) and reset the state.
    pub(crate) fn dispose(&self) {
        for unsubscribe in self.coordinator.dispose() {
            unsubscribe();
        }
        self.state.send_modify(|s| *s = SliceState::default());
    }
}
