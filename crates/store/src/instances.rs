//! Onboarding-instances slice.

use std::sync::Arc;

use tokio::sync::watch;

use gangway_core::instance::{InstanceChanges, OnboardingInstance};
use gangway_core::step::StepStatus;
use gangway_core::types::DbId;
use gangway_gateway::{Gateway, InstanceGateway, Push};

use crate::coordinator::{Released, ReleaseHandle, SubscriptionCoordinator};
use crate::error::StoreError;
use crate::optimistic;
use crate::state::{SliceError, SliceState};

/// Shared state for the instances family.
///
/// `remove` is pessimistic (the backend call goes first) while `update` is
/// optimistic — preserved exactly as the admin screens behave.
pub struct InstancesSlice {
    gateway: Arc<dyn Gateway>,
    state: Arc<watch::Sender<SliceState<OnboardingInstance>>>,
    coordinator: Arc<SubscriptionCoordinator>,
}

impl InstancesSlice {
    pub(crate) fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (state, _) = watch::channel(SliceState::default());
        Self {
            gateway,
            state: Arc::new(state),
            coordinator: Arc::new(SubscriptionCoordinator::new()),
        }
    }

    /// Start (or join) the instances subscription.
    ///
    /// The first consumer opens the gateway subscription; every later call
    /// is a pure ref-count increment. The returned handle releases exactly
    /// one claim, idempotently.
    pub fn subscribe(
        &self,
    ) -> (
        watch::Receiver<SliceState<OnboardingInstance>>,
        ReleaseHandle,
    ) {
        if self.coordinator.acquire(()) {
            self.state.send_modify(|s| {
                s.loading = true;
                s.error = None;
            });
            let sink = Arc::clone(&self.state);
            let push: Push<OnboardingInstance> = Arc::new(move |items| {
                sink.send_modify(|s| {
                    s.data = items;
                    s.loading = false;
                });
            });
            match self.gateway.subscribe_instances(push) {
                Ok(unsubscribe) => self.coordinator.attach(&(), unsubscribe),
                Err(error) => {
                    tracing::warn!(error = %error, "instances subscription setup failed");
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
    pub fn current(&self) -> SliceState<OnboardingInstance> {
        self.state.borrow().clone()
    }

    /// Append a server-confirmed instance.
    ///
    /// The create call has already succeeded (and returned the assigned id)
    /// before this runs, so there is nothing optimistic to roll back. The
    /// realtime push may have delivered the record first; appending again
    /// would double it until the next push, so known ids are skipped.
    pub fn add_confirmed(&self, instance: OnboardingInstance) {
        self.state.send_modify(|s| {
            if !s.data.iter().any(|i| i.id == instance.id) {
                s.data.push(instance);
            }
        });
    }

    /// Optimistic partial update with whole-array rollback.
    pub async fn update(&self, id: DbId, changes: InstanceChanges) -> Result<(), StoreError> {
        let call = self.gateway.update_instance(id, changes.clone());
        let sink = Arc::clone(&self.state);
        optimistic::run(
            || {
                let mut snapshot = Vec::new();
                self.state.send_modify(|s| {
                    snapshot = s.data.clone();
                    if let Some(instance) = s.data.iter_mut().find(|i| i.id == id) {
                        changes.apply(instance);
                    }
                });
                snapshot
            },
            call,
            move |snapshot| sink.send_modify(|s| s.data = snapshot),
        )
        .await
    }

    /// Pessimistic delete: the backend call goes first and local state is
    /// only touched after it succeeds. On failure nothing moved, so the
    /// error propagates with no rollback.
    pub async fn remove(&self, id: DbId) -> Result<(), StoreError> {
        self.gateway.delete_instance(id).await?;
        self.state.send_modify(|s| s.data.retain(|i| i.id != id));
        Ok(())
    }

    // -- cross-slice hooks for the steps slice ------------------------------

    /// Snapshot of the embedded view, captured by the steps slice before a
    /// joint step-status mutation.
    pub(crate) fn snapshot(&self) -> Vec<OnboardingInstance> {
        self.state.borrow().data.clone()
    }

    /// Restore a snapshot taken by [`snapshot`](Self::snapshot).
    pub(crate) fn restore(&self, snapshot: Vec<OnboardingInstance>) {
        self.state.send_modify(|s| s.data = snapshot);
    }

    /// Mirror a step-status change into the matching instance's embedded
    /// checklist, re-deriving its progress and lifecycle status.
    pub(crate) fn apply_embedded_step_status(
        &self,
        instance_id: DbId,
        step_id: DbId,
        status: StepStatus,
    ) {
        self.state.send_modify(|s| {
            if let Some(instance) = s.data.iter_mut().find(|i| i.id == instance_id) {
                // A missing step only means this view lags the backend; the
                // gateway call is what decides, and rollback covers failure.
                let _ = instance.apply_step_status(step_id, status);
            }
        });
    }

    /// Tear down the live subscription (if any) and reset the state.
    pub(crate) fn dispose(&self) {
        for unsubscribe in self.coordinator.dispose() {
            unsubscribe();
        }
        self.state.send_modify(|s| *s = SliceState::default());
    }
}
