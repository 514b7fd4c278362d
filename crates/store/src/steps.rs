//! Per-instance steps slice.
//!
//! The same ref-counting machine as every other family, but keyed by
//! instance id: independent seats, handles, and state entries per key.
//! Starting or stopping one key never touches another key's subscription
//! or data.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;

use gangway_core::step::{Step, StepStatus};
use gangway_core::types::DbId;
use gangway_gateway::{Gateway, Push, StepGateway};

use crate::coordinator::{Released, ReleaseHandle, SubscriptionCoordinator};
use crate::error::StoreError;
use crate::instances::InstancesSlice;
use crate::optimistic;
use crate::state::{KeyedSteps, SliceError};

/// The keyed steps cache: instance id to that instance's checklist entry.
pub type StepsByInstance = HashMap<DbId, KeyedSteps>;

pub struct StepsSlice {
    gateway: Arc<dyn Gateway>,
    /// The embedded-steps view that must stay in lockstep with this cache.
    instances: Arc<InstancesSlice>,
    state: Arc<watch::Sender<StepsByInstance>>,
    coordinator: Arc<SubscriptionCoordinator<DbId>>,
}

impl StepsSlice {
    pub(crate) fn new(gateway: Arc<dyn Gateway>, instances: Arc<InstancesSlice>) -> Self {
        let (state, _) = watch::channel(StepsByInstance::new());
        Self {
            gateway,
            instances,
            state: Arc::new(state),
            coordinator: Arc::new(SubscriptionCoordinator::new()),
        }
    }

    /// Start (or join) the steps subscription for one instance.
    ///
    /// Teardown of the key's last consumer removes the key's cache entry
    /// entirely; other keys are untouched.
    pub fn subscribe(&self, instance_id: DbId) -> (watch::Receiver<StepsByInstance>, ReleaseHandle) {
        if self.coordinator.acquire(instance_id) {
            self.state.send_modify(|cache| {
                let entry = cache.entry(instance_id).or_default();
                entry.loading = true;
                entry.error = None;
            });
            let sink = Arc::clone(&self.state);
            let push: Push<Step> = Arc::new(move |steps| {
                sink.send_modify(|cache| {
                    let entry = cache.entry(instance_id).or_default();
                    entry.steps = steps;
                    entry.loading = false;
                });
            });
            match self.gateway.subscribe_instance_steps(instance_id, push) {
                Ok(unsubscribe) => self.coordinator.attach(&instance_id, unsubscribe),
                Err(error) => {
                    tracing::warn!(error = %error, instance_id, "steps subscription setup failed");
                    self.state.send_modify(|cache| {
                        let entry = cache.entry(instance_id).or_default();
                        entry.error = Some(SliceError::Subscription(error.to_string()));
                        entry.loading = false;
                    });
                }
            }
        }

        let coordinator = Arc::clone(&self.coordinator);
        let sink = Arc::clone(&self.state);
        let handle = ReleaseHandle::new(move || {
            if let Released::Last(unsubscribe) = coordinator.release(&instance_id) {
                if let Some(unsubscribe) = unsubscribe {
                    unsubscribe();
                }
                sink.send_modify(|cache| {
                    cache.remove(&instance_id);
                });
            }
        });
        (self.state.subscribe(), handle)
    }

    /// Clone of the currently published cache.
    pub fn current(&self) -> StepsByInstance {
        self.state.borrow().clone()
    }

    /// Set one step's status, keeping both views of that step in lockstep.
    ///
    /// The keyed cache entry and the owning instance's embedded checklist
    /// (with its derived progress and lifecycle status) are snapshotted
    /// together before either is touched, updated synchronously in one
    /// section, and rolled back together if the gateway rejects the call —
    /// a failure can never leave the two views diverged.
    pub async fn update_step_status(
        &self,
        instance_id: DbId,
        step_id: DbId,
        status: StepStatus,
    ) -> Result<(), StoreError> {
        let call = self.gateway.update_step_status(instance_id, step_id, status);
        let sink = Arc::clone(&self.state);
        let instances = Arc::clone(&self.instances);
        optimistic::run(
            || {
                let cache_before = self.state.borrow().get(&instance_id).cloned();
                let instances_before = self.instances.snapshot();

                self.state.send_modify(|cache| {
                    if let Some(entry) = cache.get_mut(&instance_id) {
                        if let Some(step) = entry.steps.iter_mut().find(|s| s.id == step_id) {
                            step.status = status;
                        }
                    }
                });
                self.instances
                    .apply_embedded_step_status(instance_id, step_id, status);

                (cache_before, instances_before)
            },
            call,
            move |(cache_before, instances_before)| {
                sink.send_modify(|cache| match cache_before {
                    Some(entry) => {
                        cache.insert(instance_id, entry);
                    }
                    None => {
                        cache.remove(&instance_id);
                    }
                });
                instances.restore(instances_before);
            },
        )
        .await
    }

    /// Tear down every live key and reset the cache.
    pub(crate) fn dispose(&self) {
        for unsubscribe in self.coordinator.dispose() {
            unsubscribe();
        }
        self.state.send_modify(|cache| cache.clear());
    }
}
