//! The composed store.

use std::sync::Arc;

use gangway_gateway::Gateway;

use crate::activities::ActivitiesSlice;
use crate::instances::InstancesSlice;
use crate::steps::StepsSlice;
use crate::suggestions::SuggestionsSlice;
use crate::users::UsersSlice;

/// Single source of truth the UI reads from and acts through.
///
/// Composes the five entity slices over one shared gateway. Cheaply
/// cloneable handles come from wrapping the store itself in `Arc`; the
/// slices are `Arc` fields so adapters can hold onto individual ones.
pub struct OnboardingStore {
    gateway: Arc<dyn Gateway>,
    pub instances: Arc<InstancesSlice>,
    pub steps: Arc<StepsSlice>,
    pub users: Arc<UsersSlice>,
    pub activities: Arc<ActivitiesSlice>,
    pub suggestions: Arc<SuggestionsSlice>,
}

impl OnboardingStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let instances = Arc::new(InstancesSlice::new(Arc::clone(&gateway)));
        let steps = Arc::new(StepsSlice::new(
            Arc::clone(&gateway),
            Arc::clone(&instances),
        ));
        Self {
            instances,
            steps,
            users: Arc::new(UsersSlice::new(Arc::clone(&gateway))),
            activities: Arc::new(ActivitiesSlice::new(Arc::clone(&gateway))),
            suggestions: Arc::new(SuggestionsSlice::new(Arc::clone(&gateway))),
            gateway,
        }
    }

    /// The shared gateway, for one-shot calls outside the slice machinery.
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Tear down every live subscription and reset all slice state.
    ///
    /// In-flight mutation calls are not aborted; their pushes just no
    /// longer reach anyone.
    pub fn dispose(&self) {
        self.instances.dispose();
        self.steps.dispose();
        self.users.dispose();
        self.activities.dispose();
        self.suggestions.dispose();
    }
}
