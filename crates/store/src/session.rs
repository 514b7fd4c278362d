//! Role-gated consumer adapter.
//!
//! Feature code mounts a [`Session`] around the store and the identity
//! provider: sign-in resolves the ambient identity, the resolved role gates
//! which slices may be activated (manager-only views are never subscribed
//! for employee identities), and the review operations compose the
//! suggestion primitives with audit activities.

use std::sync::Arc;

use tokio::sync::watch;

use gangway_core::account::validate_email;
use gangway_core::activity::{action_types, initials, Activity, NewActivity};
use gangway_core::error::CoreError;
use gangway_core::instance::OnboardingInstance;
use gangway_core::suggestion::{
    validate_suggestion_text, NewSuggestion, Suggestion, SuggestionStatus,
};
use gangway_core::template::OnboardingTemplate;
use gangway_core::types::DbId;
use gangway_gateway::{
    ActivityGateway, AuthProvider, Identity, InstanceGateway, SuggestionGateway,
};

use crate::coordinator::ReleaseHandle;
use crate::error::StoreError;
use crate::state::SliceState;
use crate::steps::StepsByInstance;
use crate::store::OnboardingStore;
use crate::users::UsersState;

pub struct Session {
    auth: Arc<dyn AuthProvider>,
    store: Arc<OnboardingStore>,
}

/// The manager-only views, held open for as long as the desk lives.
///
/// Dropping the desk (or calling [`close`](Self::close)) releases every
/// claim it holds; other consumers of the same slices are unaffected.
#[derive(Debug)]
pub struct ManagerDesk {
    pub instances: watch::Receiver<SliceState<OnboardingInstance>>,
    pub users: watch::Receiver<UsersState>,
    pub activities: watch::Receiver<SliceState<Activity>>,
    pub suggestions: watch::Receiver<SliceState<Suggestion>>,
    handles: Vec<ReleaseHandle>,
}

impl ManagerDesk {
    /// Release every subscription claim this desk holds.
    pub fn close(&mut self) {
        for handle in &mut self.handles {
            handle.release();
        }
    }
}

/// An employee's live view of their own checklist.
pub struct EmployeeChecklist {
    pub instance_id: DbId,
    pub steps: watch::Receiver<StepsByInstance>,
    handle: ReleaseHandle,
}

impl EmployeeChecklist {
    /// Release the steps subscription claim.
    pub fn close(&mut self) {
        self.handle.release();
    }
}

impl Session {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<OnboardingStore>) -> Self {
        Self { auth, store }
    }

    // -- identity -----------------------------------------------------------

    /// Sign in through the identity provider and audit the event.
    ///
    /// The audit write is best-effort: a failure there never fails the
    /// sign-in itself.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, StoreError> {
        let identity = self.auth.sign_in(email, password).await?;
        self.record(
            NewActivity::new(initials(&identity.display_name), action_types::SIGN_IN)
                .with_actor(identity.display_name.clone(), identity.user_id),
        )
        .await;
        Ok(identity)
    }

    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
    }

    /// Ambient current-identity stream; `None` while signed out.
    pub fn identity(&self) -> watch::Receiver<Option<Identity>> {
        self.auth.identity()
    }

    fn current_identity(&self) -> Result<Identity, StoreError> {
        self.auth
            .identity()
            .borrow()
            .clone()
            .ok_or_else(|| CoreError::Unauthorized("No signed-in identity".to_string()).into())
    }

    /// Whether the active identity may open manager-only views.
    pub fn has_manager_access(&self) -> bool {
        self.auth
            .identity()
            .borrow()
            .as_ref()
            .is_some_and(Identity::has_manager_access)
    }

    fn require_manager(&self) -> Result<Identity, StoreError> {
        let identity = self.current_identity()?;
        if !identity.has_manager_access() {
            return Err(CoreError::Forbidden(format!(
                "Role '{}' may not perform manager operations",
                identity.role
            ))
            .into());
        }
        Ok(identity)
    }

    /// Best-effort audit write; failures are logged, never propagated.
    async fn record(&self, new: NewActivity) {
        if let Err(error) = self.store.gateway().record_activity(new).await {
            tracing::warn!(error = %error, "failed to record audit activity");
        }
    }

    // -- employee views -----------------------------------------------------

    /// The signed-in employee's own run, resolved by email outside the
    /// subscription machinery.
    pub async fn my_instance(&self) -> Result<Option<OnboardingInstance>, StoreError> {
        let identity = self.current_identity()?;
        Ok(self
            .store
            .gateway()
            .get_instance_by_employee_email(&identity.email)
            .await?)
    }

    /// Live view of the signed-in employee's own checklist, or `None` when
    /// no run exists for their email yet.
    pub async fn my_checklist(&self) -> Result<Option<EmployeeChecklist>, StoreError> {
        let Some(instance) = self.my_instance().await? else {
            return Ok(None);
        };
        let (steps, handle) = self.store.steps.subscribe(instance.id);
        Ok(Some(EmployeeChecklist {
            instance_id: instance.id,
            steps,
            handle,
        }))
    }

    /// Submit feedback against a step of the employee's own run.
    pub async fn submit_suggestion(
        &self,
        step_id: DbId,
        instance_id: Option<DbId>,
        text: &str,
    ) -> Result<Suggestion, StoreError> {
        validate_suggestion_text(text)?;
        let identity = self.current_identity()?;
        let suggestion = self
            .store
            .gateway()
            .create_suggestion(NewSuggestion {
                step_id,
                author_name: identity.display_name.clone(),
                text: text.to_string(),
                instance_id,
            })
            .await?;
        self.record(
            NewActivity::new(
                initials(&identity.display_name),
                action_types::SUGGESTION_SUBMITTED,
            )
            .with_actor(identity.display_name, identity.user_id)
            .with_resource("suggestion", suggestion.id)
            .with_details(serde_json::json!({ "step_id": step_id })),
        )
        .await;
        Ok(suggestion)
    }

    // -- manager views ------------------------------------------------------

    /// Open the manager-only views. Rejected outright for identities
    /// without manager access — the slices are never even subscribed.
    pub fn manager_desk(&self) -> Result<ManagerDesk, StoreError> {
        self.require_manager()?;
        let (instances, instances_handle) = self.store.instances.subscribe();
        let (users, users_handle) = self.store.users.subscribe();
        let (activities, activities_handle) = self.store.activities.subscribe();
        let (suggestions, suggestions_handle) = self.store.suggestions.subscribe();
        Ok(ManagerDesk {
            instances,
            users,
            activities,
            suggestions,
            handles: vec![
                instances_handle,
                users_handle,
                activities_handle,
                suggestions_handle,
            ],
        })
    }

    /// Instantiate a template for a new joiner and append the confirmed run.
    pub async fn start_onboarding(
        &self,
        template: &OnboardingTemplate,
        employee_name: &str,
        employee_email: &str,
    ) -> Result<OnboardingInstance, StoreError> {
        let identity = self.require_manager()?;
        validate_email(employee_email)?;
        let created = self
            .store
            .gateway()
            .create_instance(template.instantiate(employee_name, employee_email))
            .await?;
        self.store.instances.add_confirmed(created.clone());
        self.record(
            NewActivity::new(
                initials(&identity.display_name),
                action_types::INSTANCE_CREATED,
            )
            .with_actor(identity.display_name, identity.user_id)
            .with_resource("instance", created.id)
            .with_details(serde_json::json!({ "template_id": template.id })),
        )
        .await;
        Ok(created)
    }

    /// Approve a suggestion: optimistically mark it implemented, commit
    /// through the gateway, audit on success, roll back on failure.
    pub async fn approve_suggestion(&self, id: DbId) -> Result<(), StoreError> {
        let identity = self.require_manager()?;
        let snapshot = self
            .store
            .suggestions
            .apply_status(id, SuggestionStatus::Implemented);
        match self
            .store
            .gateway()
            .update_suggestion_status(id, SuggestionStatus::Implemented)
            .await
        {
            Ok(()) => {
                self.record(
                    NewActivity::new(
                        initials(&identity.display_name),
                        action_types::SUGGESTION_APPROVED,
                    )
                    .with_actor(identity.display_name, identity.user_id)
                    .with_resource("suggestion", id),
                )
                .await;
                Ok(())
            }
            Err(error) => {
                self.store.suggestions.rollback(snapshot);
                Err(error.into())
            }
        }
    }

    /// Reject a suggestion: optimistically drop it, commit the delete,
    /// audit on success, roll back on failure.
    pub async fn reject_suggestion(&self, id: DbId) -> Result<(), StoreError> {
        let identity = self.require_manager()?;
        let snapshot = self.store.suggestions.apply_remove(id);
        match self.store.gateway().delete_suggestion(id).await {
            Ok(()) => {
                self.record(
                    NewActivity::new(
                        initials(&identity.display_name),
                        action_types::SUGGESTION_REJECTED,
                    )
                    .with_actor(identity.display_name, identity.user_id)
                    .with_resource("suggestion", id),
                )
                .await;
                Ok(())
            }
            Err(error) => {
                self.store.suggestions.rollback(snapshot);
                Err(error.into())
            }
        }
    }
}
