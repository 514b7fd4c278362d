//! Per-entity-family gateway traits.
//!
//! Each family exposes a realtime subscription — `subscribe_*` registers a
//! push callback and returns the matching unsubscribe closure — plus its
//! one-shot mutating calls. Every push delivers the **full** current data
//! set for the family (or, for steps, for one instance); consumers replace,
//! never merge. Subscription setup failures are returned synchronously as
//! `Err`; mutation failures reject the returned future.

use std::sync::Arc;

use async_trait::async_trait;

use gangway_core::account::{
    CustomRole, CustomRoleChanges, NewCustomRole, NewUserAccount, UserAccount, UserAccountChanges,
};
use gangway_core::activity::{Activity, NewActivity};
use gangway_core::instance::{InstanceChanges, NewInstance, OnboardingInstance};
use gangway_core::step::{Step, StepStatus};
use gangway_core::suggestion::{NewSuggestion, Suggestion, SuggestionStatus};
use gangway_core::template::{NewTemplate, OnboardingTemplate, TemplateChanges};
use gangway_core::types::DbId;

use crate::error::GatewayResult;

/// Closure that tears down one registered subscription. Calling it more than
/// once is the caller's bug; the store's coordinator guarantees exactly-once.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

/// Callback invoked with the full current data set on every backend change.
pub type Push<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[async_trait]
pub trait InstanceGateway: Send + Sync {
    /// Subscribe to the full onboarding-instance collection.
    fn subscribe_instances(&self, on_change: Push<OnboardingInstance>)
        -> GatewayResult<Unsubscribe>;

    /// Create an instance; returns the stored record with its assigned id.
    async fn create_instance(&self, new: NewInstance) -> GatewayResult<OnboardingInstance>;

    /// Apply a partial update to an instance.
    async fn update_instance(&self, id: DbId, changes: InstanceChanges) -> GatewayResult<()>;

    /// Delete an instance.
    async fn delete_instance(&self, id: DbId) -> GatewayResult<()>;

    /// Resolve an instance by the employee's email (used during sign-in,
    /// outside the subscription machinery). Case-insensitive.
    async fn get_instance_by_employee_email(
        &self,
        email: &str,
    ) -> GatewayResult<Option<OnboardingInstance>>;
}

// ---------------------------------------------------------------------------
// Steps (keyed by instance)
// ---------------------------------------------------------------------------

#[async_trait]
pub trait StepGateway: Send + Sync {
    /// Subscribe to one instance's checklist.
    fn subscribe_instance_steps(
        &self,
        instance_id: DbId,
        on_change: Push<Step>,
    ) -> GatewayResult<Unsubscribe>;

    /// Set one step's status. The backend re-derives the owning instance's
    /// progress and lifecycle status and pushes both families.
    async fn update_step_status(
        &self,
        instance_id: DbId,
        step_id: DbId,
        status: StepStatus,
    ) -> GatewayResult<()>;
}

// ---------------------------------------------------------------------------
// Users and custom roles
// ---------------------------------------------------------------------------

#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Subscribe to the full user collection.
    fn subscribe_users(&self, on_change: Push<UserAccount>) -> GatewayResult<Unsubscribe>;

    /// Create a user; returns the stored record with its assigned id.
    async fn create_user(&self, new: NewUserAccount) -> GatewayResult<UserAccount>;

    /// Apply a partial update to a user.
    async fn update_user(&self, id: DbId, changes: UserAccountChanges) -> GatewayResult<()>;

    /// Delete a user.
    async fn delete_user(&self, id: DbId) -> GatewayResult<()>;

    /// One-shot read of all custom roles (no subscription for this family).
    async fn list_custom_roles(&self) -> GatewayResult<Vec<CustomRole>>;

    /// Create a custom role; returns the stored record with its assigned id.
    async fn create_custom_role(&self, new: NewCustomRole) -> GatewayResult<CustomRole>;

    /// Apply a partial update to a custom role.
    async fn update_custom_role(&self, id: DbId, changes: CustomRoleChanges) -> GatewayResult<()>;

    /// Delete a custom role.
    async fn delete_custom_role(&self, id: DbId) -> GatewayResult<()>;
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ActivityGateway: Send + Sync {
    /// Subscribe to the activity feed (newest first).
    fn subscribe_activities(&self, on_change: Push<Activity>) -> GatewayResult<Unsubscribe>;

    /// Append an activity entry; returns the stored record.
    async fn record_activity(&self, new: NewActivity) -> GatewayResult<Activity>;
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SuggestionGateway: Send + Sync {
    /// Subscribe to the full suggestion collection.
    fn subscribe_suggestions(&self, on_change: Push<Suggestion>) -> GatewayResult<Unsubscribe>;

    /// Submit a suggestion; returns the stored record with its assigned id.
    async fn create_suggestion(&self, new: NewSuggestion) -> GatewayResult<Suggestion>;

    /// Set a suggestion's review status.
    async fn update_suggestion_status(
        &self,
        id: DbId,
        status: SuggestionStatus,
    ) -> GatewayResult<()>;

    /// Delete a suggestion.
    async fn delete_suggestion(&self, id: DbId) -> GatewayResult<()>;
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Templates have no realtime family: manager tooling reads them on demand.
#[async_trait]
pub trait TemplateGateway: Send + Sync {
    async fn list_templates(&self) -> GatewayResult<Vec<OnboardingTemplate>>;

    /// Create a template; returns the stored record with its assigned id.
    async fn create_template(&self, new: NewTemplate) -> GatewayResult<OnboardingTemplate>;

    /// Apply a partial update to a template.
    async fn update_template(&self, id: DbId, changes: TemplateChanges) -> GatewayResult<()>;

    /// Delete a template. Existing instances keep their step snapshots.
    async fn delete_template(&self, id: DbId) -> GatewayResult<()>;
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

/// Union of every per-family capability; what the client store holds.
pub trait Gateway:
    InstanceGateway + StepGateway + UserGateway + ActivityGateway + SuggestionGateway + TemplateGateway
{
}

impl<T> Gateway for T where
    T: InstanceGateway
        + StepGateway
        + UserGateway
        + ActivityGateway
        + SuggestionGateway
        + TemplateGateway
{
}
