//! In-memory gateway used for development and tests.
//!
//! Approximates the hosted backend closely enough to drive the client store
//! end to end: every mutating call commits to in-memory tables and then
//! pushes the full current data set to all registered subscribers of the
//! touched families, after an optional simulated round-trip latency. Step
//! subscriptions are keyed by instance id and are served from the owning
//! instance's embedded checklist snapshot.
//!
//! Because the gateway exists to exercise optimistic UI flows, it also
//! offers one-shot fault injection ([`fail_next_call`](MemoryGateway::fail_next_call),
//! [`fail_next_subscribe`](MemoryGateway::fail_next_subscribe)) so rollback
//! paths can be driven deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use gangway_core::account::{
    CustomRole, CustomRoleChanges, NewCustomRole, NewUserAccount, UserAccount, UserAccountChanges,
};
use gangway_core::activity::{relative_time_label, Activity, NewActivity};
use gangway_core::error::CoreError;
use gangway_core::instance::{
    recompute_progress, InstanceChanges, InstanceStatus, NewInstance, OnboardingInstance,
};
use gangway_core::role::{self, RoleTag, BUILT_IN_ROLES};
use gangway_core::step::{Step, StepStatus};
use gangway_core::suggestion::{NewSuggestion, Suggestion, SuggestionStatus};
use gangway_core::template::{
    validate_template_name, NewTemplate, OnboardingTemplate, TemplateChanges,
};
use gangway_core::types::DbId;

use crate::config::MemoryGatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::traits::{
    ActivityGateway, InstanceGateway, Push, StepGateway, SuggestionGateway, TemplateGateway,
    Unsubscribe, UserGateway,
};

// ---------------------------------------------------------------------------
// Subscriber registry
// ---------------------------------------------------------------------------

/// Registered push callbacks per family, keyed by a subscription token.
///
/// Kept behind `Arc` so unsubscribe closures can outlive the borrow they
/// were created under.
#[derive(Default)]
struct SubscriberRegistry {
    instances: Mutex<HashMap<Uuid, Push<OnboardingInstance>>>,
    /// instance id -> token -> callback.
    steps: Mutex<HashMap<DbId, HashMap<Uuid, Push<Step>>>>,
    users: Mutex<HashMap<Uuid, Push<UserAccount>>>,
    activities: Mutex<HashMap<Uuid, Push<Activity>>>,
    suggestions: Mutex<HashMap<Uuid, Push<Suggestion>>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> std::sync::MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|_| panic!("{what} lock poisoned"))
}

fn read<'a, T>(rwlock: &'a RwLock<T>, what: &str) -> std::sync::RwLockReadGuard<'a, T> {
    rwlock.read().unwrap_or_else(|_| panic!("{what} lock poisoned"))
}

fn write<'a, T>(rwlock: &'a RwLock<T>, what: &str) -> std::sync::RwLockWriteGuard<'a, T> {
    rwlock.write().unwrap_or_else(|_| panic!("{what} lock poisoned"))
}

// ---------------------------------------------------------------------------
// MemoryGateway
// ---------------------------------------------------------------------------

/// In-memory implementation of every gateway family.
pub struct MemoryGateway {
    config: MemoryGatewayConfig,
    instances: RwLock<Vec<OnboardingInstance>>,
    users: RwLock<Vec<UserAccount>>,
    custom_roles: RwLock<Vec<CustomRole>>,
    activities: RwLock<Vec<Activity>>,
    suggestions: RwLock<Vec<Suggestion>>,
    templates: RwLock<Vec<OnboardingTemplate>>,
    subscribers: Arc<SubscriberRegistry>,
    next_id: AtomicI64,
    fail_next_call: Mutex<Option<String>>,
    fail_next_subscribe: Mutex<Option<String>>,
}

impl MemoryGateway {
    pub fn new(config: MemoryGatewayConfig) -> Self {
        let gateway = Self {
            config,
            instances: RwLock::new(Vec::new()),
            users: RwLock::new(Vec::new()),
            custom_roles: RwLock::new(Vec::new()),
            activities: RwLock::new(Vec::new()),
            suggestions: RwLock::new(Vec::new()),
            templates: RwLock::new(Vec::new()),
            subscribers: Arc::new(SubscriberRegistry::default()),
            next_id: AtomicI64::new(1),
            fail_next_call: Mutex::new(None),
            fail_next_subscribe: Mutex::new(None),
        };
        if gateway.config.seed_demo_data {
            gateway.seed_demo();
        }
        gateway
    }

    /// Gateway with the demo data set, regardless of environment.
    pub fn seeded() -> Self {
        Self::new(MemoryGatewayConfig {
            seed_demo_data: true,
            ..MemoryGatewayConfig::default()
        })
    }

    /// Arm a one-shot rejection consumed by the next mutating call.
    pub fn fail_next_call(&self, message: impl Into<String>) {
        *lock(&self.fail_next_call, "fault injection") = Some(message.into());
    }

    /// Arm a one-shot failure consumed by the next `subscribe_*` call.
    pub fn fail_next_subscribe(&self, message: impl Into<String>) {
        *lock(&self.fail_next_subscribe, "fault injection") = Some(message.into());
    }

    /// Number of live subscriptions on the instances family.
    pub fn instances_subscriber_count(&self) -> usize {
        lock(&self.subscribers.instances, "subscribers").len()
    }

    /// Number of live subscriptions on one instance's steps.
    pub fn steps_subscriber_count(&self, instance_id: DbId) -> usize {
        lock(&self.subscribers.steps, "subscribers")
            .get(&instance_id)
            .map_or(0, HashMap::len)
    }

    /// Number of live subscriptions on the users family.
    pub fn users_subscriber_count(&self) -> usize {
        lock(&self.subscribers.users, "subscribers").len()
    }

    /// Number of live subscriptions on the activities family.
    pub fn activities_subscriber_count(&self) -> usize {
        lock(&self.subscribers.activities, "subscribers").len()
    }

    /// Number of live subscriptions on the suggestions family.
    pub fn suggestions_subscriber_count(&self) -> usize {
        lock(&self.subscribers.suggestions, "subscribers").len()
    }

    fn next_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Simulated round trip, then any armed one-shot rejection.
    async fn commit_gate(&self) -> GatewayResult<()> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        if let Some(message) = lock(&self.fail_next_call, "fault injection").take() {
            return Err(GatewayError::Rejected(message));
        }
        Ok(())
    }

    fn subscribe_gate(&self) -> GatewayResult<()> {
        if let Some(message) = lock(&self.fail_next_subscribe, "fault injection").take() {
            return Err(GatewayError::Subscription(message));
        }
        Ok(())
    }

    // -- push helpers -------------------------------------------------------

    fn push_instances(&self) {
        let snapshot = read(&self.instances, "instances").clone();
        let callbacks: Vec<_> = lock(&self.subscribers.instances, "subscribers")
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }

    fn push_steps(&self, instance_id: DbId) {
        let snapshot = read(&self.instances, "instances")
            .iter()
            .find(|i| i.id == instance_id)
            .map(|i| i.steps.clone())
            .unwrap_or_default();
        let callbacks: Vec<_> = lock(&self.subscribers.steps, "subscribers")
            .get(&instance_id)
            .map(|by_token| by_token.values().cloned().collect())
            .unwrap_or_default();
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }

    fn push_users(&self) {
        let snapshot = read(&self.users, "users").clone();
        let callbacks: Vec<_> = lock(&self.subscribers.users, "subscribers")
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }

    fn push_activities(&self) {
        let snapshot = read(&self.activities, "activities").clone();
        let callbacks: Vec<_> = lock(&self.subscribers.activities, "subscribers")
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }

    fn push_suggestions(&self) {
        let snapshot = read(&self.suggestions, "suggestions").clone();
        let callbacks: Vec<_> = lock(&self.subscribers.suggestions, "subscribers")
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(MemoryGatewayConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[async_trait]
impl InstanceGateway for MemoryGateway {
    fn subscribe_instances(
        &self,
        on_change: Push<OnboardingInstance>,
    ) -> GatewayResult<Unsubscribe> {
        self.subscribe_gate()?;
        let token = Uuid::new_v4();
        lock(&self.subscribers.instances, "subscribers").insert(token, on_change.clone());
        tracing::debug!(%token, "instances subscription opened");

        // Deliver the current contents immediately, like the hosted
        // backend's initial snapshot event.
        on_change(read(&self.instances, "instances").clone());

        let registry = Arc::clone(&self.subscribers);
        Ok(Box::new(move || {
            lock(&registry.instances, "subscribers").remove(&token);
            tracing::debug!(%token, "instances subscription closed");
        }))
    }

    async fn create_instance(&self, new: NewInstance) -> GatewayResult<OnboardingInstance> {
        self.commit_gate().await?;
        let now = Utc::now();
        let instance = OnboardingInstance {
            id: self.next_id(),
            employee_name: new.employee_name,
            employee_email: new.employee_email,
            role: new.role,
            department: new.department,
            template_id: new.template_id,
            progress: recompute_progress(&new.steps),
            steps: new.steps,
            status: InstanceStatus::Active,
            created_at: now,
            updated_at: now,
            started_at: Some(now),
            completed_at: None,
        };
        write(&self.instances, "instances").push(instance.clone());
        self.push_instances();
        Ok(instance)
    }

    async fn update_instance(&self, id: DbId, changes: InstanceChanges) -> GatewayResult<()> {
        self.commit_gate().await?;
        {
            let mut instances = write(&self.instances, "instances");
            let instance = instances
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or(CoreError::NotFound {
                    entity: "instance",
                    id,
                })?;
            changes.apply(instance);
        }
        self.push_instances();
        Ok(())
    }

    async fn delete_instance(&self, id: DbId) -> GatewayResult<()> {
        self.commit_gate().await?;
        {
            let mut instances = write(&self.instances, "instances");
            if !instances.iter().any(|i| i.id == id) {
                return Err(CoreError::NotFound {
                    entity: "instance",
                    id,
                }
                .into());
            }
            instances.retain(|i| i.id != id);
        }
        self.push_instances();
        // Step subscribers of the deleted instance observe an empty checklist.
        self.push_steps(id);
        Ok(())
    }

    async fn get_instance_by_employee_email(
        &self,
        email: &str,
    ) -> GatewayResult<Option<OnboardingInstance>> {
        let wanted = email.trim().to_lowercase();
        Ok(read(&self.instances, "instances")
            .iter()
            .find(|i| i.employee_email.to_lowercase() == wanted)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[async_trait]
impl StepGateway for MemoryGateway {
    fn subscribe_instance_steps(
        &self,
        instance_id: DbId,
        on_change: Push<Step>,
    ) -> GatewayResult<Unsubscribe> {
        self.subscribe_gate()?;
        let token = Uuid::new_v4();
        lock(&self.subscribers.steps, "subscribers")
            .entry(instance_id)
            .or_default()
            .insert(token, on_change.clone());
        tracing::debug!(%token, instance_id, "steps subscription opened");

        let snapshot = read(&self.instances, "instances")
            .iter()
            .find(|i| i.id == instance_id)
            .map(|i| i.steps.clone())
            .unwrap_or_default();
        on_change(snapshot);

        let registry = Arc::clone(&self.subscribers);
        Ok(Box::new(move || {
            let mut steps = lock(&registry.steps, "subscribers");
            if let Some(by_token) = steps.get_mut(&instance_id) {
                by_token.remove(&token);
                if by_token.is_empty() {
                    steps.remove(&instance_id);
                }
            }
            tracing::debug!(%token, instance_id, "steps subscription closed");
        }))
    }

    async fn update_step_status(
        &self,
        instance_id: DbId,
        step_id: DbId,
        status: StepStatus,
    ) -> GatewayResult<()> {
        self.commit_gate().await?;
        {
            let mut instances = write(&self.instances, "instances");
            let instance = instances
                .iter_mut()
                .find(|i| i.id == instance_id)
                .ok_or(CoreError::NotFound {
                    entity: "instance",
                    id: instance_id,
                })?;
            instance.apply_step_status(step_id, status)?;
        }
        self.push_instances();
        self.push_steps(instance_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Users and custom roles
// ---------------------------------------------------------------------------

#[async_trait]
impl UserGateway for MemoryGateway {
    fn subscribe_users(&self, on_change: Push<UserAccount>) -> GatewayResult<Unsubscribe> {
        self.subscribe_gate()?;
        let token = Uuid::new_v4();
        lock(&self.subscribers.users, "subscribers").insert(token, on_change.clone());
        tracing::debug!(%token, "users subscription opened");

        on_change(read(&self.users, "users").clone());

        let registry = Arc::clone(&self.subscribers);
        Ok(Box::new(move || {
            lock(&registry.users, "subscribers").remove(&token);
            tracing::debug!(%token, "users subscription closed");
        }))
    }

    async fn create_user(&self, new: NewUserAccount) -> GatewayResult<UserAccount> {
        self.commit_gate().await?;
        let user = {
            let mut users = write(&self.users, "users");
            if users
                .iter()
                .any(|u| u.email.to_lowercase() == new.email.to_lowercase())
            {
                return Err(CoreError::Conflict(format!(
                    "A user with email '{}' already exists",
                    new.email
                ))
                .into());
            }
            let now = Utc::now();
            let user = UserAccount {
                id: self.next_id(),
                name: new.name,
                email: new.email,
                role: new.role,
                department: new.department,
                custom_roles: new.custom_roles,
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            user
        };
        self.push_users();
        Ok(user)
    }

    async fn update_user(&self, id: DbId, changes: UserAccountChanges) -> GatewayResult<()> {
        self.commit_gate().await?;
        {
            let mut users = write(&self.users, "users");
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(CoreError::NotFound { entity: "user", id })?;
            changes.apply(user);
            user.updated_at = Utc::now();
        }
        self.push_users();
        Ok(())
    }

    async fn delete_user(&self, id: DbId) -> GatewayResult<()> {
        self.commit_gate().await?;
        {
            let mut users = write(&self.users, "users");
            if !users.iter().any(|u| u.id == id) {
                return Err(CoreError::NotFound { entity: "user", id }.into());
            }
            users.retain(|u| u.id != id);
        }
        self.push_users();
        Ok(())
    }

    async fn list_custom_roles(&self) -> GatewayResult<Vec<CustomRole>> {
        Ok(read(&self.custom_roles, "custom roles").clone())
    }

    async fn create_custom_role(&self, new: NewCustomRole) -> GatewayResult<CustomRole> {
        self.commit_gate().await?;
        let custom_role = {
            let mut custom_roles = write(&self.custom_roles, "custom roles");
            let existing = BUILT_IN_ROLES
                .iter()
                .copied()
                .chain(custom_roles.iter().map(|r| r.name.as_str()));
            if role::is_duplicate_role_name(&new.name, existing) {
                return Err(
                    CoreError::Conflict(format!("Role '{}' already exists", new.name)).into(),
                );
            }
            let custom_role = CustomRole {
                id: self.next_id(),
                name: new.name,
                description: new.description,
                created_at: Utc::now(),
            };
            custom_roles.push(custom_role.clone());
            custom_role
        };
        Ok(custom_role)
    }

    async fn update_custom_role(&self, id: DbId, changes: CustomRoleChanges) -> GatewayResult<()> {
        self.commit_gate().await?;
        let mut custom_roles = write(&self.custom_roles, "custom roles");
        let custom_role = custom_roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(CoreError::NotFound {
                entity: "custom role",
                id,
            })?;
        changes.apply(custom_role);
        Ok(())
    }

    async fn delete_custom_role(&self, id: DbId) -> GatewayResult<()> {
        self.commit_gate().await?;
        let mut custom_roles = write(&self.custom_roles, "custom roles");
        if !custom_roles.iter().any(|r| r.id == id) {
            return Err(CoreError::NotFound {
                entity: "custom role",
                id,
            }
            .into());
        }
        custom_roles.retain(|r| r.id != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[async_trait]
impl ActivityGateway for MemoryGateway {
    fn subscribe_activities(&self, on_change: Push<Activity>) -> GatewayResult<Unsubscribe> {
        self.subscribe_gate()?;
        let token = Uuid::new_v4();
        lock(&self.subscribers.activities, "subscribers").insert(token, on_change.clone());
        tracing::debug!(%token, "activities subscription opened");

        on_change(read(&self.activities, "activities").clone());

        let registry = Arc::clone(&self.subscribers);
        Ok(Box::new(move || {
            lock(&registry.activities, "subscribers").remove(&token);
            tracing::debug!(%token, "activities subscription closed");
        }))
    }

    async fn record_activity(&self, new: NewActivity) -> GatewayResult<Activity> {
        self.commit_gate().await?;
        let now = Utc::now();
        let activity = Activity {
            id: self.next_id(),
            actor_initials: new.actor_initials,
            actor_name: new.actor_name,
            actor_id: new.actor_id,
            action: new.action,
            time_label: relative_time_label(now, now),
            timestamp: Some(now),
            resource_type: new.resource_type,
            resource_id: new.resource_id,
            details: new.details,
        };
        // Newest first, matching the feed's render order.
        write(&self.activities, "activities").insert(0, activity.clone());
        self.push_activities();
        Ok(activity)
    }
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[async_trait]
impl SuggestionGateway for MemoryGateway {
    fn subscribe_suggestions(&self, on_change: Push<Suggestion>) -> GatewayResult<Unsubscribe> {
        self.subscribe_gate()?;
        let token = Uuid::new_v4();
        lock(&self.subscribers.suggestions, "subscribers").insert(token, on_change.clone());
        tracing::debug!(%token, "suggestions subscription opened");

        on_change(read(&self.suggestions, "suggestions").clone());

        let registry = Arc::clone(&self.subscribers);
        Ok(Box::new(move || {
            lock(&registry.suggestions, "subscribers").remove(&token);
            tracing::debug!(%token, "suggestions subscription closed");
        }))
    }

    async fn create_suggestion(&self, new: NewSuggestion) -> GatewayResult<Suggestion> {
        self.commit_gate().await?;
        let suggestion = Suggestion {
            id: self.next_id(),
            step_id: new.step_id,
            author_name: new.author_name,
            text: new.text,
            status: SuggestionStatus::Pending,
            created_at: Some(Utc::now()),
            instance_id: new.instance_id,
        };
        write(&self.suggestions, "suggestions").push(suggestion.clone());
        self.push_suggestions();
        Ok(suggestion)
    }

    async fn update_suggestion_status(
        &self,
        id: DbId,
        status: SuggestionStatus,
    ) -> GatewayResult<()> {
        self.commit_gate().await?;
        {
            let mut suggestions = write(&self.suggestions, "suggestions");
            let suggestion = suggestions
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(CoreError::NotFound {
                    entity: "suggestion",
                    id,
                })?;
            suggestion.status = status;
        }
        self.push_suggestions();
        Ok(())
    }

    async fn delete_suggestion(&self, id: DbId) -> GatewayResult<()> {
        self.commit_gate().await?;
        {
            let mut suggestions = write(&self.suggestions, "suggestions");
            if !suggestions.iter().any(|s| s.id == id) {
                return Err(CoreError::NotFound {
                    entity: "suggestion",
                    id,
                }
                .into());
            }
            suggestions.retain(|s| s.id != id);
        }
        self.push_suggestions();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[async_trait]
impl TemplateGateway for MemoryGateway {
    async fn list_templates(&self) -> GatewayResult<Vec<OnboardingTemplate>> {
        Ok(read(&self.templates, "templates").clone())
    }

    async fn create_template(&self, new: NewTemplate) -> GatewayResult<OnboardingTemplate> {
        self.commit_gate().await?;
        validate_template_name(&new.name)?;
        let now = Utc::now();
        let template = OnboardingTemplate {
            id: self.next_id(),
            name: new.name,
            role: new.role,
            department: new.department,
            steps: new.steps,
            created_at: now,
            updated_at: now,
        };
        write(&self.templates, "templates").push(template.clone());
        Ok(template)
    }

    async fn update_template(&self, id: DbId, changes: TemplateChanges) -> GatewayResult<()> {
        self.commit_gate().await?;
        if let Some(name) = &changes.name {
            validate_template_name(name)?;
        }
        let mut templates = write(&self.templates, "templates");
        let template = templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::NotFound {
                entity: "template",
                id,
            })?;
        changes.apply(template);
        template.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_template(&self, id: DbId) -> GatewayResult<()> {
        self.commit_gate().await?;
        let mut templates = write(&self.templates, "templates");
        if !templates.iter().any(|t| t.id == id) {
            return Err(CoreError::NotFound {
                entity: "template",
                id,
            }
            .into());
        }
        templates.retain(|t| t.id != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Demo seed
// ---------------------------------------------------------------------------

impl MemoryGateway {
    /// Populate the tables with a small, coherent demo data set.
    fn seed_demo(&self) {
        let now = Utc::now();
        let employee = RoleTag::from("employee");

        let step = |id: DbId, title: &str, department: &str, expert: &str, link: Option<&str>| Step {
            id,
            title: title.to_string(),
            description: String::new(),
            role: employee.clone(),
            department: department.to_string(),
            expert: expert.to_string(),
            status: StepStatus::Pending,
            link: link.map(str::to_string),
        };

        let template = OnboardingTemplate {
            id: self.next_id(),
            name: "Engineering starter".to_string(),
            role: employee.clone(),
            department: "Engineering".to_string(),
            steps: vec![
                step(1, "Setup laptop", "IT", "Priya Patel", Some("https://wiki.example.com/laptop")),
                step(2, "Install IDE", "Engineering", "Priya Patel", None),
                step(3, "Meet your onboarding buddy", "Engineering", "Dana Flores", None),
                step(4, "Complete security training", "Security", "Noor Haddad", Some("https://training.example.com/security")),
            ],
            created_at: now,
            updated_at: now,
        };

        let mut first_run = OnboardingInstance {
            id: self.next_id(),
            employee_name: "Sam Chen".to_string(),
            employee_email: "sam@example.com".to_string(),
            role: employee.clone(),
            department: "Engineering".to_string(),
            template_id: Some(template.id),
            steps: template.steps.clone(),
            progress: 0,
            status: InstanceStatus::Active,
            created_at: now,
            updated_at: now,
            started_at: Some(now),
            completed_at: None,
        };
        first_run.steps[0].status = StepStatus::Completed;
        first_run.progress = recompute_progress(&first_run.steps);

        let second_run = OnboardingInstance {
            id: self.next_id(),
            employee_name: "Ana María López".to_string(),
            employee_email: "ana@example.com".to_string(),
            role: employee.clone(),
            department: "Design".to_string(),
            template_id: Some(template.id),
            steps: template.steps.clone(),
            progress: 0,
            status: InstanceStatus::Active,
            created_at: now,
            updated_at: now,
            started_at: Some(now),
            completed_at: None,
        };

        let user = |id: DbId, name: &str, email: &str, role: &str, department: &str| UserAccount {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: RoleTag::from(role),
            department: department.to_string(),
            custom_roles: vec![],
            created_at: now,
            updated_at: now,
        };

        let suggestion = Suggestion {
            id: self.next_id(),
            step_id: 1,
            author_name: "Sam Chen".to_string(),
            text: "Link the VPN setup guide from this step".to_string(),
            status: SuggestionStatus::Pending,
            created_at: Some(now),
            instance_id: Some(first_run.id),
        };

        write(&self.templates, "templates").push(template);
        write(&self.instances, "instances").extend([first_run, second_run]);
        write(&self.users, "users").extend([
            user(self.next_id(), "Sam Chen", "sam@example.com", "employee", "Engineering"),
            user(self.next_id(), "Ana María López", "ana@example.com", "employee", "Design"),
            user(self.next_id(), "Dana Flores", "dana@example.com", "manager", "Engineering"),
        ]);
        write(&self.custom_roles, "custom roles").extend([
            CustomRole {
                id: self.next_id(),
                name: "Buddy".to_string(),
                description: "Pairs with a new joiner for their first month".to_string(),
                created_at: now,
            },
            CustomRole {
                id: self.next_id(),
                name: "People Ops".to_string(),
                description: "Owns the onboarding templates".to_string(),
                created_at: now,
            },
        ]);
        write(&self.suggestions, "suggestions").push(suggestion);
    }
}
