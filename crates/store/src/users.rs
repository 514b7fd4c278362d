//! Users and custom-roles slice.
//!
//! Full optimistic CRUD over the admin entities, validated before any state
//! change or gateway call. Unlike the other slices, failures here are
//! surfaced as plain strings in the published state — the admin screens
//! bind that field directly, and the asymmetry is deliberate.

use std::sync::Arc;

use tokio::sync::watch;

use gangway_core::account::{
    self, CustomRole, CustomRoleChanges, NewCustomRole, NewUserAccount, UserAccount,
    UserAccountChanges,
};
use gangway_core::error::CoreError;
use gangway_core::role::{self, BUILT_IN_ROLES};
use gangway_core::types::DbId;
use gangway_gateway::{Gateway, GatewayError, Push, UserGateway};

use crate::coordinator::{Released, ReleaseHandle, SubscriptionCoordinator};
use crate::error::StoreError;
use crate::optimistic;

/// State published by the users slice.
#[derive(Debug, Clone, Default)]
pub struct UsersState {
    pub users: Vec<UserAccount>,
    /// Custom roles, loaded on demand (no realtime family for these).
    pub roles: Vec<CustomRole>,
    pub loading: bool,
    /// Failure message of the latest subscription or mutation problem.
    pub error: Option<String>,
}

pub struct UsersSlice {
    gateway: Arc<dyn Gateway>,
    state: Arc<watch::Sender<UsersState>>,
    coordinator: Arc<SubscriptionCoordinator>,
}

impl UsersSlice {
    pub(crate) fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (state, _) = watch::channel(UsersState::default());
        Self {
            gateway,
            state: Arc::new(state),
            coordinator: Arc::new(SubscriptionCoordinator::new()),
        }
    }

    /// Start (or join) the users subscription.
    pub fn subscribe(&self) -> (watch::Receiver<UsersState>, ReleaseHandle) {
        if self.coordinator.acquire(()) {
            self.state.send_modify(|s| {
                s.loading = true;
                s.error = None;
            });
            let sink = Arc::clone(&self.state);
            let push: Push<UserAccount> = Arc::new(move |users| {
                sink.send_modify(|s| {
                    s.users = users;
                    s.loading = false;
                });
            });
            match self.gateway.subscribe_users(push) {
                Ok(unsubscribe) => self.coordinator.attach(&(), unsubscribe),
                Err(error) => {
                    tracing::warn!(error = %error, "users subscription setup failed");
                    self.state.send_modify(|s| {
                        s.error = Some(error.to_string());
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
                sink.send_modify(|s| *s = UsersState::default());
            }
        });
        (self.state.subscribe(), handle)
    }

    /// Clone of the currently published state.
    pub fn current(&self) -> UsersState {
        self.state.borrow().clone()
    }

    /// One-shot load of the custom roles into the published state.
    pub async fn load_custom_roles(&self) -> Result<(), StoreError> {
        match self.gateway.list_custom_roles().await {
            Ok(roles) => {
                self.state.send_modify(|s| s.roles = roles);
                Ok(())
            }
            Err(error) => self.fail(error),
        }
    }

    /// Record the failure string and re-signal the error.
    fn fail<T>(&self, error: GatewayError) -> Result<T, StoreError> {
        tracing::warn!(error = %error, "users mutation failed");
        self.state.send_modify(|s| s.error = Some(error.to_string()));
        Err(error.into())
    }

    // -- users --------------------------------------------------------------

    /// Create a user. Appends only after the backend confirms and returns
    /// the record with its assigned id.
    pub async fn create_user(&self, new: NewUserAccount) -> Result<UserAccount, StoreError> {
        account::validate_new_user(&new)?;
        if account::is_duplicate_email(&new.email, &self.state.borrow().users, None) {
            return Err(CoreError::Conflict(format!(
                "A user with email '{}' already exists",
                new.email
            ))
            .into());
        }
        match self.gateway.create_user(new).await {
            Ok(user) => {
                // The realtime push may have delivered the record first.
                self.state.send_modify(|s| {
                    if !s.users.iter().any(|u| u.id == user.id) {
                        s.users.push(user.clone());
                    }
                    s.error = None;
                });
                Ok(user)
            }
            Err(error) => self.fail(error),
        }
    }

    /// Optimistic partial update with whole-array rollback.
    pub async fn update_user(&self, id: DbId, changes: UserAccountChanges) -> Result<(), StoreError> {
        account::validate_user_changes(&changes)?;
        if let Some(email) = &changes.email {
            if account::is_duplicate_email(email, &self.state.borrow().users, Some(id)) {
                return Err(CoreError::Conflict(format!(
                    "A user with email '{email}' already exists"
                ))
                .into());
            }
        }

        let call = self.gateway.update_user(id, changes.clone());
        let sink = Arc::clone(&self.state);
        let result = optimistic::run(
            || {
                let mut snapshot = Vec::new();
                self.state.send_modify(|s| {
                    snapshot = s.users.clone();
                    if let Some(user) = s.users.iter_mut().find(|u| u.id == id) {
                        changes.apply(user);
                    }
                });
                snapshot
            },
            call,
            move |snapshot| sink.send_modify(|s| s.users = snapshot),
        )
        .await;

        if let Err(error) = &result {
            self.state
                .send_modify(|s| s.error = Some(error.to_string()));
        }
        result
    }

    /// Pessimistic delete, like the instances slice's remove.
    pub async fn delete_user(&self, id: DbId) -> Result<(), StoreError> {
        if let Err(error) = self.gateway.delete_user(id).await {
            return self.fail(error);
        }
        self.state.send_modify(|s| s.users.retain(|u| u.id != id));
        Ok(())
    }

    // -- custom roles -------------------------------------------------------

    /// Every role name currently taken, built-ins included.
    fn taken_role_names(&self, exclude_id: Option<DbId>) -> Vec<String> {
        let state = self.state.borrow();
        BUILT_IN_ROLES
            .iter()
            .map(|name| name.to_string())
            .chain(
                state
                    .roles
                    .iter()
                    .filter(|r| Some(r.id) != exclude_id)
                    .map(|r| r.name.clone()),
            )
            .collect()
    }

    /// Create a custom role. Appends only after the backend confirms.
    pub async fn create_custom_role(&self, new: NewCustomRole) -> Result<CustomRole, StoreError> {
        role::validate_role_name(&new.name)?;
        role::validate_role_description(&new.description)?;
        let taken = self.taken_role_names(None);
        if role::is_duplicate_role_name(&new.name, taken.iter().map(String::as_str)) {
            return Err(
                CoreError::Conflict(format!("Role '{}' already exists", new.name)).into(),
            );
        }
        match self.gateway.create_custom_role(new).await {
            Ok(custom_role) => {
                self.state.send_modify(|s| {
                    s.roles.push(custom_role.clone());
                    s.error = None;
                });
                Ok(custom_role)
            }
            Err(error) => self.fail(error),
        }
    }

    /// Optimistic partial update with whole-array rollback.
    pub async fn update_custom_role(
        &self,
        id: DbId,
        changes: CustomRoleChanges,
    ) -> Result<(), StoreError> {
        if let Some(name) = &changes.name {
            role::validate_role_name(name)?;
            let taken = self.taken_role_names(Some(id));
            if role::is_duplicate_role_name(name, taken.iter().map(String::as_str)) {
                return Err(CoreError::Conflict(format!("Role '{name}' already exists")).into());
            }
        }
        if let Some(description) = &changes.description {
            role::validate_role_description(description)?;
        }

        let call = self.gateway.update_custom_role(id, changes.clone());
        let sink = Arc::clone(&self.state);
        let result = optimistic::run(
            || {
                let mut snapshot = Vec::new();
                self.state.send_modify(|s| {
                    snapshot = s.roles.clone();
                    if let Some(custom_role) = s.roles.iter_mut().find(|r| r.id == id) {
                        changes.apply(custom_role);
                    }
                });
                snapshot
            },
            call,
            move |snapshot| sink.send_modify(|s| s.roles = snapshot),
        )
        .await;

        if let Err(error) = &result {
            self.state
                .send_modify(|s| s.error = Some(error.to_string()));
        }
        result
    }

    /// Pessimistic delete.
    pub async fn delete_custom_role(&self, id: DbId) -> Result<(), StoreError> {
        if let Err(error) = self.gateway.delete_custom_role(id).await {
            return self.fail(error);
        }
        self.state.send_modify(|s| s.roles.retain(|r| r.id != id));
        Ok(())
    }

    /// Tear down the live subscription (if any) and reset the state.
    pub(crate) fn dispose(&self) {
        for unsubscribe in self.coordinator.dispose() {
            unsubscribe();
        }
        self.state.send_modify(|s| *s = UsersState::default());
    }
}
