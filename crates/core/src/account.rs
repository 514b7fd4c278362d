//! Administrative user accounts and custom roles.
//!
//! Both families are mutated only through explicit CRUD, validated before
//! any backend call: name/email format and length, and case-insensitive
//! uniqueness (role names share one namespace with the built-ins).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::role::{self, RoleTag};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// User account
// ---------------------------------------------------------------------------

/// An administrative user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: RoleTag,
    pub department: String,
    /// Names of custom roles granted to this user (weak references).
    pub custom_roles: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payload for creating a user; the backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUserAccount {
    pub name: String,
    pub email: String,
    pub role: RoleTag,
    pub department: String,
    pub custom_roles: Vec<String>,
}

/// Partial update of a user account. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<RoleTag>,
    pub department: Option<String>,
    pub custom_roles: Option<Vec<String>>,
}

impl UserAccountChanges {
    pub fn apply(&self, user: &mut UserAccount) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
        if let Some(department) = &self.department {
            user.department = department.clone();
        }
        if let Some(custom_roles) = &self.custom_roles {
            user.custom_roles = custom_roles.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Custom role
// ---------------------------------------------------------------------------

/// An admin-defined role tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRole {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
}

/// Payload for creating a custom role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomRole {
    pub name: String,
    pub description: String,
}

/// Partial update of a custom role. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomRoleChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CustomRoleChanges {
    pub fn apply(&self, custom_role: &mut CustomRole) {
        if let Some(name) = &self.name {
            custom_role.name = name.clone();
        }
        if let Some(description) = &self.description {
            custom_role.description = description.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Minimum length of a user's display name.
pub const USER_NAME_MIN_LEN: usize = 2;

/// Maximum length of a user's display name.
pub const USER_NAME_MAX_LEN: usize = 80;

/// Validate a user display name length.
pub fn validate_user_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.len() < USER_NAME_MIN_LEN || trimmed.len() > USER_NAME_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "User name must be between {USER_NAME_MIN_LEN} and {USER_NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Structural email check: exactly one `@` with a dotted domain after it.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => {
            return Err(CoreError::Validation(format!(
                "Invalid email address '{email}'"
            )))
        }
    };
    if local.is_empty() || domain.len() < 3 || !domain.contains('.') {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        )));
    }
    Ok(())
}

/// Validate a new user payload (format and length only; uniqueness is
/// checked against live data by the caller).
pub fn validate_new_user(new: &NewUserAccount) -> Result<(), CoreError> {
    validate_user_name(&new.name)?;
    validate_email(&new.email)?;
    role::validate_role_name(new.role.as_str())?;
    Ok(())
}

/// Validate the present fields of a user update.
pub fn validate_user_changes(changes: &UserAccountChanges) -> Result<(), CoreError> {
    if let Some(name) = &changes.name {
        validate_user_name(name)?;
    }
    if let Some(email) = &changes.email {
        validate_email(email)?;
    }
    if let Some(role) = &changes.role {
        role::validate_role_name(role.as_str())?;
    }
    Ok(())
}

/// Check a candidate email against existing users, case-insensitively.
/// `exclude_id` skips the record being edited.
pub fn is_duplicate_email(
    candidate: &str,
    users: &[UserAccount],
    exclude_id: Option<DbId>,
) -> bool {
    let candidate = candidate.trim().to_lowercase();
    users
        .iter()
        .filter(|u| Some(u.id) != exclude_id)
        .any(|u| u.email.trim().to_lowercase() == candidate)
}
