//! Role tags and the manager-capability predicate.
//!
//! Roles are open strings rather than a closed enum: administrators define
//! custom roles at runtime, so a new role name must never require a code
//! change. The only capability split the platform makes is employee versus
//! everyone else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Built-in role names
// ---------------------------------------------------------------------------

/// The plain employee role. Carries no management capability.
pub const ROLE_EMPLOYEE: &str = "employee";
/// Line manager role.
pub const ROLE_MANAGER: &str = "manager";
/// Platform administrator role.
pub const ROLE_ADMIN: &str = "admin";

/// Role names shipped with the platform. Custom roles extend this set at
/// runtime; both pools share one namespace (case-insensitive).
pub const BUILT_IN_ROLES: &[&str] = &[ROLE_EMPLOYEE, ROLE_MANAGER, ROLE_ADMIN];

// ---------------------------------------------------------------------------
// RoleTag
// ---------------------------------------------------------------------------

/// An open-ended role name attached to users, instances, and steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleTag(String);

impl RoleTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every non-empty role except the plain employee role carries manager
    /// access (custom roles are manager-grade by definition).
    pub fn has_manager_access(&self) -> bool {
        !self.0.is_empty() && self.0 != ROLE_EMPLOYEE
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleTag {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for RoleTag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ---------------------------------------------------------------------------
// Role name validation
// ---------------------------------------------------------------------------

/// Minimum length of a role name.
pub const ROLE_NAME_MIN_LEN: usize = 2;

/// Maximum length of a role name.
pub const ROLE_NAME_MAX_LEN: usize = 40;

/// Maximum length of a custom role description.
pub const ROLE_DESCRIPTION_MAX_LEN: usize = 200;

/// Validate a role name: trimmed, length-bounded, and limited to letters,
/// digits, spaces, dashes, and underscores.
pub fn validate_role_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.len() < ROLE_NAME_MIN_LEN || trimmed.len() > ROLE_NAME_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Role name must be between {ROLE_NAME_MIN_LEN} and {ROLE_NAME_MAX_LEN} characters"
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Role name '{trimmed}' may only contain letters, digits, spaces, dashes, and underscores"
        )));
    }
    Ok(())
}

/// Validate a custom role description length.
pub fn validate_role_description(description: &str) -> Result<(), CoreError> {
    if description.len() > ROLE_DESCRIPTION_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Role description must be at most {ROLE_DESCRIPTION_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Check a candidate role name against an existing pool, case-insensitively.
///
/// The pool should include both built-in and custom role names; the two share
/// one namespace.
pub fn is_duplicate_role_name<'a>(
    candidate: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> bool {
    let candidate = candidate.trim().to_lowercase();
    existing
        .into_iter()
        .any(|name| name.trim().to_lowercase() == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_role_has_no_manager_access() {
        assert!(!RoleTag::from(ROLE_EMPLOYEE).has_manager_access());
    }

    #[test]
    fn test_empty_role_has_no_manager_access() {
        assert!(!RoleTag::from("").has_manager_access());
    }

    #[test]
    fn test_builtin_and_custom_roles_have_manager_access() {
        assert!(RoleTag::from(ROLE_MANAGER).has_manager_access());
        assert!(RoleTag::from(ROLE_ADMIN).has_manager_access());
        assert!(RoleTag::from("People Ops").has_manager_access());
    }

    #[test]
    fn test_role_name_length_bounds() {
        assert!(validate_role_name("a").is_err());
        assert!(validate_role_name("HR").is_ok());
        assert!(validate_role_name(&"x".repeat(ROLE_NAME_MAX_LEN)).is_ok());
        assert!(validate_role_name(&"x".repeat(ROLE_NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_role_name_character_set() {
        assert!(validate_role_name("Team-Lead_2").is_ok());
        assert!(validate_role_name("People Ops").is_ok());
        assert!(validate_role_name("nope!").is_err());
        assert!(validate_role_name("a/b").is_err());
    }

    #[test]
    fn test_role_description_length() {
        assert!(validate_role_description("short").is_ok());
        assert!(validate_role_description(&"d".repeat(ROLE_DESCRIPTION_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_duplicate_role_name_is_case_insensitive() {
        let existing = ["Manager", "People Ops"];
        assert!(is_duplicate_role_name("manager", existing));
        assert!(is_duplicate_role_name("  PEOPLE OPS ", existing));
        assert!(!is_duplicate_role_name("Buddy", existing));
    }
}
