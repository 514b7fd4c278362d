//! Checklist step types shared by instances and templates.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::role::RoleTag;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Step status
// ---------------------------------------------------------------------------

/// Status values for a single onboarding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Completed,
    Stuck,
}

impl StepStatus {
    /// Parse a status string from the backend.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "stuck" => Ok(Self::Stuck),
            _ => Err(CoreError::Validation(format!(
                "Invalid step status '{s}'. Must be one of: pending, completed, stuck"
            ))),
        }
    }

    /// Convert to a backend-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Stuck => "stuck",
        }
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// A single task inside an instance or template checklist.
///
/// Step ids are assigned when a template is authored and are unique only
/// within the owning parent; instances copy them verbatim when the template
/// is instantiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: DbId,
    pub title: String,
    pub description: String,
    /// Role this step applies to.
    pub role: RoleTag,
    /// Department that owns the step.
    pub department: String,
    /// Named subject-matter expert to ask about the step.
    pub expert: String,
    pub status: StepStatus,
    /// Optional reference link for the step.
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_db_strings() {
        for status in [StepStatus::Pending, StepStatus::Completed, StepStatus::Stuck] {
            assert_eq!(StepStatus::from_str_db(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = StepStatus::from_str_db("done");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("done"));
    }
}
