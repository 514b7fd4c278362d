//! Employee feedback suggestions against checklist steps.
//!
//! A suggestion references its step (and optionally its instance) by id
//! only — lookups, no ownership. Dangling references are tolerated: a
//! deleted instance leaves its suggestions readable.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Suggestion status
// ---------------------------------------------------------------------------

/// Review status of a suggestion.
///
/// Employees create suggestions as pending and never touch them again;
/// managers move them to reviewed (seen, not adopted) or implemented
/// (adopted into the template).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    Reviewed,
    Implemented,
}

impl SuggestionStatus {
    /// Parse a status string from the backend.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "implemented" => Ok(Self::Implemented),
            _ => Err(CoreError::Validation(format!(
                "Invalid suggestion status '{s}'. Must be one of: pending, reviewed, implemented"
            ))),
        }
    }

    /// Convert to a backend-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Implemented => "implemented",
        }
    }
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

/// Feedback submitted by an employee against a specific step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: DbId,
    /// Step the feedback is about (weak reference).
    pub step_id: DbId,
    /// Display name of the submitting employee.
    pub author_name: String,
    pub text: String,
    pub status: SuggestionStatus,
    pub created_at: Option<Timestamp>,
    /// Owning instance, when known (weak reference).
    pub instance_id: Option<DbId>,
}

/// Payload for submitting a suggestion; the backend assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSuggestion {
    pub step_id: DbId,
    pub author_name: String,
    pub text: String,
    pub instance_id: Option<DbId>,
}

/// Maximum length of a suggestion's free text.
pub const SUGGESTION_TEXT_MAX_LEN: usize = 2000;

/// Validate suggestion text: trimmed non-empty and length-bounded.
pub fn validate_suggestion_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Suggestion text must not be empty".to_string(),
        ));
    }
    if text.len() > SUGGESTION_TEXT_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Suggestion text must be at most {SUGGESTION_TEXT_MAX_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_db_strings() {
        for status in [
            SuggestionStatus::Pending,
            SuggestionStatus::Reviewed,
            SuggestionStatus::Implemented,
        ] {
            assert_eq!(SuggestionStatus::from_str_db(status.as_str()).unwrap(), status);
        }
        assert!(SuggestionStatus::from_str_db("approved").is_err());
    }

    #[test]
    fn test_text_validation_bounds() {
        assert!(validate_suggestion_text("Add a link to the VPN guide").is_ok());
        assert!(validate_suggestion_text("  \n ").is_err());
        assert!(validate_suggestion_text(&"t".repeat(SUGGESTION_TEXT_MAX_LEN + 1)).is_err());
    }
}
