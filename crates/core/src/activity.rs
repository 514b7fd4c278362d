//! Append-only audit activity entries.
//!
//! This module lives in `core` (zero internal deps) so the store, the
//! gateway mock, and any future tooling share the action vocabulary and the
//! relative-time labelling the activity feed renders.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for activity entries.
pub mod action_types {
    pub const SIGN_IN: &str = "sign_in";
    pub const STEP_STATUS_CHANGE: &str = "step_status_change";
    pub const INSTANCE_CREATED: &str = "instance_created";
    pub const INSTANCE_UPDATED: &str = "instance_updated";
    pub const SUGGESTION_SUBMITTED: &str = "suggestion_submitted";
    pub const SUGGESTION_APPROVED: &str = "suggestion_approved";
    pub const SUGGESTION_REJECTED: &str = "suggestion_rejected";
    pub const USER_CREATED: &str = "user_created";
    pub const USER_UPDATED: &str = "user_updated";
    pub const USER_DELETED: &str = "user_deleted";
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// One append-only audit entry. Consumers never mutate an existing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: DbId,
    /// Actor initials, e.g. `"SC"` — always present for feed rendering.
    pub actor_initials: String,
    pub actor_name: Option<String>,
    pub actor_id: Option<DbId>,
    /// Human-readable action description.
    pub action: String,
    /// Pre-rendered relative label, e.g. `"2 h ago"`.
    pub time_label: String,
    pub timestamp: Option<Timestamp>,
    pub resource_type: Option<String>,
    pub resource_id: Option<DbId>,
    /// Free-form JSON payload carrying action-specific data.
    pub details: serde_json::Value,
}

/// Payload for recording an activity; the backend assigns id and timestamp.
///
/// Constructed via [`NewActivity::new`] and enriched with the builder
/// methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub actor_initials: String,
    pub actor_name: Option<String>,
    pub actor_id: Option<DbId>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<DbId>,
    pub details: serde_json::Value,
}

impl NewActivity {
    /// Create a new entry with only the required fields.
    pub fn new(actor_initials: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            actor_initials: actor_initials.into(),
            actor_name: None,
            actor_id: None,
            action: action.into(),
            resource_type: None,
            resource_id: None,
            details: serde_json::Value::Object(Default::default()),
        }
    }

    /// Attach the acting user's full name and id.
    pub fn with_actor(mut self, name: impl Into<String>, id: Option<DbId>) -> Self {
        self.actor_name = Some(name.into());
        self.actor_id = id;
        self
    }

    /// Attach the resource the action touched.
    pub fn with_resource(mut self, resource_type: impl Into<String>, resource_id: DbId) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id);
        self
    }

    /// Set the JSON details payload.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Render the relative-time label the activity feed shows.
pub fn relative_time_label(then: Timestamp, now: Timestamp) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} h ago");
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{days} d ago");
    }
    format!("{} w ago", days / 7)
}

/// Derive display initials from a full name: first letter of the first two
/// words, uppercased. Empty names yield `"?"`.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn test_builder_defaults_are_empty() {
        let new = NewActivity::new("SC", action_types::SIGN_IN);
        assert_eq!(new.actor_initials, "SC");
        assert!(new.actor_name.is_none());
        assert!(new.resource_type.is_none());
        assert!(new.details.is_object());
    }

    #[test]
    fn test_builder_attaches_actor_and_resource() {
        let new = NewActivity::new("SC", action_types::STEP_STATUS_CHANGE)
            .with_actor("Sam Chen", Some(3))
            .with_resource("instance", 12)
            .with_details(serde_json::json!({"step_id": 2}));
        assert_eq!(new.actor_name.as_deref(), Some("Sam Chen"));
        assert_eq!(new.actor_id, Some(3));
        assert_eq!(new.resource_type.as_deref(), Some("instance"));
        assert_eq!(new.resource_id, Some(12));
        assert_eq!(new.details["step_id"], 2);
    }

    #[test]
    fn test_relative_labels() {
        let now = Utc::now();
        assert_eq!(relative_time_label(now - Duration::seconds(5), now), "just now");
        assert_eq!(relative_time_label(now - Duration::minutes(3), now), "3 m ago");
        assert_eq!(relative_time_label(now - Duration::hours(2), now), "2 h ago");
        assert_eq!(relative_time_label(now - Duration::days(3), now), "3 d ago");
        assert_eq!(relative_time_label(now - Duration::days(15), now), "2 w ago");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Sam Chen"), "SC");
        assert_eq!(initials("Ada"), "A");
        assert_eq!(initials("ana maría lópez"), "AM");
        assert_eq!(initials("   "), "?");
    }
}
