//! Onboarding templates and instantiation.
//!
//! Instantiating a template copies its checklist into the new instance **by
//! value** — a snapshot. Later template edits never reach existing runs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::instance::NewInstance;
use crate::role::RoleTag;
use crate::step::{Step, StepStatus};
use crate::types::{DbId, Timestamp};

/// A reusable checklist definition for a role/department pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingTemplate {
    pub id: DbId,
    pub name: String,
    pub role: RoleTag,
    pub department: String,
    pub steps: Vec<Step>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Payload for creating a template; the backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub role: RoleTag,
    pub department: String,
    pub steps: Vec<Step>,
}

/// Partial update of a template. `None` fields are left untouched; a present
/// `steps` value replaces the whole checklist definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateChanges {
    pub name: Option<String>,
    pub role: Option<RoleTag>,
    pub department: Option<String>,
    pub steps: Option<Vec<Step>>,
}

impl TemplateChanges {
    pub fn apply(&self, template: &mut OnboardingTemplate) {
        if let Some(name) = &self.name {
            template.name = name.clone();
        }
        if let Some(role) = &self.role {
            template.role = role.clone();
        }
        if let Some(department) = &self.department {
            template.department = department.clone();
        }
        if let Some(steps) = &self.steps {
            template.steps = steps.clone();
        }
    }
}

/// Maximum length of a template name.
pub const TEMPLATE_NAME_MAX_LEN: usize = 80;

/// Validate a template name: trimmed non-empty and length-bounded.
pub fn validate_template_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Template name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > TEMPLATE_NAME_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Template name must be at most {TEMPLATE_NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

impl OnboardingTemplate {
    /// Build the creation payload for a new run of this template.
    ///
    /// Steps are copied by value with every status reset to pending, so the
    /// new run starts from a clean snapshot regardless of how the template
    /// (or any sibling run) changes afterwards.
    pub fn instantiate(&self, employee_name: &str, employee_email: &str) -> NewInstance {
        let steps = self
            .steps
            .iter()
            .cloned()
            .map(|mut step| {
                step.status = StepStatus::Pending;
                step
            })
            .collect();
        NewInstance {
            employee_name: employee_name.to_string(),
            employee_email: employee_email.to_string(),
            role: self.role.clone(),
            department: self.department.clone(),
            template_id: Some(self.id),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn template() -> OnboardingTemplate {
        OnboardingTemplate {
            id: 7,
            name: "Engineering starter".to_string(),
            role: RoleTag::from("employee"),
            department: "Engineering".to_string(),
            steps: vec![
                Step {
                    id: 1,
                    title: "Setup laptop".to_string(),
                    description: "Collect hardware from IT".to_string(),
                    role: RoleTag::from("employee"),
                    department: "IT".to_string(),
                    expert: "Priya".to_string(),
                    status: StepStatus::Completed,
                    link: Some("https://wiki.example.com/laptop".to_string()),
                },
                Step {
                    id: 2,
                    title: "Install IDE".to_string(),
                    description: String::new(),
                    role: RoleTag::from("employee"),
                    department: "Engineering".to_string(),
                    expert: "Priya".to_string(),
                    status: StepStatus::Pending,
                    link: None,
                },
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_instantiate_copies_steps_and_resets_statuses() {
        let tpl = template();
        let new = tpl.instantiate("Sam Chen", "sam@example.com");

        assert_eq!(new.template_id, Some(7));
        assert_eq!(new.steps.len(), 2);
        assert!(new.steps.iter().all(|s| s.status == StepStatus::Pending));
        // Everything but the status is copied verbatim.
        assert_eq!(new.steps[0].title, "Setup laptop");
        assert_eq!(new.steps[0].link.as_deref(), Some("https://wiki.example.com/laptop"));
    }

    #[test]
    fn test_instantiated_steps_are_a_snapshot() {
        let mut tpl = template();
        let new = tpl.instantiate("Sam Chen", "sam@example.com");

        // Editing the template afterwards must not reach the snapshot.
        tpl.steps[0].title = "Renamed".to_string();
        tpl.steps.pop();
        assert_eq!(new.steps.len(), 2);
        assert_eq!(new.steps[0].title, "Setup laptop");
    }

    #[test]
    fn test_template_name_validation() {
        assert!(validate_template_name("Engineering starter").is_ok());
        assert!(validate_template_name("   ").is_err());
        assert!(validate_template_name(&"n".repeat(TEMPLATE_NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_changes_replace_whole_checklist() {
        let mut tpl = template();
        let changes = TemplateChanges {
            steps: Some(vec![]),
            ..Default::default()
        };
        changes.apply(&mut tpl);
        assert!(tpl.steps.is_empty());
        assert_eq!(tpl.name, "Engineering starter");
    }
}
