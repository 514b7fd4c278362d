//! Onboarding instance record and the progress/status invariant.
//!
//! An instance is one employee's onboarding run. Its `steps` array is a
//! snapshot copied from the originating template at creation time; steps are
//! never removed afterwards, only their statuses change. `progress` and
//! `status` are derived values and must always satisfy
//! [`recompute_progress`] — both the client store and the backend mock go
//! through [`OnboardingInstance::apply_step_status`] so there is exactly one
//! definition of that rule.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::role::RoleTag;
use crate::step::{Step, StepStatus};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Instance status
// ---------------------------------------------------------------------------

/// Lifecycle status of an onboarding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Active,
    Completed,
    OnHold,
}

impl InstanceStatus {
    /// Parse a status string from the backend.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "on_hold" => Ok(Self::OnHold),
            _ => Err(CoreError::Validation(format!(
                "Invalid instance status '{s}'. Must be one of: active, completed, on_hold"
            ))),
        }
    }

    /// Convert to a backend-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
        }
    }
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// One employee's onboarding run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingInstance {
    pub id: DbId,
    pub employee_name: String,
    pub employee_email: String,
    pub role: RoleTag,
    pub department: String,
    /// Template this run was instantiated from, if it still exists.
    pub template_id: Option<DbId>,
    /// Checklist snapshot copied from the template at creation time.
    pub steps: Vec<Step>,
    /// Rounded completion percentage, always `recompute_progress(&steps)`.
    pub progress: u8,
    pub status: InstanceStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Payload for creating an instance; the backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInstance {
    pub employee_name: String,
    pub employee_email: String,
    pub role: RoleTag,
    pub department: String,
    pub template_id: Option<DbId>,
    pub steps: Vec<Step>,
}

/// Partial update of an instance's manager-editable fields.
///
/// `None` fields are left untouched. Steps are deliberately absent: the
/// checklist itself only ever changes through per-step status updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceChanges {
    pub employee_name: Option<String>,
    pub employee_email: Option<String>,
    pub role: Option<RoleTag>,
    pub department: Option<String>,
    pub status: Option<InstanceStatus>,
    pub started_at: Option<Timestamp>,
}

impl InstanceChanges {
    /// Apply the present fields to an instance and refresh `updated_at`.
    pub fn apply(&self, instance: &mut OnboardingInstance) {
        if let Some(name) = &self.employee_name {
            instance.employee_name = name.clone();
        }
        if let Some(email) = &self.employee_email {
            instance.employee_email = email.clone();
        }
        if let Some(role) = &self.role {
            instance.role = role.clone();
        }
        if let Some(department) = &self.department {
            instance.department = department.clone();
        }
        if let Some(status) = self.status {
            instance.status = status;
        }
        if let Some(started_at) = self.started_at {
            instance.started_at = Some(started_at);
        }
        instance.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Progress invariant
// ---------------------------------------------------------------------------

/// Compute the rounded completion percentage for a checklist.
///
/// Empty checklists are 0% complete.
pub fn recompute_progress(steps: &[Step]) -> u8 {
    if steps.is_empty() {
        return 0;
    }
    let completed = steps
        .iter()
        .filter(|s| s.status == StepStatus::Completed)
        .count();
    ((completed as f64 / steps.len() as f64) * 100.0).round() as u8
}

impl OnboardingInstance {
    /// Set one step's status and re-derive `progress` and `status`.
    ///
    /// Reaching 100% marks the run completed and stamps `completed_at`; a
    /// completed run dropping below 100% reverts to active and clears the
    /// stamp. A run on hold stays on hold until it actually completes.
    ///
    /// Returns [`CoreError::NotFound`] when the step id is not in this
    /// instance's checklist.
    pub fn apply_step_status(
        &mut self,
        step_id: DbId,
        status: StepStatus,
    ) -> Result<(), CoreError> {
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.id == step_id)
            .ok_or(CoreError::NotFound {
                entity: "step",
                id: step_id,
            })?;
        step.status = status;

        self.progress = recompute_progress(&self.steps);
        if self.progress == 100 {
            if self.status != InstanceStatus::Completed {
                self.status = InstanceStatus::Completed;
                self.completed_at = Some(Utc::now());
            }
        } else if self.status == InstanceStatus::Completed {
            self.status = InstanceStatus::Active;
            self.completed_at = None;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
