//! The tagged outcome of a transition request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{OnboardingError, Result},
    models::{StepId, TierRequirement},
};

/// Outcome of validating a transition request.
///
/// Rejections are ordinary values so callers can match on them; use
/// [`ValidationResult::into_result`] to turn a rejection into an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationResult {
    /// The move is allowed
    Valid { allowed_next: StepId },
    /// `not_started -> business_info`, the universal entry point
    InitialAccess,
    /// The requested step is not a registry step id, or is a step that no
    /// edge leads into (`not_started`, `error`) and so can never be requested
    InvalidStep { requested: String },
    /// Submitted data lacks required fields
    InvalidData { missing_fields: Vec<String> },
    /// The current step has no edge to the requested one
    AccessDenied { from: StepId, to: StepId },
    /// The chosen tier does not unlock the requested step
    TierRestriction { required_tier: TierRequirement },
}

impl ValidationResult {
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            ValidationResult::Valid { .. } | ValidationResult::InitialAccess
        )
    }

    /// Step the caller may move to, if allowed.
    pub fn allowed_next(&self) -> Option<StepId> {
        match self {
            ValidationResult::Valid { allowed_next } => Some(*allowed_next),
            ValidationResult::InitialAccess => Some(StepId::BusinessInfo),
            _ => None,
        }
    }

    /// Stable snake_case reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ValidationResult::Valid { .. } => "valid",
            ValidationResult::InitialAccess => "initial_access",
            ValidationResult::InvalidStep { .. } => "invalid_step",
            ValidationResult::InvalidData { .. } => "invalid_data",
            ValidationResult::AccessDenied { .. } => "access_denied",
            ValidationResult::TierRestriction { .. } => "tier_restriction",
        }
    }

    /// Converts a rejection into `OnboardingError::Rejected`.
    ///
    /// # Errors
    ///
    /// Returns the rejection wrapped in an error when the result is not
    /// allowed.
    pub fn into_result(self) -> Result<StepId> {
        match self.allowed_next() {
            Some(step) => Ok(step),
            None => Err(OnboardingError::Rejected(self)),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Valid { allowed_next } => {
                write!(f, "Transition to {allowed_next} allowed")
            }
            ValidationResult::InitialAccess => write!(f, "Onboarding can begin"),
            ValidationResult::InvalidStep { requested } => {
                write!(f, "Step '{requested}' cannot be requested")
            }
            ValidationResult::InvalidData { missing_fields } => {
                write!(f, "Missing required fields: {}", missing_fields.join(", "))
            }
            ValidationResult::AccessDenied { from, to } => {
                write!(f, "Cannot go from {from} to {to}")
            }
            ValidationResult::TierRestriction { required_tier } => {
                write!(f, "This step requires a {required_tier} plan")
            }
        }
    }
}
