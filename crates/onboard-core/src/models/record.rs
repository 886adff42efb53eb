//! The durable per-principal progress record.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BillingCycle, Milestone, StepId, Tier};
use crate::display::LocalDateTime;

/// Field map submitted with a transition and accumulated across steps.
pub type StepData = Map<String, Value>;

/// Durable onboarding progress for one session principal.
///
/// `current_step` is the single source of truth. `completed_steps` is an
/// audit trail and is never used to re-derive the current step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProgressionRecord {
    /// Step the user is currently on
    pub current_step: StepId,

    /// Tier picked at plan selection
    pub selected_plan: Option<Tier>,

    /// Billing period picked at plan selection
    pub billing_cycle: Option<BillingCycle>,

    /// Append-only, duplicate-free list of satisfied milestones
    #[serde(default)]
    pub completed_steps: Vec<Milestone>,

    /// Every field submitted so far
    #[serde(default)]
    pub step_data: StepData,

    /// A paid plan is waiting for payment
    #[serde(default)]
    pub payment_pending: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    /// When the user first entered business info
    pub started_at: Option<Timestamp>,

    /// When the record reached `completed`
    pub onboarding_completed_at: Option<Timestamp>,

    /// Set on every successful transition
    pub last_updated: Option<Timestamp>,

    /// Diagnostic from the last failure transition into `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Diagnostic from the last failed payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_error: Option<String>,
}

impl ProgressionRecord {
    /// Record for a principal that has never started onboarding.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == StepId::Completed
    }

    /// Appends a milestone unless it is already present.
    pub fn mark_completed(&mut self, milestone: Milestone) {
        if !self.completed_steps.contains(&milestone) {
            self.completed_steps.push(milestone);
        }
    }

    pub fn has_completed(&self, milestone: Milestone) -> bool {
        self.completed_steps.contains(&milestone)
    }
}

/// Outcome reported by the payment processor on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentResult {
    pub payment_id: String,
    pub subscription_id: Option<String>,
}

/// Outcome reported by the payment processor on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentFailure {
    pub message: String,
}

impl PaymentFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ProgressionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Onboarding: {}", self.current_step.label())?;
        writeln!(f)?;
        writeln!(f, "- Step: {}", self.current_step)?;
        if let Some(plan) = &self.selected_plan {
            match &self.billing_cycle {
                Some(cycle) => writeln!(f, "- Plan: {plan} ({cycle})")?,
                None => writeln!(f, "- Plan: {plan}")?,
            }
        }
        if self.payment_pending {
            writeln!(f, "- Payment pending: yes")?;
        }
        if let Some(id) = &self.payment_id {
            writeln!(f, "- Payment: {id}")?;
        }
        if let Some(id) = &self.subscription_id {
            writeln!(f, "- Subscription: {id}")?;
        }
        if let Some(ts) = &self.started_at {
            writeln!(f, "- Started: {}", LocalDateTime(ts))?;
        }
        if let Some(ts) = &self.onboarding_completed_at {
            writeln!(f, "- Completed: {}", LocalDateTime(ts))?;
        }
        if let Some(ts) = &self.last_updated {
            writeln!(f, "- Updated: {}", LocalDateTime(ts))?;
        }

        if !self.completed_steps.is_empty() {
            let done: Vec<&str> = self.completed_steps.iter().map(Milestone::as_str).collect();
            writeln!(f, "\n## Completed\n\n{}", done.join(", "))?;
        }

        if let Some(err) = &self.last_payment_error {
            writeln!(f, "\n**Last payment error:** {err}")?;
        }
        if let Some(err) = &self.last_error {
            writeln!(f, "\n**Last error:** {err}")?;
        }

        Ok(())
    }
}
