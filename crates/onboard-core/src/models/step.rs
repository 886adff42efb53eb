//! Onboarding step identifiers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of onboarding steps.
///
/// The set is closed: every step a user can be in is listed here, and the
/// transition rules between them live in [`crate::registry`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// No progress recorded yet
    #[default]
    NotStarted,

    /// Collecting business name and type
    BusinessInfo,

    /// Choosing a subscription tier
    SubscriptionSelection,

    /// Paid tier chosen, waiting for the user to pay
    PaymentPending,

    /// Payment submitted, waiting for the processor
    PaymentProcessing,

    /// Onboarding finished (terminal)
    Completed,

    /// Recoverable failure; can only restart from business info
    Error,
}

impl StepId {
    /// Every step, in ordinal order.
    pub const ALL: [StepId; 7] = [
        StepId::NotStarted,
        StepId::BusinessInfo,
        StepId::SubscriptionSelection,
        StepId::PaymentPending,
        StepId::PaymentProcessing,
        StepId::Completed,
        StepId::Error,
    ];

    /// Canonical snake_case representation, used in storage and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::NotStarted => "not_started",
            StepId::BusinessInfo => "business_info",
            StepId::SubscriptionSelection => "subscription_selection",
            StepId::PaymentPending => "payment_pending",
            StepId::PaymentProcessing => "payment_processing",
            StepId::Completed => "completed",
            StepId::Error => "error",
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            StepId::NotStarted => "Not started",
            StepId::BusinessInfo => "Business information",
            StepId::SubscriptionSelection => "Plan selection",
            StepId::PaymentPending => "Payment pending",
            StepId::PaymentProcessing => "Payment processing",
            StepId::Completed => "Completed",
            StepId::Error => "Error",
        }
    }

    /// Returns true for the terminal step.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepId::Completed)
    }
}

impl FromStr for StepId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        StepId::ALL
            .into_iter()
            .find(|step| step.as_str() == normalized)
            .ok_or_else(|| format!("Invalid onboarding step: {s}"))
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Milestones appended to a record's audit trail as steps are satisfied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// Business information accepted
    BusinessInfo,
    /// A subscription plan was chosen
    Subscription,
    /// Payment went through
    Payment,
}

impl Milestone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Milestone::BusinessInfo => "business_info",
            Milestone::Subscription => "subscription",
            Milestone::Payment => "payment",
        }
    }

    /// The milestone earned by moving along `from -> to`, if any.
    pub fn earned_by(from: StepId, to: StepId) -> Option<Self> {
        match (from, to) {
            (StepId::BusinessInfo, StepId::SubscriptionSelection) => Some(Milestone::BusinessInfo),
            (StepId::SubscriptionSelection, StepId::PaymentPending | StepId::Completed) => {
                Some(Milestone::Subscription)
            }
            (StepId::PaymentProcessing, StepId::Completed) => Some(Milestone::Payment),
            _ => None,
        }
    }
}

impl FromStr for Milestone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "business_info" => Ok(Milestone::BusinessInfo),
            "subscription" => Ok(Milestone::Subscription),
            "payment" => Ok(Milestone::Payment),
            _ => Err(format!("Invalid milestone: {s}")),
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
