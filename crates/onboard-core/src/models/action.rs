//! Routing projection: where to send the browser for a given step.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::StepId;

/// What the caller should do next.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Start,
    CompleteBusinessInfo,
    SelectPlan,
    CompletePayment,
    Wait,
    AccessDashboard,
    Retry,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Start => "start",
            ActionKind::CompleteBusinessInfo => "complete_business_info",
            ActionKind::SelectPlan => "select_plan",
            ActionKind::CompletePayment => "complete_payment",
            ActionKind::Wait => "wait",
            ActionKind::AccessDashboard => "access_dashboard",
            ActionKind::Retry => "retry",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Either a page to navigate to or a message to show in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionTarget {
    Url(String),
    Message(String),
}

/// Deterministic answer to "where do I send this browser".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NextAction {
    pub action: ActionKind,
    pub target: ActionTarget,
}

impl NextAction {
    pub fn url(&self) -> Option<&str> {
        match &self.target {
            ActionTarget::Url(url) => Some(url),
            ActionTarget::Message(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.target {
            ActionTarget::Message(msg) => Some(msg),
            ActionTarget::Url(_) => None,
        }
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            ActionTarget::Url(url) => writeln!(f, "Next: {} -> {url}", self.action),
            ActionTarget::Message(msg) => writeln!(f, "Next: {} ({msg})", self.action),
        }
    }
}

/// Page locations used by [`Routes::next_action`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Routes {
    pub business_info: String,
    pub subscription: String,
    pub payment: String,
    pub dashboard: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            business_info: "/onboarding/business-info".to_string(),
            subscription: "/onboarding/subscription".to_string(),
            payment: "/onboarding/payment".to_string(),
            dashboard: "/dashboard".to_string(),
        }
    }
}

impl Routes {
    /// Projects a step onto the action the caller should take.
    ///
    /// Every step has an answer; `error` routes back to business info so a
    /// user is never left without a way forward.
    pub fn next_action(&self, step: StepId) -> NextAction {
        let (action, target) = match step {
            StepId::NotStarted => (ActionKind::Start, url(&self.business_info)),
            StepId::BusinessInfo => (
                ActionKind::CompleteBusinessInfo,
                url(&self.business_info),
            ),
            StepId::SubscriptionSelection => (ActionKind::SelectPlan, url(&self.subscription)),
            StepId::PaymentPending => (ActionKind::CompletePayment, url(&self.payment)),
            StepId::PaymentProcessing => (
                ActionKind::Wait,
                ActionTarget::Message("Payment is being processed".to_string()),
            ),
            StepId::Completed => (ActionKind::AccessDashboard, url(&self.dashboard)),
            StepId::Error => (ActionKind::Retry, url(&self.business_info)),
        };
        NextAction { action, target }
    }
}

fn url(path: &str) -> ActionTarget {
    ActionTarget::Url(path.to_string())
}
