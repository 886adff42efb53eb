//! Static declaration of every onboarding step and the edges between them.
//!
//! The registry is data, not state: one immutable instance is shared by
//! every state machine in the process via [`StepRegistry::standard`].

use crate::{
    error::{OnboardingError, Result},
    models::{StepId, Tier, TierRequirement},
};

/// One step of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub id: StepId,
    /// Position used only to classify moves as forward or backward
    pub ordinal: u8,
    /// Fields that must be present and non-empty to enter this step
    pub required_fields: &'static [&'static str],
    /// Tier restriction on entering this step at all
    pub tier_gate: Option<TierRequirement>,
}

/// One allowed move in the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: StepId,
    pub to: StepId,
    /// Tier restriction specific to this edge
    pub condition: Option<TierRequirement>,
}

const fn step(
    id: StepId,
    ordinal: u8,
    required_fields: &'static [&'static str],
    tier_gate: Option<TierRequirement>,
) -> StepDefinition {
    StepDefinition {
        id,
        ordinal,
        required_fields,
        tier_gate,
    }
}

const fn edge(from: StepId, to: StepId, condition: Option<TierRequirement>) -> Edge {
    Edge {
        from,
        to,
        condition,
    }
}

// Indexed by `StepId` discriminant.
static STEPS: [StepDefinition; 7] = [
    step(StepId::NotStarted, 0, &[], None),
    step(StepId::BusinessInfo, 1, &[], None),
    step(
        StepId::SubscriptionSelection,
        2,
        &["businessName", "businessType"],
        None,
    ),
    step(
        StepId::PaymentPending,
        3,
        &["selectedPlan", "billingCycle"],
        Some(TierRequirement::Paid),
    ),
    step(
        StepId::PaymentProcessing,
        4,
        &[],
        Some(TierRequirement::Paid),
    ),
    step(StepId::Completed, 5, &["selectedPlan"], None),
    step(StepId::Error, 6, &[], None),
];

static EDGES: [Edge; 9] = [
    edge(StepId::NotStarted, StepId::BusinessInfo, None),
    edge(StepId::BusinessInfo, StepId::SubscriptionSelection, None),
    edge(
        StepId::SubscriptionSelection,
        StepId::PaymentPending,
        Some(TierRequirement::Paid),
    ),
    edge(
        StepId::SubscriptionSelection,
        StepId::Completed,
        Some(TierRequirement::Free),
    ),
    edge(StepId::PaymentPending, StepId::PaymentProcessing, None),
    edge(StepId::PaymentPending, StepId::SubscriptionSelection, None),
    edge(StepId::PaymentProcessing, StepId::Completed, None),
    edge(StepId::PaymentProcessing, StepId::PaymentPending, None),
    edge(StepId::Error, StepId::BusinessInfo, None),
];

static STANDARD: StepRegistry = StepRegistry {
    steps: &STEPS,
    edges: &EDGES,
};

/// Read-only catalogue of steps and transitions.
#[derive(Debug)]
pub struct StepRegistry {
    steps: &'static [StepDefinition],
    edges: &'static [Edge],
}

impl StepRegistry {
    /// The process-wide registry.
    pub fn standard() -> &'static StepRegistry {
        &STANDARD
    }

    /// Definition of a known step.
    pub fn step(&self, id: StepId) -> &StepDefinition {
        &self.steps[id as usize]
    }

    /// Looks a step up by name.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::UnknownStep` when the name is not a step id.
    pub fn step_named(&self, name: &str) -> Result<&StepDefinition> {
        name.parse::<StepId>()
            .map(|id| self.step(id))
            .map_err(|_| OnboardingError::UnknownStep {
                name: name.to_string(),
            })
    }

    pub fn required_fields_for(&self, id: StepId) -> &'static [&'static str] {
        self.step(id).required_fields
    }

    /// True when the step has a tier gate that `tier` does not satisfy.
    pub fn is_tier_gated(&self, id: StepId, tier: Option<Tier>) -> bool {
        self.step(id)
            .tier_gate
            .is_some_and(|gate| !gate.is_satisfied_by(tier))
    }

    pub fn edges(&self) -> &'static [Edge] {
        self.edges
    }

    pub fn edges_from(&self, from: StepId) -> impl Iterator<Item = &'static Edge> {
        self.edges.iter().filter(move |e| e.from == from)
    }

    pub fn edge(&self, from: StepId, to: StepId) -> Option<&'static Edge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }

    /// True when some step has an edge into `id`.
    pub fn is_edge_target(&self, id: StepId) -> bool {
        self.edges.iter().any(|e| e.to == id)
    }

    /// True when `to` sits later in the workflow than `from`.
    pub fn is_forward(&self, from: StepId, to: StepId) -> bool {
        self.step(to).ordinal > self.step(from).ordinal
    }
}
