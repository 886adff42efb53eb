//! Pure transition validation.
//!
//! [`TransitionValidator::validate`] decides whether a move is allowed and,
//! if not, why. Checks run in a fixed order so a request failing several
//! rules always reports the same reason:
//!
//! 1. anything from `completed` is `AccessDenied` (terminal)
//! 2. a step no edge ever leads to is `InvalidStep`
//! 3. `not_started -> business_info` is `InitialAccess`
//! 4. no edge from the current step is `AccessDenied`
//! 5. missing required fields is `InvalidData`
//! 6. an unmet step gate or edge condition is `TierRestriction`

use serde_json::Value;

use crate::{
    models::{StepData, StepId, Tier},
    registry::StepRegistry,
};

mod result;

pub use result::ValidationResult;

/// Validates transitions against a [`StepRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct TransitionValidator<'a> {
    registry: &'a StepRegistry,
}

impl Default for TransitionValidator<'static> {
    fn default() -> Self {
        Self::new(StepRegistry::standard())
    }
}

impl<'a> TransitionValidator<'a> {
    pub fn new(registry: &'a StepRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a StepRegistry {
        self.registry
    }

    /// Validates `current -> requested` for the given tier and data.
    pub fn validate(
        &self,
        current: StepId,
        requested: StepId,
        tier: Option<Tier>,
        data: &StepData,
    ) -> ValidationResult {
        if current.is_terminal() {
            return ValidationResult::AccessDenied {
                from: current,
                to: requested,
            };
        }

        if !self.registry.is_edge_target(requested) {
            return ValidationResult::InvalidStep {
                requested: requested.to_string(),
            };
        }

        if current == StepId::NotStarted && requested == StepId::BusinessInfo {
            return ValidationResult::InitialAccess;
        }

        let Some(edge) = self.registry.edge(current, requested) else {
            return ValidationResult::AccessDenied {
                from: current,
                to: requested,
            };
        };

        let missing_fields = self.missing_fields(requested, data);
        if !missing_fields.is_empty() {
            return ValidationResult::InvalidData { missing_fields };
        }

        let gate = self.registry.step(requested).tier_gate;
        for requirement in [gate, edge.condition].into_iter().flatten() {
            if !requirement.is_satisfied_by(tier) {
                return ValidationResult::TierRestriction {
                    required_tier: requirement,
                };
            }
        }

        ValidationResult::Valid {
            allowed_next: requested,
        }
    }

    /// Like [`validate`](Self::validate), for a step given by name. Names
    /// that are not step ids yield `InvalidStep`.
    pub fn validate_named(
        &self,
        current: StepId,
        requested: &str,
        tier: Option<Tier>,
        data: &StepData,
    ) -> ValidationResult {
        match self.registry.step_named(requested) {
            Ok(step) => self.validate(current, step.id, tier, data),
            Err(_) => ValidationResult::InvalidStep {
                requested: requested.to_string(),
            },
        }
    }

    /// Required fields of `step` that are absent or empty in `data`, in
    /// registry order.
    pub fn missing_fields(&self, step: StepId, data: &StepData) -> Vec<String> {
        self.registry
            .required_fields_for(step)
            .iter()
            .filter(|field| !data.get(**field).is_some_and(is_present))
            .map(|field| (*field).to_string())
            .collect()
    }
}

/// Validates against the standard registry.
pub fn validate(
    current: StepId,
    requested: StepId,
    tier: Option<Tier>,
    data: &StepData,
) -> ValidationResult {
    TransitionValidator::default().validate(current, requested, tier, data)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
