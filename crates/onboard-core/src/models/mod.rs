//! Data models for onboarding progress.
//!
//! - [`step`]: step identifiers and audit milestones
//! - [`tier`]: subscription tiers, billing cycles and tier requirements
//! - [`record`]: the durable [`ProgressionRecord`] and payment outcomes
//! - [`action`]: the [`NextAction`] routing projection
//!
//! Records implement [`std::fmt::Display`] as markdown, the same way the
//! CLI renders everything else.

pub mod action;
pub mod record;
pub mod step;
pub mod tier;

pub use action::{ActionKind, ActionTarget, NextAction, Routes};
pub use record::{PaymentFailure, PaymentResult, ProgressionRecord, StepData};
pub use step::{Milestone, StepId};
pub use tier::{BillingCycle, Tier, TierRequirement};
