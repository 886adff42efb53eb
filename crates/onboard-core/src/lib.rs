//! Core library for the onboarding progression engine.
//!
//! The engine decides which setup step a freshly authenticated user may be
//! on, what each step requires, how the chosen subscription tier branches
//! the rest of the flow (free skips payment, paid tiers do not), and records
//! every accepted move durably so the user can resume after a reload or a
//! failed payment.
//!
//! # Components
//!
//! - [`registry`]: the immutable [`StepRegistry`] of steps and edges
//! - [`validator`]: the pure [`TransitionValidator`] and its
//!   [`ValidationResult`] reason taxonomy
//! - [`machine`]: the [`ProgressionStateMachine`] that applies transitions
//! - [`store`]: the [`ProgressStore`] persistence seam with memory and
//!   SQLite adapters
//! - [`models`]: records, step ids, tiers and the [`NextAction`] projection
//!
//! # Quick Start
//!
//! ```rust
//! use onboard_core::{BillingCycle, SqliteStore, ProgressionStateMachine, Tier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::builder()
//!     .with_database_path(Some("onboard.db"))
//!     .build()
//!     .await?;
//!
//! let mut machine = ProgressionStateMachine::new("user-42", store);
//! machine.resume().await?;
//!
//! let result = machine
//!     .select_subscription(Tier::Professional, Some(BillingCycle::Monthly))
//!     .await?;
//! if !result.is_allowed() {
//!     println!("Rejected: {result}");
//! }
//! println!("{}", machine.next_action()?);
//! # Ok(())
//! # }
//! ```

pub mod display;
pub mod error;
pub mod machine;
pub mod models;
pub mod registry;
pub mod store;
pub mod validator;

// Re-export commonly used types
pub use display::OperationStatus;
pub use error::{OnboardingError, Result};
pub use machine::ProgressionStateMachine;
pub use models::{
    ActionKind, ActionTarget, BillingCycle, Milestone, NextAction, PaymentFailure, PaymentResult,
    ProgressionRecord, Routes, StepData, StepId, Tier, TierRequirement,
};
pub use registry::{Edge, StepDefinition, StepRegistry};
pub use store::{MemoryStore, ProgressStore, SqliteStore, SqliteStoreBuilder};
pub use validator::{TransitionValidator, ValidationResult};
