//! The stateful onboarding engine.
//!
//! A [`ProgressionStateMachine`] belongs to one session principal and one
//! in-flight interaction (a request, or a browser tab). It must be
//! initialized from the durable record before use, either directly with
//! [`initialize`](ProgressionStateMachine::initialize) or by loading it with
//! [`resume`](ProgressionStateMachine::resume).
//!
//! ```text
//! caller ─▶ transition_to ─▶ TransitionValidator ─▶ ProgressStore::save ─▶ commit
//!                                   │                        │
//!                                   └─ rejection (data)      └─ error: state untouched
//! ```
//!
//! # Example
//!
//! ```rust
//! use onboard_core::{MemoryStore, ProgressionStateMachine, StepId, Tier};
//! use serde_json::json;
//!
//! # async fn example() -> onboard_core::Result<()> {
//! let mut machine = ProgressionStateMachine::new("user-42", MemoryStore::new());
//! machine.resume().await?;
//!
//! let info = json!({"businessName": "Acme", "businessType": "LLC"});
//! machine
//!     .submit_business_info(info.as_object().cloned().unwrap_or_default())
//!     .await?;
//! machine.select_subscription(Tier::Free, None).await?;
//!
//! assert_eq!(machine.current_state()?, StepId::Completed);
//! assert!(machine.is_complete());
//! # Ok(())
//! # }
//! ```

use log::debug;

use crate::{
    error::{OnboardingError, Result},
    models::{NextAction, ProgressionRecord, Routes, StepData, StepId},
    store::ProgressStore,
    validator::TransitionValidator,
};

mod transitions;


/// Tier-gated onboarding workflow bound to one principal.
pub struct ProgressionStateMachine<S> {
    principal: String,
    store: S,
    validator: TransitionValidator<'static>,
    routes: Routes,
    record: Option<ProgressionRecord>,
}

impl<S: ProgressStore> ProgressionStateMachine<S> {
    /// Creates an uninitialized machine for `principal`.
    pub fn new(principal: impl Into<String>, store: S) -> Self {
        Self {
            principal: principal.into(),
            store,
            validator: TransitionValidator::default(),
            routes: Routes::default(),
            record: None,
        }
    }

    /// Overrides the page locations used by [`next_action`](Self::next_action).
    pub fn with_routes(mut self, routes: Routes) -> Self {
        self.routes = routes;
        self
    }

    /// Adopts `record` as the current state.
    ///
    /// The record is taken as-is: `current_step` is authoritative and
    /// `completed_steps` is never used to second-guess it. Calling this
    /// repeatedly with the same record has no further effect.
    pub fn initialize(&mut self, record: ProgressionRecord) {
        debug!(
            "{}: initialized at {}",
            self.principal, record.current_step
        );
        self.record = Some(record);
    }

    /// Loads the principal's record from the store and initializes from it.
    /// A principal with no record starts at `not_started`; nothing is written.
    ///
    /// # Errors
    ///
    /// Propagates store failures; the machine is left as it was.
    pub async fn resume(&mut self) -> Result<&ProgressionRecord> {
        let record = self
            .store
            .load(&self.principal)
            .await?
            .unwrap_or_default();
        self.initialize(record);
        self.record()
    }

    pub fn is_initialized(&self) -> bool {
        self.record.is_some()
    }

    /// The durable record as last committed.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::NotInitialized` before initialization.
    pub fn record(&self) -> Result<&ProgressionRecord> {
        self.record.as_ref().ok_or(OnboardingError::NotInitialized)
    }

    /// # Errors
    ///
    /// Returns `OnboardingError::NotInitialized` before initialization.
    pub fn current_state(&self) -> Result<StepId> {
        self.record().map(|r| r.current_step)
    }

    /// Every field submitted so far, across all steps.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::NotInitialized` before initialization.
    pub fn state_data(&self) -> Result<&StepData> {
        self.record().map(|r| &r.step_data)
    }

    /// Where the caller should send the user next.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::NotInitialized` before initialization.
    pub fn next_action(&self) -> Result<NextAction> {
        self.current_state()
            .map(|step| self.routes.next_action(step))
    }

    /// True once the record is `completed`; false while uninitialized.
    pub fn is_complete(&self) -> bool {
        self.record.as_ref().is_some_and(ProgressionRecord::is_complete)
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn validator(&self) -> TransitionValidator<'static> {
        self.validator
    }
}
