//! Transition primitive and the step-specific operations built on it.

use jiff::Timestamp;
use log::{debug, info, warn};
use serde_json::Value;

use super::ProgressionStateMachine;
use crate::{
    error::{OnboardingError, Result},
    models::{
        BillingCycle, Milestone, PaymentFailure, PaymentResult, ProgressionRecord, StepData,
        StepId, Tier,
    },
    store::ProgressStore,
    validator::ValidationResult,
};

impl<S: ProgressStore> ProgressionStateMachine<S> {
    /// Moves to `next`, merging `data` into the accumulated step data.
    ///
    /// Required fields are checked against the accumulated data plus `data`.
    /// Rejections come back as `Ok` with the non-allowed result and leave the
    /// machine and the store untouched. An allowed move is written to the
    /// store exactly once and only committed in memory after that write
    /// succeeds.
    ///
    /// The plan fields of the record follow the merged data: `selectedPlan`
    /// and `billingCycle` update `selected_plan` and `billing_cycle`, and
    /// `payment_pending` is set exactly while the record sits in a payment
    /// step.
    ///
    /// If the returned future is dropped while the write is in flight, the
    /// write may still land after the machine has kept its previous state.
    /// Call [`resume`](Self::resume) before reusing the machine.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before initialization; any store error from the
    /// write, in which case the machine keeps its previous state.
    pub async fn transition_to(&mut self, next: StepId, data: StepData) -> Result<ValidationResult> {
        self.apply(next, data, |_| {}).await
    }

    /// First hop of [`submit_business_info`](Self::submit_business_info):
    /// enters `business_info`, stamping `started_at` on first entry.
    pub async fn enter_business_info(&mut self) -> Result<ValidationResult> {
        let now = Timestamp::now();
        self.apply(StepId::BusinessInfo, StepData::new(), move |record| {
            record.started_at.get_or_insert(now);
        })
        .await
    }

    /// Second hop of [`submit_business_info`](Self::submit_business_info):
    /// `business_info -> subscription_selection` with the submitted fields.
    pub async fn complete_business_info(&mut self, data: StepData) -> Result<ValidationResult> {
        self.transition_to(StepId::SubscriptionSelection, data).await
    }

    /// Submits business details, entering `business_info` first when the
    /// user has not started yet.
    ///
    /// The data is checked against the second hop before the first is taken,
    /// so incomplete details leave a fresh user at `not_started` with nothing
    /// written.
    pub async fn submit_business_info(&mut self, data: StepData) -> Result<ValidationResult> {
        if self.current_state()? == StepId::NotStarted {
            let precheck = self.check(StepId::BusinessInfo, StepId::SubscriptionSelection, &data)?;
            if !precheck.is_allowed() {
                debug!("{}: business info rejected: {precheck}", self.principal);
                return Ok(precheck);
            }

            let entered = self.enter_business_info().await?;
            if !entered.is_allowed() {
                return Ok(entered);
            }
        }

        self.complete_business_info(data).await
    }

    /// Records the chosen plan. Free goes straight to `completed`; paid
    /// tiers go to `payment_pending`.
    pub async fn select_subscription(
        &mut self,
        plan: Tier,
        billing_cycle: Option<BillingCycle>,
    ) -> Result<ValidationResult> {
        let next = if plan.is_paid() {
            StepId::PaymentPending
        } else {
            StepId::Completed
        };

        let mut data = StepData::new();
        data.insert("selectedPlan".into(), Value::from(plan.as_str()));
        if let Some(cycle) = billing_cycle {
            data.insert("billingCycle".into(), Value::from(cycle.as_str()));
        }

        self.transition_to(next, data).await
    }

    /// `payment_pending -> payment_processing`.
    pub async fn initiate_payment(&mut self) -> Result<ValidationResult> {
        self.transition_to(StepId::PaymentProcessing, StepData::new())
            .await
    }

    /// `payment_processing -> completed`, recording the processor's ids.
    pub async fn complete_payment(&mut self, result: PaymentResult) -> Result<ValidationResult> {
        let mut data = StepData::new();
        data.insert("paymentId".into(), Value::from(result.payment_id.as_str()));
        if let Some(subscription_id) = &result.subscription_id {
            data.insert("subscriptionId".into(), Value::from(subscription_id.as_str()));
        }

        self.apply(StepId::Completed, data, move |record| {
            record.payment_id = Some(result.payment_id);
            record.subscription_id = result.subscription_id;
        })
        .await
    }

    /// `payment_processing -> payment_pending`, keeping the failure message.
    ///
    /// Payment callbacks can race with navigation, so outside
    /// `payment_processing` this does nothing and returns `Ok(None)`.
    pub async fn handle_payment_failure(
        &mut self,
        failure: PaymentFailure,
    ) -> Result<Option<ValidationResult>> {
        let current = self.current_state()?;
        if current != StepId::PaymentProcessing {
            debug!(
                "{}: ignoring payment failure while at {current}",
                self.principal
            );
            return Ok(None);
        }

        let result = self
            .apply(StepId::PaymentPending, StepData::new(), move |record| {
                record.last_payment_error = Some(failure.message);
            })
            .await?;
        Ok(Some(result))
    }

    /// `payment_pending -> subscription_selection`. The previously selected
    /// plan stays in the record and the step data.
    pub async fn go_back_to_plan_selection(&mut self) -> Result<ValidationResult> {
        self.transition_to(StepId::SubscriptionSelection, StepData::new())
            .await
    }

    /// Parks the machine in `error` with a diagnostic message.
    ///
    /// `error` is not reachable through the transition table; this is the
    /// only way in. A completed record is left alone and `Ok(false)` is
    /// returned.
    pub async fn record_error(&mut self, message: impl Into<String>) -> Result<bool> {
        let record = self.record()?;
        if record.is_complete() {
            return Ok(false);
        }

        let from = record.current_step;
        let mut updated = record.clone();
        updated.current_step = StepId::Error;
        updated.payment_pending = false;
        updated.last_error = Some(message.into());
        updated.last_updated = Some(Timestamp::now());

        self.commit(from, updated).await?;
        Ok(true)
    }

    /// `error -> business_info`. Accumulated data and milestones are kept.
    pub async fn restart(&mut self) -> Result<ValidationResult> {
        self.transition_to(StepId::BusinessInfo, StepData::new())
            .await
    }

    /// Dry-runs a move from the current step to the step named `requested`
    /// using the accumulated data, the way a route guard asks before
    /// rendering a page. Nothing is written.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before initialization.
    pub fn can_enter(&self, requested: &str) -> Result<ValidationResult> {
        let record = self.record()?;
        let tier = tier_of(&record.step_data).or(record.selected_plan);
        Ok(self
            .validator
            .validate_named(record.current_step, requested, tier, &record.step_data))
    }

    /// Dry-runs `from -> to` with `data` merged over the accumulated data.
    fn check(&self, from: StepId, to: StepId, data: &StepData) -> Result<ValidationResult> {
        let record = self.record()?;
        let mut view = record.step_data.clone();
        merge_data(&mut view, data.clone());
        let tier = tier_of(&view).or(record.selected_plan);
        Ok(self.validator.validate(from, to, tier, &view))
    }

    async fn apply<F>(&mut self, next: StepId, data: StepData, update: F) -> Result<ValidationResult>
    where
        F: FnOnce(&mut ProgressionRecord),
    {
        let record = self.record.as_ref().ok_or(OnboardingError::NotInitialized)?;
        let current = record.current_step;

        let mut view = record.step_data.clone();
        merge_data(&mut view, data);
        let tier = tier_of(&view).or(record.selected_plan);

        let result = self.validator.validate(current, next, tier, &view);
        if !result.is_allowed() {
            debug!(
                "{}: {current} -> {next} rejected ({}): {result}",
                self.principal,
                result.reason_code()
            );
            return Ok(result);
        }

        let direction = if self.validator.registry().is_forward(current, next) {
            "forward"
        } else {
            "backward"
        };
        debug!("{}: {current} -> {next} ({direction})", self.principal);

        let now = Timestamp::now();
        let mut updated = record.clone();
        updated.selected_plan = tier;
        updated.billing_cycle = cycle_of(&view).or(record.billing_cycle);
        updated.step_data = view;
        if let Some(milestone) = Milestone::earned_by(current, next) {
            updated.mark_completed(milestone);
        }
        updated.current_step = next;
        updated.payment_pending =
            matches!(next, StepId::PaymentPending | StepId::PaymentProcessing);
        updated.last_updated = Some(now);
        updated.last_error = None;
        updated.last_payment_error = None;
        if next == StepId::Completed {
            updated.onboarding_completed_at = Some(now);
        }
        update(&mut updated);

        self.commit(current, updated).await?;
        Ok(result)
    }

    /// Writes `updated` and adopts it only once the write has succeeded.
    /// A failed or cancelled write leaves the previous record in memory; a
    /// cancelled one may still reach the store.
    async fn commit(&mut self, from: StepId, updated: ProgressionRecord) -> Result<()> {
        if let Err(e) = self.store.save(&self.principal, &updated).await {
            warn!(
                "{}: failed to persist {from} -> {}: {e}",
                self.principal, updated.current_step
            );
            return Err(e);
        }

        info!("{}: {from} -> {}", self.principal, updated.current_step);
        self.record = Some(updated);
        Ok(())
    }
}

/// Adds `data` to `target`. Keys are never removed and nulls are skipped,
/// so later steps cannot erase what earlier steps submitted.
fn merge_data(target: &mut StepData, data: StepData) {
    for (key, value) in data {
        if !value.is_null() {
            target.insert(key, value);
        }
    }
}

fn tier_of(data: &StepData) -> Option<Tier> {
    data.get("selectedPlan")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

fn cycle_of(data: &StepData) -> Option<BillingCycle> {
    data.get("billingCycle")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}
