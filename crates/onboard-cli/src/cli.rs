//! Command handlers: one engine operation per command.

use anyhow::{bail, Context, Result};
use onboard_core::{
    OperationStatus, PaymentFailure, PaymentResult, ProgressionStateMachine, SqliteStore,
    StepData, ValidationResult,
};
use serde_json::Value;

use crate::{
    args::{BusinessInfoArgs, Commands, ConfirmPaymentArgs, PlanArgs},
    renderer::TerminalRenderer,
};

pub struct Cli {
    machine: ProgressionStateMachine<SqliteStore>,
    renderer: TerminalRenderer,
}

impl Cli {
    /// Loads the principal's record so every command starts from the
    /// durable state.
    pub async fn new(
        mut machine: ProgressionStateMachine<SqliteStore>,
        renderer: TerminalRenderer,
    ) -> Result<Self> {
        machine
            .resume()
            .await
            .context("Failed to load onboarding progress")?;
        Ok(Self { machine, renderer })
    }

    pub async fn handle(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Status => self.status(),
            Commands::Next => self.next(),
            Commands::Check { step } => self.check(&step),
            Commands::BusinessInfo(args) => self.business_info(args).await,
            Commands::Plan(args) => self.plan(args).await,
            Commands::Pay => {
                let result = self.machine.initiate_payment().await?;
                self.report(&result)
            }
            Commands::ConfirmPayment(args) => self.confirm_payment(args).await,
            Commands::FailPayment { message } => self.fail_payment(message).await,
            Commands::Back => {
                let result = self.machine.go_back_to_plan_selection().await?;
                self.report(&result)
            }
            Commands::Fail { message } => self.fail(message).await,
            Commands::Restart => {
                let result = self.machine.restart().await?;
                self.report(&result)
            }
            Commands::Reset => self.reset().await,
        }
    }

    fn status(&self) -> Result<()> {
        let record = self.machine.record()?;
        self.renderer.render(&record.to_string());
        self.next()
    }

    fn next(&self) -> Result<()> {
        let action = self.machine.next_action()?;
        self.renderer.render(&format!("\n{action}"));
        Ok(())
    }

    fn check(&self, step: &str) -> Result<()> {
        let result = self.machine.can_enter(step)?;
        match result.allowed_next() {
            Some(next) => {
                self.renderer.render(
                    &OperationStatus::success(format!("{} ({next}) can be entered", next.label()))
                        .to_string(),
                );
                Ok(())
            }
            None => {
                self.renderer
                    .render(&OperationStatus::failure(result.to_string()).to_string());
                bail!("Transition rejected ({})", result.reason_code())
            }
        }
    }

    async fn business_info(&mut self, args: BusinessInfoArgs) -> Result<()> {
        let mut data: StepData = args.fields.into_iter().collect();
        if let Some(name) = args.name {
            data.insert("businessName".into(), Value::from(name));
        }
        if let Some(business_type) = args.business_type {
            data.insert("businessType".into(), Value::from(business_type));
        }

        let result = self.machine.submit_business_info(data).await?;
        self.report(&result)
    }

    async fn plan(&mut self, args: PlanArgs) -> Result<()> {
        let result = self
            .machine
            .select_subscription(args.tier.into(), args.cycle.map(Into::into))
            .await?;
        self.report(&result)
    }

    async fn confirm_payment(&mut self, args: ConfirmPaymentArgs) -> Result<()> {
        let result = self
            .machine
            .complete_payment(PaymentResult {
                payment_id: args.payment_id,
                subscription_id: args.subscription_id,
            })
            .await?;
        self.report(&result)
    }

    async fn fail_payment(&mut self, message: String) -> Result<()> {
        match self
            .machine
            .handle_payment_failure(PaymentFailure::new(message))
            .await?
        {
            Some(result) => self.report(&result),
            None => {
                let step = self.machine.current_state()?;
                self.renderer.render(&format!(
                    "No payment in progress (at {step}); nothing recorded.\n"
                ));
                Ok(())
            }
        }
    }

    async fn fail(&mut self, message: String) -> Result<()> {
        if self.machine.record_error(message).await? {
            self.renderer
                .render(&OperationStatus::success("Moved to error").to_string());
            self.next()
        } else {
            bail!("Onboarding is already complete")
        }
    }

    async fn reset(&mut self) -> Result<()> {
        let principal = self.machine.principal().to_string();
        let removed = self
            .machine
            .store()
            .delete(&principal)
            .await
            .context("Failed to delete progress")?;
        let message = if removed {
            format!("Progress for '{principal}' deleted")
        } else {
            format!("No progress recorded for '{principal}'")
        };
        self.renderer
            .render(&OperationStatus::success(message).to_string());
        Ok(())
    }

    /// Prints the outcome; rejections become a non-zero exit.
    fn report(&self, result: &ValidationResult) -> Result<()> {
        if !result.is_allowed() {
            self.renderer
                .render(&OperationStatus::failure(result.to_string()).to_string());
            bail!("Transition rejected ({})", result.reason_code());
        }

        let step = self.machine.current_state()?;
        self.renderer.render(
            &OperationStatus::success(format!("Moved to {} ({step})", step.label())).to_string(),
        );
        self.next()
    }
}
