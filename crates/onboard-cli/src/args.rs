use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use onboard_core::{BillingCycle, Tier};
use serde_json::Value;

/// Drive a user's onboarding from the terminal
///
/// Every command loads the principal's progress record, applies one step of
/// the onboarding workflow and writes the result back, exactly as a web
/// request would.
#[derive(Parser)]
#[command(version, about, name = "onboard")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/onboard/onboard.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Session principal whose progress is read and written
    #[arg(long, short, global = true, default_value = "default")]
    pub principal: String,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the onboard CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Show the progress record and what to do next
    #[command(alias = "s")]
    Status,
    /// Show only the next action
    Next,
    /// Check whether a step can be entered from where the principal is now
    Check {
        /// Step id, e.g. payment_pending
        step: String,
    },
    /// Submit business details
    #[command(alias = "bi")]
    BusinessInfo(BusinessInfoArgs),
    /// Choose a subscription plan
    Plan(PlanArgs),
    /// Start processing payment for the selected plan
    Pay,
    /// Report a successful payment
    ConfirmPayment(ConfirmPaymentArgs),
    /// Report a failed payment
    FailPayment {
        /// Failure message from the payment processor
        message: String,
    },
    /// Go back from payment to plan selection
    Back,
    /// Move the principal into the error state
    Fail {
        /// Diagnostic message to record
        message: String,
    },
    /// Restart onboarding from business info after an error
    Restart,
    /// Delete the principal's progress record
    Reset,
}

#[derive(ClapArgs)]
pub struct BusinessInfoArgs {
    /// Registered business name
    #[arg(short, long)]
    pub name: Option<String>,
    /// Business type (LLC, sole proprietorship, ...)
    #[arg(short = 't', long = "type")]
    pub business_type: Option<String>,
    /// Extra field as key=value; JSON values are parsed, anything else is a
    /// string
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

#[derive(ClapArgs)]
pub struct PlanArgs {
    /// Subscription tier
    pub tier: TierArg,
    /// Billing cycle for paid tiers
    #[arg(short, long)]
    pub cycle: Option<CycleArg>,
}

#[derive(ClapArgs)]
pub struct ConfirmPaymentArgs {
    /// Payment identifier from the processor
    #[arg(long)]
    pub payment_id: String,
    /// Subscription identifier from the processor
    #[arg(long)]
    pub subscription_id: Option<String>,
}

/// Tier values accepted on the command line
#[derive(Clone, Copy, ValueEnum)]
pub enum TierArg {
    Free,
    Professional,
    Enterprise,
}

impl From<TierArg> for Tier {
    fn from(val: TierArg) -> Self {
        match val {
            TierArg::Free => Tier::Free,
            TierArg::Professional => Tier::Professional,
            TierArg::Enterprise => Tier::Enterprise,
        }
    }
}

/// Billing cycle values accepted on the command line
#[derive(Clone, Copy, ValueEnum)]
pub enum CycleArg {
    Monthly,
    #[value(alias = "yearly")]
    Annual,
}

impl From<CycleArg> for BillingCycle {
    fn from(val: CycleArg) -> Self {
        match val {
            CycleArg::Monthly => BillingCycle::Monthly,
            CycleArg::Annual => BillingCycle::Annual,
        }
    }
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_string_and_json() {
        assert_eq!(
            parse_field("city=Berlin").unwrap(),
            ("city".to_string(), Value::from("Berlin"))
        );
        assert_eq!(
            parse_field("employees=12").unwrap(),
            ("employees".to_string(), Value::from(12))
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn test_args_parse_plan() {
        let args = Args::try_parse_from(["onboard", "--principal", "alice", "plan", "professional", "--cycle", "yearly"])
            .unwrap();
        assert_eq!(args.principal, "alice");
        match args.command {
            Some(Commands::Plan(plan)) => {
                assert_eq!(Tier::from(plan.tier), Tier::Professional);
                assert!(matches!(plan.cycle, Some(CycleArg::Annual)));
            }
            _ => panic!("expected plan command"),
        }
    }
}
