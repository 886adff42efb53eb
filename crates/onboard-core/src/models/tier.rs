//! Subscription tiers and billing cycles.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Subscription level chosen during onboarding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Professional,
    Enterprise,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Professional => "professional",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Paid tiers must go through the payment steps.
    pub fn is_paid(&self) -> bool {
        !matches!(self, Tier::Free)
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "professional" => Ok(Tier::Professional),
            "enterprise" => Ok(Tier::Enterprise),
            _ => Err(format!("Invalid subscription tier: {s}")),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing period for paid tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BillingCycle::Monthly),
            "annual" | "yearly" => Ok(BillingCycle::Annual),
            _ => Err(format!("Invalid billing cycle: {s}")),
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of the free/paid split a step or edge requires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TierRequirement {
    /// Any tier other than free
    Paid,
    /// Only the free tier
    Free,
}

impl TierRequirement {
    /// A missing tier satisfies neither requirement.
    pub fn is_satisfied_by(&self, tier: Option<Tier>) -> bool {
        match (self, tier) {
            (TierRequirement::Paid, Some(t)) => t.is_paid(),
            (TierRequirement::Free, Some(t)) => !t.is_paid(),
            (_, None) => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TierRequirement::Paid => "paid",
            TierRequirement::Free => "free",
        }
    }
}

impl fmt::Display for TierRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_and_paid() {
        assert_eq!("Professional".parse::<Tier>(), Ok(Tier::Professional));
        assert!(Tier::Enterprise.is_paid());
        assert!(!Tier::Free.is_paid());
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn test_yearly_is_annual() {
        assert_eq!("yearly".parse::<BillingCycle>(), Ok(BillingCycle::Annual));
    }

    #[test]
    fn test_requirement_without_tier_fails() {
        assert!(!TierRequirement::Paid.is_satisfied_by(None));
        assert!(!TierRequirement::Free.is_satisfied_by(None));
        assert!(TierRequirement::Paid.is_satisfied_by(Some(Tier::Enterprise)));
        assert!(TierRequirement::Free.is_satisfied_by(Some(Tier::Free)));
        assert!(!TierRequirement::Free.is_satisfied_by(Some(Tier::Professional)));
    }
}
