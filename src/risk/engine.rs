//! Turns a churn probability into a risk score, tier, lifetime value and retention action.

use crate::config::BusinessConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Probability at or above which a customer is Critical.
pub const CRITICAL_THRESHOLD: f64 = 0.70;
/// Probability at or above which a customer is at least Medium.
pub const MEDIUM_THRESHOLD: f64 = 0.40;
/// Probability at or above which a customer counts towards revenue at risk.
pub const AT_RISK_THRESHOLD: f64 = 0.5;
/// Lifetime value above which a Critical customer gets personal outreach.
pub const HIGH_VALUE_THRESHOLD: f64 = 2000.0;

const EXPECTED_RELATIONSHIP_MONTHS: f64 = 24.0;
const MIN_REMAINING_MONTHS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    Critical,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= CRITICAL_THRESHOLD {
            RiskTier::Critical
        } else if probability >= MEDIUM_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::Critical => "Critical Risk",
        }
    }
}

/// Retention playbook entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    PersonalOutreach,
    AutomatedCampaign,
    ProactiveEngagement,
    StandardEngagement,
}

impl RecommendedAction {
    /// Fixed decision table over tier × high-value flag.
    pub fn decide(tier: RiskTier, high_value: bool) -> Self {
        match (tier, high_value) {
            (RiskTier::Critical, true) => RecommendedAction::PersonalOutreach,
            (RiskTier::Critical, false) => RecommendedAction::AutomatedCampaign,
            (RiskTier::Medium, _) => RecommendedAction::ProactiveEngagement,
            (RiskTier::Low, _) => RecommendedAction::StandardEngagement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::PersonalOutreach => {
                "Immediate personal outreach + premium retention offer"
            }
            RecommendedAction::AutomatedCampaign => "Automated retention campaign + discount offer",
            RecommendedAction::ProactiveEngagement => {
                "Proactive engagement + service upgrade offer"
            }
            RecommendedAction::StandardEngagement => "Standard engagement + loyalty program",
        }
    }
}

/// Probability rescaled to 0..=100, truncated.
pub fn risk_score(probability: f64) -> u8 {
    (probability * 100.0).floor().clamp(0.0, 100.0) as u8
}

pub fn risk_tier(probability: f64) -> RiskTier {
    RiskTier::from_probability(probability)
}

/// Monthly charge × expected remaining months (24 − tenure, at least 12).
pub fn lifetime_value(monthly_charge: f64, tenure_months: f64) -> f64 {
    monthly_charge * (EXPECTED_RELATIONSHIP_MONTHS - tenure_months).max(MIN_REMAINING_MONTHS)
}

pub fn recommended_action(probability: f64, lifetime_value: f64) -> RecommendedAction {
    RecommendedAction::decide(risk_tier(probability), lifetime_value > HIGH_VALUE_THRESHOLD)
}

/// Per-customer result; every field derives from the same probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnAssessment {
    pub churn_probability: f64,
    pub risk_score: u8,
    pub risk_tier: RiskTier,
    pub lifetime_value: f64,
    pub recommended_action: RecommendedAction,
}

/// Business-impact engine. Holds only immutable configuration; share freely across threads.
#[derive(Debug, Clone)]
pub struct BusinessImpactEngine {
    pub(crate) config: BusinessConfig,
}

impl BusinessImpactEngine {
    pub fn new(config: BusinessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    pub fn assess(
        &self,
        probability: f64,
        monthly_charge: f64,
        tenure_months: f64,
    ) -> ChurnAssessment {
        let value = lifetime_value(monthly_charge, tenure_months);
        let tier = risk_tier(probability);
        ChurnAssessment {
            churn_probability: probability,
            risk_score: risk_score(probability),
            risk_tier: tier,
            lifetime_value: value,
            recommended_action: RecommendedAction::decide(tier, value > HIGH_VALUE_THRESHOLD),
        }
    }
}

impl Default for BusinessImpactEngine {
    fn default() -> Self {
        Self {
            config: BusinessConfig::default(),
        }
    }
}
