//! Business-impact engine: per-customer risk assessment and portfolio retention economics.

mod engine;
mod portfolio;

pub use engine::{
    lifetime_value, recommended_action, risk_score, risk_tier, BusinessImpactEngine,
    ChurnAssessment, RecommendedAction, RiskTier, AT_RISK_THRESHOLD, CRITICAL_THRESHOLD,
    HIGH_VALUE_THRESHOLD, MEDIUM_THRESHOLD,
};
pub use portfolio::{
    InterventionPlan, PortfolioReport, RevenueAtRisk, RevenueBasis, ScoredCustomer,
    SegmentedCustomer, SelectionPolicy, TierSummary, DEFAULT_TOP_N,
};
