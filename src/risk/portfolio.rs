//! Portfolio economics over a scored batch: revenue at risk, intervention ROI,
//! tier segmentation, report.

use super::engine::{risk_score, risk_tier, BusinessImpactEngine, RiskTier, AT_RISK_THRESHOLD};
use crate::error::{ChurnError, Result};
use crate::features::schema::{MONTHLY_CHARGES, TENURE};
use crate::features::RawCustomerRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Default number of top-ranked customers targeted by a report's intervention plan.
pub const DEFAULT_TOP_N: usize = 500;

const MONTHS_PER_YEAR: f64 = 12.0;

/// One customer with the probability produced by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub churn_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_charges: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenure_months: Option<f64>,
}

impl ScoredCustomer {
    pub fn new(churn_probability: f64) -> Self {
        Self {
            customer_id: None,
            churn_probability,
            monthly_charges: None,
            tenure_months: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    pub fn with_monthly_charges(mut self, monthly: f64) -> Self {
        self.monthly_charges = Some(monthly);
        self
    }

    pub fn with_tenure(mut self, months: f64) -> Self {
        self.tenure_months = Some(months);
        self
    }

    /// Pull monetary fields out of a raw record.
    /// Absent fields stay `None`; present but invalid ones are errors.
    pub fn from_record(record: &RawCustomerRecord, churn_probability: f64) -> Result<Self> {
        let monthly_charges = match record.get(MONTHLY_CHARGES) {
            Some(_) => Some(record.amount(MONTHLY_CHARGES)?),
            None => None,
        };
        let tenure_months = match record.get(TENURE) {
            Some(_) => Some(record.amount(TENURE)?),
            None => None,
        };
        Ok(Self {
            customer_id: None,
            churn_probability,
            monthly_charges,
            tenure_months,
        })
    }
}

/// Which computation produced a revenue figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueBasis {
    /// Sum of the customers' own monthly charges
    Observed,
    /// Configured average revenue per customer, used when the batch lacks monthly charges
    AverageRevenueFallback,
}

impl RevenueBasis {
    /// Observed only when every customer in the batch carries a monthly charge.
    pub fn of(batch: &[ScoredCustomer]) -> Self {
        if batch.iter().all(|c| c.monthly_charges.is_some()) {
            RevenueBasis::Observed
        } else {
            RevenueBasis::AverageRevenueFallback
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueAtRisk {
    /// Annual revenue held by customers with probability ≥ 0.5
    pub amount: f64,
    pub customers: usize,
    pub basis: RevenueBasis,
}

/// How the intervention plan picked its customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "n", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Highest probabilities first, ties in input order
    TopN(usize),
    /// Everyone at or above the at-risk threshold
    AtRiskThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionPlan {
    pub selection: SelectionPolicy,
    pub customers_targeted: usize,
    pub intervention_cost: f64,
    pub potential_annual_revenue: f64,
    pub expected_revenue_saved: f64,
    pub net_benefit: f64,
    pub roi_percentage: f64,
    pub revenue_basis: RevenueBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedCustomer {
    #[serde(flatten)]
    pub customer: ScoredCustomer,
    pub risk_score: u8,
    pub risk_tier: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: RiskTier,
    pub customers: usize,
    pub mean_probability: f64,
    /// Sum of monthly charges, when the batch carries them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_customers: usize,
    pub high_risk_customers: usize,
    pub medium_risk_customers: usize,
    pub low_risk_customers: usize,
    pub revenue_at_risk: RevenueAtRisk,
    pub intervention_plan: InterventionPlan,
    pub tier_summary: Vec<TierSummary>,
}

fn check_probabilities(batch: &[ScoredCustomer]) -> Result<()> {
    for (row, c) in batch.iter().enumerate() {
        if !(0.0..=1.0).contains(&c.churn_probability) {
            return Err(ChurnError::InvalidProbability {
                row,
                value: c.churn_probability,
            });
        }
    }
    Ok(())
}

impl BusinessImpactEngine {
    fn annual_revenue(&self, selection: &[&ScoredCustomer], basis: RevenueBasis) -> f64 {
        match basis {
            RevenueBasis::Observed => {
                selection.iter().filter_map(|c| c.monthly_charges).sum::<f64>()
                    * MONTHS_PER_YEAR
            }
            RevenueBasis::AverageRevenueFallback => {
                selection.len() as f64 * self.config.average_revenue_per_customer * MONTHS_PER_YEAR
            }
        }
    }

    /// Annual revenue of customers with probability ≥ 0.5. Fails on a probability outside [0, 1].
    pub fn revenue_at_risk(&self, batch: &[ScoredCustomer]) -> Result<RevenueAtRisk> {
        check_probabilities(batch)?;
        let basis = RevenueBasis::of(batch);
        let at_risk: Vec<&ScoredCustomer> = batch
            .iter()
            .filter(|c| c.churn_probability >= AT_RISK_THRESHOLD)
            .collect();
        Ok(RevenueAtRisk {
            amount: self.annual_revenue(&at_risk, basis),
            customers: at_risk.len(),
            basis,
        })
    }

    /// Customers an intervention would target, highest probability first.
    /// Probabilities must lie in [0, 1]; NaN would otherwise rank above every customer.
    pub fn select_targets<'a>(
        &self,
        batch: &'a [ScoredCustomer],
        top_n: Option<usize>,
    ) -> Result<Vec<&'a ScoredCustomer>> {
        check_probabilities(batch)?;
        let mut ranked: Vec<&ScoredCustomer> = batch.iter().collect();
        // stable: equal probabilities keep input order
        ranked.sort_by(|a, b| b.churn_probability.total_cmp(&a.churn_probability));
        match top_n {
            Some(n) => ranked.truncate(n),
            None => ranked.retain(|c| c.churn_probability >= AT_RISK_THRESHOLD),
        }
        Ok(ranked)
    }

    /// Retention campaign economics: top `top_n` by probability, or everyone at risk when `None`.
    pub fn intervention_plan(
        &self,
        batch: &[ScoredCustomer],
        top_n: Option<usize>,
    ) -> Result<InterventionPlan> {
        let selection = match top_n {
            Some(n) => SelectionPolicy::TopN(n),
            None => SelectionPolicy::AtRiskThreshold,
        };
        let basis = RevenueBasis::of(batch);
        let targets = self.select_targets(batch, top_n)?;

        let cost = targets.len() as f64 * self.config.campaign_cost_per_customer;
        let potential = self.annual_revenue(&targets, basis);
        let saved = potential * self.config.campaign_success_rate;
        let net = saved - cost;
        let roi = if cost > 0.0 { net / cost * 100.0 } else { 0.0 };

        Ok(InterventionPlan {
            selection,
            customers_targeted: targets.len(),
            intervention_cost: cost,
            potential_annual_revenue: potential,
            expected_revenue_saved: saved,
            net_benefit: net,
            roi_percentage: roi,
            revenue_basis: basis,
        })
    }

    /// Attach score and tier to each customer; summarize per tier, most severe first.
    pub fn segment(
        &self,
        batch: &[ScoredCustomer],
    ) -> Result<(Vec<SegmentedCustomer>, Vec<TierSummary>)> {
        check_probabilities(batch)?;
        let segmented: Vec<SegmentedCustomer> = batch
            .iter()
            .map(|c| SegmentedCustomer {
                customer: c.clone(),
                risk_score: risk_score(c.churn_probability),
                risk_tier: risk_tier(c.churn_probability),
            })
            .collect();

        let with_revenue = RevenueBasis::of(batch) == RevenueBasis::Observed;
        let summary = [RiskTier::Critical, RiskTier::Medium, RiskTier::Low]
            .into_iter()
            .filter_map(|tier| {
                let members: Vec<&SegmentedCustomer> =
                    segmented.iter().filter(|s| s.risk_tier == tier).collect();
                if members.is_empty() {
                    return None;
                }
                let n = members.len();
                let mean =
                    members.iter().map(|s| s.customer.churn_probability).sum::<f64>() / n as f64;
                let revenue = with_revenue.then(|| {
                    members
                        .iter()
                        .filter_map(|s| s.customer.monthly_charges)
                        .sum::<f64>()
                });
                Some(TierSummary {
                    tier,
                    customers: n,
                    mean_probability: mean,
                    monthly_revenue: revenue,
                })
            })
            .collect();

        Ok((segmented, summary))
    }

    /// Full portfolio report. Tier counts come from the same tiering as `segment`.
    pub fn generate_report(
        &self,
        batch: &[ScoredCustomer],
        top_n: Option<usize>,
    ) -> Result<(PortfolioReport, Vec<SegmentedCustomer>)> {
        let (segmented, tier_summary) = self.segment(batch)?;
        let count = |tier: RiskTier| segmented.iter().filter(|s| s.risk_tier == tier).count();

        let report = PortfolioReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            total_customers: segmented.len(),
            high_risk_customers: count(RiskTier::Critical),
            medium_risk_customers: count(RiskTier::Medium),
            low_risk_customers: count(RiskTier::Low),
            revenue_at_risk: self.revenue_at_risk(batch)?,
            intervention_plan: self.intervention_plan(batch, top_n)?,
            tier_summary,
        };

        info!(
            report_id = %report.report_id,
            customers = report.total_customers,
            high_risk = report.high_risk_customers,
            medium_risk = report.medium_risk_customers,
            revenue_at_risk = report.revenue_at_risk.amount,
            roi = report.intervention_plan.roi_percentage,
            "portfolio report generated"
        );
        Ok((report, segmented))
    }

    /// Pair raw records with classifier probabilities and build the report.
    pub fn analyze(
        &self,
        records: &[RawCustomerRecord],
        probabilities: &[f64],
        top_n: Option<usize>,
    ) -> Result<(PortfolioReport, Vec<SegmentedCustomer>)> {
        if records.len() != probabilities.len() {
            return Err(ChurnError::LengthMismatch {
                records: records.len(),
                probabilities: probabilities.len(),
            });
        }
        let batch = records
            .iter()
            .zip(probabilities)
            .map(|(r, &p)| ScoredCustomer::from_record(r, p))
            .collect::<Result<Vec<_>>>()?;
        self.generate_report(&batch, top_n)
    }
}
