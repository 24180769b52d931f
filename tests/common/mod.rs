//! Synthetic telco customers shared by the integration tests.
#![allow(dead_code)]

use churn_engine::error::Result;
use churn_engine::features::schema::*;
use churn_engine::features::FeatureMatrix;
use churn_engine::model::ChurnClassifier;
use churn_engine::RawCustomerRecord;

const INTERNET: [&str; 3] = ["DSL", "Fiber optic", "No"];
const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];
const PAYMENTS: [&str; 4] = [
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

/// Complete, valid record; `i` varies every field deterministically.
pub fn customer(i: usize, tenure: i64) -> RawCustomerRecord {
    let internet = INTERNET[i % 3];
    let addon = |k: usize| {
        if internet == "No" {
            "No internet service"
        } else {
            yes_no((i / 3 + k) % 2 == 0)
        }
    };
    let has_phone = i % 4 != 3;
    let monthly = 20.0 + (i % 7) as f64 * 10.5;

    RawCustomerRecord::new()
        .with(GENDER, if (i / 2) % 2 == 0 { "Female" } else { "Male" })
        .with(SENIOR_CITIZEN, if i % 5 == 0 { 1i64 } else { 0i64 })
        .with(PARTNER, yes_no(i % 2 == 0))
        .with(DEPENDENTS, yes_no(i % 3 == 0))
        .with(TENURE, tenure)
        .with(PHONE_SERVICE, yes_no(has_phone))
        .with(
            MULTIPLE_LINES,
            if has_phone { yes_no(i % 2 == 1) } else { "No phone service" },
        )
        .with(INTERNET_SERVICE, internet)
        .with(ONLINE_SECURITY, addon(0))
        .with(ONLINE_BACKUP, addon(1))
        .with(DEVICE_PROTECTION, addon(0))
        .with(TECH_SUPPORT, addon(1))
        .with(STREAMING_TV, addon(0))
        .with(STREAMING_MOVIES, addon(1))
        .with(CONTRACT, CONTRACTS[(i / 2) % 3])
        .with(PAPERLESS_BILLING, yes_no(i % 5 != 0))
        .with(PAYMENT_METHOD, PAYMENTS[i % 4])
        .with(MONTHLY_CHARGES, monthly)
        .with(TOTAL_CHARGES, tenure as f64 * monthly + (i % 5) as f64)
}

/// `n` customers alternating between 12 and 36 months of tenure.
/// For even `n` the tenure column has mean 24 and population std 12.
pub fn corpus(n: usize) -> Vec<RawCustomerRecord> {
    (0..n)
        .map(|i| customer(i, if i % 2 == 0 { 12 } else { 36 }))
        .collect()
}

/// Returns fixed probabilities regardless of input.
pub struct FixedClassifier(pub Vec<f64>);

impl ChurnClassifier for FixedClassifier {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        assert_eq!(features.nrows(), self.0.len());
        Ok(self.0.clone())
    }
}

/// Short tenure and high charges push the probability up; deterministic per row.
pub struct TenureStub;

impl ChurnClassifier for TenureStub {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let tenure = features.column_index(TENURE).expect("tenure column");
        let monthly = features.column_index(MONTHLY_CHARGES).expect("monthly column");
        Ok((0..features.nrows())
            .map(|i| {
                let row = features.row(i);
                let z = 0.5 - 1.2 * row[tenure] + 0.8 * row[monthly];
                1.0 / (1.0 + (-z).exp())
            })
            .collect())
    }
}
