//! Engine configuration. Business constants are fixed at construction and never mutated.

use crate::error::{ChurnError, Result};
use crate::risk::DEFAULT_TOP_N;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Customer records (JSON array) scored by the binary
    pub data_path: PathBuf,
    /// Fitted transformer snapshot; created on first run
    pub snapshot_path: PathBuf,
    /// Classifier model
    pub classifier: ClassifierConfig,
    /// Retention economics
    pub business: BusinessConfig,
    /// Portfolio report parameters
    pub report: ReportConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path to ONNX churn classifier
    pub model_path: PathBuf,
    /// Index of the model output holding class probabilities
    pub probability_output: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    /// Monthly revenue assumed for customers without a monthly charge
    pub average_revenue_per_customer: f64,
    /// Retention campaign cost per targeted customer
    pub campaign_cost_per_customer: f64,
    /// Fraction of targeted customers retained (0.0–1.0)
    pub campaign_success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Customers targeted by the intervention plan; `None` targets everyone at risk
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/customers.json"),
            snapshot_path: PathBuf::from("models/feature_transformer.json"),
            classifier: ClassifierConfig::default(),
            business: BusinessConfig::default(),
            report: ReportConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/churn_classifier.onnx"),
            probability_output: 1,
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            average_revenue_per_customer: 70.0,
            campaign_cost_per_customer: 10.0,
            campaign_success_rate: 0.3,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: Some(DEFAULT_TOP_N),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl BusinessConfig {
    /// Monetary values must be finite and non-negative; the success rate must lie in [0, 1].
    pub fn validate(&self) -> Result<()> {
        let amounts = [
            ("average_revenue_per_customer", self.average_revenue_per_customer),
            ("campaign_cost_per_customer", self.campaign_cost_per_customer),
        ];
        for (name, v) in amounts {
            if !v.is_finite() || v < 0.0 {
                return Err(ChurnError::InvalidConfiguration(format!(
                    "{} must be a finite value >= 0, got {}",
                    name, v
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.campaign_success_rate) {
            return Err(ChurnError::InvalidConfiguration(format!(
                "campaign_success_rate must be within [0, 1], got {}",
                self.campaign_success_rate
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default.
    /// A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&data)
            .map_err(|e| ChurnError::InvalidConfiguration(format!("{}: {}", path.display(), e)))?;
        config.business.validate()?;
        Ok(config)
    }
}
