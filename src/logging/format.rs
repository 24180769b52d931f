//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use crate::error::Result;
use crate::risk::ChurnAssessment;
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Audit line for one assessed customer.
#[derive(Debug, Serialize)]
pub struct AssessmentLogLine<'a> {
    pub ts: String,
    pub level: &'a str,
    pub target: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<&'a str>,
    pub churn_probability: f64,
    pub risk_score: u8,
    pub risk_tier: &'a str,
    pub lifetime_value: f64,
    pub recommended_action: &'a str,
}

impl<'a> AssessmentLogLine<'a> {
    pub fn new(customer_id: Option<&'a str>, assessment: &'a ChurnAssessment) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            level: "INFO",
            target: "churn_engine::assessment",
            message: "churn assessment",
            customer_id,
            churn_probability: assessment.churn_probability,
            risk_score: assessment.risk_score,
            risk_tier: assessment.risk_tier.as_str(),
            lifetime_value: assessment.lifetime_value,
            recommended_action: assessment.recommended_action.as_str(),
        }
    }
}

/// Process-wide log setup for the churn engine binary.
///
/// Diagnostics and per-customer assessment lines share stderr, so a run's stdout holds
/// nothing but the portfolio report and can be piped straight into another tool.
pub struct StructuredLogger;

impl StructuredLogger {
    /// Route `tracing` events from fit, transform and report generation to stderr.
    /// `RUST_LOG` wins over `default_level` (the `log.level` config value).
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    /// Write `event` as one ndjson line; used for assessment audit lines, bypassing the filter.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)?;
        Ok(())
    }
}
