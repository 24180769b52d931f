//! Churn engine entrypoint: scores a customer export and prints a portfolio report.
//! Fits the feature transformer on first run and reuses the saved snapshot afterwards.
//! Logs go to stderr; the report JSON goes to stdout.

use churn_engine::{
    config::EngineConfig,
    dataset::load_customers,
    features::FeatureTransformer,
    logging::{AssessmentLogLine, StructuredLogger},
    model::{ChurnClassifier, OnnxClassifier},
    risk::{BusinessImpactEngine, RiskTier},
};
use std::io::Write;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("CHURN_ENGINE_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = EngineConfig::load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(data_path = ?config.data_path, "churn engine starting");

    let dataset = load_customers(&config.data_path)?;
    let records = dataset.records();

    let transformer = if config.snapshot_path.exists() {
        FeatureTransformer::load_snapshot(&config.snapshot_path)?
    } else {
        let mut t = FeatureTransformer::new();
        t.fit(&records)?;
        t.save_snapshot(&config.snapshot_path)?;
        t
    };

    let classifier = OnnxClassifier::load(&config.classifier)?;
    let engine = BusinessImpactEngine::new(config.business.clone())?;

    let matrix = transformer.transform(&records)?;
    let probabilities = classifier.predict_proba(&matrix)?;
    let (report, segmented) = engine.analyze(&records, &probabilities, config.report.top_n)?;

    let stderr = std::io::stderr();
    let mut audit = stderr.lock();
    for (customer, seg) in dataset.customers.iter().zip(&segmented) {
        if seg.risk_tier == RiskTier::Low {
            continue;
        }
        let (Some(monthly), Some(tenure)) =
            (seg.customer.monthly_charges, seg.customer.tenure_months)
        else {
            continue;
        };
        let assessment = engine.assess(seg.customer.churn_probability, monthly, tenure);
        let line = AssessmentLogLine::new(customer.customer_id.as_deref(), &assessment);
        StructuredLogger::emit_json(&line, &mut audit)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;

    info!(report_id = %report.report_id, "churn engine run complete");
    Ok(())
}
