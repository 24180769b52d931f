//! Churn engine: customer feature pipeline and retention business-impact analysis.
//!
//! Modular structure:
//! - [`features`]: Raw customer records → derived features → encoded, scaled matrix
//! - [`model`]: Classifier contract and ONNX churn classifier
//! - [`risk`]: Risk scoring, lifetime value, retention actions, portfolio report
//! - [`dataset`]: Customer export ingestion
//! - [`logging`]: Structured JSON logging

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod risk;

pub use config::EngineConfig;
pub use error::{ChurnError, Result};
pub use features::{FeatureMatrix, FeatureTransformer, RawCustomerRecord};
pub use logging::StructuredLogger;
pub use model::{ChurnClassifier, OnnxClassifier};
pub use risk::{BusinessImpactEngine, PortfolioReport};
