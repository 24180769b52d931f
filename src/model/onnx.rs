//! ONNX Runtime churn classifier.
//! Input: [n, n_features] f32, output: class probabilities ([n, 2] or [n]).
//! Uses `ort`; if the model file is missing the classifier loads in unavailable mode and
//! predictions fail with `ModelUnavailable` instead of producing made-up probabilities.

use super::ChurnClassifier;
use crate::config::ClassifierConfig;
use crate::error::{ChurnError, Result};
use crate::features::FeatureMatrix;
use ndarray::CowArray;
use ort::{Environment, GraphOptimizationLevel, Session, SessionBuilder, Value};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

static ORT_ENV: OnceLock<Arc<Environment>> = OnceLock::new();

fn inference_error(e: impl Display) -> ChurnError {
    ChurnError::Inference(e.to_string())
}

fn init_env() -> Result<Arc<Environment>> {
    if let Some(env) = ORT_ENV.get() {
        return Ok(env.clone());
    }
    let env = Environment::builder()
        .with_name("churn-engine")
        .build()
        .map_err(inference_error)?
        .into_arc();
    Ok(ORT_ENV.get_or_init(|| env).clone())
}

pub struct OnnxClassifier {
    session: Option<Session>,
    model_path: PathBuf,
    probability_output: usize,
}

impl OnnxClassifier {
    pub fn load(config: &ClassifierConfig) -> Result<Self> {
        let model_path = config.model_path.clone();
        if !model_path.exists() {
            warn!(
                path = %model_path.display(),
                "ONNX churn model not found; predictions unavailable"
            );
            return Ok(Self {
                session: None,
                model_path,
                probability_output: config.probability_output,
            });
        }

        let env = init_env()?;
        let session = SessionBuilder::new(&env)
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level1))
            .and_then(|b| b.with_model_from_file(&model_path))
            .map_err(inference_error)?;
        info!(
            path = %model_path.display(),
            inputs = session.inputs.len(),
            outputs = session.outputs.len(),
            "ONNX churn model loaded"
        );

        Ok(Self {
            session: Some(session),
            model_path,
            probability_output: config.probability_output,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }
}

impl ChurnClassifier for OnnxClassifier {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let Some(ref session) = self.session else {
            return Err(ChurnError::ModelUnavailable(self.model_path.clone()));
        };
        let rows = features.nrows();
        if rows == 0 {
            return Ok(Vec::new());
        }

        let input = CowArray::from(features.to_f32().into_dyn());
        let value = Value::from_array(session.allocator(), &input).map_err(inference_error)?;
        let outputs = session.run(vec![value]).map_err(inference_error)?;
        let output = outputs.get(self.probability_output).ok_or_else(|| {
            ChurnError::Inference(format!(
                "model has {} outputs, probability output {} requested",
                outputs.len(),
                self.probability_output
            ))
        })?;
        let tensor = output.try_extract::<f32>().map_err(inference_error)?;
        let flat: Vec<f64> = tensor.view().iter().map(|&v| v as f64).collect();
        positive_class(&flat, rows)
    }
}

/// Positive-class column from a flattened probability tensor of width 1 or 2.
fn positive_class(flat: &[f64], rows: usize) -> Result<Vec<f64>> {
    if rows == 0 || flat.len() % rows != 0 {
        return Err(ChurnError::Inference(format!(
            "{} probability values for {} rows",
            flat.len(),
            rows
        )));
    }
    let probs: Vec<f64> = match flat.len() / rows {
        1 => flat.to_vec(),
        2 => flat.chunks_exact(2).map(|pair| pair[1]).collect(),
        width => {
            return Err(ChurnError::Inference(format!(
                "expected 1 or 2 probability columns, got {}",
                width
            )))
        }
    };
    if let Some((row, &value)) = probs.iter().enumerate().find(|(_, p)| !(0.0..=1.0).contains(*p)) {
        return Err(ChurnError::InvalidProbability { row, value });
    }
    Ok(probs)
}
