//! Classifier contract: numeric feature matrix in, churn probability per row out.

mod onnx;

pub use onnx::OnnxClassifier;

use crate::error::Result;
use crate::features::FeatureMatrix;

/// Anything that maps transformed customer rows to P(churn).
/// One probability per row, each in [0, 1].
pub trait ChurnClassifier {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;
}

impl<C: ChurnClassifier + ?Sized> ChurnClassifier for &C {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        (**self).predict_proba(features)
    }
}

impl<C: ChurnClassifier + ?Sized> ChurnClassifier for Box<C> {
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        (**self).predict_proba(features)
    }
}
