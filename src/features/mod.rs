//! Customer feature pipeline: raw records → derived business features → encoded, scaled matrix.

mod derived;
mod encoding;
mod pipeline;
pub mod schema;
mod snapshot;

pub use derived::{DerivedFeatures, TenureBucket};
pub use encoding::{CategoryVocabulary, ScalingParams};
pub use pipeline::{FeatureTransformer, FittedState};
pub use schema::{FieldValue, RawCustomerRecord};
pub use snapshot::TransformerSnapshot;

use ndarray::{Array2, ArrayView1};

/// Row-per-customer numeric matrix with named columns (classifier input).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.values.row(i)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|i| self.values.column(i))
    }

    /// f32 copy for model runtimes.
    pub fn to_f32(&self) -> Array2<f32> {
        self.values.mapv(|v| v as f32)
    }
}
