//! Feature transformer: fit vocabularies and scaling once, then encode any number of batches.

use super::derived::DerivedFeatures;
use super::encoding::{CategoryVocabulary, ScalingParams};
use super::schema::{
    encode_binary, lookup_column, validate_field_set, ColumnKind, RawCustomerRecord,
    FEATURE_COLUMNS, TENURE_BUCKET,
};
use super::FeatureMatrix;
use crate::error::{ChurnError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Everything learned by `fit`. Read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedState {
    pub category_vocabularies: BTreeMap<String, CategoryVocabulary>,
    pub numeric_scaling: BTreeMap<String, ScalingParams>,
    pub feature_order: Vec<String>,
}

impl FittedState {
    /// Structural check for state that did not come straight out of `fit` (e.g. a loaded snapshot).
    pub fn validate(&self) -> Result<()> {
        let expected: Vec<&str> = FEATURE_COLUMNS.iter().map(|(name, _)| *name).collect();
        if self.feature_order != expected {
            return Err(ChurnError::IncompatibleSnapshot(format!(
                "feature order {:?} does not match the customer schema",
                self.feature_order
            )));
        }
        for (name, kind) in FEATURE_COLUMNS.iter() {
            match kind {
                ColumnKind::Categorical => {
                    if self.vocabulary(name)?.is_empty() {
                        return Err(ChurnError::IncompatibleSnapshot(format!(
                            "empty vocabulary for {}",
                            name
                        )));
                    }
                }
                ColumnKind::Scaled => self.scaling(name)?.check(name)?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn vocabulary(&self, field: &str) -> Result<&CategoryVocabulary> {
        self.category_vocabularies
            .get(field)
            .ok_or_else(|| ChurnError::IncompatibleSnapshot(format!("no vocabulary for {}", field)))
    }

    pub fn scaling(&self, column: &str) -> Result<&ScalingParams> {
        self.numeric_scaling.get(column).ok_or_else(|| {
            ChurnError::IncompatibleSnapshot(format!("no scaling parameters for {}", column))
        })
    }

    fn resolved_columns(&self) -> Result<Vec<(&'static str, ColumnKind)>> {
        self.feature_order
            .iter()
            .map(|name| {
                lookup_column(name).ok_or_else(|| {
                    ChurnError::IncompatibleSnapshot(format!("unknown column {}", name))
                })
            })
            .collect()
    }

    fn encode_record(
        &self,
        columns: &[(&'static str, ColumnKind)],
        record: &RawCustomerRecord,
    ) -> Result<Vec<f64>> {
        validate_field_set(record)?;
        let derived = DerivedFeatures::from_record(record)?;
        columns
            .iter()
            .map(|&(column, kind)| match kind {
                ColumnKind::Binary { negative, positive } => {
                    encode_binary(column, negative, positive, record.text(column)?)
                }
                ColumnKind::Flag => record.flag(column),
                ColumnKind::Categorical => self
                    .vocabulary(column)?
                    .encode(column, categorical_token(record, &derived, column)?),
                ColumnKind::Scaled => {
                    let params = self.scaling(column)?;
                    params.check(column)?;
                    Ok(params.scale(numeric_value(record, &derived, column)?))
                }
                ColumnKind::Indicator => Ok(if derived.has_premium { 1.0 } else { 0.0 }),
            })
            .collect()
    }
}

fn categorical_token<'a>(
    record: &'a RawCustomerRecord,
    derived: &DerivedFeatures,
    column: &'static str,
) -> Result<&'a str> {
    if column == TENURE_BUCKET {
        Ok(derived.tenure_bucket.as_str())
    } else {
        record.text(column)
    }
}

fn numeric_value(
    record: &RawCustomerRecord,
    derived: &DerivedFeatures,
    column: &'static str,
) -> Result<f64> {
    match derived.numeric(column) {
        Some(v) => Ok(v),
        None => record.amount(column),
    }
}

/// Stateful encoder/scaler. `fit` takes `&mut self`, `transform` takes `&self`: once fitted, a
/// transformer can be shared (e.g. behind `Arc`) and used from many threads.
#[derive(Debug, Clone, Default)]
pub struct FeatureTransformer {
    state: Option<FittedState>,
}

impl FeatureTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap previously fitted state after validating it.
    pub fn from_state(state: FittedState) -> Result<Self> {
        state.validate()?;
        Ok(Self { state: Some(state) })
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&FittedState> {
        self.state.as_ref()
    }

    pub fn feature_order(&self) -> Result<&[String]> {
        self.state
            .as_ref()
            .map(|s| s.feature_order.as_slice())
            .ok_or(ChurnError::NotFitted)
    }

    /// Learn vocabularies (first-seen order) and scaling parameters from `records`.
    /// Existing state is replaced only if the whole fit succeeds.
    pub fn fit(&mut self, records: &[RawCustomerRecord]) -> Result<()> {
        if records.is_empty() {
            return Err(ChurnError::InsufficientData);
        }

        let mut vocabularies: BTreeMap<String, CategoryVocabulary> = BTreeMap::new();
        let mut numeric: BTreeMap<&'static str, Vec<f64>> = BTreeMap::new();
        for (name, kind) in FEATURE_COLUMNS.iter() {
            match kind {
                ColumnKind::Categorical => {
                    vocabularies.insert(name.to_string(), CategoryVocabulary::default());
                }
                ColumnKind::Scaled => {
                    numeric.insert(*name, Vec::with_capacity(records.len()));
                }
                _ => {}
            }
        }

        for (row, record) in records.iter().enumerate() {
            observe_record(record, &mut vocabularies, &mut numeric).map_err(|e| {
                warn!(row, error = %e, "record rejected during fit");
                e
            })?;
        }

        let mut numeric_scaling = BTreeMap::new();
        for (column, values) in &numeric {
            numeric_scaling.insert(column.to_string(), ScalingParams::fit(column, values)?);
        }

        for (field, vocab) in &vocabularies {
            debug!(field = %field, categories = vocab.len(), "vocabulary learned");
        }

        self.state = Some(FittedState {
            category_vocabularies: vocabularies,
            numeric_scaling,
            feature_order: FEATURE_COLUMNS.iter().map(|(name, _)| name.to_string()).collect(),
        });
        info!(
            records = records.len(),
            columns = FEATURE_COLUMNS.len(),
            "feature transformer fitted"
        );
        Ok(())
    }

    /// Encode `records` with the frozen state. Output columns follow `feature_order`.
    pub fn transform(&self, records: &[RawCustomerRecord]) -> Result<FeatureMatrix> {
        let state = self.state.as_ref().ok_or(ChurnError::NotFitted)?;
        let columns = state.resolved_columns()?;

        let mut values = Array2::<f64>::zeros((records.len(), columns.len()));
        for (row, record) in records.iter().enumerate() {
            let encoded = state.encode_record(&columns, record).map_err(|e| {
                warn!(row, error = %e, "record rejected during transform");
                e
            })?;
            for (dst, v) in values.row_mut(row).iter_mut().zip(encoded) {
                *dst = v;
            }
        }

        debug!(rows = records.len(), columns = columns.len(), "records transformed");
        Ok(FeatureMatrix {
            columns: state.feature_order.clone(),
            values,
        })
    }

    pub fn fit_transform(&mut self, records: &[RawCustomerRecord]) -> Result<FeatureMatrix> {
        self.fit(records)?;
        self.transform(records)
    }
}

fn observe_record(
    record: &RawCustomerRecord,
    vocabularies: &mut BTreeMap<String, CategoryVocabulary>,
    numeric: &mut BTreeMap<&'static str, Vec<f64>>,
) -> Result<()> {
    validate_field_set(record)?;
    let derived = DerivedFeatures::from_record(record)?;
    for &(column, kind) in FEATURE_COLUMNS.iter() {
        match kind {
            ColumnKind::Binary { negative, positive } => {
                encode_binary(column, negative, positive, record.text(column)?)?;
            }
            ColumnKind::Flag => {
                record.flag(column)?;
            }
            ColumnKind::Categorical => {
                let token = categorical_token(record, &derived, column)?;
                if let Some(vocab) = vocabularies.get_mut(column) {
                    vocab.observe(token);
                }
            }
            ColumnKind::Scaled => {
                let v = numeric_value(record, &derived, column)?;
                if let Some(values) = numeric.get_mut(column) {
                    values.push(v);
                }
            }
            ColumnKind::Indicator => {}
        }
    }
    Ok(())
}
