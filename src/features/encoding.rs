//! Fitted encoders: learned category vocabularies and standardization parameters.

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};

/// Ordered token list for one categorical field. A token's code is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    tokens: Vec<String>,
}

impl CategoryVocabulary {
    /// Record a token during fit; new tokens get the next unused code.
    pub fn observe(&mut self, token: &str) -> usize {
        match self.code(token) {
            Some(code) => code,
            None => {
                self.tokens.push(token.to_string());
                self.tokens.len() - 1
            }
        }
    }

    pub fn code(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }

    /// Code for `token`, or `UnseenCategory` naming the field and value.
    pub fn encode(&self, field: &str, token: &str) -> Result<f64> {
        self.code(token)
            .map(|c| c as f64)
            .ok_or_else(|| ChurnError::UnseenCategory {
                field: field.to_string(),
                value: token.to_string(),
            })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Mean and population standard deviation of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    pub mean: f64,
    pub std_dev: f64,
}

impl ScalingParams {
    /// Two-pass mean/std over a column. Zero or non-finite spread is rejected.
    pub fn fit(column: &str, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ChurnError::InsufficientData);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let params = Self {
            mean,
            std_dev: variance.sqrt(),
        };
        params.check(column)?;
        Ok(params)
    }

    pub fn check(&self, column: &str) -> Result<()> {
        if !self.mean.is_finite() || !self.std_dev.is_finite() || self.std_dev <= 0.0 {
            return Err(ChurnError::DegenerateFeature {
                column: column.to_string(),
                std_dev: self.std_dev,
            });
        }
        Ok(())
    }

    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_assigns_codes_in_first_seen_order() {
        let mut v = CategoryVocabulary::default();
        assert_eq!(v.observe("Month-to-month"), 0);
        assert_eq!(v.observe("Two year"), 1);
        assert_eq!(v.observe("Month-to-month"), 0);
        assert_eq!(v.observe("One year"), 2);
        assert_eq!(v.tokens(), ["Month-to-month", "Two year", "One year"]);
        assert_eq!(v.encode("Contract", "One year").unwrap(), 2.0);
    }

    #[test]
    fn vocabulary_rejects_unseen_token() {
        let mut v = CategoryVocabulary::default();
        v.observe("DSL");
        match v.encode("InternetService", "Satellite") {
            Err(ChurnError::UnseenCategory { field, value }) => {
                assert_eq!(field, "InternetService");
                assert_eq!(value, "Satellite");
            }
            other => panic!("expected UnseenCategory, got {:?}", other),
        }
    }

    #[test]
    fn scaling_uses_population_std() {
        let p = ScalingParams::fit("x", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(p.mean, 5.0);
        assert_eq!(p.std_dev, 2.0);
        assert_eq!(p.scale(9.0), 2.0);
    }

    #[test]
    fn constant_column_is_degenerate() {
        let err = ScalingParams::fit("tenure", &[3.0, 3.0, 3.0]).unwrap_err();
        assert!(
            matches!(err, ChurnError::DegenerateFeature { ref column, .. } if column == "tenure")
        );
    }
}
