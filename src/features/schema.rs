//! Customer record schema: the fixed raw field set, its value types, and the output column layout.

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GENDER: &str = "gender";
pub const SENIOR_CITIZEN: &str = "SeniorCitizen";
pub const PARTNER: &str = "Partner";
pub const DEPENDENTS: &str = "Dependents";
pub const TENURE: &str = "tenure";
pub const PHONE_SERVICE: &str = "PhoneService";
pub const MULTIPLE_LINES: &str = "MultipleLines";
pub const INTERNET_SERVICE: &str = "InternetService";
pub const ONLINE_SECURITY: &str = "OnlineSecurity";
pub const ONLINE_BACKUP: &str = "OnlineBackup";
pub const DEVICE_PROTECTION: &str = "DeviceProtection";
pub const TECH_SUPPORT: &str = "TechSupport";
pub const STREAMING_TV: &str = "StreamingTV";
pub const STREAMING_MOVIES: &str = "StreamingMovies";
pub const CONTRACT: &str = "Contract";
pub const PAPERLESS_BILLING: &str = "PaperlessBilling";
pub const PAYMENT_METHOD: &str = "PaymentMethod";
pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
pub const TOTAL_CHARGES: &str = "TotalCharges";

pub const TENURE_BUCKET: &str = "tenure_bucket";
pub const TOTAL_SERVICES: &str = "total_services";
pub const CHARGE_PER_SERVICE: &str = "charge_per_service";
pub const CUSTOMER_VALUE: &str = "customer_value";
pub const HAS_PREMIUM: &str = "has_premium";

/// Raw input fields, in dataset order.
pub const RAW_FIELDS: [&str; 19] = [
    GENDER,
    SENIOR_CITIZEN,
    PARTNER,
    DEPENDENTS,
    TENURE,
    PHONE_SERVICE,
    MULTIPLE_LINES,
    INTERNET_SERVICE,
    ONLINE_SECURITY,
    ONLINE_BACKUP,
    DEVICE_PROTECTION,
    TECH_SUPPORT,
    STREAMING_TV,
    STREAMING_MOVIES,
    CONTRACT,
    PAPERLESS_BILLING,
    PAYMENT_METHOD,
    MONTHLY_CHARGES,
    TOTAL_CHARGES,
];

/// Services counted towards `total_services`.
pub const SERVICE_FIELDS: [&str; 8] = [
    PHONE_SERVICE,
    INTERNET_SERVICE,
    ONLINE_SECURITY,
    ONLINE_BACKUP,
    DEVICE_PROTECTION,
    TECH_SUPPORT,
    STREAMING_TV,
    STREAMING_MOVIES,
];

/// How an output column is produced from a record and its derived features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Two-token field mapped to {0, 1}
    Binary {
        negative: &'static str,
        positive: &'static str,
    },
    /// Numeric 0/1 field passed through
    Flag,
    /// Multi-valued field encoded through the fitted vocabulary
    Categorical,
    /// Numeric column standardized with fitted mean/std
    Scaled,
    /// Derived boolean passed through as 0/1
    Indicator,
}

const NO_YES: ColumnKind = ColumnKind::Binary {
    negative: "No",
    positive: "Yes",
};

/// Output columns in the order every fitted transformer emits them.
pub static FEATURE_COLUMNS: [(&str, ColumnKind); 24] = [
    (
        GENDER,
        ColumnKind::Binary {
            negative: "Female",
            positive: "Male",
        },
    ),
    (SENIOR_CITIZEN, ColumnKind::Flag),
    (PARTNER, NO_YES),
    (DEPENDENTS, NO_YES),
    (TENURE, ColumnKind::Scaled),
    (PHONE_SERVICE, NO_YES),
    (MULTIPLE_LINES, ColumnKind::Categorical),
    (INTERNET_SERVICE, ColumnKind::Categorical),
    (ONLINE_SECURITY, ColumnKind::Categorical),
    (ONLINE_BACKUP, ColumnKind::Categorical),
    (DEVICE_PROTECTION, ColumnKind::Categorical),
    (TECH_SUPPORT, ColumnKind::Categorical),
    (STREAMING_TV, ColumnKind::Categorical),
    (STREAMING_MOVIES, ColumnKind::Categorical),
    (CONTRACT, ColumnKind::Categorical),
    (PAPERLESS_BILLING, NO_YES),
    (PAYMENT_METHOD, ColumnKind::Categorical),
    (MONTHLY_CHARGES, ColumnKind::Scaled),
    (TOTAL_CHARGES, ColumnKind::Scaled),
    (TENURE_BUCKET, ColumnKind::Categorical),
    (TOTAL_SERVICES, ColumnKind::Scaled),
    (CHARGE_PER_SERVICE, ColumnKind::Scaled),
    (CUSTOMER_VALUE, ColumnKind::Scaled),
    (HAS_PREMIUM, ColumnKind::Indicator),
];

/// Static name and kind of an output column.
pub fn lookup_column(column: &str) -> Option<(&'static str, ColumnKind)> {
    FEATURE_COLUMNS.iter().find(|(name, _)| *name == column).copied()
}

pub fn column_kind(column: &str) -> Option<ColumnKind> {
    lookup_column(column).map(|(_, kind)| kind)
}

/// Columns of a given kind, in output order.
pub fn columns_of(kind: fn(&ColumnKind) -> bool) -> impl Iterator<Item = &'static str> {
    FEATURE_COLUMNS
        .iter()
        .filter(move |(_, k)| kind(k))
        .map(|(name, _)| *name)
}

/// Scalar value of one record field. `Null` is an explicitly empty cell in an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Null,
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// One customer row: field name → scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCustomerRecord(BTreeMap<String, FieldValue>);

impl RawCustomerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn text(&self, field: &'static str) -> Result<&str> {
        match self.0.get(field) {
            Some(FieldValue::Text(s)) => Ok(s),
            Some(FieldValue::Number(n)) => Err(ChurnError::InvalidFieldValue {
                field,
                reason: format!("expected text, got number {}", n),
            }),
            Some(FieldValue::Null) => Err(ChurnError::InvalidFieldValue {
                field,
                reason: "expected text, got null".to_string(),
            }),
            None => Err(ChurnError::MissingField { field }),
        }
    }

    pub fn number(&self, field: &'static str) -> Result<f64> {
        match self.0.get(field) {
            Some(FieldValue::Number(n)) => Ok(*n),
            Some(FieldValue::Text(s)) => Err(ChurnError::InvalidFieldValue {
                field,
                reason: format!("expected number, got text {:?}", s),
            }),
            Some(FieldValue::Null) => Err(ChurnError::InvalidFieldValue {
                field,
                reason: "expected number, got null".to_string(),
            }),
            None => Err(ChurnError::MissingField { field }),
        }
    }

    /// Finite, non-negative numeric field (tenure and charges).
    pub fn amount(&self, field: &'static str) -> Result<f64> {
        let v = self.number(field)?;
        if !v.is_finite() || v < 0.0 {
            return Err(ChurnError::InvalidFieldValue {
                field,
                reason: format!("expected a finite value >= 0, got {}", v),
            });
        }
        Ok(v)
    }

    /// Numeric 0/1 flag.
    pub fn flag(&self, field: &'static str) -> Result<f64> {
        let v = self.number(field)?;
        if v == 0.0 || v == 1.0 {
            Ok(v)
        } else {
            Err(ChurnError::InvalidFieldValue {
                field,
                reason: format!("expected 0 or 1, got {}", v),
            })
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for RawCustomerRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Reject records whose field set differs from [`RAW_FIELDS`].
pub fn validate_field_set(record: &RawCustomerRecord) -> Result<()> {
    for field in RAW_FIELDS {
        if record.get(field).is_none() {
            return Err(ChurnError::MissingField { field });
        }
    }
    if let Some(extra) = record.fields().find(|f| !RAW_FIELDS.contains(f)) {
        return Err(ChurnError::UnexpectedField {
            field: extra.to_string(),
        });
    }
    Ok(())
}

/// Map a two-token field to 0 or 1.
pub fn encode_binary(field: &str, negative: &str, positive: &str, token: &str) -> Result<f64> {
    if token == positive {
        Ok(1.0)
    } else if token == negative {
        Ok(0.0)
    } else {
        Err(ChurnError::UnseenCategory {
            field: field.to_string(),
            value: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_columns_cover_every_raw_field() {
        for field in RAW_FIELDS {
            assert!(column_kind(field).is_some(), "{} has no output column", field);
        }
        assert_eq!(FEATURE_COLUMNS.len(), RAW_FIELDS.len() + 5);
    }

    #[test]
    fn scaled_columns() {
        let scaled: Vec<_> = columns_of(|k| *k == ColumnKind::Scaled).collect();
        assert_eq!(
            scaled,
            vec![
                TENURE,
                MONTHLY_CHARGES,
                TOTAL_CHARGES,
                TOTAL_SERVICES,
                CHARGE_PER_SERVICE,
                CUSTOMER_VALUE
            ]
        );
    }

    #[test]
    fn typed_accessors() {
        let r = RawCustomerRecord::new()
            .with(TENURE, 12i64)
            .with(GENDER, "Male")
            .with(MONTHLY_CHARGES, -1.0)
            .with(SENIOR_CITIZEN, 2i64);
        assert_eq!(r.number(TENURE).unwrap(), 12.0);
        assert_eq!(r.text(GENDER).unwrap(), "Male");
        assert!(matches!(r.text(TENURE), Err(ChurnError::InvalidFieldValue { .. })));
        assert!(matches!(r.amount(MONTHLY_CHARGES), Err(ChurnError::InvalidFieldValue { .. })));
        assert!(matches!(r.flag(SENIOR_CITIZEN), Err(ChurnError::InvalidFieldValue { .. })));
        assert!(matches!(
            r.number(TOTAL_CHARGES),
            Err(ChurnError::MissingField { field: TOTAL_CHARGES })
        ));
    }

    #[test]
    fn binary_tokens() {
        assert_eq!(encode_binary(GENDER, "Female", "Male", "Male").unwrap(), 1.0);
        assert_eq!(encode_binary(PARTNER, "No", "Yes", "No").unwrap(), 0.0);
        let err = encode_binary(PARTNER, "No", "Yes", "Maybe").unwrap_err();
        assert!(matches!(err, ChurnError::UnseenCategory { ref value, .. } if value == "Maybe"));
    }

    #[test]
    fn record_deserializes_from_json_object() {
        let r: RawCustomerRecord =
            serde_json::from_str(r#"{"tenure": 3, "gender": "Female"}"#).unwrap();
        assert_eq!(r.get(TENURE), Some(&FieldValue::Number(3.0)));
        assert_eq!(r.get(GENDER), Some(&FieldValue::Text("Female".into())));
    }

    #[test]
    fn null_cells_parse_but_are_not_values() {
        let r: RawCustomerRecord =
            serde_json::from_str(r#"{"TotalCharges": null, "gender": null}"#).unwrap();
        assert_eq!(r.get(TOTAL_CHARGES), Some(&FieldValue::Null));
        assert!(matches!(
            r.number(TOTAL_CHARGES),
            Err(ChurnError::InvalidFieldValue { field: TOTAL_CHARGES, .. })
        ));
        assert!(matches!(
            r.text(GENDER),
            Err(ChurnError::InvalidFieldValue { field: GENDER, .. })
        ));
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"TotalCharges":null,"gender":null}"#);
    }
}
