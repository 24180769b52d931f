//! Customer dataset ingestion: a JSON array of customer objects as exported from the
//! billing system.
//!
//! Identifier and label columns are split off, and `TotalCharges` exported as text is
//! converted to a number. Blank, null or unparsable totals are imputed with the median of
//! the parsed ones; an export with no parsable total at all is rejected.

use crate::error::{ChurnError, Result};
use crate::features::schema::TOTAL_CHARGES;
use crate::features::{FieldValue, RawCustomerRecord};
use std::path::Path;
use tracing::{info, warn};

pub const CUSTOMER_ID: &str = "customerID";
pub const CHURN_LABEL: &str = "Churn";

/// One dataset row with identifier and label split from the feature fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub customer_id: Option<String>,
    /// Observed outcome, when the export carries it
    pub churned: Option<bool>,
    pub record: RawCustomerRecord,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub customers: Vec<CustomerRow>,
    /// Rows whose `TotalCharges` was replaced by the median
    pub imputed_total_charges: usize,
}

impl Dataset {
    pub fn records(&self) -> Vec<RawCustomerRecord> {
        self.customers.iter().map(|c| c.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

pub fn load_customers(path: &Path) -> Result<Dataset> {
    let data = std::fs::read_to_string(path)?;
    let rows: Vec<RawCustomerRecord> = serde_json::from_str(&data)?;
    let dataset = prepare(rows)?;
    info!(
        path = %path.display(),
        customers = dataset.len(),
        imputed_total_charges = dataset.imputed_total_charges,
        "customer dataset loaded"
    );
    Ok(dataset)
}

/// Split identifiers and labels, then clean `TotalCharges`.
pub fn prepare(rows: Vec<RawCustomerRecord>) -> Result<Dataset> {
    let mut customers = Vec::with_capacity(rows.len());
    let mut pending = Vec::new();
    let mut parsed_totals = Vec::new();

    for (row, mut record) in rows.into_iter().enumerate() {
        let customer_id = record.remove(CUSTOMER_ID).and_then(|v| match v {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Null => None,
        });
        let churned = match record.remove(CHURN_LABEL) {
            None | Some(FieldValue::Null) => None,
            Some(FieldValue::Text(s)) if s == "Yes" => Some(true),
            Some(FieldValue::Text(s)) if s == "No" => Some(false),
            Some(FieldValue::Number(n)) if n == 0.0 || n == 1.0 => Some(n == 1.0),
            Some(other) => {
                return Err(ChurnError::InvalidFieldValue {
                    field: CHURN_LABEL,
                    reason: format!("row {}: expected Yes/No, got {:?}", row, other),
                })
            }
        };

        let converted = match record.get(TOTAL_CHARGES) {
            Some(FieldValue::Number(n)) => {
                parsed_totals.push(*n);
                None
            }
            Some(FieldValue::Text(s)) => {
                Some(s.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
            }
            Some(FieldValue::Null) => Some(None),
            None => None,
        };
        match converted {
            Some(Some(n)) => {
                parsed_totals.push(n);
                record.insert(TOTAL_CHARGES, n);
            }
            Some(None) => pending.push(row),
            None => {}
        }

        customers.push(CustomerRow {
            customer_id,
            churned,
            record,
        });
    }

    if !pending.is_empty() {
        let fill = median(&mut parsed_totals).ok_or_else(|| ChurnError::InvalidFieldValue {
            field: TOTAL_CHARGES,
            reason: format!("no parsable value to impute {} blank rows from", pending.len()),
        })?;
        warn!(
            rows = pending.len(),
            fill,
            "TotalCharges missing or unparsable; imputing median"
        );
        for &row in &pending {
            customers[row].record.insert(TOTAL_CHARGES, fill);
        }
    }

    Ok(Dataset {
        customers,
        imputed_total_charges: pending.len(),
    })
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::schema::TENURE;

    fn row(id: &str, total: impl Into<FieldValue>, churn: &str) -> RawCustomerRecord {
        RawCustomerRecord::new()
            .with(CUSTOMER_ID, id)
            .with(TENURE, 10i64)
            .with(TOTAL_CHARGES, total)
            .with(CHURN_LABEL, churn)
    }

    #[test]
    fn splits_identifier_and_label() {
        let ds = prepare(vec![row("0001-A", 100.0, "Yes"), row("0002-B", "250.5", "No")]).unwrap();
        assert_eq!(ds.customers[0].customer_id.as_deref(), Some("0001-A"));
        assert_eq!(ds.customers[0].churned, Some(true));
        assert_eq!(ds.customers[1].churned, Some(false));
        assert!(ds.customers[0].record.get(CUSTOMER_ID).is_none());
        assert!(ds.customers[0].record.get(CHURN_LABEL).is_none());
        assert_eq!(ds.customers[1].record.number(TOTAL_CHARGES).unwrap(), 250.5);
        assert_eq!(ds.imputed_total_charges, 0);
    }

    #[test]
    fn blank_totals_take_the_median() {
        let ds = prepare(vec![
            row("a", 10.0, "No"),
            row("b", " ", "No"),
            row("c", "30", "No"),
            row("d", 50.0, "No"),
            row("e", FieldValue::Null, "No"),
        ])
        .unwrap();
        assert_eq!(ds.imputed_total_charges, 2);
        assert_eq!(ds.customers[1].record.number(TOTAL_CHARGES).unwrap(), 30.0);
        assert_eq!(ds.customers[4].record.number(TOTAL_CHARGES).unwrap(), 30.0);
    }

    #[test]
    fn all_blank_totals_fail() {
        let err = prepare(vec![row("a", " ", "No"), row("b", "", "Yes")]).unwrap_err();
        assert!(matches!(
            err,
            ChurnError::InvalidFieldValue { field: TOTAL_CHARGES, .. }
        ));
    }

    #[test]
    fn null_cells_in_export_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.json");
        std::fs::write(
            &path,
            r#"[
                {"customerID": "0001-A", "tenure": 2, "TotalCharges": "40.0", "Churn": "No"},
                {"customerID": null, "tenure": 0, "TotalCharges": null, "Churn": null}
            ]"#,
        )
        .unwrap();
        let ds = load_customers(&path).unwrap();
        assert_eq!(ds.imputed_total_charges, 1);
        assert_eq!(ds.customers[1].customer_id, None);
        assert_eq!(ds.customers[1].churned, None);
        assert_eq!(ds.customers[1].record.number(TOTAL_CHARGES).unwrap(), 40.0);
    }

    #[test]
    fn bad_label_is_rejected() {
        let err = prepare(vec![row("a", 1.0, "Maybe")]).unwrap_err();
        assert!(matches!(err, ChurnError::InvalidFieldValue { field: CHURN_LABEL, .. }));
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.json");
        std::fs::write(
            &path,
            r#"[{"customerID": "7590-VHVEG", "tenure": 1,
                 "TotalCharges": "29.85", "Churn": "No"}]"#,
        )
        .unwrap();
        let ds = load_customers(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].number(TOTAL_CHARGES).unwrap(), 29.85);
    }
}
