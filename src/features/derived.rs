//! Business features derived from a single record, independent of any fitted state.

use super::schema::{
    RawCustomerRecord, CHARGE_PER_SERVICE, CUSTOMER_VALUE, INTERNET_SERVICE, MONTHLY_CHARGES,
    ONLINE_SECURITY, SERVICE_FIELDS, TECH_SUPPORT, TENURE, TOTAL_SERVICES,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Tenure months up to which a customer counts as new.
pub const NEW_TENURE_MAX: f64 = 12.0;
/// Tenure months up to which a customer counts as mid-lifecycle.
pub const MID_TENURE_MAX: f64 = 36.0;

/// Customer lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureBucket {
    New,
    Mid,
    Loyal,
}

impl TenureBucket {
    pub fn from_tenure(months: f64) -> Self {
        if months <= NEW_TENURE_MAX {
            TenureBucket::New
        } else if months <= MID_TENURE_MAX {
            TenureBucket::Mid
        } else {
            TenureBucket::Loyal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TenureBucket::New => "new",
            TenureBucket::Mid => "mid",
            TenureBucket::Loyal => "loyal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub tenure_bucket: TenureBucket,
    /// Subscribed services among [`SERVICE_FIELDS`]
    pub total_services: u32,
    /// Monthly charge spread over services (+1 to keep zero-service customers finite)
    pub charge_per_service: f64,
    /// tenure × monthly charge
    pub customer_value: f64,
    /// Online security or tech support
    pub has_premium: bool,
}

/// A service field is subscribed when it reads "Yes"; internet service is any provider but "No".
fn is_subscribed(field: &str, token: &str) -> bool {
    if field == INTERNET_SERVICE {
        token != "No"
    } else {
        token == "Yes"
    }
}

impl DerivedFeatures {
    pub fn from_record(record: &RawCustomerRecord) -> Result<Self> {
        let tenure = record.amount(TENURE)?;
        let monthly = record.amount(MONTHLY_CHARGES)?;

        let mut total_services = 0u32;
        for field in SERVICE_FIELDS {
            if is_subscribed(field, record.text(field)?) {
                total_services += 1;
            }
        }

        let has_premium =
            record.text(ONLINE_SECURITY)? == "Yes" || record.text(TECH_SUPPORT)? == "Yes";

        Ok(Self {
            tenure_bucket: TenureBucket::from_tenure(tenure),
            total_services,
            charge_per_service: monthly / (total_services as f64 + 1.0),
            customer_value: tenure * monthly,
            has_premium,
        })
    }

    /// Numeric derived column by name.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            TOTAL_SERVICES => Some(self.total_services as f64),
            CHARGE_PER_SERVICE => Some(self.charge_per_service),
            CUSTOMER_VALUE => Some(self.customer_value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::schema::*;

    fn record(
        tenure: i64,
        monthly: f64,
        internet: &str,
        security: &str,
        support: &str,
    ) -> RawCustomerRecord {
        RawCustomerRecord::new()
            .with(TENURE, tenure)
            .with(MONTHLY_CHARGES, monthly)
            .with(PHONE_SERVICE, "Yes")
            .with(INTERNET_SERVICE, internet)
            .with(ONLINE_SECURITY, security)
            .with(ONLINE_BACKUP, "No")
            .with(DEVICE_PROTECTION, "No internet service")
            .with(TECH_SUPPORT, support)
            .with(STREAMING_TV, "Yes")
            .with(STREAMING_MOVIES, "No")
    }

    #[test]
    fn tenure_bucket_thresholds() {
        assert_eq!(TenureBucket::from_tenure(0.0), TenureBucket::New);
        assert_eq!(TenureBucket::from_tenure(12.0), TenureBucket::New);
        assert_eq!(TenureBucket::from_tenure(13.0), TenureBucket::Mid);
        assert_eq!(TenureBucket::from_tenure(36.0), TenureBucket::Mid);
        assert_eq!(TenureBucket::from_tenure(37.0), TenureBucket::Loyal);
        assert_eq!(TenureBucket::from_tenure(90.0), TenureBucket::Loyal);
    }

    #[test]
    fn counts_services_and_ratios() {
        let d =
            DerivedFeatures::from_record(&record(10, 90.0, "Fiber optic", "Yes", "No")).unwrap();
        // phone, internet, security, streaming tv
        assert_eq!(d.total_services, 4);
        assert!((d.charge_per_service - 18.0).abs() < 1e-12);
        assert!((d.customer_value - 900.0).abs() < 1e-12);
        assert!(d.has_premium);
        assert_eq!(d.tenure_bucket, TenureBucket::New);
    }

    #[test]
    fn no_internet_is_not_a_service() {
        let no_internet = "No internet service";
        let d = DerivedFeatures::from_record(&record(40, 20.0, "No", no_internet, no_internet))
            .unwrap();
        assert_eq!(d.total_services, 2);
        assert!(!d.has_premium);
        assert_eq!(d.tenure_bucket, TenureBucket::Loyal);
        assert_eq!(d.numeric(TOTAL_SERVICES), Some(2.0));
        assert_eq!(d.numeric(TENURE), None);
    }
}
