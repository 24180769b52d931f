//! Transformer benchmark: fit and transform over a telco-sized customer batch.

use churn_engine::features::schema::*;
use churn_engine::features::FeatureTransformer;
use churn_engine::RawCustomerRecord;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const INTERNET: [&str; 3] = ["DSL", "Fiber optic", "No"];
const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];
const PAYMENTS: [&str; 4] = [
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

fn make_customers(n: usize) -> Vec<RawCustomerRecord> {
    (0..n)
        .map(|i| {
            let internet = INTERNET[i % 3];
            let addon = |k: usize| {
                if internet == "No" {
                    "No internet service"
                } else {
                    yes_no((i + k) % 2 == 0)
                }
            };
            let tenure = (i % 72) as f64;
            let monthly = 18.25 + (i % 101) as f64;
            RawCustomerRecord::new()
                .with(GENDER, if i % 2 == 0 { "Female" } else { "Male" })
                .with(SENIOR_CITIZEN, (i % 6 == 0) as i64)
                .with(PARTNER, yes_no(i % 3 == 0))
                .with(DEPENDENTS, yes_no(i % 4 == 0))
                .with(TENURE, tenure)
                .with(PHONE_SERVICE, "Yes")
                .with(MULTIPLE_LINES, yes_no(i % 5 == 0))
                .with(INTERNET_SERVICE, internet)
                .with(ONLINE_SECURITY, addon(0))
                .with(ONLINE_BACKUP, addon(1))
                .with(DEVICE_PROTECTION, addon(2))
                .with(TECH_SUPPORT, addon(3))
                .with(STREAMING_TV, addon(4))
                .with(STREAMING_MOVIES, addon(5))
                .with(CONTRACT, CONTRACTS[i % 3])
                .with(PAPERLESS_BILLING, yes_no(i % 7 != 0))
                .with(PAYMENT_METHOD, PAYMENTS[i % 4])
                .with(MONTHLY_CHARGES, monthly)
                .with(TOTAL_CHARGES, tenure * monthly)
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let customers = make_customers(7000);

    c.bench_function("fit_7000_customers", |b| {
        b.iter(|| {
            let mut t = FeatureTransformer::new();
            t.fit(black_box(&customers)).unwrap();
            black_box(t)
        })
    });
}

fn bench_transform(c: &mut Criterion) {
    let customers = make_customers(7000);
    let mut transformer = FeatureTransformer::new();
    transformer.fit(&customers).unwrap();

    c.bench_function("transform_7000_customers", |b| {
        b.iter(|| black_box(transformer.transform(black_box(&customers)).unwrap()))
    });

    let single = &customers[..1];
    c.bench_function("transform_single_customer", |b| {
        b.iter(|| black_box(transformer.transform(black_box(single)).unwrap()))
    });
}

criterion_group!(benches, bench_fit, bench_transform);
criterion_main!(benches);
