//! Test utilities for finsight-core
//!
//! A deterministic synthetic reference dataset and a small forest
//! configuration so training stays fast in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::{ReferenceDataset, ReferenceRecord};
use crate::ml::{ForestParams, TreeParams};
use crate::models::UserGoal;
use crate::predictor::PredictorConfig;

const CLASSES: [&str; 5] = ["poor", "lower_middle", "middle", "upper_middle", "rich"];

/// Predictor settings with few, shallow trees
pub fn fast_config() -> PredictorConfig {
    PredictorConfig {
        forest: ForestParams {
            n_trees: 12,
            tree: TreeParams {
                max_depth: Some(6),
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// `n` plausible households; the same `n` always gives the same rows.
///
/// Households spending more than 85% of net income are labelled stressed.
pub fn synthetic_dataset(n: usize) -> ReferenceDataset {
    let mut rng = StdRng::seed_from_u64(7);

    let records = (0..n)
        .map(|i| {
            let class_idx = i % CLASSES.len();
            let household = rng.gen_range(1..=6) as f64;
            let kids = (household - 2.0).max(0.0);
            let net = 15_000.0 * (class_idx as f64 + 1.0) + rng.gen_range(0.0..10_000.0);
            let gross = net * 1.2;
            let spend_share = rng.gen_range(0.5..1.0);
            let fixed = net * spend_share;
            let assets = net * rng.gen_range(10.0..40.0);
            let investments = assets * rng.gen_range(0.05..0.3);
            let savings = net * rng.gen_range(1.0..6.0);
            let debts = net * rng.gen_range(0.0..12.0);

            ReferenceRecord {
                household_size: Some(household),
                number_of_kids: Some(kids),
                income_type: Some(
                    if i % 2 == 0 {
                        "single_income"
                    } else {
                        "dual_income"
                    }
                    .to_string(),
                ),
                class: Some(CLASSES[class_idx].to_string()),
                gross_monthly_income: Some(gross.round()),
                net_monthly_income: Some(net.round()),
                assets_total: Some(assets.round()),
                investments_total: Some(investments.round()),
                savings_total: Some(savings.round()),
                debts_total: Some(debts.round()),
                fixed_costs_total: Some(fixed.round()),
                insurance: Some((net * 0.05).round()),
                financial_stress: Some(if spend_share > 0.85 { "yes" } else { "no" }.to_string()),
                owns_home: Some(if assets > net * 25.0 { "yes" } else { "no" }.to_string()),
                user_goals: Some(UserGoal::ALL[i % UserGoal::ALL.len()].as_str().to_string()),
            }
        })
        .collect();

    ReferenceDataset::from_records(records)
}

/// The synthetic dataset rendered as CSV text
pub fn synthetic_csv(n: usize) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in synthetic_dataset(n).records() {
        writer
            .serialize(record)
            .expect("synthetic record serializes");
    }
    let bytes = writer.into_inner().expect("in-memory writer flushes");
    String::from_utf8(bytes).expect("csv output is utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_dataset_is_stable() {
        assert_eq!(synthetic_dataset(30), synthetic_dataset(30));
        let dataset = synthetic_dataset(30);
        assert_eq!(dataset.len(), 30);
        assert!(dataset.records().iter().any(|r| r.is_stressed()));
        assert!(dataset.records().iter().any(|r| !r.is_stressed()));
    }

    #[test]
    fn test_csv_reloads() {
        let csv = synthetic_csv(10);
        let reloaded = ReferenceDataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(reloaded, synthetic_dataset(10));
    }
}
