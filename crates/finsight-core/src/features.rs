//! Model feature vectors
//!
//! Both training rows and live profiles are turned into the same ordered
//! ten-column vector; categorical columns go through the frozen encoders.

use crate::dataset::ReferenceRecord;
use crate::ml::{CategoricalColumn, EncodingTable};
use crate::models::UserFinancialProfile;

pub const FEATURE_COUNT: usize = 10;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "household_size",
    "number_of_kids",
    "income_type",
    "class",
    "gross_monthly_income",
    "net_monthly_income",
    "assets_total",
    "investments_total",
    "savings_total",
    "debts_total",
];

/// Features of a reference record; missing numbers count as 0
pub fn record_features(record: &ReferenceRecord, encodings: &EncodingTable) -> Vec<f64> {
    let label = |column: CategoricalColumn| {
        encodings.encode(column, record.label(column).unwrap_or_default()) as f64
    };

    vec![
        record.household_size.unwrap_or(0.0),
        record.number_of_kids.unwrap_or(0.0),
        label(CategoricalColumn::IncomeType),
        label(CategoricalColumn::Class),
        record.gross_monthly_income.unwrap_or(0.0),
        record.net_monthly_income.unwrap_or(0.0),
        record.assets_total.unwrap_or(0.0),
        record.investments_total.unwrap_or(0.0),
        record.savings_total.unwrap_or(0.0),
        record.debts_total.unwrap_or(0.0),
    ]
}

/// Features of a live profile
pub fn profile_features(profile: &UserFinancialProfile, encodings: &EncodingTable) -> Vec<f64> {
    vec![
        profile.household_size as f64,
        profile.number_of_kids as f64,
        encodings.encode(CategoricalColumn::IncomeType, profile.income_type.as_str()) as f64,
        encodings.encode(CategoricalColumn::Class, profile.social_class.as_str()) as f64,
        profile.gross_monthly_income,
        profile.net_monthly_income,
        profile.assets_total,
        profile.investments_total,
        profile.savings_total,
        profile.debts_total,
    ]
}
