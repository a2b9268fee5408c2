//! Minimal supervised learning toolkit for the trained predictor
//!
//! - `tree` - CART regression tree with squared-error splits
//! - `forest` - seeded bagging ensembles (regressor and binary classifier)
//! - `encoder` - fit-once label encoders with first-class fallback
//! - `scaler` - per-feature standardization

pub mod encoder;
pub mod forest;
pub mod scaler;
pub mod tree;

pub use encoder::{CategoricalColumn, EncodingTable, LabelEncoder};
pub use forest::{classifier_params, ForestParams, RandomForestClassifier, RandomForestRegressor};
pub use scaler::StandardScaler;
pub use tree::{MaxFeatures, RegressionTree, TreeParams};

/// Root mean squared error
pub fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    let sum: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum();
    (sum / predicted.len() as f64).sqrt()
}

/// Share of matching labels
pub fn accuracy(predicted: &[bool], actual: &[bool]) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    let hits = predicted.iter().zip(actual).filter(|(p, a)| p == a).count();
    hits as f64 / predicted.len() as f64
}
