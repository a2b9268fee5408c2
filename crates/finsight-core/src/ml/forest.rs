//! Bagged random forests over [`RegressionTree`]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{MaxFeatures, RegressionTree, TreeParams};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub tree: TreeParams,
    /// Draw a bootstrap sample per tree instead of using every row
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeParams::default(),
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Averaging ensemble shared by the regressor and the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Forest {
    trees: Vec<RegressionTree>,
    n_features: usize,
    importances: Vec<f64>,
}

impl Forest {
    fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Result<Self> {
        let n_features = check_shape(x, y)?;
        if params.n_trees == 0 {
            return Err(Error::ModelFit("forest needs at least one tree".to_string()));
        }

        let n = x.len();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        let mut importances = vec![0.0; n_features];

        for _ in 0..params.n_trees {
            let sample: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let mut tree_importances = vec![0.0; n_features];
            let tree = RegressionTree::fit(
                x,
                y,
                &sample,
                &params.tree,
                &mut rng,
                &mut tree_importances,
            );
            normalize(&mut tree_importances);
            for (total, value) in importances.iter_mut().zip(tree_importances) {
                *total += value;
            }
            trees.push(tree);
        }
        normalize(&mut importances);

        Ok(Self {
            trees,
            n_features,
            importances,
        })
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        total / self.trees.len() as f64
    }
}

fn check_shape(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    let Some(first) = x.first() else {
        return Err(Error::ModelFit("no training rows".to_string()));
    };
    if x.len() != y.len() {
        return Err(Error::ModelFit(format!(
            "{} feature rows but {} targets",
            x.len(),
            y.len()
        )));
    }
    let width = first.len();
    if width == 0 || x.iter().any(|row| row.len() != width) {
        return Err(Error::ModelFit("feature rows have inconsistent width".to_string()));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(Error::ModelFit("training data contains non-finite values".to_string()));
    }
    Ok(width)
}

fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}

/// Random forest for continuous targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    forest: Forest,
}

impl RandomForestRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Result<Self> {
        Ok(Self {
            forest: Forest::fit(x, y, params)?,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.forest.predict(row)
    }

    /// Normalized impurity decrease per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.forest.importances
    }

    pub fn n_trees(&self) -> usize {
        self.forest.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.forest.n_features
    }
}

/// Random forest for a binary target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    forest: Forest,
}

impl RandomForestClassifier {
    /// Fit on boolean labels. Unless overridden, each split samples
    /// sqrt(n_features) candidate features.
    pub fn fit(x: &[Vec<f64>], labels: &[bool], params: &ForestParams) -> Result<Self> {
        let y: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        Ok(Self {
            forest: Forest::fit(x, &y, params)?,
        })
    }

    /// Probability of the positive class, in [0, 1]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        self.forest.predict(row).clamp(0.0, 1.0)
    }

    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) >= 0.5
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.forest.importances
    }

    pub fn n_trees(&self) -> usize {
        self.forest.trees.len()
    }
}

/// Classifier defaults: same as the regressor but sqrt feature sampling
pub fn classifier_params(base: &ForestParams) -> ForestParams {
    ForestParams {
        tree: TreeParams {
            max_features: MaxFeatures::Sqrt,
            ..base.tree
        },
        ..*base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n_trees: usize) -> ForestParams {
        ForestParams {
            n_trees,
            ..Default::default()
        }
    }

    fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..60).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..60).map(|i| 10.0 * i as f64).collect();
        (x, y)
    }

    #[test]
    fn test_regressor_tracks_trend() {
        let (x, y) = linear_data();
        let forest = RandomForestRegressor::fit(&x, &y, &params(25)).unwrap();

        let low = forest.predict(&[5.0, 2.0]);
        let high = forest.predict(&[55.0, 1.0]);
        assert!(low < 150.0, "low = {}", low);
        assert!(high > 450.0, "high = {}", high);
        assert_eq!(forest.n_trees(), 25);

        let importances = forest.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_training_is_deterministic() {
        let (x, y) = linear_data();
        let a = RandomForestRegressor::fit(&x, &y, &params(10)).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, &params(10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_classifier_probabilities() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, 0.0, 1.0, 2.0]).collect();
        let labels: Vec<bool> = (0..40).map(|i| i >= 20).collect();
        let forest =
            RandomForestClassifier::fit(&x, &labels, &classifier_params(&params(30))).unwrap();

        let p_low = forest.predict_proba(&[2.0, 0.0, 1.0, 2.0]);
        let p_high = forest.predict_proba(&[38.0, 0.0, 1.0, 2.0]);
        assert!((0.0..=1.0).contains(&p_low));
        assert!(p_low < 0.5 && p_high > 0.5, "{} {}", p_low, p_high);
        assert!(forest.predict(&[38.0, 0.0, 1.0, 2.0]));
    }

    #[test]
    fn test_single_class_labels() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
        let forest = RandomForestClassifier::fit(&x, &[false; 5], &params(3)).unwrap();
        assert_eq!(forest.predict_proba(&[1.0]), 0.0);
    }

    #[test]
    fn test_fit_errors() {
        let err = RandomForestRegressor::fit(&[], &[], &params(3)).unwrap_err();
        assert!(matches!(err, Error::ModelFit(_)));

        let x = vec![vec![1.0], vec![2.0]];
        assert!(RandomForestRegressor::fit(&x, &[1.0], &params(3)).is_err());
        assert!(RandomForestRegressor::fit(&x, &[1.0, f64::NAN], &params(3)).is_err());
        assert!(RandomForestRegressor::fit(&x, &[1.0, 2.0], &params(0)).is_err());

        let ragged = vec![vec![1.0], vec![2.0, 3.0]];
        assert!(RandomForestRegressor::fit(&ragged, &[1.0, 2.0], &params(3)).is_err());
    }
}
