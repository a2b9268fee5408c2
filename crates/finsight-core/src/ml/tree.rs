//! CART regression tree
//!
//! Splits minimize the summed squared error of the two children. For 0/1
//! targets this picks the same splits as Gini impurity, and a leaf's mean
//! is the positive-class fraction, so the same tree backs the classifier.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How many features are considered at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    #[default]
    All,
    Sqrt,
}

impl MaxFeatures {
    pub fn count(&self, n_features: usize) -> usize {
        match self {
            Self::All => n_features,
            Self::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Builder<'a, R: Rng> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: &'a TreeParams,
    rng: &'a mut R,
    n_features: usize,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl<'a, R: Rng> Builder<'a, R> {
    fn build(&mut self, indices: &[usize], depth: usize) -> usize {
        let n = indices.len() as f64;
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
            (s + self.y[i], sq + self.y[i] * self.y[i])
        });
        let sse = sum_sq - sum * sum / n;
        // Rounding noise on large amounts must not count as impurity
        let tolerance = 1e-12 * sum_sq.max(1.0);

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: sum / n });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || indices.len() < self.params.min_samples_split || sse <= tolerance {
            return node_id;
        }

        let Some(best) = self.best_split(indices, sum, sum_sq, sse, tolerance) else {
            return node_id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][best.feature] <= best.threshold);

        self.importances[best.feature] += best.gain;

        let left_id = self.build(&left, depth + 1);
        let right_id = self.build(&right, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: left_id,
            right: right_id,
        };
        node_id
    }

    fn best_split(
        &mut self,
        indices: &[usize],
        sum: f64,
        sum_sq: f64,
        sse: f64,
        tolerance: f64,
    ) -> Option<SplitCandidate> {
        if indices.len() < 2 {
            return None;
        }

        let k = self.params.max_features.count(self.n_features);
        let features = if k >= self.n_features {
            (0..self.n_features).collect::<Vec<_>>()
        } else {
            rand::seq::index::sample(&mut *self.rng, self.n_features, k).into_vec()
        };

        let min_leaf = self.params.min_samples_leaf.max(1);
        let n = indices.len();
        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in features {
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 0..n - 1 {
                let i = order[pos];
                left_sum += self.y[i];
                left_sq += self.y[i] * self.y[i];

                let here = self.x[i][feature];
                let next = self.x[order[pos + 1]][feature];
                if here == next {
                    continue;
                }

                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let right_sum = sum - left_sum;
                let right_sq = sum_sq - left_sq;
                let children = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);
                let gain = sse - children;

                if gain > best.map_or(tolerance, |b| b.gain) {
                    let mut threshold = here + (next - here) / 2.0;
                    // Midpoint can round up to `next` for adjacent floats
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

impl RegressionTree {
    /// Grow a tree on the rows named by `sample` (duplicates allowed).
    ///
    /// Squared-error reductions are added to `importances`, indexed by feature.
    pub fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[f64],
        sample: &[usize],
        params: &TreeParams,
        rng: &mut R,
        importances: &mut [f64],
    ) -> Self {
        let n_features = importances.len();
        let mut builder = Builder {
            x,
            y,
            params,
            rng,
            n_features,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };

        if !sample.is_empty() {
            builder.build(sample, 0);
        } else {
            builder.nodes.push(Node::Leaf { value: 0.0 });
        }

        for (total, gain) in importances.iter_mut().zip(&builder.importances) {
            *total += gain;
        }

        Self {
            nodes: builder.nodes,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(0.0);
                    id = if x <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fit_all(x: &[Vec<f64>], y: &[f64], params: &TreeParams) -> (RegressionTree, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut importances = vec![0.0; x[0].len()];
        let sample: Vec<usize> = (0..x.len()).collect();
        let tree = RegressionTree::fit(x, y, &sample, params, &mut rng, &mut importances);
        (tree, importances)
    }

    #[test]
    fn test_learns_step_function() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 1.0]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 5.0 } else { 50.0 }).collect();

        let (tree, importances) = fit_all(&x, &y, &TreeParams::default());

        assert_eq!(tree.predict(&[3.0, 1.0]), 5.0);
        assert_eq!(tree.predict(&[15.0, 1.0]), 50.0);
        assert_eq!(tree.depth(), 1);
        assert!(importances[0] > 0.0);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
        let y = vec![2.5; 5];
        let (tree, _) = fit_all(&x, &y, &TreeParams::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[100.0]), 2.5);
    }

    #[test]
    fn test_max_depth_and_min_leaf() {
        let x: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..32).map(|i| (i * i) as f64).collect();

        let shallow = TreeParams {
            max_depth: Some(2),
            ..Default::default()
        };
        let (tree, _) = fit_all(&x, &y, &shallow);
        assert!(tree.depth() <= 2);

        let coarse = TreeParams {
            min_samples_leaf: 16,
            ..Default::default()
        };
        let (tree, _) = fit_all(&x, &y, &coarse);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_binary_target_gives_fractions() {
        // Feature cannot separate the labels, so the leaf holds the positive share
        let x = vec![vec![1.0]; 4];
        let y = vec![1.0, 0.0, 0.0, 0.0];
        let (tree, _) = fit_all(&x, &y, &TreeParams::default());
        assert_eq!(tree.predict(&[1.0]), 0.25);
    }

    #[test]
    fn test_sqrt_feature_count() {
        assert_eq!(MaxFeatures::Sqrt.count(10), 3);
        assert_eq!(MaxFeatures::Sqrt.count(1), 1);
        assert_eq!(MaxFeatures::All.count(10), 10);
    }
}
