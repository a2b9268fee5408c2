//! Per-feature standardization

use serde::{Deserialize, Serialize};

/// Column-wise standard scaler using population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    /// Fit on a row-major matrix. Returns `None` for an empty or ragged matrix.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let width = rows.first()?.len();
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; width];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                let d = x - m;
                *v += d * d;
            }
        }
        let std = var.into_iter().map(|v| (v / n).sqrt()).collect();

        Some(Self { mean, std })
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (mean, std))| if *std == 0.0 { 0.0 } else { (x - mean) / std })
            .collect()
    }

    pub fn inverse_transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(z, (mean, std))| if *std == 0.0 { *mean } else { z * std + mean })
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_transform() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();

        assert_eq!(scaler.mean, vec![2.0, 10.0]);
        assert_eq!(scaler.std, vec![1.0, 0.0]);
        // Constant column maps to 0
        assert_eq!(scaler.transform(&[3.0, 99.0]), vec![1.0, 0.0]);
        assert_eq!(scaler.inverse_transform(&[1.0, 5.0]), vec![3.0, 10.0]);
    }

    #[test]
    fn test_rejects_empty_and_ragged() {
        assert!(StandardScaler::fit(&[]).is_none());
        assert!(StandardScaler::fit(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    }
}
