//! Label encoding for categorical columns
//!
//! Encoders are fit once when the models are trained and then only read.
//! A label never seen during fitting encodes as the first known class.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maps labels to their index among the sorted distinct training labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on the observed labels. Returns `None` when there are none.
    pub fn fit<'a, I>(labels: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: BTreeSet<&str> = labels.into_iter().collect();
        if classes.is_empty() {
            return None;
        }
        Some(Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        })
    }

    /// Index of `label`; unseen labels fall back to index 0
    pub fn encode(&self, label: &str) -> usize {
        match self.classes.binary_search_by(|c| c.as_str().cmp(label)) {
            Ok(index) => index,
            Err(_) => {
                debug!(label, fallback = %self.classes[0], "Unseen label, using first class");
                0
            }
        }
    }

    pub fn is_known(&self, label: &str) -> bool {
        self.classes.binary_search_by(|c| c.as_str().cmp(label)).is_ok()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Categorical columns of the reference dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalColumn {
    IncomeType,
    Class,
    FinancialStress,
    OwnsHome,
    UserGoals,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 5] = [
        Self::IncomeType,
        Self::Class,
        Self::FinancialStress,
        Self::OwnsHome,
        Self::UserGoals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncomeType => "income_type",
            Self::Class => "class",
            Self::FinancialStress => "financial_stress",
            Self::OwnsHome => "owns_home",
            Self::UserGoals => "user_goals",
        }
    }
}

/// Frozen encoders for every categorical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingTable {
    income_type: LabelEncoder,
    class: LabelEncoder,
    financial_stress: LabelEncoder,
    owns_home: LabelEncoder,
    user_goals: LabelEncoder,
}

impl EncodingTable {
    pub fn new(
        income_type: LabelEncoder,
        class: LabelEncoder,
        financial_stress: LabelEncoder,
        owns_home: LabelEncoder,
        user_goals: LabelEncoder,
    ) -> Self {
        Self {
            income_type,
            class,
            financial_stress,
            owns_home,
            user_goals,
        }
    }

    pub fn encoder(&self, column: CategoricalColumn) -> &LabelEncoder {
        match column {
            CategoricalColumn::IncomeType => &self.income_type,
            CategoricalColumn::Class => &self.class,
            CategoricalColumn::FinancialStress => &self.financial_stress,
            CategoricalColumn::OwnsHome => &self.owns_home,
            CategoricalColumn::UserGoals => &self.user_goals,
        }
    }

    pub fn encode(&self, column: CategoricalColumn, label: &str) -> usize {
        self.encoder(column).encode(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_sorted_and_distinct() {
        let encoder = LabelEncoder::fit(["middle", "rich", "poor", "middle"]).unwrap();
        assert_eq!(encoder.classes(), ["middle", "poor", "rich"]);
        assert_eq!(encoder.encode("middle"), 0);
        assert_eq!(encoder.encode("poor"), 1);
        assert_eq!(encoder.encode("rich"), 2);
    }

    #[test]
    fn test_unseen_label_uses_first_class() {
        let encoder = LabelEncoder::fit(["single_income", "dual_income"]).unwrap();
        assert!(!encoder.is_known("triple_income"));
        assert_eq!(encoder.encode("triple_income"), 0);
        assert_eq!(encoder.encode("dual_income"), 0);
        assert_eq!(encoder.encode("single_income"), 1);
    }

    #[test]
    fn test_empty_fit() {
        assert!(LabelEncoder::fit(std::iter::empty()).is_none());
    }
}
