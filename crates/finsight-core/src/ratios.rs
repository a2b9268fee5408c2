//! Financial ratios derived from a profile
//!
//! A ratio is only reported when its denominator is positive. Missing
//! denominators are expected for partially filled profiles and simply
//! leave the ratio out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::UserFinancialProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatios {
    /// Net over gross income
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_efficiency: Option<f64>,
    /// Fixed costs over net income
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_ratio: Option<f64>,
    /// Monthly share of the savings stock over net income
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_rate: Option<f64>,
    /// Debt over annual net income
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_income: Option<f64>,
    /// Investments over total assets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_allocation: Option<f64>,
    /// Months of fixed costs covered by the emergency fund
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_fund_months: Option<f64>,
}

impl FinancialRatios {
    /// Present ratios keyed by name
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        [
            ("tax_efficiency", self.tax_efficiency),
            ("expense_ratio", self.expense_ratio),
            ("savings_rate", self.savings_rate),
            ("debt_to_income", self.debt_to_income),
            ("investment_allocation", self.investment_allocation),
            ("emergency_fund_months", self.emergency_fund_months),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.to_map().is_empty()
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

/// Compute every ratio whose denominator is available
pub fn compute_ratios(profile: &UserFinancialProfile) -> FinancialRatios {
    let net = profile.net_monthly_income;

    FinancialRatios {
        tax_efficiency: ratio(net, profile.gross_monthly_income),
        expense_ratio: ratio(profile.fixed_costs_total, net),
        savings_rate: ratio(profile.savings_total / 12.0, net),
        debt_to_income: ratio(profile.debts_total, net * 12.0),
        investment_allocation: ratio(profile.investments_total, profile.assets_total),
        emergency_fund_months: ratio(profile.emergency_fund, profile.fixed_costs_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_ratios() {
        let ratios = compute_ratios(&UserFinancialProfile::sample());

        assert!((ratios.tax_efficiency.unwrap() - 0.8125).abs() < 1e-9);
        assert!((ratios.expense_ratio.unwrap() - 0.9).abs() < 1e-9);
        assert!((ratios.savings_rate.unwrap() - 12_500.0 / 65_000.0).abs() < 1e-9);
        assert!((ratios.debt_to_income.unwrap() - 800_000.0 / 780_000.0).abs() < 1e-9);
        assert!((ratios.investment_allocation.unwrap() - 0.16).abs() < 1e-9);
        assert!((ratios.emergency_fund_months.unwrap() - 200_000.0 / 58_500.0).abs() < 1e-9);
        assert_eq!(ratios.to_map().len(), 6);
    }

    #[test]
    fn test_zero_income_omits_income_ratios() {
        let profile = UserFinancialProfile {
            savings_total: 10_000.0,
            debts_total: 5_000.0,
            fixed_costs_total: 2_000.0,
            emergency_fund: 6_000.0,
            ..Default::default()
        };
        let map = compute_ratios(&profile).to_map();

        for key in ["tax_efficiency", "expense_ratio", "savings_rate", "debt_to_income"] {
            assert!(!map.contains_key(key), "{} should be omitted", key);
        }
        assert_eq!(map.get("emergency_fund_months"), Some(&3.0));
        assert!(!map.contains_key("investment_allocation"));
    }

    #[test]
    fn test_empty_profile_has_no_ratios() {
        let ratios = compute_ratios(&UserFinancialProfile::default());
        assert!(ratios.is_empty());
        assert_eq!(serde_json::to_string(&ratios).unwrap(), "{}");
    }

    #[test]
    fn test_gross_only_reports_tax_efficiency() {
        let profile = UserFinancialProfile {
            gross_monthly_income: 1000.0,
            ..Default::default()
        };
        let map = compute_ratios(&profile).to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["tax_efficiency"], 0.0);
    }
}
