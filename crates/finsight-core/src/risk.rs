//! Per-category risk assessment (0-10 per category)

use serde::{Deserialize, Serialize};

use crate::models::{RiskCategory, RiskFactorSet, RiskSeverity, UserFinancialProfile};

/// Score used when a category cannot be computed for lack of income
const NO_INCOME_RISK: f64 = 8.0;

fn bounded(score: f64) -> f64 {
    // NaN collapses to 0 through max
    score.max(0.0).min(10.0)
}

/// Score every risk category for a profile
pub fn compute_risk_factors(profile: &UserFinancialProfile) -> RiskFactorSet {
    let income = profile.net_monthly_income;
    let expenses = profile.fixed_costs_total;

    let debt = if income > 0.0 {
        profile.debts_total / (income * 12.0) * 25.0
    } else {
        10.0
    };

    let emergency_fund = if expenses > 0.0 {
        let months = profile.emergency_fund / expenses;
        10.0 - months * 1.5
    } else {
        NO_INCOME_RISK
    };

    let investment = if profile.assets_total > 0.0 {
        let share = profile.investments_total / profile.assets_total;
        if share > 0.8 {
            7.0
        } else if share < 0.1 {
            6.0
        } else {
            3.0
        }
    } else {
        5.0
    };

    let insurance = if income > 0.0 {
        8.0 - (profile.insurance / income) * 20.0
    } else {
        NO_INCOME_RISK
    };

    let expense_management = if income > 0.0 {
        (expenses / income) * 12.0
    } else {
        NO_INCOME_RISK
    };

    RiskFactorSet {
        debt: bounded(debt),
        emergency_fund: bounded(emergency_fund),
        investment: bounded(investment),
        insurance: bounded(insurance),
        expense_management: bounded(expense_management),
    }
}

/// Bucket a 0-10 risk score: above 7 is High, above 4 Medium, else Low
pub fn risk_severity_label(score: f64) -> RiskSeverity {
    if score > 7.0 {
        RiskSeverity::High
    } else if score > 4.0 {
        RiskSeverity::Medium
    } else {
        RiskSeverity::Low
    }
}

/// A risk score with its display bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessedRisk {
    pub category: RiskCategory,
    pub score: f64,
    pub severity: RiskSeverity,
}

/// Attach a severity to every category, in fixed category order
pub fn assess(factors: &RiskFactorSet) -> Vec<AssessedRisk> {
    factors
        .entries()
        .into_iter()
        .map(|(category, score)| AssessedRisk {
            category,
            score,
            severity: risk_severity_label(score),
        })
        .collect()
}

/// A remedy offered for an elevated risk category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mitigation {
    pub category: RiskCategory,
    pub suggestion: String,
}

/// Suggestions for the categories whose score crosses their threshold
///
/// Investment risk tops out at 7, so its stricter threshold only fires
/// if that scale ever widens.
pub fn mitigation_suggestions(factors: &RiskFactorSet) -> Vec<Mitigation> {
    let rules: [(RiskCategory, f64, &str); 4] = [
        (
            RiskCategory::Debt,
            6.0,
            "Consider debt consolidation or faster repayment strategies",
        ),
        (
            RiskCategory::EmergencyFund,
            6.0,
            "Build emergency fund to cover 6 months of expenses",
        ),
        (
            RiskCategory::Investment,
            7.0,
            "Diversify your investment portfolio",
        ),
        (
            RiskCategory::Insurance,
            6.0,
            "Review and increase your insurance coverage",
        ),
    ];

    rules
        .into_iter()
        .filter(|(category, threshold, _)| factors.get(*category) > *threshold)
        .map(|(category, _, suggestion)| Mitigation {
            category,
            suggestion: suggestion.to_string(),
        })
        .collect()
}
