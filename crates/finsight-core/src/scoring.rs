//! Overall financial health score (0-100)
//!
//! The score is a sum of independently capped components:
//!
//! | Component          | Max | Applies when        |
//! |--------------------|-----|---------------------|
//! | Income present     | 20  | net income > 0      |
//! | Savings rate       | 25  | always (0 w/o income)|
//! | Debt to income     | 20  | always              |
//! | Emergency fund     | 15  | fixed costs > 0     |
//! | Investment share   | 20  | assets > 0          |

use serde::{Deserialize, Serialize};

use crate::models::{HealthStatus, UserFinancialProfile};

/// Points awarded per component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub income: f64,
    pub savings: f64,
    pub debt: f64,
    pub emergency_fund: f64,
    pub investment: f64,
}

impl ScoreBreakdown {
    /// Sum of the components, clamped to [0, 100]
    pub fn total(&self) -> f64 {
        let sum = self.income + self.savings + self.debt + self.emergency_fund + self.investment;
        sum.clamp(0.0, 100.0)
    }
}

/// Score each component of the health score
pub fn score_breakdown(profile: &UserFinancialProfile) -> ScoreBreakdown {
    let income = profile.net_monthly_income;

    let income_points = if income > 0.0 { 20.0 } else { 0.0 };

    let savings_rate = if income > 0.0 {
        (profile.savings_total / 12.0) / income
    } else {
        0.0
    };
    let savings_points = (savings_rate * 125.0).min(25.0).max(0.0);

    let debt_ratio = profile.debts_total / if income > 0.0 { income * 12.0 } else { 1.0 };
    let debt_points = if debt_ratio < 0.2 {
        20.0
    } else if debt_ratio < 0.4 {
        15.0
    } else if debt_ratio < 0.6 {
        10.0
    } else {
        5.0
    };

    let emergency_points = if profile.fixed_costs_total > 0.0 {
        let months = profile.emergency_fund / profile.fixed_costs_total;
        if months >= 6.0 {
            15.0
        } else if months >= 3.0 {
            10.0
        } else if months >= 1.0 {
            5.0
        } else {
            0.0
        }
    } else {
        0.0
    };

    let investment_points = if profile.assets_total > 0.0 {
        let share = profile.investments_total / profile.assets_total;
        if share >= 0.30 {
            20.0
        } else if share >= 0.15 {
            15.0
        } else if share >= 0.05 {
            10.0
        } else {
            5.0
        }
    } else {
        0.0
    };

    ScoreBreakdown {
        income: income_points,
        savings: savings_points,
        debt: debt_points,
        emergency_fund: emergency_points,
        investment: investment_points,
    }
}

/// Overall health score in [0, 100]
pub fn compute_health_score(profile: &UserFinancialProfile) -> f64 {
    score_breakdown(profile).total()
}

/// Bucket a health score into its display label
pub fn health_status_label(score: f64) -> HealthStatus {
    if score >= 80.0 {
        HealthStatus::Excellent
    } else if score >= 60.0 {
        HealthStatus::Good
    } else if score >= 40.0 {
        HealthStatus::Fair
    } else {
        HealthStatus::NeedsImprovement
    }
}
