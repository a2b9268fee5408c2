//! Dashboard insights derived directly from a profile
//!
//! - **Action items** - up to four concrete next steps
//! - **Budget summary** - income against fixed costs with a verdict
//! - **Expense groups** - the nine categories folded into five groups
//! - **Allocation suggestion** - age-based equity/debt split

use serde::{Deserialize, Serialize};

use crate::models::UserFinancialProfile;

/// Most action items returned for one profile
pub const MAX_ACTION_ITEMS: usize = 4;

/// A recommended next step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionItem {
    BuildEmergencyFund,
    DebtRepaymentPlan,
    MoveSavingsToInvestments,
    ReviewInsurance,
}

impl ActionItem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuildEmergencyFund => "build_emergency_fund",
            Self::DebtRepaymentPlan => "debt_repayment_plan",
            Self::MoveSavingsToInvestments => "move_savings_to_investments",
            Self::ReviewInsurance => "review_insurance",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::BuildEmergencyFund => "Build emergency fund to cover 3-6 months of expenses",
            Self::DebtRepaymentPlan => "Create a debt repayment plan to reduce high debt levels",
            Self::MoveSavingsToInvestments => {
                "Consider moving some savings to investments for better returns"
            }
            Self::ReviewInsurance => "Review and potentially increase your insurance coverage",
        }
    }
}

impl std::fmt::Display for ActionItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Action items in priority order, at most [`MAX_ACTION_ITEMS`]
pub fn action_items(profile: &UserFinancialProfile) -> Vec<ActionItem> {
    let mut items = Vec::new();
    let income = profile.net_monthly_income;

    if profile.fixed_costs_total > 0.0 {
        let months = profile.emergency_fund / profile.fixed_costs_total;
        if months < 3.0 {
            items.push(ActionItem::BuildEmergencyFund);
        }
    }

    if profile.debts_total > 0.0 && income > 0.0 && profile.debts_total > income * 6.0 {
        items.push(ActionItem::DebtRepaymentPlan);
    }

    if profile.savings_total > profile.investments_total * 2.0 {
        items.push(ActionItem::MoveSavingsToInvestments);
    }

    if income > 0.0 && profile.insurance < income * 0.1 {
        items.push(ActionItem::ReviewInsurance);
    }

    items.truncate(MAX_ACTION_ITEMS);
    items
}

/// How the month's budget closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetVerdict {
    /// Expenses exceed income
    Deficit,
    /// Less than 10% of income left over
    Tight,
    Healthy,
}

impl BudgetVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deficit => "deficit",
            Self::Tight => "tight",
            Self::Healthy => "healthy",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Deficit => "Your expenses exceed your income",
            Self::Tight => "Consider reducing expenses to increase savings",
            Self::Healthy => "Good budget management",
        }
    }
}

impl std::fmt::Display for BudgetVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub income: f64,
    pub expenses: f64,
    pub remaining: f64,
    /// Share of income, 0 when there is no income
    pub expenses_pct: f64,
    pub remaining_pct: f64,
    pub verdict: BudgetVerdict,
}

pub fn budget_summary(profile: &UserFinancialProfile) -> BudgetSummary {
    let income = profile.net_monthly_income;
    let expenses = profile.fixed_costs_total;
    let remaining = income - expenses;

    let pct = |amount: f64| {
        if income > 0.0 {
            amount / income * 100.0
        } else {
            0.0
        }
    };

    let verdict = if remaining < 0.0 {
        BudgetVerdict::Deficit
    } else if remaining < income * 0.1 {
        BudgetVerdict::Tight
    } else {
        BudgetVerdict::Healthy
    };

    BudgetSummary {
        income,
        expenses,
        remaining,
        expenses_pct: pct(expenses),
        remaining_pct: pct(remaining),
        verdict,
    }
}

/// Monthly expenses folded into five groups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseGroups {
    /// Rent or mortgage, utilities and groceries
    pub essential: f64,
    pub transportation: f64,
    pub insurance: f64,
    /// Clothes, subscriptions and miscellaneous
    pub discretionary: f64,
    pub communication: f64,
}

impl ExpenseGroups {
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Essential", self.essential),
            ("Transportation", self.transportation),
            ("Insurance", self.insurance),
            ("Discretionary", self.discretionary),
            ("Communication", self.communication),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, v)| v).sum()
    }
}

pub fn expense_groups(profile: &UserFinancialProfile) -> ExpenseGroups {
    ExpenseGroups {
        essential: profile.rent_mortgage + profile.utilities + profile.groceries,
        transportation: profile.transportation,
        insurance: profile.insurance,
        discretionary: profile.clothes + profile.subscriptions + profile.miscellaneous,
        communication: profile.phone,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskAppetite {
    High,
    Moderate,
    Conservative,
}

impl RiskAppetite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Conservative => "Conservative",
        }
    }
}

impl std::fmt::Display for RiskAppetite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSuggestion {
    pub equity_pct: u32,
    pub debt_pct: u32,
    pub risk_appetite: RiskAppetite,
}

/// "100 minus age" in equity, capped at 80%
pub fn allocation_suggestion(age: u32) -> AllocationSuggestion {
    let equity_pct = 100u32.saturating_sub(age).min(80);
    let risk_appetite = if equity_pct > 60 {
        RiskAppetite::High
    } else if equity_pct > 40 {
        RiskAppetite::Moderate
    } else {
        RiskAppetite::Conservative
    };

    AllocationSuggestion {
        equity_pct,
        debt_pct: 100 - equity_pct,
        risk_appetite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_action_items() {
        let items = action_items(&UserFinancialProfile::sample());
        assert_eq!(
            items,
            vec![ActionItem::DebtRepaymentPlan, ActionItem::ReviewInsurance]
        );
        assert_eq!(
            items[0].to_string(),
            "Create a debt repayment plan to reduce high debt levels"
        );
    }

    #[test]
    fn test_all_action_items() {
        let profile = UserFinancialProfile {
            net_monthly_income: 10_000.0,
            fixed_costs_total: 8_000.0,
            emergency_fund: 1_000.0,
            debts_total: 100_000.0,
            savings_total: 50_000.0,
            investments_total: 1_000.0,
            insurance: 0.0,
            ..Default::default()
        };
        assert_eq!(action_items(&profile).len(), MAX_ACTION_ITEMS);
    }

    #[test]
    fn test_empty_profile_has_no_items() {
        assert!(action_items(&UserFinancialProfile::default()).is_empty());
    }

    #[test]
    fn test_budget_verdicts() {
        let mut profile = UserFinancialProfile {
            net_monthly_income: 10_000.0,
            fixed_costs_total: 12_000.0,
            ..Default::default()
        };
        let summary = budget_summary(&profile);
        assert_eq!(summary.verdict, BudgetVerdict::Deficit);
        assert_eq!(summary.remaining, -2_000.0);
        assert_eq!(summary.expenses_pct, 120.0);

        profile.fixed_costs_total = 9_500.0;
        assert_eq!(budget_summary(&profile).verdict, BudgetVerdict::Tight);

        profile.fixed_costs_total = 5_000.0;
        let summary = budget_summary(&profile);
        assert_eq!(summary.verdict, BudgetVerdict::Healthy);
        assert_eq!(summary.remaining_pct, 50.0);
    }

    #[test]
    fn test_budget_without_income() {
        let summary = budget_summary(&UserFinancialProfile::default());
        assert_eq!(summary.expenses_pct, 0.0);
        assert_eq!(summary.remaining_pct, 0.0);
        // 0 remaining is not below 10% of 0 income
        assert_eq!(summary.verdict, BudgetVerdict::Healthy);
    }

    #[test]
    fn test_expense_groups_cover_every_category() {
        let profile = UserFinancialProfile::sample();
        let groups = expense_groups(&profile);

        assert_eq!(groups.essential, 35_000.0);
        assert_eq!(groups.discretionary, 9_500.0);
        assert_eq!(groups.communication, 2_000.0);
        assert_eq!(groups.total(), profile.expense_categories_total());
    }

    #[test]
    fn test_allocation_by_age() {
        let young = allocation_suggestion(25);
        assert_eq!(young.equity_pct, 75);
        assert_eq!(young.debt_pct, 25);
        assert_eq!(young.risk_appetite, RiskAppetite::High);

        let capped = allocation_suggestion(18);
        assert_eq!(capped.equity_pct, 80);
        assert_eq!(capped.debt_pct, 20);

        assert_eq!(allocation_suggestion(45).risk_appetite, RiskAppetite::Moderate);
        assert_eq!(allocation_suggestion(60).risk_appetite, RiskAppetite::Conservative);

        let old = allocation_suggestion(120);
        assert_eq!(old.equity_pct, 0);
        assert_eq!(old.debt_pct, 100);
    }
}
