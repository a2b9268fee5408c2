//! One-call dashboard analysis
//!
//! Bundles every engine output for a profile into a [`FinancialReport`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::insights::{
    action_items, allocation_suggestion, budget_summary, expense_groups, ActionItem,
    AllocationSuggestion, BudgetSummary, ExpenseGroups,
};
use crate::models::{
    BaselinePredictions, HealthStatus, PredictionSet, RiskFactorSet, UserFinancialProfile,
};
use crate::predictor::TrainedPredictor;
use crate::projection::project;
use crate::ratios::{compute_ratios, FinancialRatios};
use crate::risk::{assess, compute_risk_factors, mitigation_suggestions, AssessedRisk, Mitigation};
use crate::scoring::{health_status_label, score_breakdown, ScoreBreakdown};

/// Everything the dashboard shows for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub ratios: FinancialRatios,
    pub health_score: f64,
    pub health_status: HealthStatus,
    pub score_breakdown: ScoreBreakdown,
    pub risk_factors: RiskFactorSet,
    pub risks: Vec<AssessedRisk>,
    pub mitigation: Vec<Mitigation>,
    pub action_items: Vec<ActionItem>,
    pub budget: BudgetSummary,
    pub expense_groups: ExpenseGroups,
    pub allocation: AllocationSuggestion,
    pub baseline: BaselinePredictions,
    pub predictions: PredictionSet,
}

impl FinancialReport {
    /// Build a report from already computed baseline predictions
    pub fn build(profile: &UserFinancialProfile, baseline: BaselinePredictions) -> Self {
        let breakdown = score_breakdown(profile);
        let health_score = breakdown.total();
        let risk_factors = compute_risk_factors(profile);

        Self {
            ratios: compute_ratios(profile),
            health_score,
            health_status: health_status_label(health_score),
            score_breakdown: breakdown,
            risks: assess(&risk_factors),
            mitigation: mitigation_suggestions(&risk_factors),
            risk_factors,
            action_items: action_items(profile),
            budget: budget_summary(profile),
            expense_groups: expense_groups(profile),
            allocation: allocation_suggestion(profile.age),
            predictions: project(profile, &baseline),
            baseline,
        }
    }
}

/// Produces reports against a shared predictor
#[derive(Debug, Clone)]
pub struct FinancialAnalyzer {
    predictor: Arc<TrainedPredictor>,
}

impl FinancialAnalyzer {
    pub fn new(predictor: Arc<TrainedPredictor>) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &Arc<TrainedPredictor> {
        &self.predictor
    }

    /// Full report; trains the predictor on first use
    pub fn analyze(&self, profile: &UserFinancialProfile) -> FinancialReport {
        FinancialReport::build(profile, self.predictor.predict(profile))
    }

    pub fn predictions(&self, profile: &UserFinancialProfile) -> PredictionSet {
        project(profile, &self.predictor.predict(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::NoDataset;
    use crate::models::ProjectionStatus;
    use crate::predictor::PredictorConfig;
    use crate::scoring::compute_health_score;
    use crate::test_utils::{fast_config, synthetic_dataset};

    #[test]
    fn test_report_matches_engine_functions() {
        let profile = UserFinancialProfile::sample();
        let report = FinancialReport::build(&profile, BaselinePredictions::neutral());

        assert_eq!(report.health_score, compute_health_score(&profile));
        assert_eq!(report.health_status, HealthStatus::Good);
        assert_eq!(report.risk_factors, compute_risk_factors(&profile));
        assert_eq!(report.risks.len(), 5);
        assert_eq!(report.allocation.equity_pct, 65);
        assert_eq!(report.predictions.ten_years.health_status, ProjectionStatus::Moderate);
    }

    #[test]
    fn test_degraded_analyzer_still_reports() {
        let analyzer = FinancialAnalyzer::new(Arc::new(TrainedPredictor::new(
            PredictorConfig::default(),
            NoDataset,
        )));
        let report = analyzer.analyze(&UserFinancialProfile::sample());

        assert!(report.baseline.is_neutral());
        assert_eq!(report.predictions.one_year.risk_score, 5.0);
    }

    #[test]
    fn test_trained_analyzer() {
        let analyzer = FinancialAnalyzer::new(Arc::new(TrainedPredictor::new(
            fast_config(),
            synthetic_dataset(60),
        )));
        let profile = UserFinancialProfile::sample();
        let report = analyzer.analyze(&profile);

        assert!(!report.baseline.is_neutral());
        assert_eq!(report.predictions, analyzer.predictions(&profile));
    }

    #[test]
    fn test_report_json_shape() {
        let report =
            FinancialReport::build(&UserFinancialProfile::sample(), BaselinePredictions::neutral());
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["risk_factors"]["Debt Risk"].is_number());
        assert!(json["predictions"]["10_year"]["health_status"].is_string());
        assert_eq!(json["baseline"]["source"], "neutral_default");
    }
}
