//! Growth projections over the 1, 3 and 10 year horizons
//!
//! Multipliers are fixed; only the baseline predictions come from the
//! trained models.

use crate::models::{
    BaselinePredictions, Horizon, HorizonProjection, PredictionSet, ProjectionStatus,
    UserFinancialProfile,
};
use crate::predictor::TrainedPredictor;

/// Fixed growth assumptions for one horizon
struct Growth {
    savings_multiplier: f64,
    /// Share of net income assumed saved each month
    monthly_saving_rate: f64,
    investment_multiplier: f64,
}

fn growth(horizon: Horizon) -> Growth {
    match horizon {
        Horizon::OneYear => Growth {
            savings_multiplier: 1.10,
            monthly_saving_rate: 0.20,
            investment_multiplier: 0.12,
        },
        Horizon::ThreeYears => Growth {
            savings_multiplier: 1.35,
            monthly_saving_rate: 0.20,
            investment_multiplier: 0.4,
        },
        Horizon::TenYears => Growth {
            savings_multiplier: 2.5,
            monthly_saving_rate: 0.25,
            investment_multiplier: 1.8,
        },
    }
}

/// Status for a horizon given the predicted stress probability.
///
/// The ten year horizon has its own, stricter thresholds.
pub fn projection_status(horizon: Horizon, risk_probability: f64) -> ProjectionStatus {
    match horizon {
        Horizon::OneYear | Horizon::ThreeYears => {
            if risk_probability < 0.3 {
                ProjectionStatus::Good
            } else if risk_probability < 0.7 {
                ProjectionStatus::Moderate
            } else {
                ProjectionStatus::HighRisk
            }
        }
        Horizon::TenYears => {
            if risk_probability < 0.2 {
                ProjectionStatus::Excellent
            } else if risk_probability < 0.5 {
                ProjectionStatus::Good
            } else {
                ProjectionStatus::Moderate
            }
        }
    }
}

fn project_horizon(
    horizon: Horizon,
    profile: &UserFinancialProfile,
    baseline: &BaselinePredictions,
) -> HorizonProjection {
    let g = growth(horizon);
    let months = f64::from(horizon.years() * 12);

    let savings_growth = profile.savings_total * g.savings_multiplier
        + profile.net_monthly_income * g.monthly_saving_rate * months;
    let investment_returns = baseline.investment_potential * g.investment_multiplier;

    HorizonProjection {
        savings_growth: savings_growth.max(0.0),
        investment_returns: investment_returns.max(0.0),
        risk_score: (baseline.risk_probability * 10.0).clamp(0.0, 10.0),
        health_status: projection_status(horizon, baseline.risk_probability),
    }
}

/// Project a profile forward from a set of baseline predictions
pub fn project(profile: &UserFinancialProfile, baseline: &BaselinePredictions) -> PredictionSet {
    PredictionSet {
        one_year: project_horizon(Horizon::OneYear, profile, baseline),
        three_years: project_horizon(Horizon::ThreeYears, profile, baseline),
        ten_years: project_horizon(Horizon::TenYears, profile, baseline),
    }
}

/// Projections backed by the predictor, which trains on first use
pub fn generate_predictions(
    profile: &UserFinancialProfile,
    predictor: &TrainedPredictor,
) -> PredictionSet {
    project(profile, &predictor.predict(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::NoDataset;
    use crate::predictor::PredictorConfig;

    fn baseline(risk_probability: f64, investment_potential: f64) -> BaselinePredictions {
        BaselinePredictions {
            investment_potential,
            risk_probability,
            ..BaselinePredictions::neutral()
        }
    }

    #[test]
    fn test_sample_formulas() {
        let profile = UserFinancialProfile::sample();
        let set = project(&profile, &baseline(0.1, 500_000.0));

        assert!((set.one_year.savings_growth - (165_000.0 + 156_000.0)).abs() < 1e-6);
        assert!((set.one_year.investment_returns - 60_000.0).abs() < 1e-6);
        assert!((set.three_years.savings_growth - (202_500.0 + 468_000.0)).abs() < 1e-6);
        assert!((set.three_years.investment_returns - 200_000.0).abs() < 1e-6);
        assert!((set.ten_years.savings_growth - (375_000.0 + 1_950_000.0)).abs() < 1e-6);
        assert!((set.ten_years.investment_returns - 900_000.0).abs() < 1e-6);
        assert!((set.one_year.risk_score - 1.0).abs() < 1e-12);

        assert_eq!(set.one_year.health_status, ProjectionStatus::Good);
        assert_eq!(set.ten_years.health_status, ProjectionStatus::Excellent);
    }

    #[test]
    fn test_neutral_statuses() {
        let set = project(&UserFinancialProfile::default(), &BaselinePredictions::neutral());

        assert_eq!(set.one_year.health_status, ProjectionStatus::Moderate);
        assert_eq!(set.three_years.health_status, ProjectionStatus::Moderate);
        assert_eq!(set.ten_years.health_status, ProjectionStatus::Moderate);
        assert_eq!(set.one_year.risk_score, 5.0);
        assert_eq!(set.ten_years.investment_returns, 0.0);
    }

    #[test]
    fn test_threshold_asymmetry() {
        // Ten years needs < 0.2 for Excellent
        assert_eq!(projection_status(Horizon::OneYear, 0.25), ProjectionStatus::Good);
        assert_eq!(projection_status(Horizon::TenYears, 0.25), ProjectionStatus::Good);
        assert_eq!(projection_status(Horizon::TenYears, 0.19), ProjectionStatus::Excellent);

        // 0.6 is Moderate everywhere, 0.7 splits
        assert_eq!(projection_status(Horizon::ThreeYears, 0.6), ProjectionStatus::Moderate);
        assert_eq!(projection_status(Horizon::ThreeYears, 0.7), ProjectionStatus::HighRisk);
        assert_eq!(projection_status(Horizon::TenYears, 0.7), ProjectionStatus::Moderate);
        assert_eq!(projection_status(Horizon::TenYears, 0.5), ProjectionStatus::Moderate);
    }

    #[test]
    fn test_outputs_are_clamped() {
        let profile = UserFinancialProfile {
            net_monthly_income: -1000.0,
            ..Default::default()
        };
        let set = project(&profile, &baseline(3.0, -50.0));

        for (_, p) in set.iter() {
            assert_eq!(p.savings_growth, 0.0);
            assert_eq!(p.investment_returns, 0.0);
            assert_eq!(p.risk_score, 10.0);
        }
    }

    #[test]
    fn test_degraded_predictor_statuses() {
        let predictor = TrainedPredictor::new(PredictorConfig::default(), NoDataset);
        let set = generate_predictions(&UserFinancialProfile::sample(), &predictor);

        assert_eq!(set.one_year.health_status, ProjectionStatus::Moderate);
        assert_eq!(set.three_years.health_status, ProjectionStatus::Moderate);
        assert_eq!(set.ten_years.health_status, ProjectionStatus::Moderate);
    }
}
