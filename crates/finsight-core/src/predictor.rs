//! Trained predictor: four forests fit on the reference dataset
//!
//! The predictor is an explicit handle shared through `Arc`. It trains
//! lazily on the first prediction and again only when `retrain` is called.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized -> Training -> Ready
//!                           \-> Degraded (dataset missing or fit failed)
//! ```
//!
//! At most one training run is in flight. Callers that arrive while it runs
//! wait for it and reuse its outcome. A retrain keeps serving the previous
//! models until the new ones are ready. While degraded, every prediction is
//! the neutral default.

use std::collections::BTreeMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dataset::{DatasetSource, ReferenceDataset};
use crate::error::{Error, Result};
use crate::features::{profile_features, record_features, FEATURE_NAMES};
use crate::ml::{
    accuracy, classifier_params, rmse, CategoricalColumn, EncodingTable, ForestParams,
    LabelEncoder, RandomForestClassifier, RandomForestRegressor, StandardScaler,
};
use crate::models::{BaselinePredictions, PredictionSource, UserFinancialProfile};

/// Training settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub forest: ForestParams,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    /// Fill gaps and cap outliers before training
    pub clean_dataset: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            forest: ForestParams::default(),
            test_fraction: 0.2,
            clean_dataset: false,
        }
    }
}

/// Outcome of a successful training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub dataset: String,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub duration_ms: u64,
    /// Held-out errors; informational only
    pub expense_rmse: f64,
    pub investment_rmse: f64,
    pub insurance_rmse: f64,
    pub risk_accuracy: f64,
    /// Share of stressed households in the training rows
    pub stressed_share: f64,
}

/// The fitted models plus everything needed to encode a profile for them
#[derive(Debug, Clone)]
pub struct TrainedModels {
    encodings: EncodingTable,
    scaler: StandardScaler,
    expense: RandomForestRegressor,
    investment: RandomForestRegressor,
    risk: RandomForestClassifier,
    insurance: RandomForestRegressor,
    report: TrainingReport,
}

fn select<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

impl TrainedModels {
    /// Fit all four models on a dataset
    pub fn train(
        dataset: &ReferenceDataset,
        config: &PredictorConfig,
        origin: &str,
    ) -> Result<Self> {
        let started = Instant::now();

        if dataset.is_empty() {
            return Err(Error::TrainingDataUnavailable(format!(
                "{} has no rows",
                origin
            )));
        }
        if dataset.len() < 2 {
            return Err(Error::ModelFit(
                "need at least 2 rows to split train and test".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&config.test_fraction) {
            return Err(Error::ModelFit(format!(
                "test_fraction must be in [0, 1), got {}",
                config.test_fraction
            )));
        }

        let cleaned;
        let dataset = if config.clean_dataset {
            cleaned = dataset.cleaned();
            &cleaned
        } else {
            dataset
        };
        let records = dataset.records();

        let fit_encoder = |column: CategoricalColumn| {
            LabelEncoder::fit(records.iter().map(|r| r.label(column).unwrap_or_default()))
                .ok_or_else(|| Error::ModelFit(format!("no labels for {}", column.as_str())))
        };
        let encodings = EncodingTable::new(
            fit_encoder(CategoricalColumn::IncomeType)?,
            fit_encoder(CategoricalColumn::Class)?,
            fit_encoder(CategoricalColumn::FinancialStress)?,
            fit_encoder(CategoricalColumn::OwnsHome)?,
            fit_encoder(CategoricalColumn::UserGoals)?,
        );

        let x: Vec<Vec<f64>> = records
            .iter()
            .map(|r| record_features(r, &encodings))
            .collect();
        let expense_y: Vec<f64> = records
            .iter()
            .map(|r| r.fixed_costs_total.unwrap_or(0.0))
            .collect();
        let investment_y: Vec<f64> = records
            .iter()
            .map(|r| r.investments_total.unwrap_or(0.0))
            .collect();
        let insurance_y: Vec<f64> = records.iter().map(|r| r.insurance.unwrap_or(0.0)).collect();
        let stressed: Vec<bool> = records.iter().map(|r| r.is_stressed()).collect();

        // Seeded shuffle, then hold out the tail
        let n = records.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(config.forest.seed));
        let test_rows = ((n as f64 * config.test_fraction).ceil() as usize).min(n - 1);
        let (train_idx, test_idx) = order.split_at(n - test_rows);

        let train_x = select(&x, train_idx);
        let test_x = select(&x, test_idx);

        let expense = RandomForestRegressor::fit(&train_x, &select(&expense_y, train_idx), &config.forest)?;
        let investment =
            RandomForestRegressor::fit(&train_x, &select(&investment_y, train_idx), &config.forest)?;
        let risk = RandomForestClassifier::fit(
            &train_x,
            &select(&stressed, train_idx),
            &classifier_params(&config.forest),
        )?;
        let insurance =
            RandomForestRegressor::fit(&train_x, &select(&insurance_y, train_idx), &config.forest)?;

        let scaler = StandardScaler::fit(&train_x)
            .ok_or_else(|| Error::ModelFit("could not fit feature scaler".to_string()))?;

        let evaluate = |model: &RandomForestRegressor, targets: &[f64]| {
            let predicted: Vec<f64> = test_x.iter().map(|row| model.predict(row)).collect();
            rmse(&predicted, &select(targets, test_idx))
        };
        let risk_predicted: Vec<bool> = test_x.iter().map(|row| risk.predict(row)).collect();

        let train_stressed = train_idx.iter().filter(|&&i| stressed[i]).count();

        let report = TrainingReport {
            trained_at: Utc::now(),
            dataset: origin.to_string(),
            rows: n,
            train_rows: train_idx.len(),
            test_rows: test_idx.len(),
            duration_ms: started.elapsed().as_millis() as u64,
            expense_rmse: evaluate(&expense, &expense_y),
            investment_rmse: evaluate(&investment, &investment_y),
            insurance_rmse: evaluate(&insurance, &insurance_y),
            risk_accuracy: accuracy(&risk_predicted, &select(&stressed, test_idx)),
            stressed_share: train_stressed as f64 / train_idx.len() as f64,
        };

        Ok(Self {
            encodings,
            scaler,
            expense,
            investment,
            risk,
            insurance,
            report,
        })
    }

    /// Run the four models on a profile
    pub fn predict(&self, profile: &UserFinancialProfile) -> BaselinePredictions {
        let features = profile_features(profile, &self.encodings);

        BaselinePredictions {
            expense_prediction: self.expense.predict(&features),
            investment_potential: self.investment.predict(&features),
            risk_probability: self.risk.predict_proba(&features),
            insurance_need: self.insurance.predict(&features),
            source: PredictionSource::Model,
        }
    }

    pub fn encodings(&self) -> &EncodingTable {
        &self.encodings
    }

    /// Feature scaler fit on the training rows
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Per-model feature importances keyed by feature name
    pub fn feature_importance(&self) -> BTreeMap<&'static str, BTreeMap<&'static str, f64>> {
        let named = |weights: &[f64]| -> BTreeMap<&'static str, f64> {
            FEATURE_NAMES.iter().copied().zip(weights.iter().copied()).collect()
        };

        BTreeMap::from([
            ("expense", named(self.expense.feature_importances())),
            ("investment", named(self.investment.feature_importances())),
            ("risk", named(self.risk.feature_importances())),
            ("insurance", named(self.insurance.feature_importances())),
        ])
    }
}

/// Externally visible predictor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorStatus {
    Uninitialized,
    Training,
    Ready,
    Degraded,
}

impl PredictorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Training => "training",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
        }
    }
}

impl std::fmt::Display for PredictorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

enum PredictorState {
    Uninitialized,
    /// Holds the models being replaced, if any
    Training(Option<Arc<TrainedModels>>),
    Ready(Arc<TrainedModels>),
    Degraded(String),
}

/// Shared handle to the trained models
pub struct TrainedPredictor {
    config: PredictorConfig,
    source: Box<dyn DatasetSource>,
    state: Mutex<PredictorState>,
    finished: Condvar,
}

/// Marks the run degraded if training unwinds before reporting back
struct TrainingRun<'a> {
    predictor: &'a TrainedPredictor,
    done: bool,
}

impl Drop for TrainingRun<'_> {
    fn drop(&mut self) {
        if !self.done {
            *self.predictor.lock() = PredictorState::Degraded("training aborted".to_string());
            self.predictor.finished.notify_all();
        }
    }
}

impl TrainedPredictor {
    pub fn new(config: PredictorConfig, source: impl DatasetSource + 'static) -> Self {
        Self::with_source(config, Box::new(source))
    }

    pub fn with_source(config: PredictorConfig, source: Box<dyn DatasetSource>) -> Self {
        Self {
            config,
            source,
            state: Mutex::new(PredictorState::Uninitialized),
            finished: Condvar::new(),
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Where training data comes from
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    fn lock(&self) -> MutexGuard<'_, PredictorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, PredictorState>) -> MutexGuard<'a, PredictorState> {
        self.finished
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> PredictorStatus {
        match &*self.lock() {
            PredictorState::Uninitialized => PredictorStatus::Uninitialized,
            PredictorState::Training(_) => PredictorStatus::Training,
            PredictorState::Ready(_) => PredictorStatus::Ready,
            PredictorState::Degraded(_) => PredictorStatus::Degraded,
        }
    }

    /// Why the last training run failed, while degraded
    pub fn degraded_reason(&self) -> Option<String> {
        match &*self.lock() {
            PredictorState::Degraded(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Current models without triggering training
    pub fn models(&self) -> Option<Arc<TrainedModels>> {
        match &*self.lock() {
            PredictorState::Ready(models) => Some(Arc::clone(models)),
            PredictorState::Training(previous) => previous.clone(),
            _ => None,
        }
    }

    /// Train if this is the first use; `None` when degraded
    pub fn ensure_trained(&self) -> Option<Arc<TrainedModels>> {
        let mut state = self.lock();
        loop {
            let in_flight = match &*state {
                PredictorState::Ready(models) => return Some(Arc::clone(models)),
                PredictorState::Training(Some(previous)) => return Some(Arc::clone(previous)),
                PredictorState::Degraded(_) => return None,
                PredictorState::Training(None) => true,
                PredictorState::Uninitialized => false,
            };
            if !in_flight {
                break;
            }
            state = self.wait(state);
        }

        *state = PredictorState::Training(None);
        drop(state);
        self.run_training()
    }

    /// Train again from the dataset source.
    ///
    /// If a run is already in flight this waits for it instead of starting
    /// another one.
    pub fn retrain(&self) -> Option<Arc<TrainedModels>> {
        let mut state = self.lock();
        if matches!(*state, PredictorState::Training(_)) {
            while matches!(*state, PredictorState::Training(_)) {
                state = self.wait(state);
            }
            return match &*state {
                PredictorState::Ready(models) => Some(Arc::clone(models)),
                _ => None,
            };
        }

        let previous = match &*state {
            PredictorState::Ready(models) => Some(Arc::clone(models)),
            _ => None,
        };
        *state = PredictorState::Training(previous);
        drop(state);
        self.run_training()
    }

    fn run_training(&self) -> Option<Arc<TrainedModels>> {
        let mut run = TrainingRun {
            predictor: self,
            done: false,
        };
        let origin = self.source.describe();
        info!(source = %origin, "Training predictor models");

        let outcome = self
            .source
            .load()
            .and_then(|dataset| TrainedModels::train(&dataset, &self.config, &origin));

        let mut state = self.lock();
        let result = match outcome {
            Ok(models) => {
                let report = models.report();
                info!(
                    rows = report.rows,
                    duration_ms = report.duration_ms,
                    risk_accuracy = report.risk_accuracy,
                    "Predictor ready"
                );
                let models = Arc::new(models);
                *state = PredictorState::Ready(Arc::clone(&models));
                Some(models)
            }
            Err(e) => {
                warn!(error = %e, "Predictor training failed, using neutral defaults");
                *state = PredictorState::Degraded(e.to_string());
                None
            }
        };
        run.done = true;
        drop(state);
        self.finished.notify_all();
        result
    }

    /// Report of the models currently served
    pub fn training_report(&self) -> Option<TrainingReport> {
        self.models().map(|models| models.report().clone())
    }

    /// Feature importances per model, training first if needed
    pub fn feature_importance(&self) -> Option<BTreeMap<&'static str, BTreeMap<&'static str, f64>>> {
        self.ensure_trained()
            .map(|models| models.feature_importance())
    }

    /// Baseline predictions for a profile, training first if needed
    pub fn predict(&self, profile: &UserFinancialProfile) -> BaselinePredictions {
        match self.ensure_trained() {
            Some(models) => {
                let predictions = models.predict(profile);
                debug!(
                    risk_probability = predictions.risk_probability,
                    "Predicted baseline"
                );
                predictions
            }
            None => BaselinePredictions::neutral(),
        }
    }
}

impl std::fmt::Debug for TrainedPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedPredictor")
            .field("source", &self.source.describe())
            .field("status", &self.status())
            .finish()
    }
}
