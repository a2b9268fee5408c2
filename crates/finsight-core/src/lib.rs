//! Finsight Core Library
//!
//! Scoring and prediction engine for the Finsight personal finance dashboard:
//! - Financial ratios, a 0-100 health score and five 0-10 risk factors
//! - Random forests trained on a reference dataset (expense, investment,
//!   insurance and financial-stress models)
//! - 1, 3 and 10 year growth projections
//! - Dashboard insights (action items, budget, allocation)
//! - Profile store (SQLite with an in-memory fallback)
//! - Advisor context for an external language model
//!
//! The engine functions are pure and never fail. Training problems degrade
//! the predictor to neutral defaults instead of surfacing as errors.

pub mod analysis;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod features;
pub mod insights;
pub mod ml;
pub mod models;
pub mod predictor;
pub mod projection;
pub mod ratios;
pub mod risk;
pub mod scoring;
pub mod store;

/// Test utilities including a synthetic reference dataset
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{FinancialAnalyzer, FinancialReport};
pub use config::{FinsightConfig, ServerConfig, StorageBackend, StorageConfig};
pub use context::{AdvisorContext, QuestionTopic};
pub use dataset::{CsvDatasetSource, DatasetSource, NoDataset, ReferenceDataset, ReferenceRecord};
pub use error::{Error, Result};
pub use insights::{ActionItem, AllocationSuggestion, BudgetSummary, BudgetVerdict};
pub use models::{
    BaselinePredictions, HealthStatus, Horizon, HorizonProjection, PredictionSet,
    PredictionSource, ProjectionStatus, RiskCategory, RiskFactorSet, RiskSeverity,
    UserFinancialProfile,
};
pub use predictor::{
    PredictorConfig, PredictorStatus, TrainedModels, TrainedPredictor, TrainingReport,
};
pub use projection::{generate_predictions, project};
pub use ratios::{compute_ratios, FinancialRatios};
pub use risk::{compute_risk_factors, risk_severity_label};
pub use scoring::{compute_health_score, health_status_label};
pub use store::{open_store, MemoryStore, ProfileStore, SqliteStore, StoredPredictions};
