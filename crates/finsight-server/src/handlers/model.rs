//! Model status and training handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};

use super::blocking;
use crate::{AppError, AppState};
use finsight_core::{PredictorStatus, TrainedPredictor, TrainingReport};

/// Predictor state with the last training outcome
#[derive(Debug, Serialize)]
pub struct ModelStatusResponse {
    pub status: PredictorStatus,
    pub dataset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    pub report: Option<TrainingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<BTreeMap<&'static str, BTreeMap<&'static str, f64>>>,
}

impl ModelStatusResponse {
    fn from_predictor(predictor: &TrainedPredictor) -> Self {
        Self {
            status: predictor.status(),
            dataset: predictor.source_description(),
            degraded_reason: predictor.degraded_reason(),
            report: predictor.training_report(),
            feature_importance: predictor.models().map(|m| m.feature_importance()),
        }
    }
}

/// GET /api/model - Predictor status; does not train
pub async fn get_model(State(state): State<Arc<AppState>>) -> Json<ModelStatusResponse> {
    Json(ModelStatusResponse::from_predictor(state.predictor()))
}

/// POST /api/model/train - Retrain from the dataset source
///
/// A failed run is reported through `status` and `degraded_reason`, not as
/// an HTTP error.
pub async fn train_model(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelStatusResponse>, AppError> {
    let predictor = Arc::clone(state.predictor());

    let response = blocking(move || {
        match predictor.retrain() {
            Some(models) => info!(rows = models.report().rows, "Retrained models"),
            None => warn!("Retraining failed, predictor is degraded"),
        }
        ModelStatusResponse::from_predictor(&predictor)
    })
    .await?;

    Ok(Json(response))
}
