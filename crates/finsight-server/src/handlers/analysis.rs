//! Report, prediction and advisor context handlers
//!
//! All of these may train the models on first use, so the engine calls run
//! through [`blocking`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::blocking;
use super::profiles::load_or_404;
use crate::{AppError, AppState};
use finsight_core::{
    AdvisorContext, FinancialReport, PredictionSet, StoredPredictions, UserFinancialProfile,
};

/// Query params for the advisor context
#[derive(Debug, Deserialize)]
pub struct ContextQuery {
    /// Question being asked, used to tag the topic
    pub question: Option<String>,
}

/// GET /api/profiles/:user_id/report - Full dashboard report
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<FinancialReport>, AppError> {
    let profile = load_or_404(&state, &user_id)?;
    let analyzer = state.analyzer.clone();

    let report = blocking(move || analyzer.analyze(&profile)).await?;
    Ok(Json(report))
}

/// GET /api/profiles/:user_id/predictions - Projections, saved with the profile
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PredictionSet>, AppError> {
    let profile = load_or_404(&state, &user_id)?;
    let analyzer = state.analyzer.clone();

    let predictions = blocking(move || analyzer.predictions(&profile)).await?;

    state.store.save_predictions(
        &user_id,
        &StoredPredictions {
            predictions,
            generated_at: Utc::now(),
        },
    )?;
    debug!(user = %user_id, "Saved predictions");

    Ok(Json(predictions))
}

/// GET /api/profiles/:user_id/context?question=... - Advisor context
pub async fn get_context(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<ContextQuery>,
) -> Result<Json<AdvisorContext>, AppError> {
    let profile = load_or_404(&state, &user_id)?;
    let analyzer = state.analyzer.clone();

    let context = blocking(move || {
        let report = analyzer.analyze(&profile);
        let context = AdvisorContext::assemble(&profile, &report);
        match query.question.as_deref() {
            Some(q) => context.for_question(q),
            None => context,
        }
    })
    .await?;

    Ok(Json(context))
}

/// POST /api/analyze - Report for a profile that is not stored
pub async fn analyze_profile(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<UserFinancialProfile>,
) -> Result<Json<FinancialReport>, AppError> {
    profile
        .validate()
        .map_err(|e| AppError::bad_request(&e.to_string()))?;

    let profile = profile.normalized();
    let analyzer = state.analyzer.clone();

    let report = blocking(move || analyzer.analyze(&profile)).await?;
    Ok(Json(report))
}
