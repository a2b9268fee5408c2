//! Profile storage handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{AppError, AppState, SuccessResponse};
use finsight_core::UserFinancialProfile;

/// Load a stored profile or answer 404
pub(crate) fn load_or_404(
    state: &AppState,
    user_id: &str,
) -> Result<UserFinancialProfile, AppError> {
    state
        .store
        .load_profile(user_id)?
        .ok_or_else(|| AppError::not_found(&format!("No profile for user '{}'", user_id)))
}

/// GET /api/profiles - List stored user ids
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.list_users()?))
}

/// GET /api/profiles/:user_id - Get a stored profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserFinancialProfile>, AppError> {
    Ok(Json(load_or_404(&state, &user_id)?))
}

/// PUT /api/profiles/:user_id - Validate, derive totals and store a profile
///
/// Returns the stored document including its `last_updated` stamp.
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(profile): Json<UserFinancialProfile>,
) -> Result<Json<UserFinancialProfile>, AppError> {
    profile
        .validate()
        .map_err(|e| AppError::bad_request(&e.to_string()))?;

    let saved = state.store.save_profile(&user_id, &profile.normalized())?;
    info!(user = %user_id, "Saved profile");

    Ok(Json(saved))
}

/// DELETE /api/profiles/:user_id - Delete a profile and its predictions
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.store.delete_profile(&user_id)? {
        return Err(AppError::not_found(&format!(
            "No profile for user '{}'",
            user_id
        )));
    }

    info!(user = %user_id, "Deleted profile");
    Ok(Json(SuccessResponse { success: true }))
}
