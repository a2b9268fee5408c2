//! Finsight Web Server
//!
//! Axum-based REST API for the Finsight finance dashboard.
//!
//! Security features:
//! - Restrictive CORS policy (same-origin unless origins are configured)
//! - Security headers on every response
//! - Sanitized error responses
//!
//! Training and prediction run on the blocking thread pool.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use finsight_core::{FinancialAnalyzer, ProfileStore, ServerConfig, TrainedPredictor};

mod handlers;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub analyzer: FinancialAnalyzer,
}

impl AppState {
    pub fn new(store: Arc<dyn ProfileStore>, analyzer: FinancialAnalyzer) -> Self {
        Self { store, analyzer }
    }

    pub fn predictor(&self) -> &Arc<TrainedPredictor> {
        self.analyzer.predictor()
    }
}

/// Simple success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Profiles
        .route("/profiles", get(handlers::list_profiles))
        .route(
            "/profiles/:user_id",
            get(handlers::get_profile)
                .put(handlers::put_profile)
                .delete(handlers::delete_profile),
        )
        .route("/profiles/:user_id/report", get(handlers::get_report))
        .route(
            "/profiles/:user_id/predictions",
            get(handlers::get_predictions),
        )
        .route("/profiles/:user_id/context", get(handlers::get_context))
        // Ad-hoc analysis of an unsaved profile
        .route("/analyze", post(handlers::analyze_profile))
        // Model
        .route("/model", get(handlers::get_model))
        .route("/model/train", post(handlers::train_model));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    info!(
        store = state.store.backend(),
        dataset = %state.predictor().source_description(),
        "Profile store and dataset ready"
    );

    let app = create_router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
