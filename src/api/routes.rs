use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::post,
};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;
use crate::analyze::{analyze_url, parse_target_url};
use crate::api::models::{AnalysisResponse, AnalyzeRequest};
use crate::api::response;
use crate::error::{AppError, Result};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let start_time = std::time::Instant::now();

    match process_analyze_request(&state, payload).await {
        Ok(analysis) => {
            tracing::info!(url = %analysis.url, elapsed = ?start_time.elapsed(), "Request processed");
            response::success(analysis).into_response()
        }
        Err(err) => {
            match &err {
                AppError::Validation(msg) => tracing::info!("Rejected request: {}", msg),
                other => tracing::error!(elapsed = ?start_time.elapsed(), "Error in analyze route: {}", other),
            }
            err.into_response()
        }
    }
}

async fn process_analyze_request(
    state: &AppState,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<AnalysisResponse> {
    let Json(req) = payload
        .map_err(|rejection| AppError::Validation(format!("Invalid request body: {}", rejection.body_text())))?;
    let target = parse_target_url(req.url.as_deref())?;

    if state.config.preview_mode {
        tracing::info!(url = %target.url, "Preview mode, returning sample analysis");
        return Ok(AnalysisResponse::preview(&target.requested));
    }

    tracing::info!(url = %target.url, "Processing analysis request");
    analyze_url(state.fetcher.as_ref(), state.scorer.as_ref(), &target).await
}
