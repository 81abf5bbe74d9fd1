use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{extract::State, response::IntoResponse, routing::get, Router};

/// Creates the router for dashboard endpoints
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}

/// Headline numbers for the dashboard
async fn dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .services
        .reports
        .dashboard_stats()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(stats))
}
