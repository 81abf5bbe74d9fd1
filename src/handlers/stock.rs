use super::common::{
    created_response, default_page, default_per_page, map_service_error, success_response,
    validate_input, PaginatedResponse,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::MovementType,
    services::stock::{MovementFilter, RecordMovementInput},
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for stock ledger endpoints
pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/movements", get(list_movements))
        .route("/movements", post(record_movement))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct RecordMovementRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub movement_type: MovementType,
    pub project_id: Option<Uuid>,
    /// Cascade an exit through the product's composition. Manual
    /// single-item adjustments leave this off.
    #[serde(default)]
    pub cascade: bool,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListMovementsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub product_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
}

// Handler functions

/// Record a stock movement; returns a receipt of every row touched
/// (the named product first, cascaded components after it).
async fn record_movement(
    State(state): State<AppState>,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let applied = state
        .services
        .stock
        .record_movement(RecordMovementInput {
            product_id: payload.product_id,
            quantity: payload.quantity,
            movement_type: payload.movement_type,
            project_id: payload.project_id,
            cascade: payload.cascade,
            date: payload.date,
        })
        .await
        .map_err(map_service_error)?;

    info!(
        "Stock movement recorded for product {} ({} rows touched)",
        payload.product_id,
        applied.len()
    );

    Ok(created_response(applied))
}

/// Movement history, most recent first
async fn list_movements(
    State(state): State<AppState>,
    Query(params): Query<ListMovementsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let filter = MovementFilter {
        product_id: params.product_id,
        project_id: params.project_id,
        movement_type: params.movement_type,
    };

    let (movements, total) = state
        .services
        .stock
        .list_movements(filter, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        movements, page, per_page, total,
    )))
}
