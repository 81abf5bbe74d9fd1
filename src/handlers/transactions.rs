use super::common::{
    created_response, default_page, default_per_page, map_service_error, success_response,
    validate_input, PaginatedResponse,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::TransactionType,
    services::transactions::{RecordTransactionInput, TransactionFilter},
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

/// Creates the router for finance transaction endpoints
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_transaction))
        .route("/", get(list_transactions))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct RecordTransactionRequest {
    pub project_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    #[validate(length(min = 1, max = 255))]
    pub category: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub transaction_type: Option<TransactionType>,
    pub project_id: Option<Uuid>,
    pub category: Option<String>,
}

// Handler functions

/// Record a finance transaction
async fn record_transaction(
    State(state): State<AppState>,
    Json(payload): Json<RecordTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let transaction = state
        .services
        .transactions
        .record(RecordTransactionInput {
            project_id: payload.project_id,
            project_title: None,
            transaction_type: payload.transaction_type,
            category: payload.category,
            description: payload.description,
            amount: payload.amount,
            date: payload.date,
        })
        .await
        .map_err(map_service_error)?;

    info!("Transaction recorded: {}", transaction.id);

    Ok(created_response(transaction))
}

/// List transactions with pagination and filters
async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let filter = TransactionFilter {
        transaction_type: params.transaction_type,
        project_id: params.project_id,
        category: params.category,
    };

    let (transactions, total) = state
        .services
        .transactions
        .list(filter, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        transactions,
        page,
        per_page,
        total,
    )))
}
