use super::common::{
    created_response, default_page, default_per_page, map_service_error, no_content_response,
    success_response, validate_input, PaginatedResponse,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::PersonType,
    services::clients::{CreateClientInput, UpdateClientInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for client endpoints
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_client))
        .route("/", get(list_clients))
        .route("/:id", get(get_client))
        .route("/:id", put(update_client))
        .route("/:id", delete(delete_client))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub person_type: PersonType,
    pub document: Option<String>,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub company_name: Option<String>,
    pub state_registration: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub document: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub company_name: Option<String>,
    pub state_registration: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub search: Option<String>,
    pub active: Option<bool>,
}

// Handler functions

/// Create a new client
async fn create_client(
    State(state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let client = state
        .services
        .clients
        .create_client(CreateClientInput {
            name: payload.name,
            person_type: payload.person_type,
            document: payload.document,
            email: payload.email,
            phone: payload.phone,
            mobile: payload.mobile,
            company_name: payload.company_name,
            state_registration: payload.state_registration,
            street: payload.street,
            number: payload.number,
            complement: payload.complement,
            neighborhood: payload.neighborhood,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
            country: payload.country,
            active: payload.active,
        })
        .await
        .map_err(map_service_error)?;

    info!("Client created: {}", client.id);

    Ok(created_response(client))
}

/// Get a client by ID
async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_client = state
        .services
        .clients
        .get_client(id)
        .await
        .map_err(map_service_error)?;

    match maybe_client {
        Some(client) => Ok(success_response(client)),
        None => Err(ApiError::NotFound(format!(
            "Client with ID {} not found",
            id
        ))),
    }
}

/// List clients with pagination
async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListClientsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let (clients, total) = state
        .services
        .clients
        .list_clients(params.search, params.active, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        clients, page, per_page, total,
    )))
}

/// Update a client
async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let client = state
        .services
        .clients
        .update_client(
            id,
            UpdateClientInput {
                name: payload.name,
                document: payload.document,
                email: payload.email,
                phone: payload.phone,
                mobile: payload.mobile,
                company_name: payload.company_name,
                state_registration: payload.state_registration,
                street: payload.street,
                number: payload.number,
                complement: payload.complement,
                neighborhood: payload.neighborhood,
                city: payload.city,
                state: payload.state,
                zip_code: payload.zip_code,
                country: payload.country,
                active: payload.active,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Client updated: {}", id);

    Ok(success_response(client))
}

/// Delete a client and its projects
async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .clients
        .delete_client(id)
        .await
        .map_err(map_service_error)?;

    info!("Client deleted: {}", id);

    Ok(no_content_response())
}
