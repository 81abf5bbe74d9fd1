use super::common::{
    created_response, default_page, default_per_page, map_service_error, no_content_response,
    success_response, validate_input, PaginatedResponse,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::{ProjectStatus, ProjectType},
    services::projects::{
        CreateProjectInput, ProjectFilter, ProjectItemInput, UpdateProjectInput,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for project endpoints
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_project))
        .route("/", get(list_projects))
        .route("/:id", get(get_project))
        .route("/:id", put(update_project))
        .route("/:id", delete(delete_project))
        .route("/:id/items", get(get_project_items))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct ProjectItemRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
    pub project_type: ProjectType,
    #[serde(default)]
    pub items: Vec<ProjectItemRequest>,
    pub budget: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub materials_cost: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
    pub profit_margin: Option<Decimal>,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Quote
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub materials_cost: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
    pub profit_margin: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub client_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
}

// Handler functions

/// Register a new project
async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let items = payload
        .items
        .into_iter()
        .map(|item| ProjectItemInput {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    let project = state
        .services
        .projects
        .create_project(CreateProjectInput {
            client_id: payload.client_id,
            title: payload.title,
            description: payload.description,
            status: payload.status,
            project_type: payload.project_type,
            items,
            budget: payload.budget,
            start_date: payload.start_date,
            end_date: payload.end_date,
            materials_cost: payload.materials_cost,
            labor_cost: payload.labor_cost,
            profit_margin: payload.profit_margin,
        })
        .await
        .map_err(map_service_error)?;

    info!("Project created: #{} ({})", project.number, project.id);

    Ok(created_response(project))
}

/// Get a project by ID
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_project = state
        .services
        .projects
        .get_project(id)
        .await
        .map_err(map_service_error)?;

    match maybe_project {
        Some(project) => Ok(success_response(project)),
        None => Err(ApiError::NotFound(format!(
            "Project with ID {} not found",
            id
        ))),
    }
}

/// Line items of a project
async fn get_project_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .projects
        .get_project_items(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// List projects with pagination and filters
async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListProjectsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let filter = ProjectFilter {
        client_id: params.client_id,
        status: params.status,
        search: params.search,
    };

    let (projects, total) = state
        .services
        .projects
        .list_projects(filter, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        projects, page, per_page, total,
    )))
}

/// Update a project (completing one records the final payment)
async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let project = state
        .services
        .projects
        .update_project(
            id,
            UpdateProjectInput {
                title: payload.title,
                description: payload.description,
                status: payload.status,
                budget: payload.budget,
                start_date: payload.start_date,
                end_date: payload.end_date,
                materials_cost: payload.materials_cost,
                labor_cost: payload.labor_cost,
                profit_margin: payload.profit_margin,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Project updated: {}", id);

    Ok(success_response(project))
}

/// Delete a project and its dependent records
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .projects
        .delete_project(id)
        .await
        .map_err(map_service_error)?;

    info!("Project deleted: {}", id);

    Ok(no_content_response())
}
