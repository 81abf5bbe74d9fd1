use super::common::{
    created_response, default_page, default_per_page, map_service_error, no_content_response,
    success_response, validate_input, PaginatedResponse,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::ProductType,
    services::bom::ComponentInput,
    services::products::{CreateProductInput, ProductFilter, UpdateProductInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for product endpoints
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/low-stock", get(list_low_stock))
        .route("/component-options", get(list_component_options))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
        .route("/:id/components", get(get_components))
        .route("/:id/components", post(add_component))
        .route("/:id/cost", get(compute_cost))
        .route("/:id/availability", get(check_availability))
        .route("/:id/explosion", get(explode))
        .route("/:id/used-in", get(products_using))
}

// Request and response DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct ComponentRequest {
    pub component_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub product_type: ProductType,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub cost_price: Decimal,
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub current_stock: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
    pub supplier: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentRequest>,
}

fn default_unit() -> String {
    "UN".to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub min_stock: Option<Decimal>,
    pub supplier: Option<String>,
    /// Replaces the composition wholesale when present
    pub components: Option<Vec<ComponentRequest>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddComponentRequest {
    pub component_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub category: Option<String>,
    pub product_type: Option<ProductType>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityQuery {
    pub quantity: Decimal,
}

fn to_component_inputs(components: Vec<ComponentRequest>) -> Vec<ComponentInput> {
    components
        .into_iter()
        .map(|c| ComponentInput {
            component_id: c.component_id,
            quantity: c.quantity,
        })
        .collect()
}

// Handler functions

/// Create a new product
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateProductInput {
        name: payload.name,
        description: payload.description,
        category: payload.category,
        product_type: payload.product_type,
        unit: payload.unit,
        cost_price: payload.cost_price,
        sale_price: payload.sale_price,
        current_stock: payload.current_stock,
        min_stock: payload.min_stock,
        supplier: payload.supplier,
        components: to_component_inputs(payload.components),
    };

    let product = state
        .services
        .products
        .create_product(input)
        .await
        .map_err(map_service_error)?;

    info!("Product created: {}", product.id);

    Ok(created_response(product))
}

/// Get a product by ID
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let maybe_product = state
        .services
        .products
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    match maybe_product {
        Some(product) => Ok(success_response(product)),
        None => Err(ApiError::NotFound(format!(
            "Product with ID {} not found",
            id
        ))),
    }
}

/// List products with pagination and filters
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let filter = ProductFilter {
        category: params.category,
        product_type: params.product_type,
        search: params.search,
    };

    let (products, total) = state
        .services
        .products
        .list_products(filter, page, per_page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        products, page, per_page, total,
    )))
}

/// Products at or below their minimum stock threshold
async fn list_low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list_low_stock()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Products eligible to appear in a composition list
async fn list_component_options(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .available_components()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Update a product
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = UpdateProductInput {
        name: payload.name,
        description: payload.description,
        category: payload.category,
        unit: payload.unit,
        cost_price: payload.cost_price,
        sale_price: payload.sale_price,
        min_stock: payload.min_stock,
        supplier: payload.supplier,
        components: payload.components.map(to_component_inputs),
    };

    let product = state
        .services
        .products
        .update_product(id, input)
        .await
        .map_err(map_service_error)?;

    info!("Product updated: {}", id);

    Ok(success_response(product))
}

/// Delete a product (refused while referenced as a component)
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    info!("Product deleted: {}", id);

    Ok(no_content_response())
}

/// Ordered component list of a product
async fn get_components(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let components = state
        .services
        .bom
        .get_components(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(components))
}

/// Add a single component to a product
async fn add_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddComponentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let component = state
        .services
        .bom
        .add_component(id, payload.component_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    info!("Component {} added to product {}", payload.component_id, id);

    Ok(created_response(component))
}

/// Recursive unit cost of a product
async fn compute_cost(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let cost = state
        .services
        .bom
        .compute_cost(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(serde_json::json!({
        "product_id": id,
        "cost": cost,
    })))
}

/// Check stock availability through the whole composition tree
async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<QuantityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let availability = state
        .services
        .bom
        .check_availability(id, params.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(availability))
}

/// Multi-level component requirements for a production quantity
async fn explode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<QuantityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let components = state
        .services
        .bom
        .explode(id, params.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(components))
}

/// Products that list this product as a direct component
async fn products_using(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .bom
        .products_using_component(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}
