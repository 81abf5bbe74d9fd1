use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        product::{self, Entity as ProductEntity},
        product_component::{self, Entity as ProductComponentEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::ProductType,
    services::bom::{BomService, ComponentInput},
};

/// Fields for a new catalog product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub product_type: ProductType,
    pub unit: String,
    pub cost_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub supplier: Option<String>,
    pub components: Vec<ComponentInput>,
}

/// Partial update; `None` fields are left untouched. A `Some` component
/// list replaces the existing composition wholesale.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub min_stock: Option<Decimal>,
    pub supplier: Option<String>,
    pub components: Option<Vec<ComponentInput>>,
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub product_type: Option<ProductType>,
    pub search: Option<String>,
}

/// Service for managing catalog products and their composition.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    bom: Arc<BomService>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, bom: Arc<BomService>, event_sender: EventSender) -> Self {
        Self {
            db,
            bom,
            event_sender,
        }
    }

    /// Creates a product, snapshot-costing and cycle-checking its
    /// component list.
    ///
    /// The product row is inserted first and the composition installed
    /// through the graph engine; if any component edge is rejected the
    /// just-created row is deleted again, so a failed create leaves the
    /// store unchanged.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db;

        validate_money(input.cost_price, "cost_price")?;
        if let Some(sale_price) = input.sale_price {
            validate_money(sale_price, "sale_price")?;
        }
        validate_money(input.current_stock, "current_stock")?;
        validate_money(input.min_stock, "min_stock")?;
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Product name must not be empty".to_string(),
            ));
        }
        if input.product_type.is_raw_material() && !input.components.is_empty() {
            return Err(ServiceError::InvalidOperation(format!(
                "Raw material '{}' cannot have components",
                input.name
            )));
        }

        let product_id = Uuid::new_v4();
        let row = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name.clone()),
            description: Set(input.description),
            category: Set(input.category),
            product_type: Set(input.product_type.to_string()),
            unit: Set(input.unit),
            cost_price: Set(input.cost_price),
            sale_price: Set(input.sale_price),
            current_stock: Set(input.current_stock),
            min_stock: Set(input.min_stock),
            supplier: Set(input.supplier),
            created_at: Set(Utc::now()),
            updated_at: Set(Some(Utc::now())),
        };

        let mut created = row.insert(db).await.map_err(|e| {
            error!("Failed to create product: {}", e);
            ServiceError::db_error(e)
        })?;

        if !input.components.is_empty() {
            match self
                .bom
                .replace_components(product_id, &input.components)
                .await
            {
                Ok(cost_price) => {
                    created.cost_price = cost_price;
                }
                Err(err) => {
                    // Undo the partial create before surfacing the error.
                    if let Err(cleanup) = ProductEntity::delete_by_id(product_id).exec(db).await {
                        error!(
                            product_id = %product_id,
                            "Failed to roll back product after rejected components: {}",
                            cleanup
                        );
                    }
                    return Err(err);
                }
            }
        }

        self.event_sender
            .send(Event::ProductCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(product_id = %created.id, name = %created.name, "Product created");

        Ok(created)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db;

        ProductEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(|e| {
                error!(product_id = %id, error = %e, "Database error when fetching product");
                ServiceError::db_error(e)
            })
    }

    /// List products with pagination
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = ProductEntity::find();

        if let Some(category) = filter.category {
            query = query.filter(product::Column::Category.eq(category));
        }
        if let Some(product_type) = filter.product_type {
            query = query.filter(product::Column::ProductType.eq(product_type.to_string()));
        }
        if let Some(search) = filter.search {
            let pattern = format!("%{}%", search);
            query = query.filter(
                product::Column::Name
                    .like(&pattern)
                    .or(product::Column::Description.like(&pattern)),
            );
        }

        let paginator = query
            .order_by_desc(product::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let products = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((products, total))
    }

    /// Products at or below their minimum stock threshold.
    #[instrument(skip(self))]
    pub async fn list_low_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db;

        ProductEntity::find()
            .filter(
                Expr::col(product::Column::CurrentStock)
                    .lte(Expr::col(product::Column::MinStock)),
            )
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Products eligible to appear in a composition list (raw materials
    /// and sub parts).
    #[instrument(skip(self))]
    pub async fn available_components(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db;

        ProductEntity::find()
            .filter(product::Column::ProductType.is_in([
                ProductType::RawMaterial.to_string(),
                ProductType::SubPart.to_string(),
            ]))
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Applies a partial update. A provided component list replaces the
    /// existing composition wholesale (cycle-checked and re-costed); the
    /// whole change takes effect or none of it does.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db;

        let existing = ProductEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        // Install the new composition first: it re-validates acyclicity
        // and refreshes the snapshot cost before any field change lands.
        if let Some(components) = &input.components {
            let cost_price = self.bom.replace_components(id, components).await?;
            self.event_sender
                .send(Event::ProductCostRecalculated {
                    product_id: id,
                    cost_price,
                })
                .await
                .map_err(ServiceError::EventError)?;
        }

        let is_raw_material = existing.product_type().is_raw_material();
        let mut row: product::ActiveModel = existing.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Product name must not be empty".to_string(),
                ));
            }
            row.name = Set(name);
        }
        if let Some(description) = input.description {
            row.description = Set(Some(description));
        }
        if let Some(category) = input.category {
            row.category = Set(Some(category));
        }
        if let Some(unit) = input.unit {
            row.unit = Set(unit);
        }
        if let Some(cost_price) = input.cost_price {
            validate_money(cost_price, "cost_price")?;
            // Snapshot costing owns the cost of composed products.
            if is_raw_material {
                row.cost_price = Set(cost_price);
            }
        }
        if let Some(sale_price) = input.sale_price {
            validate_money(sale_price, "sale_price")?;
            row.sale_price = Set(Some(sale_price));
        }
        if let Some(min_stock) = input.min_stock {
            validate_money(min_stock, "min_stock")?;
            row.min_stock = Set(min_stock);
        }
        if let Some(supplier) = input.supplier {
            row.supplier = Set(Some(supplier));
        }
        row.updated_at = Set(Some(Utc::now()));

        let updated = row.update(db).await.map_err(|e| {
            error!(product_id = %id, error = %e, "Database error when updating product");
            ServiceError::db_error(e)
        })?;

        self.event_sender
            .send(Event::ProductUpdated(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(product_id = %updated.id, "Product updated");

        Ok(updated)
    }

    /// Deletes a product unless another product still lists it as a
    /// component; the delete is then refused entirely.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        let existing = ProductEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        if self.bom.is_referenced(id).await? {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "Product '{}' is used as a component of other products",
                existing.name
            )));
        }

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        ProductComponentEntity::delete_many()
            .filter(product_component::Column::ProductId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        ProductEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProductDeleted(id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(product_id = %id, "Product deleted");

        Ok(())
    }
}

fn validate_money(value: Decimal, field: &str) -> Result<(), ServiceError> {
    if value < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}
