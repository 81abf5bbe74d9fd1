use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    bom::{Availability, BomGraph, ComponentEdge, ExplodedComponent, ProductNode},
    entities::{
        product::{self, Entity as ProductEntity},
        product_component::{self, Entity as ProductComponentEntity},
    },
    errors::ServiceError,
};

/// Requested component association for a product.
#[derive(Debug, Clone)]
pub struct ComponentInput {
    pub component_id: Uuid,
    pub quantity: Decimal,
}

/// Product composition engine: maintains the component graph, guarantees
/// acyclicity and computes recursive costs.
///
/// Every operation loads a graph snapshot once, works on it in memory and
/// writes the outcome back, so validation never interleaves with partial
/// mutations.
#[derive(Clone)]
pub struct BomService {
    db: Arc<DatabaseConnection>,
}

impl BomService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Loads the full composition graph (products plus edges) as an
    /// in-memory snapshot. Catalogs here are small-business sized, so two
    /// queries per logical operation beat a round-trip per node.
    pub async fn load_graph(&self) -> Result<BomGraph, ServiceError> {
        let db = &*self.db;

        let products = ProductEntity::find().all(db).await.map_err(|e| {
            error!("Failed to load products for composition graph: {}", e);
            ServiceError::db_error(e)
        })?;

        let edges = ProductComponentEntity::find()
            .order_by_asc(product_component::Column::ProductId)
            .order_by_asc(product_component::Column::Position)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to load component edges: {}", e);
                ServiceError::db_error(e)
            })?;

        let mut edges_by_product: HashMap<Uuid, Vec<ComponentEdge>> = HashMap::new();
        for edge in edges {
            edges_by_product
                .entry(edge.product_id)
                .or_default()
                .push(ComponentEdge {
                    component_id: edge.component_id,
                    quantity: edge.quantity,
                });
        }

        let mut graph = BomGraph::new();
        for p in products {
            let components = edges_by_product.remove(&p.id).unwrap_or_default();
            graph.insert_node(
                p.id,
                ProductNode {
                    product_type: p.product_type(),
                    cost_price: p.cost_price,
                    current_stock: p.current_stock,
                    components,
                },
            );
        }

        Ok(graph)
    }

    /// Recursive cost of one unit of the product. A missing product costs
    /// zero (benign for lookups racing a deletion during bulk import).
    #[instrument(skip(self))]
    pub async fn compute_cost(&self, product_id: Uuid) -> Result<Decimal, ServiceError> {
        let graph = self.load_graph().await?;
        Ok(graph.rollup_cost(product_id))
    }

    /// Read-only check that `quantity` units can be consumed at every
    /// level of the composition tree.
    #[instrument(skip(self))]
    pub async fn check_availability(
        &self,
        product_id: Uuid,
        quantity: Decimal,
    ) -> Result<Availability, ServiceError> {
        let graph = self.load_graph().await?;
        Ok(graph.check_availability(product_id, quantity))
    }

    /// Multi-level requirements explosion for `quantity` units.
    #[instrument(skip(self))]
    pub async fn explode(
        &self,
        product_id: Uuid,
        quantity: Decimal,
    ) -> Result<Vec<ExplodedComponent>, ServiceError> {
        let graph = self.load_graph().await?;
        Ok(graph.explode(product_id, quantity))
    }

    /// Ordered component list of a product.
    pub async fn get_components(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<product_component::Model>, ServiceError> {
        let db = &*self.db;

        ProductComponentEntity::find()
            .filter(product_component::Column::ProductId.eq(product_id))
            .order_by_asc(product_component::Column::Position)
            .all(db)
            .await
            .map_err(|e| {
                error!("Failed to fetch product components: {}", e);
                ServiceError::db_error(e)
            })
    }

    /// Adds a single component edge to an existing product.
    ///
    /// The edge is rejected with `CircularReference` before anything is
    /// written when it would make the product a component of itself,
    /// directly or transitively. On success the edge is persisted with
    /// unit and cost snapshots and the owner's snapshot cost is refreshed.
    #[instrument(skip(self))]
    pub async fn add_component(
        &self,
        product_id: Uuid,
        component_id: Uuid,
        quantity: Decimal,
    ) -> Result<product_component::Model, ServiceError> {
        let db = &*self.db;

        if quantity <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Component quantity must be positive".to_string(),
            ));
        }

        let graph = self.load_graph().await?;
        if graph.would_create_cycle(product_id, component_id) {
            return Err(ServiceError::CircularReference(format!(
                "product {} cannot contain {}: it would become a component of itself",
                product_id, component_id
            )));
        }

        let owner = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        if owner.product_type().is_raw_material() {
            return Err(ServiceError::InvalidOperation(format!(
                "Raw material '{}' cannot have components",
                owner.name
            )));
        }

        let component = ProductEntity::find_by_id(component_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Component product {} not found", component_id))
            })?;

        let position = graph
            .node(product_id)
            .map(|node| node.components.len() as i32)
            .unwrap_or(0);

        let edge = product_component::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            component_id: Set(component_id),
            quantity: Set(quantity),
            unit: Set(component.unit.clone()),
            unit_cost: Set(component.cost_price),
            total_cost: Set(quantity * component.cost_price),
            position: Set(position),
            created_at: Set(Utc::now()),
        };

        let created = edge.insert(db).await.map_err(|e| {
            error!("Failed to add component edge: {}", e);
            ServiceError::db_error(e)
        })?;

        self.refresh_snapshot_cost(product_id).await?;

        info!(
            product_id = %product_id,
            component_id = %component_id,
            quantity = %quantity,
            "Component added to product"
        );

        Ok(created)
    }

    /// Replaces a product's component list wholesale.
    ///
    /// Every new edge is cycle-checked against the current graph before
    /// any deletion happens; the swap itself (delete old edges, insert new
    /// ones, refresh the snapshot cost) runs inside one transaction, so
    /// the update is atomic from the caller's perspective. Returns the new
    /// snapshot cost.
    #[instrument(skip(self, components))]
    pub async fn replace_components(
        &self,
        product_id: Uuid,
        components: &[ComponentInput],
    ) -> Result<Decimal, ServiceError> {
        let db = &*self.db;

        for input in components {
            if input.quantity <= Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Component quantity must be positive".to_string(),
                ));
            }
        }

        let owner = ProductEntity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        if owner.product_type().is_raw_material() && !components.is_empty() {
            return Err(ServiceError::InvalidOperation(format!(
                "Raw material '{}' cannot have components",
                owner.name
            )));
        }

        let graph = self.load_graph().await?;
        let edges: Vec<ComponentEdge> = components
            .iter()
            .map(|c| ComponentEdge {
                component_id: c.component_id,
                quantity: c.quantity,
            })
            .collect();
        if let Err(cycle) = graph.validate_components(product_id, &edges) {
            return Err(ServiceError::CircularReference(format!(
                "product {} cannot contain {}: it would become a component of itself",
                cycle.product_id, cycle.component_id
            )));
        }

        let snapshots = self.component_snapshots(components).await?;
        let new_cost: Decimal = snapshots.iter().map(|s| s.total_cost).sum();

        let now = Utc::now();
        let rows: Vec<product_component::ActiveModel> = snapshots
            .into_iter()
            .enumerate()
            .map(|(position, snap)| product_component::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                component_id: Set(snap.component_id),
                quantity: Set(snap.quantity),
                unit: Set(snap.unit),
                unit_cost: Set(snap.unit_cost),
                total_cost: Set(snap.total_cost),
                position: Set(position as i32),
                created_at: Set(now),
            })
            .collect();

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        ProductComponentEntity::delete_many()
            .filter(product_component::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        if !rows.is_empty() {
            ProductComponentEntity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        if !owner.product_type().is_raw_material() {
            ProductEntity::update_many()
                .col_expr(product::Column::CostPrice, Expr::value(new_cost))
                .col_expr(product::Column::UpdatedAt, Expr::value(now))
                .filter(product::Column::Id.eq(product_id))
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(
            product_id = %product_id,
            components = components.len(),
            cost_price = %new_cost,
            "Product components replaced"
        );

        Ok(new_cost)
    }

    /// Products that list the given product as a direct component.
    pub async fn products_using_component(
        &self,
        component_id: Uuid,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db;

        let owners: Vec<Uuid> = ProductComponentEntity::find()
            .filter(product_component::Column::ComponentId.eq(component_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|edge| edge.product_id)
            .collect();

        if owners.is_empty() {
            return Ok(Vec::new());
        }

        ProductEntity::find()
            .filter(product::Column::Id.is_in(owners))
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Whether any product references the given product as a component.
    pub async fn is_referenced(&self, component_id: Uuid) -> Result<bool, ServiceError> {
        let db = &*self.db;

        let reference = ProductComponentEntity::find()
            .filter(product_component::Column::ComponentId.eq(component_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(reference.is_some())
    }

    /// Recomputes a product's snapshot cost from its stored edges.
    async fn refresh_snapshot_cost(&self, product_id: Uuid) -> Result<Decimal, ServiceError> {
        let db = &*self.db;

        let cost: Decimal = self
            .get_components(product_id)
            .await?
            .iter()
            .map(|edge| edge.total_cost)
            .sum();

        ProductEntity::update_many()
            .col_expr(product::Column::CostPrice, Expr::value(cost))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product_id))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(cost)
    }

    /// Resolves snapshot pricing for a component list in one query.
    async fn component_snapshots(
        &self,
        components: &[ComponentInput],
    ) -> Result<Vec<ComponentSnapshot>, ServiceError> {
        let db = &*self.db;

        if components.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = components.iter().map(|c| c.component_id).collect();
        let rows: HashMap<Uuid, product::Model> = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        components
            .iter()
            .map(|input| {
                let row = rows.get(&input.component_id).ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Component product {} not found",
                        input.component_id
                    ))
                })?;
                Ok(ComponentSnapshot {
                    component_id: input.component_id,
                    quantity: input.quantity,
                    unit: row.unit.clone(),
                    unit_cost: row.cost_price,
                    total_cost: input.quantity * row.cost_price,
                })
            })
            .collect()
    }
}

struct ComponentSnapshot {
    component_id: Uuid,
    quantity: Decimal,
    unit: String,
    unit_cost: Decimal,
    total_cost: Decimal,
}
