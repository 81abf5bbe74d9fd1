use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    ActiveValue::Set,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        product::{self, Entity as ProductEntity},
        product_component::{self, Entity as ProductComponentEntity},
        stock_movement::{self, Entity as StockMovementEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{MovementType, ReferenceType},
};

/// Request to apply one stock movement.
#[derive(Debug, Clone)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub movement_type: MovementType,
    pub project_id: Option<Uuid>,
    /// When true, an exit from a composed product is propagated to its
    /// components, scaled by the declared quantities at every level.
    pub cascade: bool,
    pub date: Option<NaiveDate>,
}

/// Receipt for one applied movement (top-level or cascaded).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AppliedMovement {
    pub movement_id: Uuid,
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
}

/// Filters for the movement history listing.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
}

/// Stock ledger: applies movements to product stock and appends immutable
/// history. Corrections are new offsetting movements, never edits.
#[derive(Clone)]
pub struct StockService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Applies a stock movement and returns a receipt of every row
    /// touched, parent first, cascaded components in stored edge order.
    ///
    /// Exits clamp the stored stock at zero instead of rejecting
    /// over-consumption; callers wanting a hard stop should pre-check
    /// availability. The clamp mirrors the ledger's tolerant, append-only
    /// design. There is no cross-row transaction around a cascade, so a
    /// mid-cascade failure leaves the already-applied prefix in place.
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        input: RecordMovementInput,
    ) -> Result<Vec<AppliedMovement>, ServiceError> {
        if input.quantity <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Movement quantity must be positive".to_string(),
            ));
        }

        let mut applied = Vec::new();
        self.apply_movement(input, &mut applied).await?;
        Ok(applied)
    }

    async fn apply_movement(
        &self,
        input: RecordMovementInput,
        applied: &mut Vec<AppliedMovement>,
    ) -> Result<(), ServiceError> {
        let db = &*self.db;

        let Some(target) = ProductEntity::find_by_id(input.product_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
        else {
            // A vanished product mid-cascade is benign; skip it.
            warn!(product_id = %input.product_id, "Stock movement for unknown product skipped");
            return Ok(());
        };

        let previous_stock = target.current_stock;
        let new_stock = match input.movement_type {
            MovementType::Entry => previous_stock + input.quantity,
            MovementType::Exit => (previous_stock - input.quantity).max(Decimal::ZERO),
        };

        ProductEntity::update_many()
            .col_expr(product::Column::CurrentStock, Expr::value(new_stock))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(input.product_id))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        let movement_id = Uuid::new_v4();
        let unit_price = target.cost_price;
        let total_value = input.quantity * unit_price;
        let reference_type = if input.project_id.is_some() {
            ReferenceType::Project
        } else {
            ReferenceType::Manual
        };
        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());

        let row = stock_movement::ActiveModel {
            id: Set(movement_id),
            product_id: Set(input.product_id),
            product_name: Set(target.name.clone()),
            movement_type: Set(input.movement_type.to_string()),
            quantity: Set(input.quantity),
            unit_price: Set(Some(unit_price)),
            total_value: Set(Some(total_value)),
            project_id: Set(input.project_id),
            reference_type: Set(reference_type.to_string()),
            date: Set(date),
            created_at: Set(Utc::now()),
        };

        StockMovementEntity::insert(row)
            .exec_without_returning(db)
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::StockMovementRecorded {
                movement_id,
                product_id: input.product_id,
                movement_type: input.movement_type.to_string(),
                quantity: input.quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        if input.movement_type == MovementType::Exit && new_stock <= target.min_stock {
            self.event_sender
                .send(Event::LowStock {
                    product_id: input.product_id,
                    current_stock: new_stock,
                    min_stock: target.min_stock,
                })
                .await
                .map_err(ServiceError::EventError)?;
        }

        info!(
            product_id = %input.product_id,
            movement_type = %input.movement_type,
            quantity = %input.quantity,
            new_stock = %new_stock,
            "Stock movement recorded"
        );

        applied.push(AppliedMovement {
            movement_id,
            product_id: input.product_id,
            movement_type: input.movement_type,
            quantity: input.quantity,
            previous_stock,
            new_stock,
        });

        if input.cascade && input.movement_type == MovementType::Exit {
            let components = ProductComponentEntity::find()
                .filter(product_component::Column::ProductId.eq(input.product_id))
                .order_by_asc(product_component::Column::Position)
                .all(db)
                .await
                .map_err(ServiceError::db_error)?;

            for edge in components {
                let child = RecordMovementInput {
                    product_id: edge.component_id,
                    quantity: edge.quantity * input.quantity,
                    movement_type: MovementType::Exit,
                    project_id: input.project_id,
                    cascade: true,
                    date: Some(date),
                };
                Box::pin(self.apply_movement(child, applied)).await?;
            }
        }

        Ok(())
    }

    /// Movement history, most recent first.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_movement::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = StockMovementEntity::find();

        if let Some(product_id) = filter.product_id {
            query = query.filter(stock_movement::Column::ProductId.eq(product_id));
        }
        if let Some(project_id) = filter.project_id {
            query = query.filter(stock_movement::Column::ProjectId.eq(project_id));
        }
        if let Some(movement_type) = filter.movement_type {
            query = query
                .filter(stock_movement::Column::MovementType.eq(movement_type.to_string()));
        }

        let paginator = query
            .order_by_desc(stock_movement::Column::CreatedAt)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let movements = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((movements, total))
    }
}
