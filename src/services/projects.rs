use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        client::{self, Entity as ClientEntity},
        product::{self, Entity as ProductEntity},
        project::{self, Entity as ProjectEntity},
        project_item::{self, Entity as ProjectItemEntity},
        stock_movement::{self, Entity as StockMovementEntity},
        transaction::{self, Entity as TransactionEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{MovementType, ProjectStatus, ProjectType, TransactionType},
    services::bom::BomService,
    services::stock::{RecordMovementInput, StockService},
    services::transactions::{RecordTransactionInput, TransactionService},
};

/// Fraction of the budget invoiced up front for approved sales, the rest
/// falling due on completion.
const DOWN_PAYMENT_FRACTION: Decimal = dec!(0.5);

/// One product line of a new project.
#[derive(Debug, Clone)]
pub struct ProjectItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Fields for a new project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub project_type: ProjectType,
    pub items: Vec<ProjectItemInput>,
    pub budget: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub materials_cost: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
    pub profit_margin: Option<Decimal>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
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

/// Filters for the project listing.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
}

/// Project orchestration: registration derives the finance entries and
/// triggers the stock ledger consumption for each line item.
#[derive(Clone)]
pub struct ProjectService {
    db: Arc<DatabaseConnection>,
    bom: Arc<BomService>,
    stock: Arc<StockService>,
    transactions: Arc<TransactionService>,
    event_sender: EventSender,
}

impl ProjectService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        bom: Arc<BomService>,
        stock: Arc<StockService>,
        transactions: Arc<TransactionService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            bom,
            stock,
            transactions,
            event_sender,
        }
    }

    /// Registers a project.
    ///
    /// A sale registered beyond the quote stage records the down payment
    /// and consumes stock for every line item, cascading through each
    /// product's composition. Deficient stock is logged, not blocked: the
    /// ledger clamps at zero and production planning follows up on the
    /// shortfall.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_project(
        &self,
        input: CreateProjectInput,
    ) -> Result<project::Model, ServiceError> {
        let db = &*self.db;

        if input.budget < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Project budget must not be negative".to_string(),
            ));
        }
        for item in &input.items {
            if item.quantity <= Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Project item quantity must be positive".to_string(),
                ));
            }
        }

        let client = ClientEntity::find_by_id(input.client_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client {} not found", input.client_id))
            })?;

        let product_names = self.resolve_product_names(&input.items).await?;

        let last = ProjectEntity::find()
            .order_by_desc(project::Column::Number)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        let number = last.map(|p| p.number + 1).unwrap_or(1);

        let project_id = Uuid::new_v4();
        let row = project::ActiveModel {
            id: Set(project_id),
            number: Set(number),
            client_id: Set(client.id),
            client_name: Set(client.name.clone()),
            title: Set(input.title.clone()),
            description: Set(input.description),
            status: Set(input.status.to_string()),
            project_type: Set(input.project_type.to_string()),
            budget: Set(input.budget),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            materials_cost: Set(input.materials_cost),
            labor_cost: Set(input.labor_cost),
            profit_margin: Set(input.profit_margin),
            created_at: Set(Utc::now()),
            updated_at: Set(Some(Utc::now())),
        };

        let item_rows: Vec<project_item::ActiveModel> = input
            .items
            .iter()
            .map(|item| project_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                project_id: Set(project_id),
                product_id: Set(item.product_id),
                product_name: Set(product_names
                    .get(&item.product_id)
                    .cloned()
                    .unwrap_or_default()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                total_price: Set(item.quantity * item.unit_price),
            })
            .collect();

        let txn = db.begin().await.map_err(ServiceError::db_error)?;
        let created = row.insert(&txn).await.map_err(|e| {
            error!("Failed to create project: {}", e);
            ServiceError::db_error(e)
        })?;
        if !item_rows.is_empty() {
            ProjectItemEntity::insert_many(item_rows)
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }
        txn.commit().await.map_err(ServiceError::db_error)?;

        // An approved sale is invoiced half up front.
        if input.project_type == ProjectType::Sale && input.status != ProjectStatus::Quote {
            self.transactions
                .record(RecordTransactionInput {
                    project_id: Some(project_id),
                    project_title: Some(input.title.clone()),
                    transaction_type: TransactionType::Income,
                    category: "Down Payment".to_string(),
                    description: format!("Down payment for project #{} - {}", number, input.title),
                    amount: input.budget * DOWN_PAYMENT_FRACTION,
                    date: None,
                })
                .await?;
        }

        self.consume_stock_for_items(project_id, &input.items).await?;

        ClientEntity::update_many()
            .col_expr(
                client::Column::TotalProjects,
                Expr::col(client::Column::TotalProjects).add(1),
            )
            .col_expr(
                client::Column::TotalValue,
                Expr::col(client::Column::TotalValue).add(input.budget),
            )
            .filter(client::Column::Id.eq(client.id))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProjectCreated(project_id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(project_id = %project_id, number = number, "Project created");

        Ok(created)
    }

    /// Consumes stock for every line item, cascading through composition.
    /// Availability is pre-checked for visibility only; the ledger clamps
    /// over-consumption at zero rather than rejecting it.
    async fn consume_stock_for_items(
        &self,
        project_id: Uuid,
        items: &[ProjectItemInput],
    ) -> Result<(), ServiceError> {
        if items.is_empty() {
            return Ok(());
        }

        let graph = self.bom.load_graph().await?;
        for item in items {
            let verdict = graph.check_availability(item.product_id, item.quantity);
            if !verdict.available {
                warn!(
                    project_id = %project_id,
                    product_id = %verdict.product_id,
                    current_stock = %verdict.current_stock,
                    required = %verdict.required,
                    "Insufficient stock for project consumption; proceeding with clamped exit"
                );
            }
        }

        for item in items {
            self.stock
                .record_movement(RecordMovementInput {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    movement_type: MovementType::Exit,
                    project_id: Some(project_id),
                    cascade: true,
                    date: None,
                })
                .await?;
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_project(&self, id: Uuid) -> Result<Option<project::Model>, ServiceError> {
        let db = &*self.db;

        ProjectEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Line items of a project.
    pub async fn get_project_items(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<project_item::Model>, ServiceError> {
        let db = &*self.db;

        ProjectItemEntity::find()
            .filter(project_item::Column::ProjectId.eq(project_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_projects(
        &self,
        filter: ProjectFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<project::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = ProjectEntity::find();

        if let Some(client_id) = filter.client_id {
            query = query.filter(project::Column::ClientId.eq(client_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(project::Column::Status.eq(status.to_string()));
        }
        if let Some(search) = filter.search {
            let pattern = format!("%{}%", search);
            query = query.filter(
                project::Column::Title
                    .like(&pattern)
                    .or(project::Column::ClientName.like(&pattern)),
            );
        }

        let paginator = query
            .order_by_desc(project::Column::Number)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let projects = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((projects, total))
    }

    /// Applies a partial update. Completing a project records the final
    /// payment for the remaining half of the budget.
    #[instrument(skip(self, input))]
    pub async fn update_project(
        &self,
        id: Uuid,
        input: UpdateProjectInput,
    ) -> Result<project::Model, ServiceError> {
        let db = &*self.db;

        let existing = ProjectEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Project {} not found", id)))?;

        let old_status = ProjectStatus::from_column(&existing.status);
        let number = existing.number;
        let title = existing.title.clone();
        let budget = existing.budget;

        let mut row: project::ActiveModel = existing.into();

        if let Some(new_title) = input.title {
            row.title = Set(new_title);
        }
        if let Some(description) = input.description {
            row.description = Set(Some(description));
        }
        if let Some(status) = input.status {
            row.status = Set(status.to_string());
        }
        if let Some(new_budget) = input.budget {
            if new_budget < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Project budget must not be negative".to_string(),
                ));
            }
            row.budget = Set(new_budget);
        }
        if let Some(start_date) = input.start_date {
            row.start_date = Set(Some(start_date));
        }
        if let Some(end_date) = input.end_date {
            row.end_date = Set(Some(end_date));
        }
        if let Some(materials_cost) = input.materials_cost {
            row.materials_cost = Set(Some(materials_cost));
        }
        if let Some(labor_cost) = input.labor_cost {
            row.labor_cost = Set(Some(labor_cost));
        }
        if let Some(profit_margin) = input.profit_margin {
            row.profit_margin = Set(Some(profit_margin));
        }
        row.updated_at = Set(Some(Utc::now()));

        let updated = row.update(db).await.map_err(|e| {
            error!(project_id = %id, error = %e, "Database error when updating project");
            ServiceError::db_error(e)
        })?;

        if let Some(new_status) = input.status {
            if new_status != old_status {
                self.event_sender
                    .send(Event::ProjectStatusChanged {
                        project_id: id,
                        old_status: old_status.to_string(),
                        new_status: new_status.to_string(),
                    })
                    .await
                    .map_err(ServiceError::EventError)?;

                if new_status == ProjectStatus::Completed {
                    self.transactions
                        .record(RecordTransactionInput {
                            project_id: Some(id),
                            project_title: Some(title.clone()),
                            transaction_type: TransactionType::Income,
                            category: "Final Payment".to_string(),
                            description: format!("Final payment for project #{}", number),
                            amount: budget * (Decimal::ONE - DOWN_PAYMENT_FRACTION),
                            date: None,
                        })
                        .await?;
                }
            }
        }

        info!(project_id = %updated.id, "Project updated");

        Ok(updated)
    }

    /// Deletes a project together with its items, finance transactions and
    /// stock movements (the one sanctioned bulk removal of ledger rows).
    /// Stock levels are left as they are; the consumption already
    /// happened.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        ProjectEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Project {} not found", id)))?;

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        TransactionEntity::delete_many()
            .filter(transaction::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        StockMovementEntity::delete_many()
            .filter(stock_movement::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        ProjectItemEntity::delete_many()
            .filter(project_item::Column::ProjectId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        ProjectEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProjectDeleted(id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(project_id = %id, "Project deleted");

        Ok(())
    }

    async fn resolve_product_names(
        &self,
        items: &[ProjectItemInput],
    ) -> Result<std::collections::HashMap<Uuid, String>, ServiceError> {
        let db = &*self.db;

        if items.is_empty() {
            return Ok(Default::default());
        }

        let ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
        let products = ProductEntity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let names: std::collections::HashMap<Uuid, String> =
            products.into_iter().map(|p| (p.id, p.name)).collect();

        for item in items {
            if !names.contains_key(&item.product_id) {
                return Err(ServiceError::NotFound(format!(
                    "Product {} not found",
                    item.product_id
                )));
            }
        }

        Ok(names)
    }
}
