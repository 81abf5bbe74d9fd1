use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    entities::transaction::{self, Entity as TransactionEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::TransactionType,
};

/// Fields for a new finance ledger entry.
#[derive(Debug, Clone)]
pub struct RecordTransactionInput {
    pub project_id: Option<Uuid>,
    pub project_title: Option<String>,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
}

/// Filters for the transaction listing.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub project_id: Option<Uuid>,
    pub category: Option<String>,
}

/// Finance ledger service.
#[derive(Clone)]
pub struct TransactionService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl TransactionService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(category = %input.category))]
    pub async fn record(
        &self,
        input: RecordTransactionInput,
    ) -> Result<transaction::Model, ServiceError> {
        let db = &*self.db;

        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Transaction amount must be positive".to_string(),
            ));
        }

        let row = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(input.project_id),
            project_title: Set(input.project_title),
            transaction_type: Set(input.transaction_type.to_string()),
            category: Set(input.category),
            description: Set(input.description),
            amount: Set(input.amount),
            date: Set(input.date.unwrap_or_else(|| Utc::now().date_naive())),
            created_at: Set(Utc::now()),
        };

        let created = row.insert(db).await.map_err(|e| {
            error!("Failed to record transaction: {}", e);
            ServiceError::db_error(e)
        })?;

        self.event_sender
            .send(Event::TransactionRecorded(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(
            transaction_id = %created.id,
            amount = %created.amount,
            "Transaction recorded"
        );

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: TransactionFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<transaction::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = TransactionEntity::find();

        if let Some(transaction_type) = filter.transaction_type {
            query = query
                .filter(transaction::Column::TransactionType.eq(transaction_type.to_string()));
        }
        if let Some(project_id) = filter.project_id {
            query = query.filter(transaction::Column::ProjectId.eq(project_id));
        }
        if let Some(category) = filter.category {
            query = query.filter(transaction::Column::Category.eq(category));
        }

        let paginator = query
            .order_by_desc(transaction::Column::Date)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let transactions = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((transactions, total))
    }

    /// Total income recorded in the given month.
    #[instrument(skip(self))]
    pub async fn monthly_income(&self, year: i32, month: u32) -> Result<Decimal, ServiceError> {
        let db = &*self.db;

        let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ServiceError::InvalidInput(format!("Invalid month: {}-{}", year, month))
        })?;
        let to = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| ServiceError::InvalidInput(format!("Invalid month: {}-{}", year, month)))?;

        let incomes = TransactionEntity::find()
            .filter(transaction::Column::TransactionType.eq(TransactionType::Income.to_string()))
            .filter(transaction::Column::Date.gte(from))
            .filter(transaction::Column::Date.lt(to))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(incomes.iter().map(|t| t.amount).sum())
    }

    /// Total income for the current month.
    pub async fn current_month_income(&self) -> Result<Decimal, ServiceError> {
        let today = Utc::now().date_naive();
        self.monthly_income(today.year(), today.month()).await
    }
}
