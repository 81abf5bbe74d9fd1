use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    entities::{
        client::Entity as ClientEntity,
        product::{self, Entity as ProductEntity},
        project::{self, Entity as ProjectEntity},
        transaction::{self, Entity as TransactionEntity},
    },
    errors::ServiceError,
    models::ProjectStatus,
    services::transactions::TransactionService,
};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_clients: u64,
    pub active_projects: u64,
    pub monthly_revenue: Decimal,
    pub pending_payments: Decimal,
    pub low_stock_items: u64,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub kind: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Aggregated reporting over the other domains.
#[derive(Clone)]
pub struct ReportsService {
    db: Arc<DatabaseConnection>,
    transactions: Arc<TransactionService>,
}

impl ReportsService {
    pub fn new(db: Arc<DatabaseConnection>, transactions: Arc<TransactionService>) -> Self {
        Self { db, transactions }
    }

    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        let db = &*self.db;

        let total_clients = ClientEntity::find()
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let active_projects = ProjectEntity::find()
            .filter(project::Column::Status.is_in([
                ProjectStatus::Approved.to_string(),
                ProjectStatus::InProduction.to_string(),
            ]))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let monthly_revenue = self.transactions.current_month_income().await?;

        // Completed or delivered projects still owe their final half.
        let pending_payments: Decimal = ProjectEntity::find()
            .filter(project::Column::Status.is_in([
                ProjectStatus::Completed.to_string(),
                ProjectStatus::Delivered.to_string(),
            ]))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .iter()
            .map(|p| p.budget * dec!(0.5))
            .sum();

        let low_stock_items = ProductEntity::find()
            .filter(
                Expr::col(product::Column::CurrentStock)
                    .lte(Expr::col(product::Column::MinStock)),
            )
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let recent_activity = self.recent_activity().await?;

        Ok(DashboardStats {
            total_clients,
            active_projects,
            monthly_revenue,
            pending_payments,
            low_stock_items,
            recent_activity,
        })
    }

    async fn recent_activity(&self) -> Result<Vec<ActivityEntry>, ServiceError> {
        let db = &*self.db;

        let projects = ProjectEntity::find()
            .order_by_desc(project::Column::CreatedAt)
            .limit(3)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let transactions = TransactionEntity::find()
            .order_by_desc(transaction::Column::CreatedAt)
            .limit(3)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut entries: Vec<ActivityEntry> = projects
            .into_iter()
            .map(|p| ActivityEntry {
                kind: "project".to_string(),
                message: format!("New project #{}: {}", p.number, p.title),
                at: p.created_at,
            })
            .chain(transactions.into_iter().map(|t| ActivityEntry {
                kind: "transaction".to_string(),
                message: format!("{}: {}", t.category, t.amount),
                at: t.created_at,
            }))
            .collect();

        entries.sort_by(|a, b| b.at.cmp(&a.at));
        entries.truncate(5);

        Ok(entries)
    }
}
