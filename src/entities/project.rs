use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Project entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Sequential human-facing project number
    pub number: i64,

    pub client_id: Uuid,

    /// Client name at the time of registration
    pub client_name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Project title must be between 1 and 255 characters"
    ))]
    pub title: String,

    pub description: Option<String>,

    /// One of `quote`, `approved`, `in_production`, `completed`, `delivered`
    pub status: String,

    /// One of `quote`, `sale`
    pub project_type: String,

    pub budget: Decimal,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    pub materials_cost: Option<Decimal>,

    pub labor_cost: Option<Decimal>,

    /// Percentage applied on top of costs
    pub profit_margin: Option<Decimal>,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(has_many = "super::project_item::Entity")]
    Items,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovements,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::project_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
