use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable stock ledger entry.
///
/// Movements are append-only: corrections are recorded as new offsetting
/// movements, never by editing history. Rows are removed only in bulk when
/// their owning project is deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    /// Product name at the time of the movement
    pub product_name: String,

    /// One of `entry`, `exit`
    pub movement_type: String,

    pub quantity: Decimal,

    /// Product's cost price at the time of the movement
    pub unit_price: Option<Decimal>,

    /// quantity * unit_price
    pub total_value: Option<Decimal>,

    pub project_id: Option<Uuid>,

    /// One of `manual`, `project`
    pub reference_type: String,

    pub date: NaiveDate,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
