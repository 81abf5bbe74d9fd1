use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One "is composed of" edge of the product graph.
///
/// `unit`, `unit_cost` and `total_cost` are snapshots of the component at
/// association time, not live references; the ordered `position` preserves
/// the sequence in which components were declared.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_components")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    pub component_id: Uuid,

    pub quantity: Decimal,

    pub unit: String,

    /// Component's cost price at association time
    pub unit_cost: Decimal,

    /// quantity * unit_cost
    pub total_cost: Decimal,

    pub position: i32,

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
        belongs_to = "super::product::Entity",
        from = "Column::ComponentId",
        to = "super::product::Column::Id"
    )]
    Component,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
