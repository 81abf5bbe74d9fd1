use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::ProductType;

/// Catalog product.
///
/// Raw materials are leaves of the composition graph; sub parts and
/// finished products may list other products as components. For composed
/// products `cost_price` is the snapshot sum of their component costs.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    pub category: Option<String>,

    /// One of `raw_material`, `sub_part`, `finished_product`
    pub product_type: String,

    /// Unit of measure (e.g. "UN", "m", "m2")
    pub unit: String,

    pub cost_price: Decimal,

    pub sale_price: Option<Decimal>,

    pub current_stock: Decimal,

    /// Threshold under which the product is flagged as low stock
    pub min_stock: Decimal,

    pub supplier: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn product_type(&self) -> ProductType {
        ProductType::from_column(&self.product_type)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_component::Entity")]
    Components,
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovements,
}

impl Related<super::product_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Components.def()
    }
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
