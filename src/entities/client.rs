use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Client entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Client name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// One of `individual`, `company`
    pub person_type: String,

    /// Tax document (CPF for individuals, CNPJ for companies)
    pub document: Option<String>,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    pub phone: Option<String>,

    pub mobile: Option<String>,

    pub company_name: Option<String>,

    pub state_registration: Option<String>,

    pub street: Option<String>,

    pub number: Option<String>,

    pub complement: Option<String>,

    pub neighborhood: Option<String>,

    pub city: Option<String>,

    pub state: Option<String>,

    pub zip_code: Option<String>,

    pub country: Option<String>,

    pub active: bool,

    /// Denormalized counters, refreshed when projects are registered
    pub total_projects: i32,

    pub total_value: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
