//! Domain enumerations shared across entities, services and handlers.
//!
//! Entities store these as plain strings (one value per row); the enums are
//! the typed view used by business logic. `strum` provides the canonical
//! snake_case wire form in both directions.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Position of a product in the composition graph.
///
/// Raw materials are leaves: their cost price is authoritative and they can
/// never have components. Sub parts and finished products may be composed
/// of other products.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    RawMaterial,
    SubPart,
    FinishedProduct,
}

impl ProductType {
    pub fn is_raw_material(self) -> bool {
        matches!(self, ProductType::RawMaterial)
    }

    /// Parses the stored column value, defaulting unknown values to the
    /// leaf kind so stale rows never trigger phantom recursion.
    pub fn from_column(value: &str) -> Self {
        value.parse().unwrap_or(ProductType::RawMaterial)
    }
}

/// Direction of a stock movement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Entry,
    Exit,
}

/// What caused a stock movement to be recorded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Manual,
    Project,
}

/// Lifecycle of a project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Quote,
    Approved,
    InProduction,
    Completed,
    Delivered,
}

impl ProjectStatus {
    pub fn from_column(value: &str) -> Self {
        value.parse().unwrap_or(ProjectStatus::Quote)
    }
}

/// Commercial nature of a project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Quote,
    Sale,
}

/// Legal nature of a client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Individual,
    Company,
}

/// Direction of a finance transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_type_round_trips_through_column_form() {
        for t in [
            ProductType::RawMaterial,
            ProductType::SubPart,
            ProductType::FinishedProduct,
        ] {
            assert_eq!(ProductType::from_column(t.as_ref()), t);
        }
        assert_eq!(ProductType::from_column("garbage"), ProductType::RawMaterial);
    }

    #[test]
    fn movement_type_serializes_snake_case() {
        assert_eq!(MovementType::Entry.to_string(), "entry");
        assert_eq!(MovementType::Exit.to_string(), "exit");
        assert_eq!(ReferenceType::Project.to_string(), "project");
    }
}
