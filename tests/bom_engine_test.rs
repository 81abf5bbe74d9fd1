//! Service-level tests for the composition engine
//!
//! Covers:
//! - Recursive cost computation over a mocked catalog
//! - Availability checks through the composition tree
//! - Circular reference rejection before any mutation
//! - The referential guard on product deletion

use std::sync::Arc;

use atelier_api::{
    entities::{product, product_component},
    errors::ServiceError,
    events::EventSender,
    models::ProductType,
    services::{
        bom::{BomService, ComponentInput},
        products::ProductService,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase};
use tokio::sync::mpsc;
use uuid::Uuid;

fn test_product(
    id: Uuid,
    name: &str,
    product_type: ProductType,
    cost_price: Decimal,
    current_stock: Decimal,
) -> product::Model {
    product::Model {
        id,
        name: name.to_string(),
        description: None,
        category: None,
        product_type: product_type.to_string(),
        unit: "UN".to_string(),
        cost_price,
        sale_price: None,
        current_stock,
        min_stock: dec!(5),
        supplier: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn test_edge(
    product_id: Uuid,
    component_id: Uuid,
    quantity: Decimal,
    unit_cost: Decimal,
    position: i32,
) -> product_component::Model {
    product_component::Model {
        id: Uuid::new_v4(),
        product_id,
        component_id,
        quantity,
        unit: "UN".to_string(),
        unit_cost,
        total_cost: quantity * unit_cost,
        position,
        created_at: Utc::now(),
    }
}

/// The worked catalog: Door = 0.5x MDF (85.50) + 2x Hinge (12.50).
struct DoorCatalog {
    door: Uuid,
    mdf: Uuid,
    hinge: Uuid,
    products: Vec<product::Model>,
    edges: Vec<product_component::Model>,
}

fn door_catalog() -> DoorCatalog {
    let door = Uuid::new_v4();
    let mdf = Uuid::new_v4();
    let hinge = Uuid::new_v4();

    let products = vec![
        test_product(mdf, "MDF 15mm", ProductType::RawMaterial, dec!(85.50), dec!(50)),
        test_product(
            hinge,
            "Hinge 35mm",
            ProductType::RawMaterial,
            dec!(12.50),
            dec!(200),
        ),
        test_product(
            door,
            "Cabinet Door 40x60",
            ProductType::FinishedProduct,
            dec!(67.75),
            dec!(10),
        ),
    ];
    let edges = vec![
        test_edge(door, mdf, dec!(0.5), dec!(85.50), 0),
        test_edge(door, hinge, dec!(2), dec!(12.50), 1),
    ];

    DoorCatalog {
        door,
        mdf,
        hinge,
        products,
        edges,
    }
}

#[tokio::test]
async fn compute_cost_rolls_up_component_costs() {
    let catalog = door_catalog();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([catalog.products.clone()])
        .append_query_results([catalog.edges.clone()])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    let cost = service.compute_cost(catalog.door).await.unwrap();

    // 0.5 * 85.50 + 2 * 12.50
    assert_eq!(cost, dec!(67.75));
}

#[tokio::test]
async fn compute_cost_of_raw_material_is_authoritative() {
    let catalog = door_catalog();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([catalog.products.clone()])
        .append_query_results([catalog.edges.clone()])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    let cost = service.compute_cost(catalog.mdf).await.unwrap();

    assert_eq!(cost, dec!(85.50));
}

#[tokio::test]
async fn compute_cost_of_missing_product_is_zero() {
    let catalog = door_catalog();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([catalog.products.clone()])
        .append_query_results([catalog.edges.clone()])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    let cost = service.compute_cost(Uuid::new_v4()).await.unwrap();

    assert_eq!(cost, Decimal::ZERO);
}

#[tokio::test]
async fn availability_reports_first_deficient_component() {
    let catalog = door_catalog();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([catalog.products.clone()])
        .append_query_results([catalog.edges.clone()])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    // 1000 doors need 500 MDF but only 50 are on hand; the hinge line
    // must not be aggregated into the verdict.
    let verdict = service
        .check_availability(catalog.door, dec!(1000))
        .await
        .unwrap();

    assert!(!verdict.available);
    assert_eq!(verdict.product_id, catalog.mdf);
    assert_eq!(verdict.current_stock, dec!(50));
    assert_eq!(verdict.required, dec!(500));
}

#[tokio::test]
async fn availability_satisfied_reports_own_stock() {
    let catalog = door_catalog();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([catalog.products.clone()])
        .append_query_results([catalog.edges.clone()])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    let verdict = service
        .check_availability(catalog.door, dec!(100))
        .await
        .unwrap();

    assert!(verdict.available);
    assert_eq!(verdict.product_id, catalog.door);
    assert_eq!(verdict.current_stock, dec!(10));
}

#[tokio::test]
async fn add_component_rejects_cycle_before_any_write() {
    let catalog = door_catalog();

    // Only the two graph-snapshot queries are mocked: if the service
    // attempted any insert the mock would error with a database failure
    // instead of the circular reference below.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([catalog.products.clone()])
        .append_query_results([catalog.edges.clone()])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    // Door -> MDF exists, so MDF -> Door must be rejected.
    let err = service
        .add_component(catalog.mdf, catalog.door, dec!(1))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::CircularReference(_)));
}

#[tokio::test]
async fn replace_components_rejects_transitive_cycle() {
    let top = Uuid::new_v4();
    let middle = Uuid::new_v4();

    let products = vec![
        test_product(top, "Frame", ProductType::SubPart, dec!(10), dec!(0)),
        test_product(middle, "Panel", ProductType::SubPart, dec!(4), dec!(0)),
    ];
    // Frame -> Panel already exists.
    let edges = vec![test_edge(top, middle, dec!(1), dec!(4), 0)];

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // owner lookup for Panel
        .append_query_results([vec![products[1].clone()]])
        // graph snapshot
        .append_query_results([products.clone()])
        .append_query_results([edges.clone()])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    // Panel -> Frame would close the loop through Frame -> Panel.
    let err = service
        .replace_components(
            middle,
            &[ComponentInput {
                component_id: top,
                quantity: dec!(2),
            }],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::CircularReference(_)));
}

#[tokio::test]
async fn raw_material_cannot_receive_components() {
    let catalog = door_catalog();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // owner lookup for MDF
        .append_query_results([vec![catalog.products[0].clone()]])
        .into_connection();
    let service = BomService::new(Arc::new(db));

    let err = service
        .replace_components(
            catalog.mdf,
            &[ComponentInput {
                component_id: catalog.hinge,
                quantity: dec!(1),
            }],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn delete_product_refused_while_referenced() {
    let catalog = door_catalog();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // product lookup for MDF
        .append_query_results([vec![catalog.products[0].clone()]])
        // a referencing edge exists (Door -> MDF)
        .append_query_results([vec![catalog.edges[0].clone()]])
        .into_connection();

    let (tx, _rx) = mpsc::channel(8);
    let event_sender = EventSender::new(tx);
    let db = Arc::new(db);
    let bom = Arc::new(BomService::new(db.clone()));
    let service = ProductService::new(db, bom, event_sender);

    let err = service.delete_product(catalog.mdf).await.unwrap_err();

    assert!(matches!(err, ServiceError::ReferentialIntegrity(_)));
}
