//! Stock ledger tests over a mocked store
//!
//! Covers:
//! - Cascading exits through the composition, scaled multiplicatively
//! - The zero floor on over-consumption
//! - Entries never cascading
//! - Unknown products being skipped as a benign no-op

use std::sync::Arc;

use atelier_api::{
    entities::{product, product_component},
    errors::ServiceError,
    events::EventSender,
    models::{MovementType, ProductType},
    services::stock::{RecordMovementInput, StockService},
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use tokio::sync::mpsc;
use uuid::Uuid;

fn test_product(
    id: Uuid,
    name: &str,
    product_type: ProductType,
    cost_price: Decimal,
    current_stock: Decimal,
    min_stock: Decimal,
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
        min_stock,
        supplier: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn test_edge(
    product_id: Uuid,
    component_id: Uuid,
    quantity: Decimal,
    position: i32,
) -> product_component::Model {
    product_component::Model {
        id: Uuid::new_v4(),
        product_id,
        component_id,
        quantity,
        unit: "UN".to_string(),
        unit_cost: Decimal::ZERO,
        total_cost: Decimal::ZERO,
        position,
        created_at: Utc::now(),
    }
}

fn movement(
    product_id: Uuid,
    quantity: Decimal,
    movement_type: MovementType,
    cascade: bool,
) -> RecordMovementInput {
    RecordMovementInput {
        product_id,
        quantity,
        movement_type,
        project_id: None,
        cascade,
        date: None,
    }
}

fn service(db: sea_orm::DatabaseConnection) -> StockService {
    let (tx, rx) = mpsc::channel(32);
    // Keep the receiver alive for the lifetime of the test process so
    // event sends never fail.
    std::mem::forget(rx);
    StockService::new(Arc::new(db), EventSender::new(tx))
}

fn exec_ok(n: usize) -> impl Iterator<Item = MockExecResult> {
    (0..n).map(|_| MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    })
}

#[tokio::test]
async fn cascading_exit_debits_every_component() {
    let door = Uuid::new_v4();
    let mdf = Uuid::new_v4();
    let hinge = Uuid::new_v4();

    let door_row = test_product(
        door,
        "Cabinet Door",
        ProductType::FinishedProduct,
        dec!(67.75),
        dec!(10),
        dec!(0),
    );
    let mdf_row = test_product(
        mdf,
        "MDF 15mm",
        ProductType::RawMaterial,
        dec!(85.50),
        dec!(50),
        dec!(10),
    );
    let hinge_row = test_product(
        hinge,
        "Hinge 35mm",
        ProductType::RawMaterial,
        dec!(12.50),
        dec!(200),
        dec!(50),
    );

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // door: fetch, then its component edges
        .append_query_results([vec![door_row]])
        .append_query_results([vec![
            test_edge(door, mdf, dec!(0.5), 0),
            test_edge(door, hinge, dec!(2), 1),
        ]])
        // mdf: fetch, no components
        .append_query_results([vec![mdf_row]])
        .append_query_results([Vec::<product_component::Model>::new()])
        // hinge: fetch, no components
        .append_query_results([vec![hinge_row]])
        .append_query_results([Vec::<product_component::Model>::new()])
        // three stock updates and three ledger inserts
        .append_exec_results(exec_ok(6))
        .into_connection();

    let applied = service(db)
        .record_movement(movement(door, dec!(10), MovementType::Exit, true))
        .await
        .unwrap();

    assert_eq!(applied.len(), 3);

    // Parent first, then components in stored order.
    assert_eq!(applied[0].product_id, door);
    assert_eq!(applied[0].quantity, dec!(10));
    assert_eq!(applied[0].previous_stock, dec!(10));
    assert_eq!(applied[0].new_stock, dec!(0));

    // 0.5 per door * 10 doors
    assert_eq!(applied[1].product_id, mdf);
    assert_eq!(applied[1].quantity, dec!(5));
    assert_eq!(applied[1].new_stock, dec!(45));

    // 2 per door * 10 doors
    assert_eq!(applied[2].product_id, hinge);
    assert_eq!(applied[2].quantity, dec!(20));
    assert_eq!(applied[2].new_stock, dec!(180));
}

#[tokio::test]
async fn exit_clamps_stock_at_zero() {
    let mdf = Uuid::new_v4();
    let mdf_row = test_product(
        mdf,
        "MDF 15mm",
        ProductType::RawMaterial,
        dec!(85.50),
        dec!(50),
        dec!(10),
    );

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![mdf_row]])
        .append_exec_results(exec_ok(2))
        .into_connection();

    // The clamp is deliberate: over-consumption floors the stored stock
    // at zero rather than rejecting the movement.
    let applied = service(db)
        .record_movement(movement(mdf, dec!(1000), MovementType::Exit, false))
        .await
        .unwrap();

    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].previous_stock, dec!(50));
    assert_eq!(applied[0].new_stock, dec!(0));
}

#[tokio::test]
async fn entry_increments_stock_and_never_cascades() {
    let door = Uuid::new_v4();
    let door_row = test_product(
        door,
        "Cabinet Door",
        ProductType::FinishedProduct,
        dec!(67.75),
        dec!(10),
        dec!(0),
    );

    // Even with cascade requested, an entry touches only the named
    // product: no component query is mocked and none is issued.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![door_row]])
        .append_exec_results(exec_ok(2))
        .into_connection();

    let applied = service(db)
        .record_movement(movement(door, dec!(25), MovementType::Entry, true))
        .await
        .unwrap();

    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].previous_stock, dec!(10));
    assert_eq!(applied[0].new_stock, dec!(35));
}

#[tokio::test]
async fn movement_for_unknown_product_is_a_noop() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<product::Model>::new()])
        .into_connection();

    let applied = service(db)
        .record_movement(movement(
            Uuid::new_v4(),
            dec!(5),
            MovementType::Exit,
            true,
        ))
        .await
        .unwrap();

    assert!(applied.is_empty());
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let err = service(db)
        .record_movement(movement(
            Uuid::new_v4(),
            Decimal::ZERO,
            MovementType::Entry,
            false,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidInput(_)));
}
