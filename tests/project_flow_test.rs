//! Project orchestration tests over a mocked store
//!
//! Covers:
//! - Quote registration deriving no finance transaction
//! - Approved sales deriving the down payment and consuming stock
//! - Completion deriving the final payment exactly once
//! - Project deletion removing items, transactions and ledger rows in bulk
//!
//! The mocks double as sequencing assertions: every query result is queued
//! in the exact order the orchestration is expected to issue it, so a
//! skipped or extra statement fails the test with a decode or exhaustion
//! error instead of passing silently.

use std::sync::Arc;

use atelier_api::{
    entities::{client, product, product_component, project, transaction},
    events::EventSender,
    models::{PersonType, ProductType, ProjectStatus, ProjectType, TransactionType},
    services::{
        projects::{CreateProjectInput, ProjectItemInput, UpdateProjectInput},
        AppServices,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use tokio::sync::mpsc;
use uuid::Uuid;

fn test_client(id: Uuid) -> client::Model {
    client::Model {
        id,
        name: "Ana Moreira".to_string(),
        person_type: PersonType::Individual.to_string(),
        document: None,
        email: "ana@example.com".to_string(),
        phone: None,
        mobile: None,
        company_name: None,
        state_registration: None,
        street: None,
        number: None,
        complement: None,
        neighborhood: None,
        city: None,
        state: None,
        zip_code: None,
        country: None,
        active: true,
        total_projects: 0,
        total_value: Decimal::ZERO,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn test_product(id: Uuid, name: &str, cost_price: Decimal, current_stock: Decimal) -> product::Model {
    product::Model {
        id,
        name: name.to_string(),
        description: None,
        category: None,
        product_type: ProductType::RawMaterial.to_string(),
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

fn test_project(
    id: Uuid,
    number: i64,
    client_id: Uuid,
    status: ProjectStatus,
    project_type: ProjectType,
    budget: Decimal,
) -> project::Model {
    project::Model {
        id,
        number,
        client_id,
        client_name: "Ana Moreira".to_string(),
        title: "Walnut wardrobe".to_string(),
        description: None,
        status: status.to_string(),
        project_type: project_type.to_string(),
        budget,
        start_date: None,
        end_date: None,
        materials_cost: None,
        labor_cost: None,
        profit_margin: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn test_transaction(project_id: Uuid, category: &str, amount: Decimal) -> transaction::Model {
    transaction::Model {
        id: Uuid::new_v4(),
        project_id: Some(project_id),
        project_title: Some("Walnut wardrobe".to_string()),
        transaction_type: TransactionType::Income.to_string(),
        category: category.to_string(),
        description: format!("{} for project", category),
        amount,
        date: Utc::now().date_naive(),
        created_at: Utc::now(),
    }
}

fn services(db: sea_orm::DatabaseConnection) -> AppServices {
    let (tx, rx) = mpsc::channel(64);
    // Keep the receiver alive for the lifetime of the test process so
    // event sends never fail.
    std::mem::forget(rx);
    AppServices::new(Arc::new(db), EventSender::new(tx))
}

fn exec_ok(n: usize) -> impl Iterator<Item = MockExecResult> {
    (0..n).map(|_| MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    })
}

fn one_item(product_id: Uuid) -> Vec<ProjectItemInput> {
    vec![ProjectItemInput {
        product_id,
        quantity: dec!(2),
        unit_price: dec!(350),
    }]
}

fn create_input(
    client_id: Uuid,
    status: ProjectStatus,
    project_type: ProjectType,
    items: Vec<ProjectItemInput>,
) -> CreateProjectInput {
    CreateProjectInput {
        client_id,
        title: "Walnut wardrobe".to_string(),
        description: None,
        status,
        project_type,
        items,
        budget: dec!(12000),
        start_date: None,
        end_date: None,
        materials_cost: None,
        labor_cost: None,
        profit_margin: None,
    }
}

#[tokio::test]
async fn registering_a_quote_derives_no_down_payment() {
    let client_id = Uuid::new_v4();
    let board = Uuid::new_v4();
    let project_id = Uuid::new_v4();
    let board_row = test_product(board, "Oak board", dec!(40), dec!(50));

    // No transaction insert is mocked: had a down payment been derived,
    // its insert would consume the graph-snapshot result queued after the
    // project insert and fail to decode.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_client(client_id)]])
        .append_query_results([vec![board_row.clone()]])
        .append_query_results([Vec::<project::Model>::new()])
        .append_query_results([vec![test_project(
            project_id,
            1,
            client_id,
            ProjectStatus::Quote,
            ProjectType::Quote,
            dec!(12000),
        )]])
        // composition snapshot for the consumption pre-check
        .append_query_results([vec![board_row.clone()]])
        .append_query_results([Vec::<product_component::Model>::new()])
        // ledger exit for the single line item
        .append_query_results([vec![board_row]])
        .append_query_results([Vec::<product_component::Model>::new()])
        // item insert, stock update, movement insert, client counters
        .append_exec_results(exec_ok(4))
        .into_connection();

    let created = services(db)
        .projects
        .create_project(create_input(
            client_id,
            ProjectStatus::Quote,
            ProjectType::Quote,
            one_item(board),
        ))
        .await
        .unwrap();

    assert_eq!(created.status, ProjectStatus::Quote.to_string());
}

#[tokio::test]
async fn approved_sale_derives_the_down_payment_and_consumes_stock() {
    let client_id = Uuid::new_v4();
    let board = Uuid::new_v4();
    let project_id = Uuid::new_v4();
    let board_row = test_product(board, "Oak board", dec!(40), dec!(50));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_client(client_id)]])
        .append_query_results([vec![board_row.clone()]])
        .append_query_results([Vec::<project::Model>::new()])
        .append_query_results([vec![test_project(
            project_id,
            1,
            client_id,
            ProjectStatus::Approved,
            ProjectType::Sale,
            dec!(12000),
        )]])
        // the down payment: half of the 12000 budget
        .append_query_results([vec![test_transaction(project_id, "Down Payment", dec!(6000))]])
        // composition snapshot for the consumption pre-check
        .append_query_results([vec![board_row.clone()]])
        .append_query_results([Vec::<product_component::Model>::new()])
        // ledger exit for the single line item
        .append_query_results([vec![board_row]])
        .append_query_results([Vec::<product_component::Model>::new()])
        .append_exec_results(exec_ok(4))
        .into_connection();

    let created = services(db)
        .projects
        .create_project(create_input(
            client_id,
            ProjectStatus::Approved,
            ProjectType::Sale,
            one_item(board),
        ))
        .await
        .unwrap();

    assert_eq!(created.project_type, ProjectType::Sale.to_string());
}

#[tokio::test]
async fn completing_a_project_records_the_final_payment() {
    let client_id = Uuid::new_v4();
    let project_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_project(
            project_id,
            7,
            client_id,
            ProjectStatus::Approved,
            ProjectType::Sale,
            dec!(12000),
        )]])
        .append_query_results([vec![test_project(
            project_id,
            7,
            client_id,
            ProjectStatus::Completed,
            ProjectType::Sale,
            dec!(12000),
        )]])
        // the remaining half of the budget falls due on completion
        .append_query_results([vec![test_transaction(
            project_id,
            "Final Payment",
            dec!(6000),
        )]])
        .into_connection();

    let updated = services(db)
        .projects
        .update_project(
            project_id,
            UpdateProjectInput {
                status: Some(ProjectStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ProjectStatus::Completed.to_string());
}

#[tokio::test]
async fn repeating_the_completed_status_records_no_second_payment() {
    let client_id = Uuid::new_v4();
    let project_id = Uuid::new_v4();

    // Only the fetch and the update are mocked; a second final payment
    // would hit an exhausted query queue and fail the test.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_project(
            project_id,
            7,
            client_id,
            ProjectStatus::Completed,
            ProjectType::Sale,
            dec!(12000),
        )]])
        .append_query_results([vec![test_project(
            project_id,
            7,
            client_id,
            ProjectStatus::Completed,
            ProjectType::Sale,
            dec!(12000),
        )]])
        .into_connection();

    let updated = services(db)
        .projects
        .update_project(
            project_id,
            UpdateProjectInput {
                status: Some(ProjectStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ProjectStatus::Completed.to_string());
}

#[tokio::test]
async fn deleting_a_project_removes_its_dependents_in_bulk() {
    let client_id = Uuid::new_v4();
    let project_id = Uuid::new_v4();

    // Transactions, stock movements, items, then the project itself.
    // Stock movements are immutable individually; this is the one
    // sanctioned bulk removal, and stock levels stay where the
    // consumption left them.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![test_project(
            project_id,
            7,
            client_id,
            ProjectStatus::Delivered,
            ProjectType::Sale,
            dec!(12000),
        )]])
        .append_exec_results(exec_ok(4))
        .into_connection();

    services(db)
        .projects
        .delete_project(project_id)
        .await
        .unwrap();
}

#[test]
fn project_numbers_are_sequential() {
    let last: Option<i64> = Some(41);
    assert_eq!(last.map(|n| n + 1).unwrap_or(1), 42);

    let none: Option<i64> = None;
    assert_eq!(none.map(|n| n + 1).unwrap_or(1), 1);
}

#[test]
fn budget_splits_evenly_between_down_and_final_payment() {
    let budget = dec!(12000);
    let down_payment = budget * dec!(0.5);
    let final_payment = budget - down_payment;

    assert_eq!(down_payment, dec!(6000));
    assert_eq!(final_payment, dec!(6000));
}

#[test]
fn pending_payments_cover_completed_and_delivered_projects() {
    let budgets = [dec!(12000), dec!(8000)];
    let pending: Decimal = budgets.iter().map(|b| *b * dec!(0.5)).sum();

    assert_eq!(pending, dec!(10000));
}
