// Core services
pub mod bom;
pub mod stock;

// Catalog and relationship management
pub mod clients;
pub mod products;

// Project and finance orchestration
pub mod projects;
pub mod transactions;

// Reporting
pub mod reports;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub bom: Arc<bom::BomService>,
    pub stock: Arc<stock::StockService>,
    pub products: Arc<products::ProductService>,
    pub clients: Arc<clients::ClientService>,
    pub projects: Arc<projects::ProjectService>,
    pub transactions: Arc<transactions::TransactionService>,
    pub reports: Arc<reports::ReportsService>,
}

impl AppServices {
    /// Wires every service over the shared pool and event channel.
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        let bom = Arc::new(bom::BomService::new(db.clone()));
        let stock = Arc::new(stock::StockService::new(db.clone(), event_sender.clone()));
        let transactions = Arc::new(transactions::TransactionService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let products = Arc::new(products::ProductService::new(
            db.clone(),
            bom.clone(),
            event_sender.clone(),
        ));
        let clients = Arc::new(clients::ClientService::new(db.clone(), event_sender.clone()));
        let projects = Arc::new(projects::ProjectService::new(
            db.clone(),
            bom.clone(),
            stock.clone(),
            transactions.clone(),
            event_sender.clone(),
        ));
        let reports = Arc::new(reports::ReportsService::new(db, transactions.clone()));

        Self {
            bom,
            stock,
            products,
            clients,
            projects,
            transactions,
            reports,
        }
    }
}
