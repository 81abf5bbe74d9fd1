pub mod clients;
pub mod common;
pub mod dashboard;
pub mod products;
pub mod projects;
pub mod stock;
pub mod transactions;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
