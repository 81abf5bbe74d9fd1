pub mod client;
pub mod product;
pub mod product_component;
pub mod project;
pub mod project_item;
pub mod stock_movement;
pub mod transaction;
