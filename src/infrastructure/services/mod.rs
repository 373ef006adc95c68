//! Infrastructure services

mod cart_service;
mod catalog_service;

pub use cart_service::CartService;
pub use catalog_service::{CatalogService, StoreItemResolver};
