//! Infrastructure layer - External service implementations

pub mod cache;
pub mod cart;
pub mod item;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
