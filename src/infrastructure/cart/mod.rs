//! Cart infrastructure - PostgreSQL cart stores

mod postgres_repository;

pub use postgres_repository::{PostgresCartLineRepository, PostgresCartRepository};
