//! Storage infrastructure - PostgreSQL pooling shared by the repositories

mod postgres;

pub use postgres::{bounded, connect, PostgresConfig};
pub(crate) use postgres::format_ids;
