//! API layer - HTTP endpoints and middleware

pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::{create_router, create_router_with_metrics};
pub use state::AppState;
