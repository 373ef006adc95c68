//! Domain layer - Core business logic and entities

pub mod cache;
pub mod cart;
pub mod error;
pub mod item;

pub use cache::{Cache, CacheExt};
pub use cart::{
    Cart, CartId, CartLine, CartLineId, CartLineRepository, CartRepository, CartStatus,
    ResolvedCartEntry, UserId,
};
pub use error::DomainError;
pub use item::{Item, ItemCache, ItemId, ItemRepository, ItemResolver};
