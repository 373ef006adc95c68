//! Cart domain - Carts, cart lines and resolved cart entries

mod entity;
mod repository;

pub use entity::{Cart, CartId, CartLine, CartLineId, CartStatus, ResolvedCartEntry, UserId};
pub use repository::in_memory::InMemoryCartRepository;
pub use repository::{CartLineRepository, CartRepository};

#[cfg(test)]
pub use repository::{MockCartLineRepository, MockCartRepository};
