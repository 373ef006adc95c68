//! Item domain - Catalog items and the capabilities that read them

mod entity;
mod repository;

pub use entity::{Item, ItemId};
pub use repository::in_memory::InMemoryItemRepository;
pub use repository::{ItemCache, ItemRepository, ItemResolver};

#[cfg(test)]
pub use repository::{MockItemCache, MockItemRepository, MockItemResolver};
