//! Cache infrastructure - Cache implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::{CacheBackend, CacheFactory};
pub use in_memory::{InMemoryCache, InMemoryCacheConfig};
pub use self::redis::{RedisCache, RedisCacheConfig};
