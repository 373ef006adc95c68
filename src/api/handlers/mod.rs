//! Request handlers

pub mod carts;
pub mod items;
