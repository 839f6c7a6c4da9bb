//! Inventory items, the catalog pre-orders are raised against.

pub mod entity;
pub mod error;

pub use error::*;
