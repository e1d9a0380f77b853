//! Aggregates module
pub mod attribute;
pub mod catalog;
pub mod product;

pub use attribute::Attribute;
pub use catalog::{Catalog, InventoryQuery, InventorySummary, SortDirection, SortField};
pub use product::{Platform, Product, ProductVariation, StockStatus, VariationAttribute, VariationEntry};
