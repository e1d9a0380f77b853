//! Catalog Sync
//!
//! One canonical product catalog, published to two commerce platforms.
//!
//! ## Features
//! - Canonical product and variation model
//! - WooCommerce payloads (attributes declared at the parent)
//! - Square payloads (item options with synthetic ids, money in cents)
//! - Sync preparation per product platform selection
//! - Inventory summaries

use thiserror::Error;

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ids;
pub mod sync;

pub use adapters::{to_square, to_woocommerce, OptionTable, SquareAdapter, SquareUpsert, WooCommercePayload};
pub use config::SyncConfig;
pub use domain::aggregates::{Attribute, Catalog, Platform, Product, ProductVariation, StockStatus, VariationAttribute};
pub use ids::{IdGenerator, SequentialIds, UuidV4Ids};
pub use sync::{CatalogSync, SyncBatch};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Variation {variation_id} references {name}={option}, which is not in the option table")]
    UnresolvedOption {
        variation_id: String,
        name: String,
        option: String,
    },

    #[error("Variation {variation_id} is missing values for: {}", .missing.join(", "))]
    IncompleteAttributes {
        variation_id: String,
        missing: Vec<String>,
    },

    #[error("Product {product_id} is marked as variable but has no variations")]
    EmptyVariations { product_id: String },

    #[error("Variation not found: {0}")]
    VariationNotFound(String),

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
