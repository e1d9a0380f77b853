//! Platform adapters.
//!
//! Pure translations from the canonical [`Product`](crate::Product) into
//! platform catalog payloads. Both adapters share the [`OptionTable`]
//! grouping pass.

pub mod grouping;
pub mod square;
pub mod woocommerce;

pub use grouping::{OptionGroup, OptionRef, OptionTable};
pub use square::{to_square, SquareAdapter, SquareUpsert};
pub use woocommerce::{to_woocommerce, WooCommercePayload};
