//! Sync preparation.
//!
//! Validates a product and runs the adapter for every platform the product
//! is published to. Nothing is sent anywhere; the batch is handed back to the
//! caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use crate::adapters::{to_woocommerce, SquareAdapter, SquareUpsert, WooCommercePayload};
use crate::config::SyncConfig;
use crate::domain::aggregates::{Catalog, Product};
use crate::ids::{IdGenerator, UuidV4Ids};
use crate::{CatalogError, Result};

/// Payloads for one product. A platform the product is not published to is `None`.
#[derive(Clone, Debug, Serialize)]
pub struct SyncBatch {
    pub product_id: String,
    pub prepared_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub woocommerce: Option<WooCommercePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square: Option<SquareUpsert>,
}

pub struct CatalogSync<G = UuidV4Ids> {
    square: SquareAdapter<G>,
    require_complete_attributes: bool,
}

impl CatalogSync<UuidV4Ids> {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config, UuidV4Ids)
    }
}

impl<G: IdGenerator> CatalogSync<G> {
    pub fn new(config: &SyncConfig, ids: G) -> Self {
        Self {
            square: SquareAdapter::new(ids).with_currency(config.currency.clone()),
            require_complete_attributes: config.require_complete_attributes,
        }
    }

    /// Checks required fields and variation shape.
    pub fn check(&self, product: &Product) -> Result<()> {
        product.validate()?;
        if !product.has_variations {
            if !product.variations.is_empty() {
                warn!(product_id = %product.id, "Simple product carries variations, they will be ignored");
            }
            return Ok(());
        }
        if product.variations.is_empty() {
            return Err(CatalogError::EmptyVariations { product_id: product.id.clone() });
        }
        if self.require_complete_attributes {
            if let Some((variation_id, missing)) = product.missing_axes().into_iter().next() {
                return Err(CatalogError::IncompleteAttributes {
                    variation_id: variation_id.to_string(),
                    missing: missing.into_iter().map(String::from).collect(),
                });
            }
        }
        Ok(())
    }

    /// Builds the payloads from a normalized copy, so default variation SKUs and the
    /// recomputed stock level reach both adapters.
    pub fn prepare(&self, product: &Product) -> Result<SyncBatch> {
        let mut product = product.clone();
        product.normalize();
        let product = &product;
        self.check(product)?;
        let woocommerce = product.platforms.targets_woocommerce().then(|| to_woocommerce(product));
        let square = if product.platforms.targets_square() { Some(self.square.to_square(product)?) } else { None };
        info!(
            product_id = %product.id,
            sku = %product.sku,
            woocommerce = woocommerce.is_some(),
            square = square.is_some(),
            "Prepared sync batch"
        );
        Ok(SyncBatch { product_id: product.id.clone(), prepared_at: Utc::now(), woocommerce, square })
    }

    /// Prepares every product. One bad product does not stop the others.
    /// Products with a batch get `last_synced` set to the batch time.
    pub fn prepare_catalog(&self, catalog: &mut Catalog) -> Vec<(String, Result<SyncBatch>)> {
        let results: Vec<(String, Result<SyncBatch>)> = catalog
            .products()
            .iter()
            .map(|p| {
                let result = self.prepare(p);
                if let Err(e) = &result {
                    warn!(product_id = %p.id, "Skipping product: {e}");
                }
                (p.id.clone(), result)
            })
            .collect();
        for (product_id, result) in &results {
            if let Ok(batch) = result {
                catalog.mark_synced(product_id, batch.prepared_at);
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Platform, ProductVariation, VariationAttribute};
    use crate::domain::value_objects::{Quantity, Sku};
    use crate::ids::SequentialIds;
    use rust_decimal_macros::dec;

    fn variation(id: &str, stock: u32, attrs: &[(&str, &str)]) -> ProductVariation {
        ProductVariation {
            id: id.into(), name: id.into(), sku: Sku::default(), price: dec!(25.00), stock_level: Quantity::new(stock),
            attributes: attrs.iter().map(|(n, o)| VariationAttribute::new(*n, *o)).collect(),
        }
    }

    fn tee(platforms: Platform) -> Product {
        let mut p = Product::variable("3", "Organic Cotton T-Shirt", Sku::from("APP-TS-003"), dec!(25.00))
            .with_platforms(platforms);
        p.set_variations(vec![
            variation("3-1", 40, &[("Size", "Small"), ("Color", "White")]),
            variation("3-2", 50, &[("Size", "Medium"), ("Color", "White")]),
            variation("3-3", 30, &[("Size", "Large"), ("Color", "White")]),
        ]);
        p
    }

    fn sync() -> CatalogSync<SequentialIds> {
        CatalogSync::new(&SyncConfig::default(), SequentialIds::new("idem"))
    }

    #[test]
    fn test_stock_recomputed_before_adapters() {
        let product = tee(Platform::Both);
        assert_eq!(product.stock_level.value(), 120);
        let batch = sync().prepare(&product).unwrap();
        let woo = batch.woocommerce.unwrap();
        let stock: u32 = woo.variations.iter().map(|v| v.stock_quantity).sum();
        assert_eq!(stock, product.stock_level.value());
    }

    #[test]
    fn test_platform_selection() {
        let s = sync();
        let both = s.prepare(&tee(Platform::Both)).unwrap();
        assert!(both.woocommerce.is_some() && both.square.is_some());
        let woo_only = s.prepare(&tee(Platform::WooCommerce)).unwrap();
        assert!(woo_only.woocommerce.is_some() && woo_only.square.is_none());
        let square_only = s.prepare(&tee(Platform::Square)).unwrap();
        assert!(square_only.woocommerce.is_none());
        assert_eq!(square_only.square.unwrap().idempotency_key, "idem-2");
    }

    #[test]
    fn test_incomplete_attributes_rejected() {
        let mut product = tee(Platform::Both);
        product.variations[2].attributes.pop();
        let err = sync().prepare(&product).unwrap_err();
        assert!(matches!(err, CatalogError::IncompleteAttributes { ref variation_id, ref missing }
            if variation_id == "3-3" && missing == &vec!["Color".to_string()]));

        let lenient = SyncConfig { require_complete_attributes: false, ..SyncConfig::default() };
        let batch = CatalogSync::new(&lenient, SequentialIds::default()).prepare(&product).unwrap();
        assert!(batch.square.unwrap().references_resolve());
    }

    #[test]
    fn test_empty_variable_product_rejected() {
        let product = Product::variable("7", "Empty", Sku::from("EMP-007"), dec!(10));
        assert!(matches!(sync().prepare(&product), Err(CatalogError::EmptyVariations { .. })));
    }

    #[test]
    fn test_missing_name_rejected() {
        let product = Product::simple("8", "", Sku::from("NON-008"), dec!(10), 1);
        assert!(matches!(sync().prepare(&product), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn test_prepare_catalog_keeps_going() {
        let mut catalog = Catalog::from_products(vec![
            Product::simple("1", "Satchel", Sku::from("LTH-SAT-001"), dec!(129.99), 45),
            Product::simple("2", "", Sku::from("AUD-NC-002"), dec!(249.50), 8),
            tee(Platform::Square),
        ]);
        let results = sync().prepare_catalog(&mut catalog);
        let ok: Vec<bool> = results.iter().map(|(_, r)| r.is_ok()).collect();
        assert_eq!(ok, vec![true, false, true]);

        let prepared_at = results[0].1.as_ref().unwrap().prepared_at;
        assert_eq!(catalog.get("1").unwrap().last_synced, Some(prepared_at));
        assert_eq!(catalog.get("2").unwrap().last_synced, None);
        assert!(catalog.get("3").unwrap().last_synced.is_some());
    }

    #[test]
    fn test_prepare_fills_defaults_for_raw_products() {
        let json = r#"{
            "id": "3", "name": "Organic Cotton T-Shirt", "sku": "APP-TS-003", "price": 25.00, "stockLevel": 999,
            "hasVariations": true,
            "variations": [
                { "id": "3-1", "name": "Small - Blue", "price": 25.00, "stockLevel": 40,
                  "attributes": [{ "name": "Size", "option": "Small" }, { "name": "Color", "option": "Blue" }] },
                { "id": "3-2", "name": "Large - Blue", "price": 25.00, "stockLevel": 30,
                  "attributes": [{ "name": "Size", "option": "Large" }, { "name": "Color", "option": "Blue" }] }
            ]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        let batch = sync().prepare(&product).unwrap();

        let woo = batch.woocommerce.unwrap();
        assert_eq!(woo.variations[0].sku, "APP-TS-003-Small-Blue");
        let stock: u32 = woo.variations.iter().map(|v| v.stock_quantity).sum();
        assert_eq!(stock, 70);

        let square = batch.square.unwrap();
        let skus: Vec<&str> =
            square.object.item_data.variations.iter().map(|v| v.item_variation_data.sku.as_str()).collect();
        assert_eq!(skus, vec!["APP-TS-003-Small-Blue", "APP-TS-003-Large-Blue"]);
    }

    #[test]
    fn test_currency_from_config() {
        let config = SyncConfig { currency: "EUR".into(), ..SyncConfig::default() };
        let product = Product::simple("1", "Satchel", Sku::from("LTH-SAT-001"), dec!(129.99), 45);
        let batch = CatalogSync::new(&config, SequentialIds::default()).prepare(&product).unwrap();
        let money = &batch.square.unwrap().object.item_data.variations[0].item_variation_data.price_money;
        assert_eq!((money.amount, money.currency.as_str()), (12999, "EUR"));
    }
}
