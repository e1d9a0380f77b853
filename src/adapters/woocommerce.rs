//! WooCommerce product payloads.
//!
//! WooCommerce declares variation attributes on the parent product and
//! creates each variation separately, referencing attribute values by name.

use std::convert::Infallible;

use serde::Serialize;
use tracing::debug;

use crate::adapters::grouping::OptionTable;
use crate::domain::aggregates::{Product, ProductVariation, VariationAttribute};
use crate::domain::value_objects::{decimal_string, Dimensions};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WooProductType {
    Simple,
    Variable,
}

/// Body for `POST /products`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WooProduct {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WooProductType,
    pub description: String,
    pub sku: String,
    pub weight: String,
    pub dimensions: WooDimensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<WooCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<WooAttribute>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WooDimensions {
    pub length: String,
    pub width: String,
    pub height: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WooCategory {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WooAttribute {
    pub name: String,
    pub visible: bool,
    pub variation: bool,
    pub options: Vec<String>,
}

/// One entry for `POST /products/{id}/variations`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WooVariation {
    pub regular_price: String,
    pub sku: String,
    pub manage_stock: bool,
    pub stock_quantity: u32,
    pub attributes: Vec<VariationAttribute>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WooVariationBatch<'a> {
    pub create: &'a [WooVariation],
}

/// The parent product plus the variations to create after it. Empty for simple products.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WooCommercePayload {
    pub product: WooProduct,
    pub variations: Vec<WooVariation>,
}

impl WooCommercePayload {
    /// Body for `POST /products/{id}/variations/batch`.
    pub fn variations_batch(&self) -> WooVariationBatch<'_> {
        WooVariationBatch { create: &self.variations }
    }
}

impl From<Option<&Dimensions>> for WooDimensions {
    fn from(dimensions: Option<&Dimensions>) -> Self {
        match dimensions {
            Some(d) => Self {
                length: decimal_string(d.length),
                width: decimal_string(d.width),
                height: decimal_string(d.height),
            },
            None => Self::default(),
        }
    }
}

impl From<&ProductVariation> for WooVariation {
    fn from(v: &ProductVariation) -> Self {
        Self {
            regular_price: decimal_string(v.price),
            sku: v.sku.to_string(),
            manage_stock: true,
            stock_quantity: v.stock_level.value(),
            attributes: v.attributes.clone(),
        }
    }
}

/// Never fails: any well-formed product produces a payload.
pub fn to_woocommerce(product: &Product) -> WooCommercePayload {
    let mut payload = WooProduct {
        name: product.name.clone(),
        kind: WooProductType::Simple,
        description: product.description.clone(),
        sku: product.sku.to_string(),
        weight: product.weight.map(decimal_string).unwrap_or_default(),
        dimensions: product.dimensions.as_ref().into(),
        regular_price: None,
        manage_stock: None,
        stock_quantity: None,
        categories: None,
        attributes: None,
    };

    if !product.has_variations {
        payload.regular_price = Some(decimal_string(product.price));
        payload.manage_stock = Some(true);
        payload.stock_quantity = Some(product.stock_level.value());
        payload.categories = Some(vec![WooCategory { name: product.category.clone() }]);
        debug!(product_id = %product.id, "Built WooCommerce simple product");
        return WooCommercePayload { product: payload, variations: vec![] };
    }

    // Attribute pairs are copied verbatim, so the second pass cannot fail.
    let (table, variations) =
        OptionTable::project(&product.variations, |_, v| Ok::<_, Infallible>(WooVariation::from(v)))
            .unwrap_or_else(|never| match never {});
    payload.kind = WooProductType::Variable;
    payload.attributes = Some(
        table
            .groups()
            .iter()
            .map(|g| WooAttribute { name: g.name.clone(), visible: true, variation: true, options: g.options.clone() })
            .collect(),
    );
    debug!(product_id = %product.id, attributes = table.groups().len(), variations = variations.len(), "Built WooCommerce variable product");
    WooCommercePayload { product: payload, variations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Platform;
    use crate::domain::value_objects::{Quantity, Sku};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn shirt_variation(id: &str, size: &str, price: rust_decimal::Decimal, stock: u32) -> ProductVariation {
        ProductVariation {
            id: id.into(),
            name: format!("{size} - White"),
            sku: Sku::from(format!("APP-TS-003-{}-W", &size[..1]).as_str()),
            price,
            stock_level: Quantity::new(stock),
            attributes: vec![VariationAttribute::new("Size", size), VariationAttribute::new("Color", "White")],
        }
    }

    fn simple_tee() -> Product {
        Product::simple("3", "Organic Cotton T-Shirt", Sku::from("APP-TS-003"), dec!(25.00), 120)
            .with_category("Apparel")
            .with_description("Sustainably sourced 100% cotton tee.")
            .with_platforms(Platform::Square)
    }

    fn variable_tee() -> Product {
        let mut p = Product::variable("3", "Organic Cotton T-Shirt", Sku::from("APP-TS-003"), dec!(25.00))
            .with_category("Apparel");
        p.set_variations(vec![
            shirt_variation("3-1", "Small", dec!(25.00), 40),
            shirt_variation("3-2", "Medium", dec!(25.00), 50),
            shirt_variation("3-3", "Large", dec!(27.00), 30),
        ]);
        p
    }

    #[test]
    fn test_simple_product() {
        let payload = to_woocommerce(&simple_tee());
        assert_eq!(payload.product.kind, WooProductType::Simple);
        assert_eq!(payload.product.regular_price.as_deref(), Some("25"));
        assert_eq!(payload.product.stock_quantity, Some(120));
        assert_eq!(payload.product.manage_stock, Some(true));
        assert!(payload.variations.is_empty());

        let body = serde_json::to_value(&payload.product).unwrap();
        assert_eq!(body, json!({
            "name": "Organic Cotton T-Shirt",
            "type": "simple",
            "description": "Sustainably sourced 100% cotton tee.",
            "sku": "APP-TS-003",
            "weight": "",
            "dimensions": { "length": "", "width": "", "height": "" },
            "regular_price": "25",
            "manage_stock": true,
            "stock_quantity": 120,
            "categories": [{ "name": "Apparel" }]
        }));
    }

    #[test]
    fn test_weight_and_dimensions() {
        let product = simple_tee()
            .with_weight(dec!(0.250))
            .with_dimensions(Dimensions { length: dec!(30), width: dec!(20.5), height: dec!(0) });
        let payload = to_woocommerce(&product);
        assert_eq!(payload.product.weight, "0.25");
        assert_eq!(payload.product.dimensions, WooDimensions { length: "30".into(), width: "20.5".into(), height: "0".into() });
    }

    #[test]
    fn test_variable_attribute_grouping() {
        let payload = to_woocommerce(&variable_tee());
        assert_eq!(payload.product.kind, WooProductType::Variable);
        assert_eq!(payload.product.sku, "APP-TS-003");
        assert!(payload.product.regular_price.is_none());
        assert!(payload.product.categories.is_none());
        assert_eq!(payload.product.attributes, Some(vec![
            WooAttribute { name: "Size".into(), visible: true, variation: true, options: vec!["Small".into(), "Medium".into(), "Large".into()] },
            WooAttribute { name: "Color".into(), visible: true, variation: true, options: vec!["White".into()] },
        ]));
    }

    #[test]
    fn test_variations_copied_in_order() {
        let product = variable_tee();
        let payload = to_woocommerce(&product);
        let skus: Vec<&str> = payload.variations.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["APP-TS-003-S-W", "APP-TS-003-M-W", "APP-TS-003-L-W"]);
        assert_eq!(payload.variations[2].regular_price, "27");
        assert_eq!(payload.variations[2].stock_quantity, 30);
        assert_eq!(payload.variations[0].attributes, product.variations[0].attributes);

        let batch = serde_json::to_value(payload.variations_batch()).unwrap();
        assert_eq!(batch["create"][1], json!({
            "regular_price": "25",
            "sku": "APP-TS-003-M-W",
            "manage_stock": true,
            "stock_quantity": 50,
            "attributes": [{ "name": "Size", "option": "Medium" }, { "name": "Color", "option": "White" }]
        }));
    }

    #[test]
    fn test_sparse_variations_pass_through() {
        let mut product = variable_tee();
        product.variations[1].attributes.truncate(1);
        let payload = to_woocommerce(&product);
        assert_eq!(payload.variations[1].attributes.len(), 1);
        assert_eq!(payload.product.attributes.unwrap()[1].options, vec!["White"]);
    }

    #[test]
    fn test_deterministic() {
        let product = variable_tee();
        assert_eq!(to_woocommerce(&product), to_woocommerce(&product));
    }
}
