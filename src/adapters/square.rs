//! Square catalog upsert payloads.
//!
//! Square models every product as an `ITEM` with at least one
//! `ITEM_VARIATION`. Variation axes become standalone `ITEM_OPTION` objects
//! and variations point at option values by id. Objects created in the same
//! request carry client-assigned temporary ids starting with `#`.

use serde::Serialize;
use tracing::debug;

use crate::adapters::grouping::{OptionRef, OptionTable};
use crate::domain::aggregates::{Product, ProductVariation};
use crate::domain::value_objects::{Money, Sku};
use crate::ids::{IdGenerator, UuidV4Ids};
use crate::{CatalogError, Result};

pub const TEMP_ID_PREFIX: &str = "#";
pub const DEFAULT_CURRENCY: &str = "USD";
const REGULAR_VARIATION_ID: &str = "#regular";
const REGULAR_VARIATION_NAME: &str = "Regular";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogObjectType {
    Item,
    ItemVariation,
    ItemOption,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingType {
    FixedPricing,
}

/// Body for `POST /v2/catalog/object`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SquareUpsert {
    pub idempotency_key: String,
    pub object: CatalogItem,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    #[serde(rename = "type")]
    pub kind: CatalogObjectType,
    pub id: String,
    pub item_data: ItemData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemData {
    pub name: String,
    pub description: String,
    pub variations: Vec<ItemVariation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_options: Option<Vec<ItemOption>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemVariation {
    #[serde(rename = "type")]
    pub kind: CatalogObjectType,
    pub id: String,
    pub item_variation_data: ItemVariationData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemVariationData {
    pub item_id: String,
    pub name: String,
    pub sku: String,
    pub pricing_type: PricingType,
    pub price_money: SquareMoney,
    pub track_inventory: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_option_values: Vec<ItemOptionValueRef>,
}

/// Amount in minor units (cents for USD).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SquareMoney {
    pub amount: i64,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemOption {
    #[serde(rename = "type")]
    pub kind: CatalogObjectType,
    pub id: String,
    pub item_option_data: ItemOptionData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemOptionData {
    pub name: String,
    pub values: Vec<ItemOptionValue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemOptionValue {
    pub id: String,
    pub item_option_value_data: ItemOptionValueData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemOptionValueData {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemOptionValueRef {
    pub item_option_id: String,
    pub item_option_value_id: String,
}

pub fn temp_id(id: &str) -> String {
    format!("{TEMP_ID_PREFIX}{id}")
}

fn option_id(group: usize) -> String {
    format!("{TEMP_ID_PREFIX}opt_{group}")
}

fn option_value_id(r: OptionRef) -> String {
    format!("{}_val_{}", option_id(r.group), r.option)
}

impl SquareUpsert {
    /// Every temporary id defined in this payload, in document order.
    pub fn defined_ids(&self) -> Vec<&str> {
        let data = &self.object.item_data;
        let mut ids = vec![self.object.id.as_str()];
        ids.extend(data.variations.iter().map(|v| v.id.as_str()));
        for option in data.item_options.iter().flatten() {
            ids.push(&option.id);
            ids.extend(option.item_option_data.values.iter().map(|v| v.id.as_str()));
        }
        ids
    }

    /// Whether every option reference in the variations points at an option value defined in `item_options`.
    pub fn references_resolve(&self) -> bool {
        let options = self.object.item_data.item_options.as_deref().unwrap_or_default();
        self.object.item_data.variations.iter().flat_map(|v| &v.item_variation_data.item_option_values).all(|r| {
            options.iter().any(|o| {
                o.id == r.item_option_id && o.item_option_data.values.iter().any(|v| v.id == r.item_option_value_id)
            })
        })
    }
}

/// Builds Square payloads. Idempotency keys come from the injected generator.
#[derive(Debug)]
pub struct SquareAdapter<G = UuidV4Ids> {
    ids: G,
    currency: String,
}

impl Default for SquareAdapter<UuidV4Ids> {
    fn default() -> Self {
        Self::new(UuidV4Ids)
    }
}

impl<G: IdGenerator> SquareAdapter<G> {
    pub fn new(ids: G) -> Self {
        Self { ids, currency: DEFAULT_CURRENCY.to_string() }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn currency(&self) -> &str { &self.currency }

    pub fn to_square(&self, product: &Product) -> Result<SquareUpsert> {
        let item_id = temp_id(&product.id);
        let (variations, item_options) = if product.has_variations {
            let (table, variations) = OptionTable::project(&product.variations, |table, v| {
                self.variation(&item_id, table, v)
            })?;
            (variations, Some(build_item_options(&table)))
        } else {
            let regular = ItemVariation {
                kind: CatalogObjectType::ItemVariation,
                id: REGULAR_VARIATION_ID.to_string(),
                item_variation_data: ItemVariationData {
                    item_id: item_id.clone(),
                    name: REGULAR_VARIATION_NAME.to_string(),
                    sku: product.sku.to_string(),
                    pricing_type: PricingType::FixedPricing,
                    price_money: self.money(&product.sku, product.price)?,
                    track_inventory: true,
                    item_option_values: vec![],
                },
            };
            (vec![regular], None)
        };

        debug!(
            product_id = %product.id,
            variations = variations.len(),
            options = item_options.as_ref().map_or(0, Vec::len),
            "Built Square catalog item"
        );
        Ok(SquareUpsert {
            idempotency_key: self.ids.next(),
            object: CatalogItem {
                kind: CatalogObjectType::Item,
                id: item_id,
                item_data: ItemData {
                    name: product.name.clone(),
                    description: product.description.clone(),
                    variations,
                    item_options,
                },
            },
        })
    }

    fn variation(&self, item_id: &str, table: &OptionTable, v: &ProductVariation) -> Result<ItemVariation> {
        let item_option_values = v
            .attributes
            .iter()
            .map(|attr| {
                let r = table.resolve(v, &attr.name, &attr.option)?;
                Ok(ItemOptionValueRef { item_option_id: option_id(r.group), item_option_value_id: option_value_id(r) })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ItemVariation {
            kind: CatalogObjectType::ItemVariation,
            id: temp_id(&v.id),
            item_variation_data: ItemVariationData {
                item_id: item_id.to_string(),
                name: v.name.clone(),
                sku: v.sku.to_string(),
                pricing_type: PricingType::FixedPricing,
                price_money: self.money(&v.sku, v.price)?,
                track_inventory: true,
                item_option_values,
            },
        })
    }

    fn money(&self, sku: &Sku, price: rust_decimal::Decimal) -> Result<SquareMoney> {
        let amount = Money::new(price, &self.currency)
            .to_minor_units()
            .map_err(|e| CatalogError::AmountOutOfRange(format!("{sku}: {e}")))?;
        Ok(SquareMoney { amount, currency: self.currency.clone() })
    }
}

fn build_item_options(table: &OptionTable) -> Vec<ItemOption> {
    table
        .groups()
        .iter()
        .enumerate()
        .map(|(group, g)| ItemOption {
            kind: CatalogObjectType::ItemOption,
            id: option_id(group),
            item_option_data: ItemOptionData {
                name: g.name.clone(),
                values: g
                    .options
                    .iter()
                    .enumerate()
                    .map(|(option, name)| ItemOptionValue {
                        id: option_value_id(OptionRef { group, option }),
                        item_option_value_data: ItemOptionValueData { name: name.clone() },
                    })
                    .collect(),
            },
        })
        .collect()
}

/// Square payload in USD with a random idempotency key.
pub fn to_square(product: &Product) -> Result<SquareUpsert> {
    SquareAdapter::new(UuidV4Ids).to_square(product)
}
