//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::{Validate, ValidationError};

use crate::domain::aggregates::Attribute;
use crate::domain::value_objects::{Dimensions, Quantity, Sku};
use crate::ids::IdGenerator;
use crate::{CatalogError, Result};

/// The canonical, platform-agnostic product.
///
/// `stock_level` is a cached value for variable products: the sum of the
/// variations' stock, refreshed by every method that changes `variations`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(custom = "validate_sku")]
    pub sku: Sku,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[serde(default)]
    pub stock_level: Quantity,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub platforms: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub has_variations: bool,
    #[serde(default)]
    #[validate]
    pub variations: Vec<ProductVariation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariation {
    #[validate(length(min = 1, message = "variation id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "variation name is required"))]
    pub name: String,
    #[serde(default)]
    pub sku: Sku,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[serde(default)]
    pub stock_level: Quantity,
    #[serde(default)]
    pub attributes: Vec<VariationAttribute>,
}

/// One axis value of a variation, e.g. `Size = Small`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariationAttribute {
    pub name: String,
    pub option: String,
}

impl VariationAttribute {
    pub fn new(name: impl Into<String>, option: impl Into<String>) -> Self {
        Self { name: name.into(), option: option.into() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    WooCommerce,
    Square,
    #[default]
    Both,
}

impl Platform {
    pub fn targets_woocommerce(&self) -> bool { matches!(self, Self::WooCommerce | Self::Both) }
    pub fn targets_square(&self) -> bool { matches!(self, Self::Square | Self::Both) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    pub fn classify(stock: Quantity, low_stock_threshold: u32) -> Self {
        match stock.value() {
            0 => Self::OutOfStock,
            n if n < low_stock_threshold => Self::LowStock,
            _ => Self::InStock,
        }
    }
}

/// A hand-entered variation, before ids and defaults are filled in.
#[derive(Clone, Debug, Default)]
pub struct VariationEntry {
    pub label: String,
    pub sku: Option<Sku>,
    pub price: Option<Decimal>,
    pub stock_level: u32,
}

impl Product {
    pub fn simple(id: impl Into<String>, name: impl Into<String>, sku: Sku, price: Decimal, stock_level: u32) -> Self {
        Self {
            id: id.into(), name: name.into(), sku, price, stock_level: Quantity::new(stock_level),
            category: String::new(), description: String::new(), platforms: Platform::default(),
            last_synced: None, image: None, has_variations: false, variations: vec![],
            weight: None, dimensions: None,
        }
    }

    pub fn variable(id: impl Into<String>, name: impl Into<String>, sku: Sku, price: Decimal) -> Self {
        Self { has_variations: true, ..Self::simple(id, name, sku, price, 0) }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self { self.category = category.into(); self }
    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = description.into(); self }
    pub fn with_platforms(mut self, platforms: Platform) -> Self { self.platforms = platforms; self }
    pub fn with_weight(mut self, weight: Decimal) -> Self { self.weight = Some(weight); self }
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self { self.dimensions = Some(dimensions); self }

    pub fn is_variable(&self) -> bool { self.has_variations }

    pub fn stock_status(&self, low_stock_threshold: u32) -> StockStatus {
        StockStatus::classify(self.stock_level, low_stock_threshold)
    }

    /// Sum of variation stock, stored back into `stock_level`. Simple products keep their own count.
    pub fn recompute_stock_level(&mut self) -> Quantity {
        if self.has_variations {
            self.stock_level = self.variations.iter().map(|v| v.stock_level).sum();
            debug!(product_id = %self.id, stock = %self.stock_level, "Recomputed stock level");
        }
        self.stock_level
    }

    /// Restores the derived fields after a product arrives from outside (JSON, a form):
    /// blank variation SKUs get their default and the cached stock level is recomputed.
    pub fn normalize(&mut self) {
        for variation in &mut self.variations {
            if variation.sku.is_empty() {
                variation.sku = self.sku.for_variation_label(&variation.name);
            }
        }
        self.recompute_stock_level();
    }

    pub fn add_variation(&mut self, variation: ProductVariation) {
        self.variations.push(variation);
        self.normalize();
    }

    pub fn remove_variation(&mut self, variation_id: &str) -> Result<ProductVariation> {
        let index = self
            .variations
            .iter()
            .position(|v| v.id == variation_id)
            .ok_or_else(|| CatalogError::VariationNotFound(variation_id.to_string()))?;
        let removed = self.variations.remove(index);
        self.recompute_stock_level();
        Ok(removed)
    }

    pub fn set_variations(&mut self, variations: Vec<ProductVariation>) {
        self.variations = variations;
        self.normalize();
    }

    /// Manual entry. A label like `Small - Blue` becomes `Option 1 = Small, Option 2 = Blue`;
    /// a label without `-` becomes a single `Attribute` pair. Blank labels are ignored.
    pub fn add_labelled_variation(&mut self, ids: &dyn IdGenerator, entry: VariationEntry) -> Option<&ProductVariation> {
        if entry.label.trim().is_empty() {
            return None;
        }
        let parts: Vec<&str> = entry.label.split('-').map(str::trim).collect();
        let attributes = if parts.len() > 1 {
            vec![VariationAttribute::new("Option 1", parts[0]), VariationAttribute::new("Option 2", parts[1])]
        } else {
            vec![VariationAttribute::new("Attribute", parts[0])]
        };
        let price = entry.price.filter(|p| !p.is_zero()).unwrap_or(self.price);
        let sku = entry.sku.filter(|s| !s.is_empty()).unwrap_or_else(|| self.sku.for_variation_label(&entry.label));
        self.add_variation(ProductVariation {
            id: ids.next(),
            name: entry.label,
            sku,
            price,
            stock_level: Quantity::new(entry.stock_level),
            attributes,
        });
        self.variations.last()
    }

    /// One variation per selected term of `attribute`. Terms the attribute does not define are skipped.
    pub fn generate_variations(
        &mut self,
        ids: &dyn IdGenerator,
        attribute: &Attribute,
        terms: &[String],
        price: Decimal,
        stock_level: u32,
    ) -> usize {
        let mut added = 0;
        for term in terms {
            if !attribute.has_term(term) {
                warn!(attribute = %attribute.name, term = %term, "Skipping term not defined by attribute");
                continue;
            }
            self.variations.push(ProductVariation {
                id: ids.next(),
                name: term.clone(),
                sku: self.sku.for_term(term),
                price,
                stock_level: Quantity::new(stock_level),
                attributes: vec![VariationAttribute::new(attribute.name.clone(), term.clone())],
            });
            added += 1;
        }
        self.recompute_stock_level();
        added
    }

    /// Lowest and highest price. For simple products both ends are `price`.
    pub fn price_range(&self) -> (Decimal, Decimal) {
        if !self.has_variations || self.variations.is_empty() {
            return (self.price, self.price);
        }
        self.variations.iter().fold((Decimal::MAX, Decimal::MIN), |(lo, hi), v| (lo.min(v.price), hi.max(v.price)))
    }

    /// Attribute names used anywhere in the variations, first-seen order.
    pub fn declared_axes(&self) -> Vec<&str> {
        let mut axes: Vec<&str> = Vec::new();
        for attr in self.variations.iter().flat_map(|v| v.attributes.iter()) {
            if !axes.contains(&attr.name.as_str()) {
                axes.push(&attr.name);
            }
        }
        axes
    }

    /// Variations that omit one or more declared axes, with the names they omit.
    pub fn missing_axes(&self) -> Vec<(&str, Vec<&str>)> {
        let axes = self.declared_axes();
        self.variations
            .iter()
            .filter_map(|v| {
                let missing: Vec<&str> =
                    axes.iter().copied().filter(|axis| !v.attributes.iter().any(|a| a.name == *axis)).collect();
                (!missing.is_empty()).then_some((v.id.as_str(), missing))
            })
            .collect()
    }

    pub fn mark_synced(&mut self, at: DateTime<Utc>) { self.last_synced = Some(at); }
}

fn validate_sku(sku: &Sku) -> std::result::Result<(), ValidationError> {
    if sku.is_empty() { return Err(ValidationError::new("sku_required")); }
    Ok(())
}

fn validate_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() { return Err(ValidationError::new("negative_price")); }
    Ok(())
}
