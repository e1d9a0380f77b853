//! Catalog Aggregate

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::aggregates::{Platform, Product, StockStatus};
use crate::domain::value_objects::Money;
use crate::{CatalogError, Result};

/// Products in insertion order. Every product that enters is normalized.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

/// Headline inventory numbers for a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_value: Money,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Name,
    Sku,
    Category,
    Price,
    StockLevel,
    LastSynced,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Inventory list query. Empty `search` and `None` filters match everything.
#[derive(Clone, Debug, Default)]
pub struct InventoryQuery {
    /// Case-insensitive substring of the name or SKU.
    pub search: String,
    pub category: Option<String>,
    pub stock_status: Option<StockStatus>,
    pub sort_by: SortField,
    pub direction: SortDirection,
}

impl InventoryQuery {
    pub fn search(mut self, text: impl Into<String>) -> Self { self.search = text.into(); self }

    /// `All` clears the category filter.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (category != "All").then_some(category);
        self
    }

    pub fn stock_status(mut self, status: StockStatus) -> Self { self.stock_status = Some(status); self }

    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_by = field;
        self.direction = direction;
        self
    }

    fn matches(&self, product: &Product, low_stock_threshold: u32) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = product.name.to_lowercase().contains(&needle)
            || product.sku.as_str().to_lowercase().contains(&needle);
        let matches_category = self.category.as_ref().map_or(true, |c| &product.category == c);
        let matches_stock = self.stock_status.map_or(true, |s| product.stock_status(low_stock_threshold) == s);
        matches_search && matches_category && matches_stock
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.sort_by {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Sku => a.sku.as_str().cmp(b.sku.as_str()),
            SortField::Category => a.category.cmp(&b.category),
            SortField::Price => a.price.cmp(&b.price),
            SortField::StockLevel => a.stock_level.cmp(&b.stock_level),
            SortField::LastSynced => a.last_synced.cmp(&b.last_synced),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl Catalog {
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut catalog = Self::default();
        for product in products {
            catalog.upsert(product);
        }
        catalog
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }
    pub fn get(&self, id: &str) -> Option<&Product> { self.products.iter().find(|p| p.id == id) }

    /// Insert, or replace the product with the same id in place.
    pub fn upsert(&mut self, mut product: Product) {
        product.normalize();
        if let Some(existing) = self.products.iter_mut().find(|p| p.id == product.id) {
            *existing = product;
        } else {
            self.products.push(product);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }

    /// Stamps `last_synced` on the product. Returns false when no product has `id`.
    pub fn mark_synced(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        match self.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.mark_synced(at);
                true
            }
            None => false,
        }
    }

    /// Products that should be published to `platform`.
    pub fn for_platform(&self, platform: Platform) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| match platform {
            Platform::WooCommerce => p.platforms.targets_woocommerce(),
            Platform::Square => p.platforms.targets_square(),
            Platform::Both => p.platforms == Platform::Both,
        })
    }

    /// Matching products, sorted. Ties keep catalog order.
    pub fn filter(&self, query: &InventoryQuery, low_stock_threshold: u32) -> Vec<&Product> {
        let mut found: Vec<&Product> = self.products.iter().filter(|p| query.matches(p, low_stock_threshold)).collect();
        found.sort_by(|a, b| query.compare(a, b));
        found
    }

    /// Product count per category, in the order categories first appear.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for product in &self.products {
            match counts.iter_mut().find(|(name, _)| *name == product.category) {
                Some((_, count)) => *count += 1,
                None => counts.push((product.category.clone(), 1)),
            }
        }
        counts
    }

    /// Inventory value is `price x stock_level` per product.
    pub fn summary(&self, currency: &str, low_stock_threshold: u32) -> Result<InventorySummary> {
        let mut total_value = Money::zero(currency);
        for p in &self.products {
            total_value = Money::new(p.price, currency)
                .multiply(p.stock_level.value())
                .and_then(|line| total_value.add(&line))
                .map_err(|e| CatalogError::AmountOutOfRange(format!("{}: {e}", p.sku)))?;
        }
        let count = |status: StockStatus| {
            self.products.iter().filter(|p| p.stock_status(low_stock_threshold) == status).count()
        };
        Ok(InventorySummary {
            total_products: self.products.len(),
            total_value,
            low_stock_count: count(StockStatus::LowStock),
            out_of_stock_count: count(StockStatus::OutOfStock),
        })
    }
}
