//! Ordered attribute grouping shared by both platform adapters.
//!
//! First pass: every variation's `{name, option}` pairs fold into an ordered
//! multimap of attribute name to distinct options. Names and options keep
//! first-seen order. Second pass: [`OptionTable::project`] walks the
//! variations again and lets the caller emit one record per variation.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::aggregates::ProductVariation;
use crate::{CatalogError, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionGroup {
    pub name: String,
    pub options: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct OptionTable {
    groups: Vec<OptionGroup>,
    name_index: HashMap<String, usize>,
    option_index: HashMap<(usize, String), usize>,
}

/// Position of a `{name, option}` pair in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionRef {
    pub group: usize,
    pub option: usize,
}

impl OptionTable {
    pub fn from_variations(variations: &[ProductVariation]) -> Self {
        let mut table = Self::default();
        for attr in variations.iter().flat_map(|v| v.attributes.iter()) {
            table.insert(&attr.name, &attr.option);
        }
        table
    }

    fn insert(&mut self, name: &str, option: &str) {
        let group = match self.name_index.get(name) {
            Some(&i) => i,
            None => {
                self.groups.push(OptionGroup { name: name.to_string(), options: vec![] });
                self.name_index.insert(name.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let key = (group, option.to_string());
        if !self.option_index.contains_key(&key) {
            let options = &mut self.groups[group].options;
            options.push(option.to_string());
            self.option_index.insert(key, options.len() - 1);
        }
    }

    pub fn groups(&self) -> &[OptionGroup] { &self.groups }
    pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    pub fn lookup(&self, name: &str, option: &str) -> Option<OptionRef> {
        let group = *self.name_index.get(name)?;
        let option = *self.option_index.get(&(group, option.to_string()))?;
        Some(OptionRef { group, option })
    }

    /// Like [`lookup`](Self::lookup), but a pair the table has never seen is an integrity error.
    pub fn resolve(&self, variation: &ProductVariation, name: &str, option: &str) -> Result<OptionRef> {
        self.lookup(name, option).ok_or_else(|| CatalogError::UnresolvedOption {
            variation_id: variation.id.clone(),
            name: name.to_string(),
            option: option.to_string(),
        })
    }

    /// Group names `variation` does not supply a value for.
    pub fn missing_axes(&self, variation: &ProductVariation) -> Vec<&str> {
        self.groups
            .iter()
            .map(|g| g.name.as_str())
            .filter(|name| !variation.attributes.iter().any(|a| a.name == *name))
            .collect()
    }

    /// Builds the table, then maps each variation through `emit` in input order.
    ///
    /// Sparse variations are allowed here; they are logged and passed to `emit` unchanged.
    pub fn project<T, E, F>(variations: &[ProductVariation], mut emit: F) -> std::result::Result<(Self, Vec<T>), E>
    where
        F: FnMut(&Self, &ProductVariation) -> std::result::Result<T, E>,
    {
        let table = Self::from_variations(variations);
        let records = variations
            .iter()
            .map(|v| {
                let missing = table.missing_axes(v);
                if !missing.is_empty() {
                    warn!(variation_id = %v.id, missing = ?missing, "Variation does not cover every attribute");
                }
                emit(&table, v)
            })
            .collect::<std::result::Result<Vec<T>, E>>()?;
        Ok((table, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::VariationAttribute;
    use crate::domain::value_objects::{Quantity, Sku};
    use rust_decimal::Decimal;

    fn variation(id: &str, attrs: &[(&str, &str)]) -> ProductVariation {
        ProductVariation {
            id: id.into(), name: id.into(), sku: Sku::from(id), price: Decimal::ONE, stock_level: Quantity::new(1),
            attributes: attrs.iter().map(|(n, o)| VariationAttribute::new(*n, *o)).collect(),
        }
    }

    fn shirts() -> Vec<ProductVariation> {
        vec![
            variation("3-1", &[("Size", "Small"), ("Color", "White")]),
            variation("3-2", &[("Size", "Medium"), ("Color", "White")]),
            variation("3-3", &[("Size", "Large"), ("Color", "White")]),
        ]
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let table = OptionTable::from_variations(&shirts());
        assert_eq!(table.groups(), &[
            OptionGroup { name: "Size".into(), options: vec!["Small".into(), "Medium".into(), "Large".into()] },
            OptionGroup { name: "Color".into(), options: vec!["White".into()] },
        ]);
    }

    #[test]
    fn test_order_is_not_alphabetical() {
        let table = OptionTable::from_variations(&[
            variation("a", &[("Weight", "Heavy"), ("Color", "Zinc")]),
            variation("b", &[("Color", "Amber"), ("Weight", "Light")]),
        ]);
        let names: Vec<&str> = table.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Weight", "Color"]);
        assert_eq!(table.groups()[1].options, vec!["Zinc", "Amber"]);
    }

    #[test]
    fn test_lookup_and_resolve() {
        let vars = shirts();
        let table = OptionTable::from_variations(&vars);
        assert_eq!(table.lookup("Size", "Large"), Some(OptionRef { group: 0, option: 2 }));
        assert_eq!(table.lookup("Color", "White"), Some(OptionRef { group: 1, option: 0 }));
        assert_eq!(table.lookup("Color", "Large"), None);
        let err = table.resolve(&vars[0], "Size", "XL").unwrap_err();
        assert!(matches!(err, CatalogError::UnresolvedOption { ref option, .. } if option == "XL"));
    }

    #[test]
    fn test_same_option_under_different_names() {
        let table = OptionTable::from_variations(&[variation("a", &[("Trim", "Gold"), ("Buttons", "Gold")])]);
        assert_eq!(table.lookup("Trim", "Gold"), Some(OptionRef { group: 0, option: 0 }));
        assert_eq!(table.lookup("Buttons", "Gold"), Some(OptionRef { group: 1, option: 0 }));
    }

    #[test]
    fn test_project_sparse() {
        let vars = vec![variation("a", &[("Size", "S"), ("Color", "Red")]), variation("b", &[("Size", "M")])];
        let (table, counts) = OptionTable::project(&vars, |_, v| Ok::<_, CatalogError>(v.attributes.len())).unwrap();
        assert_eq!(counts, vec![2, 1]);
        assert_eq!(table.missing_axes(&vars[1]), vec!["Color"]);
    }

    #[test]
    fn test_project_propagates_errors() {
        let vars = shirts();
        let result = OptionTable::project(&vars, |table, v| table.resolve(v, "Fit", "Slim"));
        assert!(matches!(result, Err(CatalogError::UnresolvedOption { .. })));
    }
}
