//! Attribute taxonomy
//!
//! Catalog-level axes of variation (`Size`, `Color`) and their allowed terms.
//! Only used while authoring variations; the platform adapters read the
//! variations themselves.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Attribute {
    pub id: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub terms: Vec<String>,
}

impl Attribute {
    /// `terms` is comma-separated form input. A missing or blank slug is derived from the name.
    pub fn new(id: impl Into<String>, name: impl Into<String>, slug: Option<&str>, terms: &str) -> Self {
        let name = name.into();
        let slug = match slug.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => Self::default_slug(&name),
        };
        Self { id: id.into(), name, slug, terms: Self::parse_terms(terms) }
    }

    /// `Pattern Style` -> `pattern-style`
    pub fn default_slug(name: &str) -> String {
        name.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase()
    }

    pub fn parse_terms(input: &str) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for term in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        }
        terms
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}
