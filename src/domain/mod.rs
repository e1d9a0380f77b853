//! Canonical catalog model
pub mod aggregates;
pub mod value_objects;
