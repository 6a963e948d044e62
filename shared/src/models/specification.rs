//! Specification catalog model
//!
//! Global list of specifications (size, material, ...) and their values.
//! Products reference these by id; the per-product remaining quantity lives
//! on the product's own specification value refs.

use serde::{Deserialize, Serialize};

use crate::types::LocalizedText;

/// One selectable value within a specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationValue {
    pub id: String,
    #[serde(default)]
    pub value: LocalizedText,
}

/// Specification entity from the global catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub id: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub values: Vec<SpecificationValue>,
}

impl Specification {
    /// Look up one of this specification's values by id
    pub fn value(&self, value_id: &str) -> Option<&SpecificationValue> {
        self.values.iter().find(|v| v.id == value_id)
    }
}
