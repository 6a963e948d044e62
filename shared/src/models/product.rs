//! Product Model

use serde::{Deserialize, Serialize};

use super::cart::ProductSnapshot;
use crate::types::LocalizedText;

/// Reference from a product to one selectable specification value
///
/// `quantity` is the per-option remaining stock when the store tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpecValue {
    pub specification_id: String,
    pub value_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

/// A color variant defined on a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Product entity from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub specification_values: Vec<ProductSpecValue>,
    #[serde(default)]
    pub colors: Vec<ProductColor>,
}

impl Product {
    /// The unit price a new cart line records
    ///
    /// Sale price when the product is currently on sale and the sale price
    /// is positive, else the list price.
    pub fn effective_unit_price(&self) -> f64 {
        if self.is_on_sale {
            if let Some(sale_price) = self.sale_price {
                if sale_price > 0.0 {
                    return sale_price;
                }
            }
        }
        self.price
    }

    /// Whether adding this product requires a specification choice
    pub fn has_specifications(&self) -> bool {
        !self.specification_values.is_empty()
    }

    /// Snapshot embedded into a cart line at add time
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            price: self.price,
            sale_price: self.sale_price,
            is_on_sale: self.is_on_sale,
            images: self.images.clone(),
            stock: self.stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, sale_price: Option<f64>, is_on_sale: bool) -> Product {
        Product {
            id: "p1".to_string(),
            name: LocalizedText::new("Test", "اختبار"),
            barcode: None,
            price,
            sale_price,
            is_on_sale,
            stock: 10,
            images: Vec::new(),
            category_id: None,
            specification_values: Vec::new(),
            colors: Vec::new(),
        }
    }

    #[test]
    fn effective_price_uses_sale_price_when_on_sale() {
        assert_eq!(product(20.0, Some(15.0), true).effective_unit_price(), 15.0);
    }

    #[test]
    fn effective_price_ignores_sale_price_when_not_on_sale() {
        assert_eq!(product(20.0, Some(15.0), false).effective_unit_price(), 20.0);
    }

    #[test]
    fn effective_price_ignores_non_positive_sale_price() {
        assert_eq!(product(20.0, Some(0.0), true).effective_unit_price(), 20.0);
        assert_eq!(product(20.0, None, true).effective_unit_price(), 20.0);
    }
}
