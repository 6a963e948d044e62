//! Cart aggregate
//!
//! Server-owned sale session: line items, derived totals, optional
//! customer/discount/payment records, and lifecycle status.
//!
//! The selection payloads embedded in line items historically arrive in
//! several shapes (array, single object, JSON-encoded string). They are
//! normalized exactly once at deserialization; a payload that matches none
//! of the known shapes is a decode error, not a silent empty list.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::money;
use crate::types::LocalizedText;

/// Cart lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl CartStatus {
    /// Wire representation, as used in list query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "ACTIVE",
            CartStatus::Completed => "COMPLETED",
            CartStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Discount type for cart-level discounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Optional customer contact attached to a cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Cart-level tax record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTax {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub rate: f64,
}

/// Cart-level discount record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDiscount {
    #[serde(rename = "type")]
    pub kind: DiscountType,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Payment record written on completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayment {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Free-form notes on a cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
}

/// Product snapshot embedded in a line item at add time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i32,
}

/// A chosen specification value recorded on a line item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedSpecification {
    pub specification_id: String,
    pub value_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: String,
}

/// A chosen color recorded on a line item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedColor {
    pub color_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// One purchasable line within a cart
///
/// `price_at_add` snapshots the unit price (sale price if the product was
/// on sale) at the moment the line was created and never changes afterward;
/// quantity edits do not re-price the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: String,
    #[serde(default)]
    pub product: ProductSnapshot,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub price_at_add: f64,
    #[serde(default, deserialize_with = "deserialize_selection_list")]
    pub selected_specifications: Vec<SelectedSpecification>,
    #[serde(default, deserialize_with = "deserialize_selection_list")]
    pub selected_colors: Vec<SelectedColor>,
}

impl CartLineItem {
    /// Line total at the recorded add-time price
    pub fn line_total(&self) -> f64 {
        money::line_total(self.price_at_add, self.quantity)
    }
}

/// A server-owned open sale session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub store_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CartCustomer>,
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<CartTax>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<CartDiscount>,
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<CartPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<CartNotes>,
    #[serde(default)]
    pub status: CartStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// The total to display/derive for this cart
    ///
    /// Empty item list yields 0 regardless of any stale value on the
    /// record. A non-positive server total against a non-empty item list is
    /// never trusted; the fallback is the sum of `price_at_add x quantity`.
    pub fn display_total(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        if self.total > 0.0 {
            return self.total;
        }
        self.derived_total()
    }

    /// Sum of `price_at_add x quantity` over all items
    pub fn derived_total(&self) -> f64 {
        let sum = self
            .items
            .iter()
            .map(|item| money::to_decimal(item.price_at_add) * rust_decimal::Decimal::from(item.quantity))
            .sum();
        money::to_f64(sum)
    }

    /// Total unit count across all lines
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Selection payload decoding
// ============================================================================

/// Wire shapes observed for selection payloads
#[derive(Deserialize)]
#[serde(untagged, bound = "T: DeserializeOwned")]
enum SelectionListWire<T> {
    Many(Vec<T>),
    One(T),
    Encoded(String),
}

/// Decode a selection list from any of its known wire shapes
///
/// Missing field or `null` decodes to an empty list. A JSON-encoded string
/// must itself parse as a list or single object; anything else is rejected.
fn deserialize_selection_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let wire = Option::<SelectionListWire<T>>::deserialize(deserializer)?;
    match wire {
        None => Ok(Vec::new()),
        Some(SelectionListWire::Many(list)) => Ok(list),
        Some(SelectionListWire::One(single)) => Ok(vec![single]),
        Some(SelectionListWire::Encoded(raw)) => {
            if raw.trim().is_empty() {
                return Ok(Vec::new());
            }
            tracing::debug!("normalizing JSON-encoded selection payload");
            serde_json::from_str::<Vec<T>>(&raw)
                .or_else(|_| serde_json::from_str::<T>(&raw).map(|single| vec![single]))
                .map_err(|_| {
                    serde::de::Error::custom(format!(
                        "malformed selection payload: {raw:?}"
                    ))
                })
        }
    }
}
