//! SpecificationPicker - variant selection before add-to-cart
//!
//! Modal-scoped state: for one product, the in-progress choice of one value
//! per relevant specification plus a color, and a stock-bounded quantity.
//! Discarded on cancel; converted to an add payload on confirm. Never
//! touches the network.

use std::collections::BTreeMap;

use shared::models::{Product, ProductColor, Specification, SelectedColor, SelectedSpecification};
use shared::Language;

/// One selectable option within a specification, with its remaining stock
/// when the store tracks it per option
#[derive(Debug, Clone, PartialEq)]
pub struct PickerOption {
    pub value_id: String,
    pub label: String,
    pub remaining: Option<i32>,
}

/// A specification relevant to the picked product, with its options
#[derive(Debug, Clone, PartialEq)]
pub struct PickerSpecification {
    pub specification_id: String,
    pub title: String,
    pub options: Vec<PickerOption>,
}

/// Why a selection was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRejected {
    /// The chosen value's tracked quantity is zero or less
    OutOfStock,
    /// No such specification/value/color on this product
    Unknown,
}

/// The packaged result of a confirmed picker
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedSelection {
    pub specifications: Vec<SelectedSpecification>,
    pub colors: Vec<SelectedColor>,
    pub quantity: i32,
}

/// Selection state for one product
pub struct SpecificationPicker {
    product: Product,
    specifications: Vec<PickerSpecification>,
    selection: BTreeMap<String, String>,
    color: Option<ProductColor>,
    quantity: i32,
}

impl SpecificationPicker {
    /// Build a picker for a product against the global specification catalog
    ///
    /// Only specifications the product itself references are offered, and
    /// within each, only the values the product carries.
    pub fn new(product: Product, catalog: &[Specification], language: Language) -> Self {
        let specifications = catalog
            .iter()
            .filter_map(|spec| {
                let options: Vec<PickerOption> = product
                    .specification_values
                    .iter()
                    .filter(|pv| pv.specification_id == spec.id)
                    .filter_map(|pv| {
                        spec.value(&pv.value_id).map(|value| PickerOption {
                            value_id: pv.value_id.clone(),
                            label: value.value.get(language).to_string(),
                            remaining: pv.quantity,
                        })
                    })
                    .collect();
                if options.is_empty() {
                    None
                } else {
                    Some(PickerSpecification {
                        specification_id: spec.id.clone(),
                        title: spec.title.get(language).to_string(),
                        options,
                    })
                }
            })
            .collect();

        Self {
            product,
            specifications,
            selection: BTreeMap::new(),
            color: None,
            quantity: 1,
        }
    }

    /// The specifications this product offers
    pub fn specifications(&self) -> &[PickerSpecification] {
        &self.specifications
    }

    pub fn colors(&self) -> &[ProductColor] {
        &self.product.colors
    }

    pub fn selected_value(&self, specification_id: &str) -> Option<&str> {
        self.selection.get(specification_id).map(|s| s.as_str())
    }

    pub fn selected_color(&self) -> Option<&ProductColor> {
        self.color.as_ref()
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    // ========== Selection ==========

    /// Choose a value for a specification
    ///
    /// A value with tracked remaining quantity of zero or less is rejected
    /// and the running selection stays unchanged.
    pub fn select_value(
        &mut self,
        specification_id: &str,
        value_id: &str,
    ) -> Result<(), SelectionRejected> {
        let option = self
            .specifications
            .iter()
            .find(|s| s.specification_id == specification_id)
            .and_then(|s| s.options.iter().find(|o| o.value_id == value_id))
            .ok_or(SelectionRejected::Unknown)?;

        if option.remaining.is_some_and(|remaining| remaining <= 0) {
            tracing::debug!(
                %specification_id,
                %value_id,
                "rejected out-of-stock specification value"
            );
            return Err(SelectionRejected::OutOfStock);
        }

        self.selection
            .insert(specification_id.to_string(), value_id.to_string());
        self.clamp_quantity();
        Ok(())
    }

    /// Choose one of the product's colors
    pub fn select_color(&mut self, color_id: &str) -> Result<(), SelectionRejected> {
        let color = self
            .product
            .colors
            .iter()
            .find(|c| c.id == color_id)
            .ok_or(SelectionRejected::Unknown)?;
        self.color = Some(color.clone());
        Ok(())
    }

    // ========== Quantity ==========

    /// The available stock ceiling for the current selection
    ///
    /// With at least one specification value selected, the minimum tracked
    /// remaining quantity across the selected values; otherwise the
    /// product's own stock counter.
    pub fn stock_ceiling(&self) -> i32 {
        let tracked_min = self
            .selection
            .iter()
            .filter_map(|(spec_id, value_id)| {
                self.specifications
                    .iter()
                    .find(|s| &s.specification_id == spec_id)
                    .and_then(|s| s.options.iter().find(|o| &o.value_id == value_id))
                    .and_then(|o| o.remaining)
            })
            .min();

        match tracked_min {
            Some(min) if !self.selection.is_empty() => min,
            _ => self.product.stock,
        }
    }

    /// Whether the quantity stepper is usable
    ///
    /// Disabled until every offered specification has a selected value and,
    /// when the product defines colors, a color is selected.
    pub fn stepper_enabled(&self) -> bool {
        let all_specs_chosen = self
            .specifications
            .iter()
            .all(|s| self.selection.contains_key(&s.specification_id));
        let color_chosen = self.product.colors.is_empty() || self.color.is_some();
        all_specs_chosen && color_chosen
    }

    /// Set the quantity, clamped to `1..=stock_ceiling`
    ///
    /// Ignored while the stepper is disabled.
    pub fn set_quantity(&mut self, quantity: i32) -> bool {
        if !self.stepper_enabled() {
            return false;
        }
        self.quantity = quantity.clamp(1, self.stock_ceiling().max(1));
        true
    }

    pub fn increment(&mut self) -> bool {
        self.set_quantity(self.quantity + 1)
    }

    pub fn decrement(&mut self) -> bool {
        self.set_quantity(self.quantity - 1)
    }

    fn clamp_quantity(&mut self) {
        self.quantity = self.quantity.clamp(1, self.stock_ceiling().max(1));
    }

    // ========== Confirm ==========

    /// Package the running selection into an add payload
    ///
    /// Returns `None` while the selection is incomplete (same condition
    /// that disables the stepper).
    pub fn confirm(&self) -> Option<ConfirmedSelection> {
        if !self.stepper_enabled() {
            return None;
        }

        let specifications = self
            .specifications
            .iter()
            .filter_map(|spec| {
                let value_id = self.selection.get(&spec.specification_id)?;
                let option = spec.options.iter().find(|o| &o.value_id == value_id)?;
                Some(SelectedSpecification {
                    specification_id: spec.specification_id.clone(),
                    value_id: value_id.clone(),
                    title: spec.title.clone(),
                    value: option.label.clone(),
                })
            })
            .collect();

        let colors = self
            .color
            .iter()
            .map(|c| SelectedColor {
                color_id: c.id.clone(),
                name: c.name.clone(),
                value: c.value.clone(),
            })
            .collect();

        Some(ConfirmedSelection {
            specifications,
            colors,
            quantity: self.quantity,
        })
    }
}
