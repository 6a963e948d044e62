//! SaleWorkspace - product search and cart editing for the active cart
//!
//! Binds the catalog (products, categories, specification list) to the
//! cart held by the store: smart search resolves a free-text term to a
//! single product, the filter narrows the grid, and add/step/clear/complete
//! route through the store.
//!
//! Completion is a two-step sequence by contract: `complete` the cart, then
//! explicitly `delete` it. The follow-up delete looks redundant next to
//! completion but matches the server's observed behavior and stays.

use crate::store::{CartStore, Outcome};
use shared::models::{Cart, Category, Product, Specification};
use shared::money;
use shared::Language;

/// Result of resolving a free-text search term to a product
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResolution {
    /// Exactly one product matched; select it
    Match(Product),
    /// Several products share the searched price; show their names instead
    /// of auto-selecting
    Multiple(Vec<String>),
    /// Nothing matched; the grid stays filterable by the same term
    NoMatch,
}

/// How an add request proceeds for a given product
#[derive(Debug, Clone, PartialEq)]
pub enum AddRouting {
    /// The product declares specification values; route through the picker
    PickerRequired(Product),
    /// No specifications; added directly with quantity 1
    Added,
}

/// Outcome of a clear request
#[derive(Debug, Clone, PartialEq)]
pub enum ClearOutcome {
    /// Cart had items; confirmation required before clearing
    NeedsConfirmation,
    /// Cleared (or nothing to clear)
    Cleared,
    /// A clear is already in flight, or the call failed
    Failed(String),
}

/// A completed sale, reported so the tab controller can drop the tab
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSale {
    pub cart_id: String,
}

/// Product catalog/search/cart-editing surface bound to the active cart
pub struct SaleWorkspace {
    store: CartStore,
    language: Language,
    products: Vec<Product>,
    categories: Vec<Category>,
    specifications: Vec<Specification>,
    search_term: String,
    selected_category: Option<String>,
    clearing: bool,
    completing: bool,
}

impl SaleWorkspace {
    pub fn new(store: CartStore) -> Self {
        let language = store.language();
        Self {
            store,
            language,
            products: Vec::new(),
            categories: Vec::new(),
            specifications: Vec::new(),
            search_term: String::new(),
            selected_category: None,
            clearing: false,
            completing: false,
        }
    }

    /// Install the catalog this workspace searches over
    pub fn load_catalog(
        &mut self,
        products: Vec<Product>,
        categories: Vec<Category>,
        specifications: Vec<Specification>,
    ) {
        self.products = products;
        self.categories = categories;
        self.specifications = specifications;
    }

    pub fn specifications(&self) -> &[Specification] {
        &self.specifications
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_category_filter(&mut self, category_id: Option<String>) {
        self.selected_category = category_id;
    }

    /// The cart currently bound to this workspace
    pub fn active_cart(&self) -> Option<Cart> {
        self.store.current_cart()
    }

    // ========== Smart search ==========

    /// Resolve a free-text term to a single product
    ///
    /// Priority: exact barcode for all-numeric terms of 8+ digits, then
    /// exact/near price (auto-select only when unambiguous), then exact
    /// name or barcode.
    pub fn smart_search(&self, term: &str) -> SearchResolution {
        let term = term.trim();
        if term.is_empty() {
            return SearchResolution::NoMatch;
        }

        // 1. Barcode scan: 8+ digits, numeric only
        if term.len() >= 8 && term.chars().all(|c| c.is_ascii_digit()) {
            if let Some(product) = self
                .products
                .iter()
                .find(|p| p.barcode.as_deref() == Some(term))
            {
                return SearchResolution::Match(product.clone());
            }
        }

        // 2. Price match (list or sale), within one cent
        if let Ok(price) = term.parse::<f64>() {
            let matches: Vec<&Product> = self
                .products
                .iter()
                .filter(|p| Self::price_matches(p, price))
                .collect();
            match matches.len() {
                0 => {}
                1 => return SearchResolution::Match(matches[0].clone()),
                _ => {
                    return SearchResolution::Multiple(
                        matches
                            .iter()
                            .map(|p| p.name.get(self.language).to_string())
                            .collect(),
                    );
                }
            }
        }

        // 3. Exact name (either language) or exact barcode
        if let Some(product) = self.products.iter().find(|p| {
            p.name.eq_ignore_case(term) || p.barcode.as_deref() == Some(term)
        }) {
            return SearchResolution::Match(product.clone());
        }

        SearchResolution::NoMatch
    }

    fn price_matches(product: &Product, price: f64) -> bool {
        money::money_eq(product.price, price)
            || product
                .sale_price
                .is_some_and(|sale| money::money_eq(sale, price))
    }

    // ========== Grid filtering ==========

    /// Live filter over the product grid
    ///
    /// Inclusive OR across name substring, barcode substring, near-price
    /// and category-name match; always ANDed with the selected category.
    pub fn filtered_products(&self) -> Vec<&Product> {
        let term = self.search_term.trim();
        let price = term.parse::<f64>().ok();
        let term_categories: Vec<&str> = self
            .categories
            .iter()
            .filter(|c| !term.is_empty() && c.name.contains_ignore_case(term))
            .map(|c| c.id.as_str())
            .collect();

        self.products
            .iter()
            .filter(|p| {
                if let Some(selected) = &self.selected_category {
                    if p.category_id.as_deref() != Some(selected.as_str()) {
                        return false;
                    }
                }
                if term.is_empty() {
                    return true;
                }
                p.name.contains_ignore_case(term)
                    || p.barcode.as_deref().is_some_and(|b| b.contains(term))
                    || price.is_some_and(|price| Self::price_matches(p, price))
                    || p.category_id
                        .as_deref()
                        .is_some_and(|c| term_categories.contains(&c))
            })
            .collect()
    }

    // ========== Cart editing ==========

    /// Route an add request for a product
    ///
    /// Products with specification values go through the picker; everything
    /// else is added directly with quantity 1 and empty selections.
    pub async fn add_product(&self, product: &Product) -> Result<AddRouting, Outcome<Cart>> {
        if product.has_specifications() {
            return Ok(AddRouting::PickerRequired(product.clone()));
        }

        let Some(cart) = self.store.current_cart() else {
            return Err(Outcome::fail("no active cart"));
        };

        let outcome = self
            .store
            .add_to_cart(&cart.id, product, 1, None, Vec::new(), Vec::new())
            .await;
        if outcome.is_success() {
            Ok(AddRouting::Added)
        } else {
            Err(outcome)
        }
    }

    /// Add a product with the selections a picker confirmed
    pub async fn add_with_selections(
        &self,
        product: &Product,
        quantity: i32,
        selections: crate::picker::ConfirmedSelection,
    ) -> Outcome<Cart> {
        let Some(cart) = self.store.current_cart() else {
            return Outcome::fail("no active cart");
        };
        self.store
            .add_to_cart(
                &cart.id,
                product,
                quantity,
                None,
                selections.specifications,
                selections.colors,
            )
            .await
    }

    /// Step a line item's quantity up or down
    ///
    /// A step that would land at zero or below routes to remove; the store
    /// does not accept non-positive quantities.
    pub async fn step_quantity(&self, item_id: &str, delta: i32) -> Outcome<Cart> {
        let Some(cart) = self.store.current_cart() else {
            return Outcome::fail("no active cart");
        };
        let Some(item) = cart.items.iter().find(|i| i.id == item_id) else {
            return Outcome::fail("no such item");
        };

        let next = item.quantity + delta;
        if next <= 0 {
            self.store.remove_from_cart(&cart.id, item_id).await
        } else {
            self.store.update_cart_item(&cart.id, item_id, next).await
        }
    }

    /// Remove a line item outright
    pub async fn remove_item(&self, item_id: &str) -> Outcome<Cart> {
        let Some(cart) = self.store.current_cart() else {
            return Outcome::fail("no active cart");
        };
        self.store.remove_from_cart(&cart.id, item_id).await
    }

    // ========== Clear ==========

    /// Request clearing the active cart
    ///
    /// Carts holding items require confirmation; an empty cart clears
    /// without one.
    pub async fn request_clear(&mut self) -> ClearOutcome {
        let Some(cart) = self.store.current_cart() else {
            return ClearOutcome::Failed("no active cart".to_string());
        };
        if cart.item_count() > 0 {
            return ClearOutcome::NeedsConfirmation;
        }
        self.perform_clear(&cart.id).await
    }

    /// Proceed with a confirmed clear
    pub async fn confirm_clear(&mut self) -> ClearOutcome {
        let Some(cart) = self.store.current_cart() else {
            return ClearOutcome::Failed("no active cart".to_string());
        };
        self.perform_clear(&cart.id).await
    }

    async fn perform_clear(&mut self, cart_id: &str) -> ClearOutcome {
        if self.clearing {
            return ClearOutcome::Failed("clear already in progress".to_string());
        }
        self.clearing = true;
        let outcome = self.store.clear_cart(cart_id).await;
        self.clearing = false;

        if outcome.is_success() {
            ClearOutcome::Cleared
        } else {
            ClearOutcome::Failed(outcome.message.unwrap_or_default())
        }
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    // ========== Completion ==========

    /// Complete the active cart: complete, then delete, then report
    ///
    /// Requires a non-empty cart. The tab for the completed cart must only
    /// be dropped after both server calls succeed, so the completed id is
    /// returned rather than applied here.
    pub async fn complete_order(&mut self, notes: Option<String>) -> Outcome<CompletedSale> {
        let Some(cart) = self.store.current_cart() else {
            return Outcome::fail("no active cart");
        };
        if cart.is_empty() {
            return Outcome::fail("cannot complete an empty cart");
        }
        if self.completing {
            return Outcome::fail("completion already in progress");
        }

        self.completing = true;
        let completed = self.store.complete_cart(&cart.id, notes).await;
        if !completed.is_success() {
            self.completing = false;
            return Outcome::fail(completed.message.unwrap_or_default());
        }

        let deleted = self.store.delete_cart(&cart.id).await;
        self.completing = false;
        if !deleted.is_success() {
            return Outcome::fail(deleted.message.unwrap_or_default());
        }

        tracing::info!(cart_id = %cart.id, "sale completed");
        Outcome::ok(CompletedSale { cart_id: cart.id })
    }
}
