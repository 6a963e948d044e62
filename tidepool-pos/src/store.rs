//! CartStore - canonical client-side view of open carts
//!
//! Owns the single "current cart" slot and the per-store cart list, and
//! wraps every remote cart call. State lives behind one lock with a
//! single-writer convention (only this module mutates it); dependents read
//! snapshots or subscribe to the watch channel.
//!
//! Two rules keep interleaved async completions from corrupting the slot:
//!
//! - **Clear-before-switch**: any operation targeting a different cart than
//!   the held one clears the held cart before the request goes out, so the
//!   UI never renders cart A's data under cart B's tab.
//! - **Generation counter**: every install/clear bumps a generation; a
//!   fetch only applies its response if the generation it captured is still
//!   current. A response that lost the race is discarded outright.
//!
//! No operation throws across the boundary: everything resolves to an
//! [`Outcome`] and failures are localized into the store's error slot.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::api::{
    AddItemRequest, CartApi, CompleteRequest, DiscountRequest, HttpCartApi, UpdateItemRequest,
};
use crate::freshness::{CacheStamp, LIST_CACHE_WINDOW};
use crate::localize::{client_error_message, LocalizedMessage};
use crate::{ClientConfig, ClientError};
use shared::models::{
    Cart, CartCustomer, CartStatus, DiscountType, Product, SelectedColor, SelectedSpecification,
};
use shared::Language;

/// Uniform result envelope for store operations
///
/// Store calls never reject; a failed call resolves with `success: false`
/// and a localized message.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[derive(Default)]
struct CartState {
    current: Option<Cart>,
    carts: Vec<Cart>,
    list_store_id: Option<String>,
    list_status: Option<CartStatus>,
    list_stamp: Option<CacheStamp>,
    error: Option<LocalizedMessage>,
    generation: u64,
    op_in_flight: bool,
}

/// Client-side store over the remote cart API
#[derive(Clone)]
pub struct CartStore {
    state: Arc<RwLock<CartState>>,
    api: Arc<dyn CartApi>,
    language: Language,
    current_tx: Arc<watch::Sender<Option<Cart>>>,
}

impl CartStore {
    /// Create a store backed by the production HTTP transport
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_api(Arc::new(HttpCartApi::new(config)), config.language)
    }

    /// Create a store over any transport (tests use a scripted one)
    pub fn with_api(api: Arc<dyn CartApi>, language: Language) -> Self {
        let (current_tx, _) = watch::channel(None);
        Self {
            state: Arc::new(RwLock::new(CartState::default())),
            api,
            language,
            current_tx: Arc::new(current_tx),
        }
    }

    // ========== Read access ==========

    /// Snapshot of the held current cart
    pub fn current_cart(&self) -> Option<Cart> {
        self.state.read().current.clone()
    }

    /// Snapshot of the last fetched cart list
    pub fn carts(&self) -> Vec<Cart> {
        self.state.read().carts.clone()
    }

    /// The last stored failure, if any
    pub fn last_error(&self) -> Option<LocalizedMessage> {
        self.state.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.write().error = None;
    }

    /// Whether a cart operation is currently in flight
    pub fn is_busy(&self) -> bool {
        self.state.read().op_in_flight
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Subscribe to current-cart changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Cart>> {
        self.current_tx.subscribe()
    }

    /// Drop the held current cart (tab switches do this before loading)
    pub fn clear_current(&self) {
        {
            let mut state = self.state.write();
            state.current = None;
            state.generation += 1;
        }
        self.publish_current();
    }

    // ========== Cart lifecycle ==========

    /// Request a new cart for a store
    ///
    /// On success the cart list for that store is force-refreshed so tabs
    /// discover the new cart.
    pub async fn create_cart(&self, store_id: &str) -> Outcome<Cart> {
        self.set_busy(true);
        let result = self.api.create_cart(store_id).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                tracing::info!(cart_id = %cart.id, %store_id, "cart created");
                let _ = self
                    .get_all_carts(store_id, CartStatus::Active, true)
                    .await;
                Outcome::ok(cart)
            }
            Err(err) => self.fail("create_cart", err),
        }
    }

    /// Fetch one cart
    ///
    /// Short-circuits without a network call when the held cart already has
    /// this id and `force_refresh` is false. Switching to a different cart
    /// clears the held one first.
    pub async fn get_cart(&self, cart_id: &str, force_refresh: bool) -> Outcome<Cart> {
        let generation = {
            let mut state = self.state.write();
            if !force_refresh {
                if let Some(current) = state.current.as_ref().filter(|c| c.id == cart_id) {
                    tracing::debug!(%cart_id, "get_cart served from held cart");
                    return Outcome::ok(current.clone());
                }
            }
            if state.current.as_ref().is_some_and(|c| c.id != cart_id) {
                state.current = None;
            }
            state.generation += 1;
            state.generation
        };
        self.publish_current();

        self.set_busy(true);
        let result = self.api.get_cart(cart_id).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                {
                    let mut state = self.state.write();
                    if state.generation != generation {
                        drop(state);
                        tracing::debug!(%cart_id, "discarding superseded cart response");
                        return self.fail("get_cart", ClientError::Stale);
                    }
                    state.current = Some(cart.clone());
                }
                self.publish_current();
                Outcome::ok(cart)
            }
            Err(err) => self.fail("get_cart", err),
        }
    }

    /// Fetch the list of carts for a store filtered by status
    ///
    /// Skips the network call when the previous fetch for the same
    /// store/status completed within [`LIST_CACHE_WINDOW`] and
    /// `force_refresh` is false.
    pub async fn get_all_carts(
        &self,
        store_id: &str,
        status: CartStatus,
        force_refresh: bool,
    ) -> Outcome<Vec<Cart>> {
        {
            let state = self.state.read();
            let fresh = state
                .list_stamp
                .is_some_and(|stamp| stamp.is_fresh(std::time::Instant::now(), LIST_CACHE_WINDOW));
            if !force_refresh
                && fresh
                && state.list_store_id.as_deref() == Some(store_id)
                && state.list_status == Some(status)
            {
                tracing::debug!(%store_id, "cart list served from cache window");
                return Outcome::ok(state.carts.clone());
            }
        }

        self.set_busy(true);
        let result = self.api.list_carts(store_id, status).await;
        self.set_busy(false);

        match result {
            Ok(carts) => {
                let mut state = self.state.write();
                state.carts = carts.clone();
                state.list_store_id = Some(store_id.to_string());
                state.list_status = Some(status);
                state.list_stamp = Some(CacheStamp::now());
                Outcome::ok(carts)
            }
            Err(err) => self.fail("get_all_carts", err),
        }
    }

    /// Delete a cart outright
    pub async fn delete_cart(&self, cart_id: &str) -> Outcome<()> {
        self.prepare_target(cart_id);

        self.set_busy(true);
        let result = self.api.delete_cart(cart_id).await;
        self.set_busy(false);

        match result {
            Ok(()) => {
                {
                    let mut state = self.state.write();
                    state.generation += 1;
                    state.carts.retain(|c| c.id != cart_id);
                    if state.current.as_ref().is_some_and(|c| c.id == cart_id) {
                        state.current = None;
                    }
                }
                self.publish_current();
                tracing::info!(%cart_id, "cart deleted");
                Outcome::done()
            }
            Err(err) => self.fail("delete_cart", err),
        }
    }

    /// Complete a cart (status becomes COMPLETED server-side)
    pub async fn complete_cart(&self, cart_id: &str, notes: Option<String>) -> Outcome<Cart> {
        self.prepare_target(cart_id);
        let request = CompleteRequest { notes };

        self.set_busy(true);
        let result = self.api.complete_cart(cart_id, &request).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                {
                    let mut state = self.state.write();
                    state.generation += 1;
                    // a completed cart no longer belongs in the active list
                    state.carts.retain(|c| c.id != cart.id);
                    state.current = Some(cart.clone());
                }
                self.publish_current();
                tracing::info!(%cart_id, total = cart.display_total(), "cart completed");
                Outcome::ok(cart)
            }
            Err(err) => self.fail("complete_cart", err),
        }
    }

    // ========== Line item mutations ==========

    /// Add a line item, snapshotting the effective unit price
    ///
    /// `price_at_add` is the sale price when the product is currently on
    /// sale, else the list price; the server must not re-derive it later.
    pub async fn add_to_cart(
        &self,
        cart_id: &str,
        product: &Product,
        quantity: i32,
        variant_id: Option<String>,
        selected_specifications: Vec<SelectedSpecification>,
        selected_colors: Vec<SelectedColor>,
    ) -> Outcome<Cart> {
        self.prepare_target(cart_id);

        let request = AddItemRequest {
            product_id: product.id.clone(),
            product: product.snapshot(),
            quantity,
            price_at_add: product.effective_unit_price(),
            variant_id,
            selected_specifications,
            selected_colors,
        };

        self.set_busy(true);
        let result = self.api.add_item(cart_id, &request).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                tracing::debug!(%cart_id, product_id = %product.id, quantity, "item added");
                self.install_current(cart.clone());
                Outcome::ok(cart)
            }
            Err(err) => self.fail("add_to_cart", err),
        }
    }

    /// Set a line item's quantity
    ///
    /// Quantity must be positive: callers route zero/negative steps to
    /// [`CartStore::remove_from_cart`]. A non-positive value is rejected
    /// here without a network call.
    pub async fn update_cart_item(
        &self,
        cart_id: &str,
        item_id: &str,
        quantity: i32,
    ) -> Outcome<Cart> {
        if quantity <= 0 {
            return self.fail(
                "update_cart_item",
                ClientError::Validation(
                    "quantity must be positive; remove the item instead".to_string(),
                ),
            );
        }

        self.prepare_target(cart_id);
        let request = UpdateItemRequest { quantity };

        self.set_busy(true);
        let result = self.api.update_item(cart_id, item_id, &request).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                self.install_current(cart.clone());
                Outcome::ok(cart)
            }
            Err(err) => self.fail("update_cart_item", err),
        }
    }

    /// Delete a line item
    pub async fn remove_from_cart(&self, cart_id: &str, item_id: &str) -> Outcome<Cart> {
        self.prepare_target(cart_id);

        self.set_busy(true);
        let result = self.api.remove_item(cart_id, item_id).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                self.install_current(cart.clone());
                Outcome::ok(cart)
            }
            Err(err) => self.fail("remove_from_cart", err),
        }
    }

    // ========== Cart-level mutations ==========

    /// Attach or update customer contact details
    pub async fn update_customer(&self, cart_id: &str, customer: CartCustomer) -> Outcome<Cart> {
        self.prepare_target(cart_id);

        self.set_busy(true);
        let result = self.api.update_customer(cart_id, &customer).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                self.install_current(cart.clone());
                Outcome::ok(cart)
            }
            Err(err) => self.fail("update_customer", err),
        }
    }

    /// Apply a cart-level discount
    pub async fn apply_discount(
        &self,
        cart_id: &str,
        kind: DiscountType,
        value: f64,
        reason: Option<String>,
    ) -> Outcome<Cart> {
        self.prepare_target(cart_id);
        let request = DiscountRequest {
            kind,
            value,
            reason,
        };

        self.set_busy(true);
        let result = self.api.apply_discount(cart_id, &request).await;
        self.set_busy(false);

        match result {
            Ok(cart) => {
                self.install_current(cart.clone());
                Outcome::ok(cart)
            }
            Err(err) => self.fail("apply_discount", err),
        }
    }

    /// Remove all items from a cart
    ///
    /// When the server reports an empty item list the totals are forced to
    /// zero client-side so a stale positive total never survives a clear.
    pub async fn clear_cart(&self, cart_id: &str) -> Outcome<Cart> {
        self.prepare_target(cart_id);

        self.set_busy(true);
        let result = self.api.clear_cart(cart_id).await;
        self.set_busy(false);

        match result {
            Ok(mut cart) => {
                if cart.items.is_empty() {
                    cart.total = 0.0;
                    cart.subtotal = 0.0;
                }
                self.install_current(cart.clone());
                tracing::debug!(%cart_id, "cart cleared");
                Outcome::ok(cart)
            }
            Err(err) => self.fail("clear_cart", err),
        }
    }

    // ========== Internal ==========

    /// Clear-before-switch: targeting a different cart than the held one
    /// drops the held cart before the request goes out
    fn prepare_target(&self, cart_id: &str) {
        let cleared = {
            let mut state = self.state.write();
            if state.current.as_ref().is_some_and(|c| c.id != cart_id) {
                state.current = None;
                state.generation += 1;
                true
            } else {
                false
            }
        };
        if cleared {
            tracing::debug!(%cart_id, "held cart cleared before switching target");
            self.publish_current();
        }
    }

    /// Install a fresh cart as current and patch the list entry
    fn install_current(&self, cart: Cart) {
        {
            let mut state = self.state.write();
            state.generation += 1;
            if let Some(entry) = state.carts.iter_mut().find(|c| c.id == cart.id) {
                *entry = cart.clone();
            }
            state.current = Some(cart);
        }
        self.publish_current();
    }

    fn publish_current(&self) {
        let current = self.state.read().current.clone();
        self.current_tx.send_replace(current);
    }

    fn set_busy(&self, busy: bool) {
        self.state.write().op_in_flight = busy;
    }

    /// Localize, record, and wrap a failure
    fn fail<T>(&self, op: &'static str, err: ClientError) -> Outcome<T> {
        let localized = client_error_message(&err, self.language);
        tracing::warn!(op, error = %err, "cart operation failed");
        if !matches!(err, ClientError::Stale) {
            self.state.write().error = Some(localized.clone());
        }
        Outcome::fail(localized.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared::LocalizedText;

    /// Scripted transport that records calls and serves canned carts
    #[derive(Default)]
    struct ScriptedApi {
        carts: Mutex<Vec<Cart>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn with_cart(cart: Cart) -> Self {
            Self {
                carts: Mutex::new(vec![cart]),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        fn lookup(&self, cart_id: &str) -> crate::ClientResult<Cart> {
            self.carts
                .lock()
                .iter()
                .find(|c| c.id == cart_id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(cart_id.to_string()))
        }
    }

    #[async_trait]
    impl CartApi for ScriptedApi {
        async fn create_cart(&self, store_id: &str) -> crate::ClientResult<Cart> {
            self.calls.lock().push(format!("create {store_id}"));
            let cart = test_cart("cart-new", 0.0, 0);
            self.carts.lock().push(cart.clone());
            Ok(cart)
        }

        async fn get_cart(&self, cart_id: &str) -> crate::ClientResult<Cart> {
            self.calls.lock().push(format!("get {cart_id}"));
            self.lookup(cart_id)
        }

        async fn list_carts(
            &self,
            store_id: &str,
            _status: CartStatus,
        ) -> crate::ClientResult<Vec<Cart>> {
            self.calls.lock().push(format!("list {store_id}"));
            Ok(self.carts.lock().clone())
        }

        async fn delete_cart(&self, cart_id: &str) -> crate::ClientResult<()> {
            self.calls.lock().push(format!("delete {cart_id}"));
            self.carts.lock().retain(|c| c.id != cart_id);
            Ok(())
        }

        async fn add_item(
            &self,
            cart_id: &str,
            request: &AddItemRequest,
        ) -> crate::ClientResult<Cart> {
            self.calls
                .lock()
                .push(format!("add {cart_id} @{}", request.price_at_add));
            self.lookup(cart_id)
        }

        async fn update_item(
            &self,
            cart_id: &str,
            item_id: &str,
            request: &UpdateItemRequest,
        ) -> crate::ClientResult<Cart> {
            self.calls
                .lock()
                .push(format!("update {cart_id}/{item_id} q{}", request.quantity));
            self.lookup(cart_id)
        }

        async fn remove_item(&self, cart_id: &str, item_id: &str) -> crate::ClientResult<Cart> {
            self.calls.lock().push(format!("remove {cart_id}/{item_id}"));
            self.lookup(cart_id)
        }

        async fn update_customer(
            &self,
            cart_id: &str,
            _customer: &CartCustomer,
        ) -> crate::ClientResult<Cart> {
            self.calls.lock().push(format!("customer {cart_id}"));
            self.lookup(cart_id)
        }

        async fn apply_discount(
            &self,
            cart_id: &str,
            _request: &DiscountRequest,
        ) -> crate::ClientResult<Cart> {
            self.calls.lock().push(format!("discount {cart_id}"));
            self.lookup(cart_id)
        }

        async fn clear_cart(&self, cart_id: &str) -> crate::ClientResult<Cart> {
            self.calls.lock().push(format!("clear {cart_id}"));
            let mut cart = self.lookup(cart_id)?;
            cart.items.clear();
            // deliberately leave the stale totals in place
            Ok(cart)
        }

        async fn complete_cart(
            &self,
            cart_id: &str,
            _request: &CompleteRequest,
        ) -> crate::ClientResult<Cart> {
            self.calls.lock().push(format!("complete {cart_id}"));
            let mut cart = self.lookup(cart_id)?;
            cart.status = CartStatus::Completed;
            Ok(cart)
        }

        async fn health_check(&self) -> crate::ClientResult<()> {
            Ok(())
        }
    }

    fn test_cart(id: &str, total: f64, item_quantity: i32) -> Cart {
        let items = if item_quantity > 0 {
            vec![shared::models::CartLineItem {
                id: format!("{id}-item"),
                product: Default::default(),
                quantity: item_quantity,
                variant_id: None,
                price_at_add: 10.0,
                selected_specifications: Vec::new(),
                selected_colors: Vec::new(),
            }]
        } else {
            Vec::new()
        };
        Cart {
            id: id.to_string(),
            name: LocalizedText::new("Cart", "سلة"),
            admin_id: None,
            store_id: "store-1".to_string(),
            customer: None,
            items,
            subtotal: total,
            tax: None,
            discount: None,
            total,
            payment: None,
            notes: None,
            status: CartStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    fn store_over(api: ScriptedApi) -> (CartStore, Arc<ScriptedApi>) {
        let api = Arc::new(api);
        let store = CartStore::with_api(api.clone(), Language::En);
        (store, api)
    }

    #[tokio::test]
    async fn get_cart_short_circuits_on_held_id() {
        let (store, api) = store_over(ScriptedApi::with_cart(test_cart("c1", 10.0, 1)));

        let first = store.get_cart("c1", false).await;
        assert!(first.is_success());
        let second = store.get_cart("c1", false).await;
        assert!(second.is_success());

        assert_eq!(api.calls(), vec!["get c1"]);
        assert_eq!(
            first.into_data().map(|c| c.id),
            second.into_data().map(|c| c.id)
        );
    }

    #[tokio::test]
    async fn get_cart_force_refresh_refetches() {
        let (store, api) = store_over(ScriptedApi::with_cart(test_cart("c1", 10.0, 1)));

        store.get_cart("c1", false).await;
        store.get_cart("c1", true).await;
        assert_eq!(api.calls(), vec!["get c1", "get c1"]);
    }

    #[tokio::test]
    async fn switching_carts_clears_held_before_fetch() {
        let api = ScriptedApi::with_cart(test_cart("a", 10.0, 1));
        api.carts.lock().push(test_cart("b", 20.0, 2));
        let (store, _) = store_over(api);
        let mut updates = store.subscribe();

        store.get_cart("a", false).await;
        updates.borrow_and_update();
        store.get_cart("b", false).await;

        // the slot went through None before b was installed
        assert!(updates.has_changed().unwrap());
        assert_eq!(store.current_cart().map(|c| c.id), Some("b".to_string()));
    }

    #[tokio::test]
    async fn update_item_rejects_non_positive_quantity_locally() {
        let (store, api) = store_over(ScriptedApi::with_cart(test_cart("c1", 10.0, 1)));

        let outcome = store.update_cart_item("c1", "c1-item", 0).await;
        assert!(!outcome.is_success());
        assert!(api.calls().is_empty());
        assert!(store.last_error().is_some());
    }

    #[tokio::test]
    async fn clear_cart_forces_totals_to_zero() {
        let (store, _) = store_over(ScriptedApi::with_cart(test_cart("c1", 30.0, 3)));

        let outcome = store.clear_cart("c1").await;
        let cart = outcome.into_data().unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0.0);
        assert_eq!(cart.subtotal, 0.0);
        assert_eq!(cart.display_total(), 0.0);
    }

    #[tokio::test]
    async fn add_to_cart_snapshots_sale_price() {
        let (store, api) = store_over(ScriptedApi::with_cart(test_cart("c1", 0.0, 0)));

        let product = Product {
            id: "p1".to_string(),
            name: LocalizedText::new("Tea", "شاي"),
            barcode: None,
            price: 20.0,
            sale_price: Some(15.0),
            is_on_sale: true,
            stock: 5,
            images: Vec::new(),
            category_id: None,
            specification_values: Vec::new(),
            colors: Vec::new(),
        };

        store
            .add_to_cart("c1", &product, 1, None, Vec::new(), Vec::new())
            .await;
        assert_eq!(api.calls(), vec!["add c1 @15"]);
    }

    #[tokio::test]
    async fn failures_store_localized_error() {
        let (store, _) = store_over(ScriptedApi::default());

        let outcome = store.get_cart("missing", false).await;
        assert!(!outcome.is_success());
        let error = store.last_error().unwrap();
        assert_eq!(error.title, "Not found");
    }

    #[tokio::test]
    async fn list_is_cached_within_window() {
        let (store, api) = store_over(ScriptedApi::with_cart(test_cart("c1", 10.0, 1)));

        store.get_all_carts("store-1", CartStatus::Active, false).await;
        store.get_all_carts("store-1", CartStatus::Active, false).await;
        assert_eq!(api.calls(), vec!["list store-1"]);

        store.get_all_carts("store-1", CartStatus::Active, true).await;
        assert_eq!(api.calls(), vec!["list store-1", "list store-1"]);
    }
}
