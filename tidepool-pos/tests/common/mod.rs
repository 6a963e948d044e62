//! In-process mock of the cart API for integration tests
//!
//! Serves the same routes and envelope as the real service, records every
//! call in order, and can delay or fail individual endpoints so tests can
//! steer response interleavings.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use shared::models::{Cart, CartCustomer, CartLineItem, CartStatus};
use shared::response::ApiEnvelope;
use shared::LocalizedText;
use tidepool_pos::api::{AddItemRequest, DiscountRequest, UpdateItemRequest};

#[derive(Default)]
pub struct MockState {
    /// Carts in insertion order (list responses preserve it)
    pub carts: Mutex<Vec<Cart>>,
    pub calls: Mutex<Vec<String>>,
    pub get_cart_hits: AtomicUsize,
    pub list_hits: AtomicUsize,
    /// Per-cart delay before `get cart` responds, in milliseconds
    pub get_delays: Mutex<HashMap<String, u64>>,
    /// Delay before `list carts` responds, in milliseconds
    pub list_delay_ms: AtomicU64,
    /// When set, `delete cart` responds with `success: false`
    pub fail_delete: AtomicBool,
    next_id: AtomicUsize,
}

impl MockState {
    pub fn log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn seed(&self, cart: Cart) {
        self.carts.lock().unwrap().push(cart);
    }

    pub fn delay_get(&self, cart_id: &str, millis: u64) {
        self.get_delays
            .lock()
            .unwrap()
            .insert(cart_id.to_string(), millis);
    }

    pub fn cart(&self, cart_id: &str) -> Option<Cart> {
        self.carts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == cart_id)
            .cloned()
    }

    fn record(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }

    /// Recompute totals the way the real service does
    fn recompute(cart: &mut Cart) {
        let total: f64 = cart
            .items
            .iter()
            .map(|item| item.price_at_add * f64::from(item.quantity))
            .sum();
        cart.subtotal = total;
        cart.total = total;
    }
}

/// A cart with `quantity` units of one line at `price`
pub fn cart_with_items(id: &str, store_id: &str, price: f64, quantity: i32) -> Cart {
    let items = if quantity > 0 {
        vec![CartLineItem {
            id: format!("{id}-item-1"),
            product: Default::default(),
            quantity,
            variant_id: None,
            price_at_add: price,
            selected_specifications: Vec::new(),
            selected_colors: Vec::new(),
        }]
    } else {
        Vec::new()
    };
    let total = price * f64::from(quantity.max(0));
    Cart {
        id: id.to_string(),
        name: LocalizedText::new(format!("Cart {id}"), format!("سلة {id}")),
        admin_id: None,
        store_id: store_id.to_string(),
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

pub async fn spawn_mock() -> (Arc<MockState>, String) {
    let state = Arc::new(MockState::default());
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    (state, format!("http://{addr}"))
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/pos-cart/cart/{cart_id}", get(get_cart))
        .route(
            "/api/pos-cart/{id}",
            post(create_cart).get(list_carts).delete(delete_cart),
        )
        .route("/api/pos-cart/{cart_id}/add", post(add_item))
        .route(
            "/api/pos-cart/{cart_id}/item/{item_id}",
            put(update_item).delete(remove_item),
        )
        .route("/api/pos-cart/{cart_id}/customer", put(update_customer))
        .route("/api/pos-cart/{cart_id}/discount", put(apply_discount))
        .route("/api/pos-cart/{cart_id}/clear", post(clear_cart))
        .route("/api/pos-cart/{cart_id}/complete", post(complete_cart))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_cart(
    State(state): State<Arc<MockState>>,
    Path(store_id): Path<String>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("create {store_id}"));
    let n = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let cart = cart_with_items(&format!("cart-{n}"), &store_id, 0.0, 0);
    state.seed(cart.clone());
    Json(ApiEnvelope::ok(cart))
}

async fn get_cart(
    State(state): State<Arc<MockState>>,
    Path(cart_id): Path<String>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("get {cart_id}"));
    state.get_cart_hits.fetch_add(1, Ordering::SeqCst);

    let delay = state.get_delays.lock().unwrap().get(&cart_id).copied();
    if let Some(millis) = delay {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    match state.cart(&cart_id) {
        Some(cart) => Json(ApiEnvelope::ok(cart)),
        None => Json(ApiEnvelope::fail("Cart not found")),
    }
}

async fn list_carts(
    State(state): State<Arc<MockState>>,
    Path(store_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<ApiEnvelope<Vec<Cart>>> {
    state.record(format!("list {store_id}"));
    state.list_hits.fetch_add(1, Ordering::SeqCst);

    let millis = state.list_delay_ms.load(Ordering::SeqCst);
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    let status = query
        .get("status")
        .map(String::as_str)
        .unwrap_or("ACTIVE");
    let carts = state
        .carts
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.store_id == store_id && c.status.as_str() == status)
        .cloned()
        .collect();
    Json(ApiEnvelope::ok(carts))
}

async fn delete_cart(
    State(state): State<Arc<MockState>>,
    Path(cart_id): Path<String>,
) -> Json<ApiEnvelope<serde_json::Value>> {
    state.record(format!("delete {cart_id}"));
    if state.fail_delete.load(Ordering::SeqCst) {
        return Json(ApiEnvelope::fail("Delete rejected"));
    }
    state.carts.lock().unwrap().retain(|c| c.id != cart_id);
    Json(ApiEnvelope::ok(serde_json::json!({ "deleted": true })))
}

async fn add_item(
    State(state): State<Arc<MockState>>,
    Path(cart_id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("add {cart_id}"));
    let mut carts = state.carts.lock().unwrap();
    let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
        return Json(ApiEnvelope::fail("Cart not found"));
    };
    let item = CartLineItem {
        id: format!("{cart_id}-item-{}", cart.items.len() + 1),
        product: request.product,
        quantity: request.quantity,
        variant_id: request.variant_id,
        price_at_add: request.price_at_add,
        selected_specifications: request.selected_specifications,
        selected_colors: request.selected_colors,
    };
    cart.items.push(item);
    MockState::recompute(cart);
    Json(ApiEnvelope::ok(cart.clone()))
}

async fn update_item(
    State(state): State<Arc<MockState>>,
    Path((cart_id, item_id)): Path<(String, String)>,
    Json(request): Json<UpdateItemRequest>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("update {cart_id}/{item_id}"));
    let mut carts = state.carts.lock().unwrap();
    let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
        return Json(ApiEnvelope::fail("Cart not found"));
    };
    let Some(item) = cart.items.iter_mut().find(|i| i.id == item_id) else {
        return Json(ApiEnvelope::fail("Item not found"));
    };
    item.quantity = request.quantity;
    MockState::recompute(cart);
    Json(ApiEnvelope::ok(cart.clone()))
}

async fn remove_item(
    State(state): State<Arc<MockState>>,
    Path((cart_id, item_id)): Path<(String, String)>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("remove {cart_id}/{item_id}"));
    let mut carts = state.carts.lock().unwrap();
    let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
        return Json(ApiEnvelope::fail("Cart not found"));
    };
    cart.items.retain(|i| i.id != item_id);
    MockState::recompute(cart);
    Json(ApiEnvelope::ok(cart.clone()))
}

async fn update_customer(
    State(state): State<Arc<MockState>>,
    Path(cart_id): Path<String>,
    Json(customer): Json<CartCustomer>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("customer {cart_id}"));
    let mut carts = state.carts.lock().unwrap();
    let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
        return Json(ApiEnvelope::fail("Cart not found"));
    };
    cart.customer = Some(customer);
    Json(ApiEnvelope::ok(cart.clone()))
}

async fn apply_discount(
    State(state): State<Arc<MockState>>,
    Path(cart_id): Path<String>,
    Json(request): Json<DiscountRequest>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("discount {cart_id}"));
    let mut carts = state.carts.lock().unwrap();
    let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
        return Json(ApiEnvelope::fail("Cart not found"));
    };
    cart.discount = Some(shared::models::CartDiscount {
        kind: request.kind,
        value: request.value,
        reason: request.reason,
    });
    Json(ApiEnvelope::ok(cart.clone()))
}

async fn clear_cart(
    State(state): State<Arc<MockState>>,
    Path(cart_id): Path<String>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("clear {cart_id}"));
    let mut carts = state.carts.lock().unwrap();
    let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
        return Json(ApiEnvelope::fail("Cart not found"));
    };
    // items go, but the stale totals are deliberately left behind: the
    // client is responsible for never displaying them
    cart.items.clear();
    Json(ApiEnvelope::ok(cart.clone()))
}

async fn complete_cart(
    State(state): State<Arc<MockState>>,
    Path(cart_id): Path<String>,
) -> Json<ApiEnvelope<Cart>> {
    state.record(format!("complete {cart_id}"));
    let mut carts = state.carts.lock().unwrap();
    let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id) else {
        return Json(ApiEnvelope::fail("Cart not found"));
    };
    cart.status = CartStatus::Completed;
    Json(ApiEnvelope::ok(cart.clone()))
}
