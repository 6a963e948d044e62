//! Cart API seam
//!
//! [`CartApi`] is the transport boundary of the POS core: the store talks to
//! the REST cart service exclusively through this trait, so tests can swap
//! in a scripted implementation. [`HttpCartApi`] is the production
//! implementation over [`HttpClient`].
//!
//! # Endpoints
//!
//! | Operation | Method & Path |
//! |---|---|
//! | Create cart | `POST /api/pos-cart/{storeId}` |
//! | Get cart | `GET /api/pos-cart/cart/{cartId}` |
//! | List carts | `GET /api/pos-cart/{storeId}?status={status}` |
//! | Delete cart | `DELETE /api/pos-cart/{cartId}` |
//! | Add item | `POST /api/pos-cart/{cartId}/add` |
//! | Update item | `PUT /api/pos-cart/{cartId}/item/{itemId}` |
//! | Remove item | `DELETE /api/pos-cart/{cartId}/item/{itemId}` |
//! | Update customer | `PUT /api/pos-cart/{cartId}/customer` |
//! | Apply discount | `PUT /api/pos-cart/{cartId}/discount` |
//! | Clear cart | `POST /api/pos-cart/{cartId}/clear` |
//! | Complete cart | `POST /api/pos-cart/{cartId}/complete` |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ClientConfig, ClientError, ClientResult, HttpClient};
use shared::models::{
    Cart, CartCustomer, CartStatus, DiscountType, ProductSnapshot, SelectedColor,
    SelectedSpecification,
};
use shared::response::ApiEnvelope;

const BASE_PATH: &str = "api/pos-cart";

/// Payload for adding a line item to a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub product: ProductSnapshot,
    pub quantity: i32,
    pub price_at_add: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub selected_specifications: Vec<SelectedSpecification>,
    #[serde(default)]
    pub selected_colors: Vec<SelectedColor>,
}

/// Payload for setting a line item's quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Payload for applying a cart-level discount
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    #[serde(rename = "type")]
    pub kind: DiscountType,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Payload for completing a cart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Transport boundary to the REST cart service
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn create_cart(&self, store_id: &str) -> ClientResult<Cart>;
    async fn get_cart(&self, cart_id: &str) -> ClientResult<Cart>;
    async fn list_carts(&self, store_id: &str, status: CartStatus) -> ClientResult<Vec<Cart>>;
    async fn delete_cart(&self, cart_id: &str) -> ClientResult<()>;
    async fn add_item(&self, cart_id: &str, request: &AddItemRequest) -> ClientResult<Cart>;
    async fn update_item(
        &self,
        cart_id: &str,
        item_id: &str,
        request: &UpdateItemRequest,
    ) -> ClientResult<Cart>;
    async fn remove_item(&self, cart_id: &str, item_id: &str) -> ClientResult<Cart>;
    async fn update_customer(&self, cart_id: &str, customer: &CartCustomer) -> ClientResult<Cart>;
    async fn apply_discount(&self, cart_id: &str, request: &DiscountRequest) -> ClientResult<Cart>;
    async fn clear_cart(&self, cart_id: &str) -> ClientResult<Cart>;
    async fn complete_cart(&self, cart_id: &str, request: &CompleteRequest) -> ClientResult<Cart>;

    /// Liveness probe on the deployment's `GET /health`
    async fn health_check(&self) -> ClientResult<()>;
}

/// Production [`CartApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    http: HttpClient,
}

impl HttpCartApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: HttpClient::new(config),
        }
    }

    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    /// Unwrap an envelope that must carry data
    fn require_data<T>(envelope: ApiEnvelope<T>) -> ClientResult<T> {
        envelope
            .into_data()
            .map_err(|e| ClientError::Api(e.message))?
            .ok_or_else(|| ClientError::InvalidResponse("missing response data".to_string()))
    }

    /// Unwrap an envelope where data is optional
    fn require_ok<T>(envelope: ApiEnvelope<T>) -> ClientResult<()> {
        envelope.into_data().map_err(|e| ClientError::Api(e.message))?;
        Ok(())
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn create_cart(&self, store_id: &str) -> ClientResult<Cart> {
        let envelope = self
            .http
            .post_empty::<ApiEnvelope<Cart>>(&format!("{BASE_PATH}/{store_id}"))
            .await?;
        Self::require_data(envelope)
    }

    async fn get_cart(&self, cart_id: &str) -> ClientResult<Cart> {
        let envelope = self
            .http
            .get::<ApiEnvelope<Cart>>(&format!("{BASE_PATH}/cart/{cart_id}"))
            .await?;
        Self::require_data(envelope)
    }

    async fn list_carts(&self, store_id: &str, status: CartStatus) -> ClientResult<Vec<Cart>> {
        let envelope = self
            .http
            .get::<ApiEnvelope<Vec<Cart>>>(&format!(
                "{BASE_PATH}/{store_id}?status={}",
                status.as_str()
            ))
            .await?;
        Self::require_data(envelope)
    }

    async fn delete_cart(&self, cart_id: &str) -> ClientResult<()> {
        let envelope = self
            .http
            .delete::<ApiEnvelope<serde_json::Value>>(&format!("{BASE_PATH}/{cart_id}"))
            .await?;
        Self::require_ok(envelope)
    }

    async fn add_item(&self, cart_id: &str, request: &AddItemRequest) -> ClientResult<Cart> {
        let envelope = self
            .http
            .post::<ApiEnvelope<Cart>, _>(&format!("{BASE_PATH}/{cart_id}/add"), request)
            .await?;
        Self::require_data(envelope)
    }

    async fn update_item(
        &self,
        cart_id: &str,
        item_id: &str,
        request: &UpdateItemRequest,
    ) -> ClientResult<Cart> {
        let envelope = self
            .http
            .put::<ApiEnvelope<Cart>, _>(
                &format!("{BASE_PATH}/{cart_id}/item/{item_id}"),
                request,
            )
            .await?;
        Self::require_data(envelope)
    }

    async fn remove_item(&self, cart_id: &str, item_id: &str) -> ClientResult<Cart> {
        let envelope = self
            .http
            .delete::<ApiEnvelope<Cart>>(&format!("{BASE_PATH}/{cart_id}/item/{item_id}"))
            .await?;
        Self::require_data(envelope)
    }

    async fn update_customer(&self, cart_id: &str, customer: &CartCustomer) -> ClientResult<Cart> {
        let envelope = self
            .http
            .put::<ApiEnvelope<Cart>, _>(&format!("{BASE_PATH}/{cart_id}/customer"), customer)
            .await?;
        Self::require_data(envelope)
    }

    async fn apply_discount(&self, cart_id: &str, request: &DiscountRequest) -> ClientResult<Cart> {
        let envelope = self
            .http
            .put::<ApiEnvelope<Cart>, _>(&format!("{BASE_PATH}/{cart_id}/discount"), request)
            .await?;
        Self::require_data(envelope)
    }

    async fn clear_cart(&self, cart_id: &str) -> ClientResult<Cart> {
        let envelope = self
            .http
            .post_empty::<ApiEnvelope<Cart>>(&format!("{BASE_PATH}/{cart_id}/clear"))
            .await?;
        Self::require_data(envelope)
    }

    async fn complete_cart(&self, cart_id: &str, request: &CompleteRequest) -> ClientResult<Cart> {
        let envelope = self
            .http
            .post::<ApiEnvelope<Cart>, _>(&format!("{BASE_PATH}/{cart_id}/complete"), request)
            .await?;
        Self::require_data(envelope)
    }

    async fn health_check(&self) -> ClientResult<()> {
        let _ = self
            .http
            .get::<serde_json::Value>("health")
            .await?;
        Ok(())
    }
}
