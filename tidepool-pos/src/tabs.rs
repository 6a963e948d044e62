//! TabController - tabbed view over the open carts
//!
//! Each server-side cart maps to one UI tab. Tabs are derived caches of
//! cart summaries (total, item count, status), never the source of truth;
//! they resync from the live cart whenever it is the active one and no
//! tab-level load is in flight.
//!
//! Closure runs a small confirmation state machine: a tab holding items
//! must be confirmed before its cart is deleted, an empty tab closes
//! immediately. A cart completed by the workspace closes its tab without a
//! second server delete (the workspace already issued complete + delete).

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::freshness::RefreshDebounce;
use crate::store::{CartStore, Outcome};
use shared::models::{Cart, CartStatus};
use shared::LocalizedText;

/// UI-local projection of one cart
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: String,
    pub name: LocalizedText,
    pub status: CartStatus,
    pub total: f64,
    pub item_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Tab {
    /// Derive a tab from cart data (same fallback-total rule as the store)
    fn from_cart(cart: &Cart) -> Self {
        Self {
            id: cart.id.clone(),
            name: cart.name.clone(),
            status: cart.status,
            total: cart.display_total(),
            item_count: cart.item_count(),
            created_at: cart.created_at.unwrap_or_else(Utc::now),
        }
    }

    /// Refresh the cached summary from live cart data
    fn sync_from(&mut self, cart: &Cart) {
        self.status = cart.status;
        self.total = cart.display_total();
        self.item_count = cart.item_count();
    }
}

/// Result of a close request
#[derive(Debug, Clone, PartialEq)]
pub enum CloseTabOutcome {
    /// Tab closed (and its cart deleted when user-initiated)
    Closed,
    /// The tab holds items; call `confirm_close_tab` to proceed
    NeedsConfirmation,
    /// No such tab
    NotFound,
    /// Server call failed; the tab stays
    Failed(String),
}

#[derive(Default)]
struct TabState {
    tabs: Vec<Tab>,
    active: Option<String>,
    loading: bool,
    debounce: RefreshDebounce,
    pending_close: Option<String>,
}

/// State machine over the set of open tabs plus one active-tab pointer
#[derive(Clone)]
pub struct TabController {
    state: Arc<RwLock<TabState>>,
    store: CartStore,
    store_id: String,
}

impl TabController {
    pub fn new(store: CartStore, store_id: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(TabState::default())),
            store,
            store_id: store_id.into(),
        }
    }

    // ========== Read access ==========

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.read().tabs.clone()
    }

    pub fn active_tab_id(&self) -> Option<String> {
        self.state.read().active.clone()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        let state = self.state.read();
        let active = state.active.as_deref()?;
        state.tabs.iter().find(|t| t.id == active).cloned()
    }

    /// Whether a tab-level load is in flight
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn pending_close(&self) -> Option<String> {
        self.state.read().pending_close.clone()
    }

    // ========== Tab lifecycle ==========

    /// Fetch all active carts and map them to tabs
    ///
    /// When no tab is active yet, the first loaded tab becomes active and
    /// its cart is loaded so the workspace has something to render.
    pub async fn load_tabs(&self) -> Outcome<()> {
        self.set_loading(true);
        let outcome = self
            .store
            .get_all_carts(&self.store_id, CartStatus::Active, false)
            .await;

        let Some(carts) = outcome.data else {
            self.set_loading(false);
            return Outcome::fail(outcome.message.unwrap_or_default());
        };

        let activate = {
            let mut state = self.state.write();
            state.tabs = carts.iter().map(Tab::from_cart).collect();
            if state.active.is_none() {
                state.active = state.tabs.first().map(|t| t.id.clone());
            }
            state.active.clone()
        };

        if let Some(cart_id) = activate {
            let loaded = self.store.get_cart(&cart_id, false).await;
            if !loaded.is_success() {
                tracing::warn!(%cart_id, "initial cart load failed");
            }
        }

        self.set_loading(false);
        self.sync_active_tab();
        Outcome::done()
    }

    /// Create a cart and open a tab for it, optimistically
    pub async fn create_new_tab(&self) -> Outcome<Tab> {
        self.set_loading(true);
        let outcome = self.store.create_cart(&self.store_id).await;

        let Some(cart) = outcome.data else {
            self.set_loading(false);
            return Outcome::fail(outcome.message.unwrap_or_default());
        };

        let tab = Tab::from_cart(&cart);
        {
            let mut state = self.state.write();
            state.tabs.retain(|t| t.id != tab.id);
            state.tabs.push(tab.clone());
            state.active = Some(tab.id.clone());
        }

        // eager load so the workspace is immediately usable
        let loaded = self.store.get_cart(&tab.id, true).await;
        self.set_loading(false);
        if !loaded.is_success() {
            tracing::warn!(cart_id = %tab.id, "eager load of new cart failed");
        }
        self.sync_active_tab();
        tracing::info!(cart_id = %tab.id, "tab created");
        Outcome::ok(tab)
    }

    /// Make a tab active and load its cart
    ///
    /// No-op when the tab is already active. On load failure the active id
    /// stays on the new tab; the caller re-triggers the load.
    pub async fn select_tab(&self, tab_id: &str) -> Outcome<()> {
        {
            let state = self.state.read();
            if state.active.as_deref() == Some(tab_id) {
                return Outcome::done();
            }
            if !state.tabs.iter().any(|t| t.id == tab_id) {
                return Outcome::fail("unknown tab");
            }
        }

        self.store.clear_current();
        {
            let mut state = self.state.write();
            state.loading = true;
            state.active = Some(tab_id.to_string());
        }

        let outcome = self.store.get_cart(tab_id, true).await;
        self.set_loading(false);

        if outcome.is_success() {
            self.sync_active_tab();
            Outcome::done()
        } else {
            Outcome::fail(outcome.message.unwrap_or_default())
        }
    }

    /// Close a tab, asking for confirmation when it holds items
    pub async fn close_tab(&self, tab_id: &str) -> CloseTabOutcome {
        let item_count = {
            let state = self.state.read();
            match state.tabs.iter().find(|t| t.id == tab_id) {
                Some(tab) => tab.item_count,
                None => return CloseTabOutcome::NotFound,
            }
        };

        if item_count > 0 {
            self.state.write().pending_close = Some(tab_id.to_string());
            return CloseTabOutcome::NeedsConfirmation;
        }

        self.remove_tab(tab_id, true).await
    }

    /// Proceed with a close that required confirmation
    pub async fn confirm_close_tab(&self) -> CloseTabOutcome {
        let Some(tab_id) = self.state.write().pending_close.take() else {
            return CloseTabOutcome::NotFound;
        };
        self.remove_tab(&tab_id, true).await
    }

    /// Abandon a pending close
    pub fn cancel_close_tab(&self) {
        self.state.write().pending_close = None;
    }

    /// Close the tab of a cart the workspace just completed
    ///
    /// Completion already terminated the cart server-side (complete
    /// followed by the explicit delete), so no further delete is issued
    /// here.
    pub async fn close_tab_by_cart_id(&self, cart_id: &str) -> CloseTabOutcome {
        self.remove_tab(cart_id, false).await
    }

    // ========== Refresh policy ==========

    /// Note that the workspace changed cart data
    ///
    /// With a completed-cart id the tab closes right away. Without one a
    /// debounced refresh is scheduled, unless a tab-level load is already
    /// in flight (its result would clobber the fresher single-cart state).
    pub async fn on_cart_updated(&self, completed_cart_id: Option<&str>, now: Instant) {
        match completed_cart_id {
            Some(cart_id) => {
                self.close_tab_by_cart_id(cart_id).await;
            }
            None => {
                let mut state = self.state.write();
                if !state.loading {
                    state.debounce.schedule(now);
                }
            }
        }
    }

    /// Run the debounced refresh when it has come due
    pub async fn flush_refresh(&self, now: Instant) -> bool {
        {
            let mut state = self.state.write();
            if state.loading || !state.debounce.take_due(now) {
                return false;
            }
        }
        self.refresh_tabs().await;
        true
    }

    /// Re-fetch the cart list and rebuild tab summaries, keeping the
    /// active pointer when its tab survived
    async fn refresh_tabs(&self) {
        self.set_loading(true);
        let outcome = self
            .store
            .get_all_carts(&self.store_id, CartStatus::Active, true)
            .await;

        if let Some(carts) = outcome.data {
            let mut state = self.state.write();
            state.tabs = carts.iter().map(Tab::from_cart).collect();
            if let Some(active) = &state.active {
                if !state.tabs.iter().any(|t| &t.id == active) {
                    state.active = state.tabs.first().map(|t| t.id.clone());
                }
            }
        }
        self.set_loading(false);
        self.sync_active_tab();
    }

    /// Resync the active tab's cached summary from the held cart
    ///
    /// Skipped while a tab-level load is in flight or when the held cart
    /// does not match the active tab.
    pub fn sync_active_tab(&self) {
        let Some(cart) = self.store.current_cart() else {
            return;
        };
        let mut state = self.state.write();
        if state.loading {
            return;
        }
        if state.active.as_deref() != Some(cart.id.as_str()) {
            return;
        }
        if let Some(tab) = state.tabs.iter_mut().find(|t| t.id == cart.id) {
            tab.sync_from(&cart);
        }
    }

    // ========== Internal ==========

    /// Shared closure sequence: optional server delete, tab removal,
    /// active-tab reassignment
    async fn remove_tab(&self, tab_id: &str, delete_on_server: bool) -> CloseTabOutcome {
        let exists = self.state.read().tabs.iter().any(|t| t.id == tab_id);
        if !exists {
            return CloseTabOutcome::NotFound;
        }

        if delete_on_server {
            let outcome = self.store.delete_cart(tab_id).await;
            if !outcome.is_success() {
                return CloseTabOutcome::Failed(outcome.message.unwrap_or_default());
            }
        }

        let next_active = {
            let mut state = self.state.write();
            let closed_index = state.tabs.iter().position(|t| t.id == tab_id);
            state.tabs.retain(|t| t.id != tab_id);

            if state.active.as_deref() == Some(tab_id) {
                let index = closed_index.unwrap_or(0).min(state.tabs.len().saturating_sub(1));
                state.active = state.tabs.get(index).map(|t| t.id.clone());
                state.active.clone()
            } else {
                None
            }
        };

        match next_active {
            Some(cart_id) => {
                self.store.clear_current();
                let loaded = self.store.get_cart(&cart_id, true).await;
                if !loaded.is_success() {
                    tracing::warn!(%cart_id, "loading next tab after close failed");
                }
                self.sync_active_tab();
            }
            None => {
                if self.state.read().active.is_none() {
                    self.store.clear_current();
                }
            }
        }

        tracing::info!(%tab_id, "tab closed");
        CloseTabOutcome::Closed
    }

    fn set_loading(&self, loading: bool) {
        self.state.write().loading = loading;
    }
}
