//! POS session example
//!
//! Drives a full sale against a running cart API:
//! 1. Load the open tabs for a store (creating one if none exist)
//! 2. Add a product to the active cart
//! 3. Complete the sale (complete + delete) and close its tab
//!
//! Run: cargo run --example pos_session -- http://localhost:3000 store-1

use std::time::Instant;

use tidepool_pos::{
    CartApi, CartStore, ClientConfig, HttpCartApi, Language, SaleWorkspace, TabController,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let base_url = args
        .next()
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let store_id = args.next().unwrap_or_else(|| "store-1".to_string());

    let config = ClientConfig::new(&base_url)
        .with_language(Language::En)
        .with_token(std::env::var("POS_TOKEN").unwrap_or_default());

    let api = HttpCartApi::new(&config);
    if let Err(err) = api.health_check().await {
        anyhow::bail!("server at {base_url} is not healthy: {err}");
    }

    let store = CartStore::new(&config);
    let tabs = TabController::new(store.clone(), &store_id);
    let mut workspace = SaleWorkspace::new(store.clone());

    // 1. Open the workspace: discover carts, or start a fresh one
    let loaded = tabs.load_tabs().await;
    if !loaded.is_success() {
        anyhow::bail!("loading tabs failed: {:?}", loaded.message);
    }
    if tabs.tabs().is_empty() {
        let created = tabs.create_new_tab().await;
        if !created.is_success() {
            anyhow::bail!("creating a cart failed: {:?}", created.message);
        }
    }
    println!("open tabs: {}", tabs.tabs().len());

    let Some(active) = tabs.active_tab() else {
        anyhow::bail!("no active tab after load");
    };
    println!("active cart: {} (total {})", active.id, active.total);

    // 2. Add a demo product directly (no specifications)
    let product = serde_json::from_value(serde_json::json!({
        "id": "demo-product",
        "name": { "en": "Demo Product", "ar": "منتج تجريبي" },
        "price": 12.5,
        "stock": 100
    }))?;
    if let Err(outcome) = workspace.add_product(&product).await {
        anyhow::bail!("add failed: {:?}", outcome.message);
    }
    tabs.on_cart_updated(None, Instant::now()).await;
    tabs.sync_active_tab();
    tokio::time::sleep(std::time::Duration::from_millis(350)).await;
    tabs.flush_refresh(Instant::now()).await;

    let cart = workspace.active_cart().expect("cart is loaded");
    println!(
        "cart now holds {} item(s), total {}",
        cart.item_count(),
        cart.display_total()
    );

    // 3. Complete the sale and close its tab
    let completed = workspace.complete_order(Some("example sale".to_string())).await;
    match completed.data {
        Some(sale) => {
            tabs.on_cart_updated(Some(&sale.cart_id), Instant::now()).await;
            println!("sale completed for cart {}", sale.cart_id);
        }
        None => anyhow::bail!("completion failed: {:?}", completed.message),
    }

    println!("remaining tabs: {}", tabs.tabs().len());
    Ok(())
}
