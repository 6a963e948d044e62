//! Tidepool POS - cart workspace client for the store admin API
//!
//! The point-of-sale core: a cart store over the REST cart service, a
//! tabbed controller mapping carts to workspace tabs, the sale workspace
//! (search, filter, cart editing), and the specification picker.

pub mod api;
pub mod config;
pub mod error;
pub mod freshness;
pub mod http;
pub mod localize;
pub mod picker;
pub mod store;
pub mod tabs;
pub mod workspace;

pub use api::{CartApi, HttpCartApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use localize::LocalizedMessage;
pub use picker::SpecificationPicker;
pub use store::{CartStore, Outcome};
pub use tabs::{CloseTabOutcome, Tab, TabController};
pub use workspace::{SaleWorkspace, SearchResolution};

// Re-export shared types for convenience
pub use shared::models::{Cart, CartLineItem, CartStatus, Product};
pub use shared::{Language, LocalizedText};
