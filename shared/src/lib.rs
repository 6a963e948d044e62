//! Shared types for the Tidepool POS core
//!
//! Common types used across the workspace: the cart aggregate and catalog
//! models, localized text, money helpers, and the API response envelope.

pub mod models;
pub mod money;
pub mod response;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use response::{ApiEnvelope, EnvelopeError};
pub use types::{Language, LocalizedText};
