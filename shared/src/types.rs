//! Common types for the shared crate
//!
//! Localized text and the display language selector used across the
//! workspace.

use serde::{Deserialize, Serialize};

/// Display language for localized fields and user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

/// A localized text pair (English / Arabic)
///
/// Catalog entities and carts carry both languages; display code picks one
/// via [`LocalizedText::get`], falling back to the other side when the
/// requested one is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub ar: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }

    /// Get the text for a language, falling back to the other side
    pub fn get(&self, lang: Language) -> &str {
        let (preferred, fallback) = match lang {
            Language::En => (&self.en, &self.ar),
            Language::Ar => (&self.ar, &self.en),
        };
        if preferred.is_empty() {
            fallback
        } else {
            preferred
        }
    }

    pub fn is_empty(&self) -> bool {
        self.en.is_empty() && self.ar.is_empty()
    }

    /// Exact match against either language, case-insensitive
    pub fn eq_ignore_case(&self, term: &str) -> bool {
        self.en.eq_ignore_ascii_case(term) || self.ar == term
    }

    /// Substring match against either language, case-insensitive
    pub fn contains_ignore_case(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        self.en.to_lowercase().contains(&term.to_lowercase()) || self.ar.contains(term)
    }
}

impl std::fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get(Language::En))
    }
}
