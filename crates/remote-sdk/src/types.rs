//! Navigation and localization types published by micro-frontends.
//!
//! A remote serves two documents: a [`NavigationManifest`] listing the menu
//! entries it contributes, and a [`LocalizationUnit`] with its translated
//! strings. Both are JSON with camelCase keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    /// Display name, used when no translation exists for the label key.
    pub name: String,

    /// Target route (e.g., "/products").
    pub route: String,

    /// Translation key for the label (e.g., "global.menu.entities.products").
    #[serde(default)]
    pub translation_key: Option<String>,

    /// Authorities allowed to see the entry (empty = everyone).
    #[serde(default)]
    pub authorities: Vec<String>,

    /// Ordering hint for renderers. Never used to reorder across sources.
    #[serde(default)]
    pub weight: Option<i32>,
}

impl NavigationEntry {
    pub fn new(name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            translation_key: None,
            authorities: Vec::new(),
            weight: None,
        }
    }

    pub fn translation_key(mut self, key: impl Into<String>) -> Self {
        self.translation_key = Some(key.into());
        self
    }

    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authorities.push(authority.into());
        self
    }

    pub fn weight(mut self, weight: i32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// The key a renderer should translate: the translation key if one was
    /// given, the display name otherwise.
    pub fn label_key(&self) -> &str {
        self.translation_key.as_deref().unwrap_or(&self.name)
    }

    /// Whether an account holding `authorities` may see this entry.
    pub fn is_visible_to<S: AsRef<str>>(&self, authorities: &[S]) -> bool {
        self.authorities.is_empty()
            || self
                .authorities
                .iter()
                .any(|required| authorities.iter().any(|held| held.as_ref() == required))
    }
}

/// The navigation document a remote serves (`navbar-items.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationManifest {
    #[serde(default)]
    pub entries: Vec<NavigationEntry>,
}

/// Language code → (translation key → translated string).
pub type Catalogs = BTreeMap<String, BTreeMap<String, String>>;

/// Translated strings scoped to one remote (`i18n.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationUnit {
    /// Remote that owns the unit. Stamped by the loader when omitted.
    #[serde(default)]
    pub source: String,

    /// Catalogs by language.
    #[serde(default)]
    pub translations: Catalogs,
}

impl LocalizationUnit {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translations: Catalogs::new(),
        }
    }

    /// Add one translated string.
    pub fn with(
        mut self,
        language: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.translations
            .entry(language.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Look up a key in one language.
    pub fn get(&self, language: &str, key: &str) -> Option<&str> {
        self.translations
            .get(language)
            .and_then(|catalog| catalog.get(key))
            .map(String::as_str)
    }

    /// Languages this unit carries.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.translations.keys().map(String::as_str)
    }
}
