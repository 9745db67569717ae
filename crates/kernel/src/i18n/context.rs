//! Translation context for interface strings.
//!
//! Shell catalogs are loaded once at startup into an in-memory map; remote
//! units are installed keyed by source. Lookups try the current locale,
//! then the default locale, and fall back to the key itself.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use navshell_sdk::types::LocalizationUnit;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use super::activator::ActivationOutcome;

/// Locale change errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("language '{language}' is not supported. Supported: {supported}")]
    UnsupportedLanguage { language: String, supported: String },
}

/// Process-wide translation state.
pub struct TranslationContext {
    languages: Vec<String>,
    default_language: String,
    current: RwLock<String>,
    /// Shell catalogs: key = "language\0key" → translation.
    base: DashMap<String, String>,
    /// Remote units by source name; ordered so lookups are deterministic.
    units: RwLock<BTreeMap<String, Arc<LocalizationUnit>>>,
}

impl TranslationContext {
    /// Create a context. `default_language` is added to `languages` if the
    /// caller left it out.
    pub fn new(languages: Vec<String>, default_language: impl Into<String>) -> Self {
        let default_language = default_language.into();
        let mut languages = languages;
        if !languages.contains(&default_language) {
            languages.insert(0, default_language.clone());
        }

        Self {
            languages,
            current: RwLock::new(default_language.clone()),
            default_language,
            base: DashMap::new(),
            units: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn current_locale(&self) -> String {
        self.current.read().clone()
    }

    /// Switch the current locale. Only configured languages are accepted.
    pub fn use_locale(&self, language: &str) -> Result<(), LocaleError> {
        if !self.languages.iter().any(|l| l == language) {
            return Err(LocaleError::UnsupportedLanguage {
                language: language.to_string(),
                supported: self.languages.join(", "),
            });
        }

        *self.current.write() = language.to_string();
        info!(language = %language, "locale changed");
        Ok(())
    }

    /// Add shell translations for one language.
    pub fn load_catalog<I>(&self, language: &str, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut count = 0usize;
        for (key, translation) in entries {
            self.base.insert(cache_key(language, &key), translation);
            count += 1;
        }
        count
    }

    /// Load `{language}.json` for every configured language from `dir`.
    ///
    /// Missing files are skipped; a file that does not parse is an error.
    pub async fn load_dir(&self, dir: &Path) -> Result<usize> {
        let mut total = 0usize;

        for language in &self.languages {
            let path = dir.join(format!("{language}.json"));
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no shell catalog for language");
                    continue;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to read catalog {}", path.display()));
                }
            };

            let catalog: BTreeMap<String, String> = serde_json::from_str(&content)
                .with_context(|| format!("invalid catalog {}", path.display()))?;
            let count = self.load_catalog(language, catalog);
            info!(language = %language, count, "loaded shell translations");
            total += count;
        }

        Ok(total)
    }

    /// Install a remote unit under `source`, replacing any previous one.
    pub(crate) fn install(&self, source: &str, unit: LocalizationUnit) -> ActivationOutcome {
        let mut units = self.units.write();
        match units.get(source) {
            Some(existing) if **existing == unit => ActivationOutcome::Unchanged,
            Some(_) => {
                units.insert(source.to_string(), Arc::new(unit));
                ActivationOutcome::Replaced
            }
            None => {
                units.insert(source.to_string(), Arc::new(unit));
                ActivationOutcome::Installed
            }
        }
    }

    /// The unit currently installed for `source`.
    pub fn installed(&self, source: &str) -> Option<Arc<LocalizationUnit>> {
        self.units.read().get(source).cloned()
    }

    pub fn installed_sources(&self) -> Vec<String> {
        self.units.read().keys().cloned().collect()
    }

    /// Translate a key in the current locale.
    pub fn translate(&self, key: &str) -> String {
        let language = self.current_locale();
        self.translate_in(&language, key)
    }

    /// Translate a key in `language`, then the default language.
    ///
    /// Falls back to the key if no translation is found.
    pub fn translate_in(&self, language: &str, key: &str) -> String {
        if let Some(translation) = self.lookup(language, key) {
            return translation;
        }
        if language != self.default_language
            && let Some(translation) = self.lookup(&self.default_language, key)
        {
            return translation;
        }
        key.to_string()
    }

    /// Shell catalog first, then remote units in source order.
    fn lookup(&self, language: &str, key: &str) -> Option<String> {
        if let Some(translation) = self.base.get(&cache_key(language, key)) {
            return Some(translation.clone());
        }
        self.units
            .read()
            .values()
            .find_map(|unit| unit.get(language, key).map(str::to_string))
    }

    /// Every translation available in `language`, with the same precedence
    /// as [`translate_in`](Self::translate_in) minus the default-language
    /// fallback.
    pub fn catalog(&self, language: &str) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        let prefix = cache_key(language, "");

        for entry in self.base.iter() {
            if let Some(key) = entry.key().strip_prefix(&prefix) {
                merged.insert(key.to_string(), entry.value().clone());
            }
        }
        for unit in self.units.read().values() {
            if let Some(catalog) = unit.translations.get(language) {
                for (key, value) in catalog {
                    merged.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }

        merged
    }
}

/// Build a catalog key from language and translation key.
///
/// Uses a null byte separator so keys containing any printable character
/// cannot collide across languages.
fn cache_key(language: &str, key: &str) -> String {
    format!("{language}\0{key}")
}

impl std::fmt::Debug for TranslationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationContext")
            .field("current", &*self.current.read())
            .field("base_size", &self.base.len())
            .field("units", &self.units.read().len())
            .finish()
    }
}
