//! The shell's own navigation entries, read from `navigation.toml`.
//!
//! ```toml
//! [[entries]]
//! name = "Home"
//! route = "/"
//! translationKey = "global.menu.home"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use navshell_sdk::types::{NavigationEntry, NavigationManifest};
use tracing::info;

/// Entries used when no navigation file exists.
pub fn default_static_entries() -> Vec<NavigationEntry> {
    vec![
        NavigationEntry::new("Home", "/").translation_key("global.menu.home"),
        NavigationEntry::new("Gateway", "/admin/gateway")
            .translation_key("global.menu.admin.gateway")
            .authority("ROLE_ADMIN"),
    ]
}

/// Parse a navigation TOML document.
pub fn parse_static_entries(content: &str) -> Result<Vec<NavigationEntry>> {
    let manifest: NavigationManifest =
        toml::from_str(content).context("failed to parse navigation entries")?;
    Ok(manifest.entries)
}

/// Load static entries from `path`, falling back to the built-in defaults
/// when the file does not exist. A file that exists but does not parse is
/// an error.
pub fn load_static_entries(path: &Path) -> Result<Vec<NavigationEntry>> {
    if !path.exists() {
        info!(path = %path.display(), "navigation file not found, using defaults");
        return Ok(default_static_entries());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read navigation file: {}", path.display()))?;
    let entries = parse_static_entries(&content)
        .with_context(|| format!("invalid navigation file: {}", path.display()))?;

    info!(path = %path.display(), count = entries.len(), "loaded static navigation entries");
    Ok(entries)
}
