//! The remote loader capability and its deployment variants.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use navshell_sdk::types::{LocalizationUnit, NavigationManifest};

use super::directory::DirectoryRemoteLoader;
use super::error::RemoteError;
use super::http::HttpRemoteLoader;
use crate::config::{Config, is_valid_source_name};

/// File name of a remote's navigation document.
pub const NAVIGATION_DOCUMENT: &str = "navbar-items.json";

/// File name of a remote's localization document.
pub const LOCALIZATION_DOCUMENT: &str = "i18n.json";

/// Fetches remote bundles by logical name.
///
/// The two operations are independent: either may fail without affecting
/// the other. Each call performs exactly one retrieval; implementations
/// must not cache.
#[async_trait]
pub trait RemoteModuleLoader: Send + Sync {
    /// Fetch the navigation entries a remote contributes.
    async fn fetch_entries(&self, remote: &str) -> Result<NavigationManifest, RemoteError>;

    /// Fetch the remote's localization unit.
    ///
    /// Loaders stamp the unit's `source` with `remote` when the document
    /// leaves it empty.
    async fn fetch_localization(&self, remote: &str) -> Result<LocalizationUnit, RemoteError>;

    /// Human-readable description of where bundles come from.
    fn describe(&self) -> String;
}

/// Loader variant selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    /// Fetch bundles over HTTP from `NAVSHELL_REMOTE_BASE_URL`.
    Http,
    /// Read bundles from `NAVSHELL_REMOTE_DIR` (development, air-gapped installs).
    Directory,
}

impl FromStr for LoaderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "directory" | "dir" => Ok(Self::Directory),
            other => bail!("unknown remote loader '{other}': expected 'http' or 'directory'"),
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// Build the loader the configuration asks for.
pub fn build_loader(config: &Config) -> Result<Arc<dyn RemoteModuleLoader>> {
    let loader: Arc<dyn RemoteModuleLoader> = match config.remote_loader {
        LoaderKind::Http => Arc::new(HttpRemoteLoader::new(
            config.remote_base_url.clone(),
            config.remote_timeout,
        )?),
        LoaderKind::Directory => Arc::new(DirectoryRemoteLoader::new(&config.remote_dir)),
    };
    Ok(loader)
}

/// Reject names that cannot be a remote key before touching the network
/// or filesystem with them.
pub fn check_source_name(remote: &str) -> Result<(), RemoteError> {
    if is_valid_source_name(remote) {
        Ok(())
    } else {
        Err(RemoteError::unavailable(remote, "invalid remote source name"))
    }
}
