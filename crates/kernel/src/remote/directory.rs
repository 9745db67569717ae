//! Directory remote loader.
//!
//! Reads the same documents as the HTTP loader from a local tree:
//! `{dir}/{remote}/navbar-items.json` and `{dir}/{remote}/i18n.json`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use navshell_sdk::types::{LocalizationUnit, NavigationManifest};
use tracing::debug;

use super::error::RemoteError;
use super::loader::{
    LOCALIZATION_DOCUMENT, NAVIGATION_DOCUMENT, RemoteModuleLoader, check_source_name,
};

/// Loads remote bundles from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryRemoteLoader {
    root: PathBuf,
}

impl DirectoryRemoteLoader {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn document_path(&self, remote: &str, document: &str) -> PathBuf {
        self.root.join(remote).join(document)
    }

    async fn read_document(&self, remote: &str, document: &str) -> Result<Vec<u8>, String> {
        let path = self.document_path(remote, document);
        debug!(remote = %remote, path = %path.display(), "reading remote document");

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => format!("{} not found", path.display()),
            _ => format!("failed to read {}: {e}", path.display()),
        })
    }
}

#[async_trait]
impl RemoteModuleLoader for DirectoryRemoteLoader {
    async fn fetch_entries(&self, remote: &str) -> Result<NavigationManifest, RemoteError> {
        check_source_name(remote)?;

        let body = self
            .read_document(remote, NAVIGATION_DOCUMENT)
            .await
            .map_err(|details| RemoteError::unavailable(remote, details))?;

        serde_json::from_slice(&body).map_err(|e| RemoteError::malformed(remote, e.to_string()))
    }

    async fn fetch_localization(&self, remote: &str) -> Result<LocalizationUnit, RemoteError> {
        check_source_name(remote)
            .map_err(|e| RemoteError::localization_unavailable(remote, e.to_string()))?;

        let body = self
            .read_document(remote, LOCALIZATION_DOCUMENT)
            .await
            .map_err(|details| RemoteError::localization_unavailable(remote, details))?;

        let mut unit: LocalizationUnit = serde_json::from_slice(&body).map_err(|e| {
            RemoteError::localization_unavailable(remote, format!("malformed document: {e}"))
        })?;
        if unit.source.is_empty() {
            unit.source = remote.to_string();
        }
        Ok(unit)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}
