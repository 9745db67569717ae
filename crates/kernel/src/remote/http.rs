//! HTTP remote loader.
//!
//! Remotes are served under a common base URL:
//! `{base}/{remote}/navbar-items.json` and `{base}/{remote}/i18n.json`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use navshell_sdk::types::{LocalizationUnit, NavigationManifest};
use tracing::debug;
use url::Url;

use super::error::RemoteError;
use super::loader::{
    LOCALIZATION_DOCUMENT, NAVIGATION_DOCUMENT, RemoteModuleLoader, check_source_name,
};

/// Loads remote bundles over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteLoader {
    client: reqwest::Client,
    base: Url,
}

impl HttpRemoteLoader {
    /// Create a loader for bundles below `base`.
    ///
    /// `timeout` bounds each request; an expired request is reported as
    /// unavailable like any other transport failure.
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for remote loader")?;
        Ok(Self { client, base })
    }

    /// URL of one of a remote's documents.
    pub fn document_url(&self, remote: &str, document: &str) -> Result<Url, String> {
        self.base
            .join(&format!("{remote}/{document}"))
            .map_err(|e| format!("invalid document URL: {e}"))
    }

    /// GET a document and return its body. Errors are transport-level
    /// descriptions; the caller picks the error variant.
    async fn get_document(&self, remote: &str, document: &str) -> Result<Vec<u8>, String> {
        let url = self.document_url(remote, document)?;
        debug!(remote = %remote, %url, "fetching remote document");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| describe_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("GET {url} returned HTTP {}", status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body of {url}: {e}"))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl RemoteModuleLoader for HttpRemoteLoader {
    async fn fetch_entries(&self, remote: &str) -> Result<NavigationManifest, RemoteError> {
        check_source_name(remote)?;

        let body = self
            .get_document(remote, NAVIGATION_DOCUMENT)
            .await
            .map_err(|details| RemoteError::unavailable(remote, details))?;

        serde_json::from_slice(&body).map_err(|e| RemoteError::malformed(remote, e.to_string()))
    }

    async fn fetch_localization(&self, remote: &str) -> Result<LocalizationUnit, RemoteError> {
        check_source_name(remote)
            .map_err(|e| RemoteError::localization_unavailable(remote, e.to_string()))?;

        let body = self
            .get_document(remote, LOCALIZATION_DOCUMENT)
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
        format!("http {}", self.base)
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}
