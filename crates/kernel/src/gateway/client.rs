//! HTTP clients for the gateway-routes and profile collaborators.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use navshell_sdk::gateway::{ProfileInfo, RouteTableEntry};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::GatewayError;

/// Path of the route table below the gateway URL.
const ROUTES_PATH: &str = "api/gateway/routes";

/// Path of the profile document below the profile URL.
const PROFILE_PATH: &str = "management/info";

/// Source of the gateway's route table.
#[async_trait]
pub trait GatewayRoutesClient: Send + Sync {
    /// Fetch the complete route table. One request per call.
    async fn find_all(&self) -> Result<Vec<RouteTableEntry>, GatewayError>;
}

/// Source of the environment flags shown in the navigation bar.
#[async_trait]
pub trait ProfileClient: Send + Sync {
    async fn fetch_profile(&self) -> Result<ProfileInfo, GatewayError>;
}

/// reqwest-backed client for both collaborators.
#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    client: reqwest::Client,
    gateway_url: Url,
    profile_url: Url,
}

impl HttpGatewayClient {
    pub fn new(gateway_url: Url, profile_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for gateway")?;
        Ok(Self {
            client,
            gateway_url,
            profile_url,
        })
    }

    pub fn routes_url(&self) -> Result<Url, GatewayError> {
        join(&self.gateway_url, ROUTES_PATH)
    }

    pub fn profile_url(&self) -> Result<Url, GatewayError> {
        join(&self.profile_url, PROFILE_PATH)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        debug!(%url, "querying gateway collaborator");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| GatewayError::unavailable(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::unavailable(
                url.as_str(),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::invalid_response(url.as_str(), e.to_string()))
    }
}

#[async_trait]
impl GatewayRoutesClient for HttpGatewayClient {
    async fn find_all(&self) -> Result<Vec<RouteTableEntry>, GatewayError> {
        let url = self.routes_url()?;
        self.get_json(url).await
    }
}

#[async_trait]
impl ProfileClient for HttpGatewayClient {
    async fn fetch_profile(&self) -> Result<ProfileInfo, GatewayError> {
        let url = self.profile_url()?;
        self.get_json(url).await
    }
}

fn join(base: &Url, path: &str) -> Result<Url, GatewayError> {
    base.join(path)
        .map_err(|e| GatewayError::unavailable(base.as_str(), format!("invalid URL: {e}")))
}
