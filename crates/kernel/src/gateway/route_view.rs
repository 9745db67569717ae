//! Gateway route table view.
//!
//! Holds the last route table fetched from the gateway and an `updating`
//! flag that is set while at least one refresh is in flight. A refresh
//! replaces the table wholesale; a failed refresh keeps the old table.
//! Concurrent refreshes are independent requests, the last to complete wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use navshell_sdk::gateway::RouteTableEntry;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::client::GatewayRoutesClient;
use super::error::GatewayError;
use crate::metrics::Metrics;

/// Route table as rendered.
#[derive(Debug, Clone, Serialize)]
pub struct RouteTableSnapshot {
    pub routes: Vec<RouteTableEntry>,
    pub updating: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Cheap to clone; clones share the table.
#[derive(Clone)]
pub struct GatewayRouteView {
    inner: Arc<ViewInner>,
}

struct ViewInner {
    client: Arc<dyn GatewayRoutesClient>,
    routes: RwLock<Arc<Vec<RouteTableEntry>>>,
    in_flight: AtomicUsize,
    refreshed_at: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
    metrics: Option<Arc<Metrics>>,
}

/// Counts one in-flight refresh until dropped, including on unwind.
struct InFlight(Arc<ViewInner>);

impl InFlight {
    fn enter(inner: &Arc<ViewInner>) -> Self {
        inner.in_flight.fetch_add(1, Ordering::AcqRel);
        Self(inner.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl GatewayRouteView {
    pub fn new(client: Arc<dyn GatewayRoutesClient>) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                client,
                routes: RwLock::new(Arc::new(Vec::new())),
                in_flight: AtomicUsize::new(0),
                refreshed_at: RwLock::new(None),
                last_error: RwLock::new(None),
                metrics: None,
            }),
        }
    }

    /// Record refresh outcomes in `metrics`. Call before the view is shared.
    pub fn with_metrics(client: Arc<dyn GatewayRoutesClient>, metrics: Arc<Metrics>) -> Self {
        let mut view = Self::new(client);
        if let Some(inner) = Arc::get_mut(&mut view.inner) {
            inner.metrics = Some(metrics);
        }
        view
    }

    /// Fetch the route table and replace the current one.
    ///
    /// Errors are logged here and leave the previous table in place; the
    /// result is informational.
    pub async fn refresh(&self) -> Result<usize, GatewayError> {
        let _in_flight = InFlight::enter(&self.inner);

        match self.inner.client.find_all().await {
            Ok(routes) => {
                let count = routes.len();
                *self.inner.routes.write() = Arc::new(routes);
                *self.inner.refreshed_at.write() = Some(Utc::now());
                *self.inner.last_error.write() = None;
                info!(routes = count, "gateway routes refreshed");
                self.record("ok");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "gateway routes refresh failed");
                *self.inner.last_error.write() = Some(e.to_string());
                self.record(e.kind());
                Err(e)
            }
        }
    }

    /// Start a refresh in the background. `updating` is already set when
    /// this returns.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let view = self.clone();
        let in_flight = InFlight::enter(&self.inner);

        tokio::spawn(async move {
            let _in_flight = in_flight;
            let _ = view.refresh().await;
        })
    }

    pub fn routes(&self) -> Arc<Vec<RouteTableEntry>> {
        self.inner.routes.read().clone()
    }

    pub fn is_updating(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire) > 0
    }

    pub fn snapshot(&self) -> RouteTableSnapshot {
        RouteTableSnapshot {
            routes: self.routes().as_ref().clone(),
            updating: self.is_updating(),
            refreshed_at: *self.inner.refreshed_at.read(),
            last_error: self.inner.last_error.read().clone(),
        }
    }

    fn record(&self, outcome: &str) {
        if let Some(metrics) = &self.inner.metrics {
            metrics.record_gateway_refresh(outcome);
        }
    }
}

impl std::fmt::Debug for GatewayRouteView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayRouteView")
            .field("routes", &self.inner.routes.read().len())
            .field("updating", &self.is_updating())
            .finish()
    }
}
