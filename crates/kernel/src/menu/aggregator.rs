//! Navigation aggregator - merges shell entries and remote contributions.
//!
//! On every session-ready transition the aggregator starts one independent
//! load per configured source. Each load runs in its own task and, when it
//! resolves, is recorded in the [`ContributionRegistry`] and followed by a
//! republication of the merged model. A successful load also kicks off the
//! source's localization activation in a separate task.
//!
//! Loads are never retried here. [`NavigationAggregator::reload_source`]
//! starts a fresh attempt on request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use navshell_sdk::types::NavigationEntry;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::model::{MergedNavigationModel, NavigationContribution, RemoteSection};
use super::registry::ContributionRegistry;
use crate::i18n::LocalizationActivator;
use crate::metrics::Metrics;
use crate::remote::{RemoteError, RemoteModuleLoader};
use crate::session::SessionTracker;

/// Buffered model publications per change subscriber.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// What to do with a load that completes after a newer activation started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleCompletions {
    /// Record it like any other completion (completion order wins).
    #[default]
    Apply,
    /// Drop it; only loads from the latest activation are recorded.
    Discard,
}

/// Optional aggregator settings.
#[derive(Debug, Clone, Default)]
pub struct AggregatorOptions {
    pub stale: StaleCompletions,
    pub metrics: Option<Arc<Metrics>>,
}

/// Merges static and remote navigation and publishes every change.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct NavigationAggregator {
    inner: Arc<Inner>,
}

struct Inner {
    static_entries: NavigationContribution,
    registry: ContributionRegistry,
    loader: Arc<dyn RemoteModuleLoader>,
    activator: LocalizationActivator,
    session: SessionTracker,
    /// Highest ready epoch that has been activated.
    activated_epoch: AtomicU64,
    current: watch::Sender<Arc<MergedNavigationModel>>,
    changes: broadcast::Sender<Arc<MergedNavigationModel>>,
    /// Serializes publication; holds the last revision.
    publish_lock: Mutex<u64>,
    stale: StaleCompletions,
    metrics: Option<Arc<Metrics>>,
}

impl NavigationAggregator {
    pub fn new(
        static_entries: Vec<NavigationEntry>,
        sources: Vec<String>,
        loader: Arc<dyn RemoteModuleLoader>,
        activator: LocalizationActivator,
        session: SessionTracker,
        options: AggregatorOptions,
    ) -> Self {
        let static_entries = NavigationContribution::from(static_entries);
        let registry = ContributionRegistry::new(sources);
        let initial = Arc::new(MergedNavigationModel::initial(
            static_entries.clone(),
            registry.sources(),
        ));
        let (current, _) = watch::channel(initial);
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                static_entries,
                registry,
                loader,
                activator,
                session,
                activated_epoch: AtomicU64::new(0),
                current,
                changes,
                publish_lock: Mutex::new(0),
                stale: options.stale,
                metrics: options.metrics,
            }),
        }
    }

    /// Start loading every source if the session has become ready since
    /// the last activation.
    ///
    /// Returns `true` if loads were started. Calling it again without a new
    /// ready transition does nothing.
    pub fn activate(&self) -> bool {
        let session = self.inner.session.current();
        if !session.is_ready() {
            debug!("session not ready, navigation activation deferred");
            return false;
        }

        let epoch = session.ready_epoch;
        let previous = self.inner.activated_epoch.fetch_max(epoch, Ordering::AcqRel);
        if previous >= epoch {
            debug!(epoch, "navigation already activated for this session");
            return false;
        }

        let sources = self.inner.registry.sources();
        info!(epoch, sources = sources.len(), "loading remote navigation");

        for source in sources {
            self.inner.registry.mark_loading(source);
        }
        self.inner.publish();

        for source in sources {
            tokio::spawn(load_source(self.inner.clone(), source.clone(), epoch));
        }
        true
    }

    /// Start a new load for one source outside of session activation.
    ///
    /// Returns `false` for an unknown source.
    pub fn reload_source(&self, source: &str) -> bool {
        if !self.inner.registry.contains(source) {
            return false;
        }

        let epoch = self.inner.activated_epoch.load(Ordering::Acquire);
        info!(source = %source, "reloading remote navigation");
        self.inner.registry.mark_loading(source);
        self.inner.publish();
        tokio::spawn(load_source(self.inner.clone(), source.to_string(), epoch));
        true
    }

    /// Drop a source's retained contribution and republish.
    pub fn invalidate(&self, source: &str) -> bool {
        if !self.inner.registry.invalidate(source) {
            return false;
        }
        info!(source = %source, "remote navigation invalidated");
        self.inner.publish();
        true
    }

    /// The latest merged model. Never blocks on a load.
    pub fn current_model(&self) -> Arc<MergedNavigationModel> {
        self.inner.current.borrow().clone()
    }

    /// Every publication from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<MergedNavigationModel>> {
        self.inner.changes.subscribe()
    }

    /// The latest publication only; intermediate ones may be skipped.
    pub fn watch(&self) -> watch::Receiver<Arc<MergedNavigationModel>> {
        self.inner.current.subscribe()
    }

    pub fn registry(&self) -> &ContributionRegistry {
        &self.inner.registry
    }

    pub fn session(&self) -> &SessionTracker {
        &self.inner.session
    }

    /// Activate on every session-ready transition for as long as the
    /// returned task runs.
    pub fn spawn_session_listener(&self) -> JoinHandle<()> {
        let aggregator = self.clone();
        let mut rx = self.inner.session.subscribe();

        tokio::spawn(async move {
            aggregator.activate();
            while rx.changed().await.is_ok() {
                rx.borrow_and_update();
                aggregator.activate();
            }
        })
    }
}

impl std::fmt::Debug for NavigationAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationAggregator")
            .field("sources", &self.inner.registry.sources())
            .field(
                "activated_epoch",
                &self.inner.activated_epoch.load(Ordering::Relaxed),
            )
            .field("stale", &self.inner.stale)
            .finish()
    }
}

impl Inner {
    /// Rebuild the model from the registry and publish it.
    fn publish(&self) {
        let mut revision = self.publish_lock.lock();
        *revision += 1;

        let model = Arc::new(MergedNavigationModel {
            revision: *revision,
            static_entries: self.static_entries.clone(),
            remotes: self
                .registry
                .sources()
                .iter()
                .map(|source| {
                    let (state, entries) = self.registry.snapshot(source);
                    RemoteSection {
                        source: source.clone(),
                        state,
                        entries,
                    }
                })
                .collect(),
        });

        if let Some(metrics) = &self.metrics {
            metrics.set_navigation_entries(model.len());
        }
        self.current.send_replace(model.clone());
        // No subscribers is fine.
        let _ = self.changes.send(model);
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.stale == StaleCompletions::Discard
            && self.activated_epoch.load(Ordering::Acquire) != epoch
    }

    fn record_load(&self, source: &str, outcome: &str, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_remote_load(source, outcome, started.elapsed().as_secs_f64());
        }
    }
}

/// Load one source and record the outcome. Never fails.
async fn load_source(inner: Arc<Inner>, source: String, epoch: u64) {
    let started = Instant::now();

    // The fetch runs in its own task so a panicking loader is recorded as a
    // failure of this source instead of unwinding through here.
    let fetch = {
        let loader = inner.loader.clone();
        let source = source.clone();
        tokio::spawn(async move { loader.fetch_entries(&source).await })
    };
    let result = match fetch.await {
        Ok(result) => result,
        Err(e) => Err(RemoteError::unavailable(
            &source,
            format!("load task failed: {e}"),
        )),
    };

    if inner.is_stale(epoch) {
        debug!(source = %source, epoch, "discarding load from superseded activation");
        inner.record_load(&source, "discarded", started);
        return;
    }

    match result {
        Ok(manifest) => {
            let count = manifest.entries.len();
            inner
                .registry
                .record_success(&source, manifest.entries.into());
            info!(source = %source, entries = count, "remote navigation loaded");
            inner.record_load(&source, "loaded", started);
            inner.publish();

            let activator = inner.activator.clone();
            let loader = inner.loader.clone();
            tokio::spawn(async move {
                // Failures are logged by the activator.
                let _ = activator
                    .activate_while(&source, loader.fetch_localization(&source), || {
                        !inner.is_stale(epoch)
                    })
                    .await;
            });
        }
        Err(e) => {
            warn!(source = %source, kind = e.kind(), error = %e, "remote navigation failed");
            inner.registry.record_failure(&source, &e);
            inner.record_load(&source, e.kind(), started);
            inner.publish();
        }
    }
}
