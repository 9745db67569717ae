//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use navshell_sdk::gateway::ProfileInfo;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::gateway::{GatewayRouteView, GatewayRoutesClient, HttpGatewayClient, ProfileClient};
use crate::i18n::{LocalizationActivator, TranslationContext};
use crate::menu::{AggregatorOptions, NavigationAggregator, load_static_entries};
use crate::metrics::Metrics;
use crate::remote::{RemoteModuleLoader, build_loader};
use crate::session::SessionTracker;

/// External collaborators the shell talks to.
///
/// Production uses the HTTP implementations; tests substitute stubs.
#[derive(Clone)]
pub struct Collaborators {
    pub loader: Arc<dyn RemoteModuleLoader>,
    pub gateway: Arc<dyn GatewayRoutesClient>,
    pub profile: Arc<dyn ProfileClient>,
}

impl Collaborators {
    /// Build the collaborators the configuration points at.
    pub fn from_config(config: &Config) -> Result<Self> {
        let loader = build_loader(config).context("failed to create remote loader")?;
        let gateway = Arc::new(
            HttpGatewayClient::new(
                config.gateway_url.clone(),
                config.profile_url.clone(),
                config.remote_timeout,
            )
            .context("failed to create gateway client")?,
        );

        Ok(Self {
            loader,
            gateway: gateway.clone(),
            profile: gateway,
        })
    }
}

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Merged navigation model and the remote loads behind it.
    aggregator: NavigationAggregator,

    /// Process-wide locale and translations.
    translations: Arc<TranslationContext>,

    session: SessionTracker,

    /// Gateway route table.
    gateway: GatewayRouteView,

    profile_client: Arc<dyn ProfileClient>,

    /// Environment flags; `None` until the profile collaborator answers.
    profile: RwLock<Option<ProfileInfo>>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state with the HTTP collaborators.
    pub async fn new(config: &Config) -> Result<Self> {
        let collaborators = Collaborators::from_config(config)?;
        Self::with_collaborators(config, collaborators).await
    }

    /// Create application state around the given collaborators.
    pub async fn with_collaborators(config: &Config, collaborators: Collaborators) -> Result<Self> {
        let static_entries =
            load_static_entries(&config.nav_file).context("failed to load static navigation")?;

        let translations = Arc::new(TranslationContext::new(
            config.languages.clone(),
            config.default_language.clone(),
        ));
        translations
            .load_dir(&config.i18n_dir)
            .await
            .context("failed to load shell translations")?;

        let metrics = Arc::new(Metrics::new());
        let session = SessionTracker::new();
        let activator = LocalizationActivator::new(translations.clone()).with_metrics(metrics.clone());

        info!(
            remotes = ?config.remotes,
            loader = %collaborators.loader.describe(),
            stale = ?config.stale_completions,
            "navigation sources configured"
        );

        let aggregator = NavigationAggregator::new(
            static_entries,
            config.remotes.clone(),
            collaborators.loader,
            activator,
            session.clone(),
            AggregatorOptions {
                stale: config.stale_completions,
                metrics: Some(metrics.clone()),
            },
        );

        let gateway = GatewayRouteView::with_metrics(collaborators.gateway, metrics.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config: config.clone(),
                aggregator,
                translations,
                session,
                gateway,
                profile_client: collaborators.profile,
                profile: RwLock::new(None),
                metrics,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn aggregator(&self) -> &NavigationAggregator {
        &self.inner.aggregator
    }

    pub fn translations(&self) -> &Arc<TranslationContext> {
        &self.inner.translations
    }

    pub fn session(&self) -> &SessionTracker {
        &self.inner.session
    }

    pub fn gateway(&self) -> &GatewayRouteView {
        &self.inner.gateway
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Build version for display, already `v`-prefixed.
    pub fn version(&self) -> Option<&str> {
        self.inner.config.version.as_deref()
    }

    /// Last profile flags received, if any.
    pub fn profile(&self) -> Option<ProfileInfo> {
        self.inner.profile.read().clone()
    }

    /// Ask the profile collaborator for the environment flags.
    ///
    /// A failure is logged and leaves the previous flags in place.
    pub async fn refresh_profile(&self) -> bool {
        match self.inner.profile_client.fetch_profile().await {
            Ok(profile) => {
                info!(profiles = ?profile.active_profiles, "profile info loaded");
                *self.inner.profile.write() = Some(profile);
                true
            }
            Err(e) => {
                warn!(error = %e, "profile info unavailable");
                false
            }
        }
    }
}
