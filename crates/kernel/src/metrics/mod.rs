//! Prometheus metrics collection.
//!
//! Provides composition metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Per-remote outcome labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RemoteLabels {
    pub source: String,
    pub outcome: String,
}

/// Outcome-only labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// Remote navigation loads by source and outcome.
    pub remote_loads: Family<RemoteLabels, Counter>,

    /// Remote navigation load duration.
    pub remote_load_duration_seconds: Family<RemoteLabels, Histogram>,

    /// Localization activations by source and outcome.
    pub localization_activations: Family<RemoteLabels, Counter>,

    /// Gateway route refreshes by outcome.
    pub gateway_refreshes: Family<OutcomeLabels, Counter>,

    /// Entries in the last published navigation model.
    pub navigation_entries: Gauge,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let remote_loads = Family::<RemoteLabels, Counter>::default();
        registry.register(
            "remote_loads",
            "Remote navigation loads",
            remote_loads.clone(),
        );

        let remote_load_duration_seconds =
            Family::<RemoteLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.005, 2.0, 12))
            });
        registry.register(
            "remote_load_duration_seconds",
            "Remote navigation load duration in seconds",
            remote_load_duration_seconds.clone(),
        );

        let localization_activations = Family::<RemoteLabels, Counter>::default();
        registry.register(
            "localization_activations",
            "Localization unit activations",
            localization_activations.clone(),
        );

        let gateway_refreshes = Family::<OutcomeLabels, Counter>::default();
        registry.register(
            "gateway_refreshes",
            "Gateway route table refreshes",
            gateway_refreshes.clone(),
        );

        let navigation_entries = Gauge::default();
        registry.register(
            "navigation_entries",
            "Entries in the published navigation model",
            navigation_entries.clone(),
        );

        Self {
            registry,
            remote_loads,
            remote_load_duration_seconds,
            localization_activations,
            gateway_refreshes,
            navigation_entries,
        }
    }

    /// Record a remote navigation load.
    pub fn record_remote_load(&self, source: &str, outcome: &str, duration_secs: f64) {
        let labels = RemoteLabels {
            source: source.to_string(),
            outcome: outcome.to_string(),
        };

        self.remote_loads.get_or_create(&labels).inc();
        self.remote_load_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a localization activation attempt.
    pub fn record_activation(&self, source: &str, outcome: &str) {
        let labels = RemoteLabels {
            source: source.to_string(),
            outcome: outcome.to_string(),
        };
        self.localization_activations.get_or_create(&labels).inc();
    }

    /// Record a gateway refresh.
    pub fn record_gateway_refresh(&self, outcome: &str) {
        let labels = OutcomeLabels {
            outcome: outcome.to_string(),
        };
        self.gateway_refreshes.get_or_create(&labels).inc();
    }

    /// Record the size of a published navigation model.
    pub fn set_navigation_entries(&self, count: usize) {
        self.navigation_entries
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible, and all metric
    /// labels use derived `EncodeLabelSet` impls that do not produce
    /// `fmt::Error`.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
