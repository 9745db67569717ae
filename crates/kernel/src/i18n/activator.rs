//! Localization activation - installs remote units into the translation
//! context.
//!
//! Activation is keyed by source: activating the same unit twice leaves the
//! context as if it had been activated once, a different unit replaces the
//! previous one, and a failed load leaves whatever was installed before.
//! When calls for one source overlap, the one started last wins regardless
//! of which unit resolves first.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use navshell_sdk::types::LocalizationUnit;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::context::TranslationContext;
use crate::metrics::Metrics;
use crate::remote::RemoteError;

/// What an activation did to the translation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationOutcome {
    /// First unit for this source.
    Installed,
    /// A different unit replaced the previous one.
    Replaced,
    /// The same unit was already installed.
    Unchanged,
    /// A later call for the same source started first; nothing installed.
    Superseded,
}

impl ActivationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Replaced => "replaced",
            Self::Unchanged => "unchanged",
            Self::Superseded => "superseded",
        }
    }
}

/// Activates localization units into the shared translation context.
#[derive(Debug, Clone)]
pub struct LocalizationActivator {
    context: Arc<TranslationContext>,
    /// Per-source call counter; only the latest call may install.
    calls: Arc<DashMap<String, u64>>,
    metrics: Option<Arc<Metrics>>,
}

impl LocalizationActivator {
    pub fn new(context: Arc<TranslationContext>) -> Self {
        Self {
            context,
            calls: Arc::new(DashMap::new()),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn context(&self) -> &Arc<TranslationContext> {
        &self.context
    }

    /// Await `unit` and install it for `source`.
    ///
    /// Errors are logged here; callers may ignore the result. A failed
    /// future never touches the context.
    pub async fn activate_for<F>(&self, source: &str, unit: F) -> Result<ActivationOutcome, RemoteError>
    where
        F: Future<Output = Result<LocalizationUnit, RemoteError>>,
    {
        self.activate_while(source, unit, || true).await
    }

    /// Like [`activate_for`](Self::activate_for), but the unit is only
    /// installed if `current()` still holds once it has resolved.
    pub async fn activate_while<F, C>(
        &self,
        source: &str,
        unit: F,
        current: C,
    ) -> Result<ActivationOutcome, RemoteError>
    where
        F: Future<Output = Result<LocalizationUnit, RemoteError>>,
        C: Fn() -> bool,
    {
        let call = {
            let mut latest = self.calls.entry(source.to_string()).or_insert(0);
            *latest += 1;
            *latest
        };

        let result = match unit.await {
            Ok(_) if !current() || !self.is_latest(source, call) => {
                debug!(source = %source, call, "localization superseded");
                Ok(ActivationOutcome::Superseded)
            }
            Ok(unit) => self.install(source, unit),
            Err(e) => Err(e),
        };

        match &result {
            Ok(outcome) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_activation(source, outcome.as_str());
                }
            }
            Err(e) => {
                warn!(source = %source, kind = e.kind(), error = %e, "localization not activated");
                if let Some(metrics) = &self.metrics {
                    metrics.record_activation(source, e.kind());
                }
            }
        }

        result
    }

    fn is_latest(&self, source: &str, call: u64) -> bool {
        self.calls.get(source).is_some_and(|latest| *latest == call)
    }

    fn install(
        &self,
        source: &str,
        mut unit: LocalizationUnit,
    ) -> Result<ActivationOutcome, RemoteError> {
        if unit.source.is_empty() {
            unit.source = source.to_string();
        }
        validate_unit(source, &unit)?;

        let languages = unit.translations.len();
        let outcome = self.context.install(source, unit);
        match outcome {
            ActivationOutcome::Unchanged => {
                debug!(source = %source, "localization already active");
            }
            _ => info!(
                source = %source,
                languages,
                outcome = outcome.as_str(),
                "localization activated"
            ),
        }
        Ok(outcome)
    }
}

/// A unit must belong to the source it is activated for and carry at least
/// one non-empty language code.
fn validate_unit(source: &str, unit: &LocalizationUnit) -> Result<(), RemoteError> {
    if unit.source != source {
        return Err(RemoteError::activation_failed(
            source,
            format!("unit belongs to '{}'", unit.source),
        ));
    }
    if unit.translations.is_empty() {
        return Err(RemoteError::activation_failed(source, "unit has no languages"));
    }
    if unit.languages().any(|l| l.trim().is_empty()) {
        return Err(RemoteError::activation_failed(
            source,
            "unit has an empty language code",
        ));
    }
    Ok(())
}
