//! Contribution registry - the last good contribution of every remote source.
//!
//! Each source has its own record and its own failure state. Records are
//! created from configuration and never removed.
//!
//! Failure policy is retain-stale: a failed load after a successful one keeps
//! the previous contribution (and the menu entries it renders) until the
//! caller calls [`ContributionRegistry::invalidate`].

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, warn};

use super::model::{LoadState, NavigationContribution};

/// Diagnostic view of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub state: LoadState,
    /// Entries currently contributed (possibly stale).
    pub entries: usize,
    pub last_error: Option<String>,
    pub successes: u64,
    pub failures: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct SourceRecord {
    state: LoadState,
    contribution: NavigationContribution,
    last_error: Option<String>,
    successes: u64,
    failures: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl SourceRecord {
    fn new() -> Self {
        Self {
            state: LoadState::NotStarted,
            contribution: NavigationContribution::empty(),
            last_error: None,
            successes: 0,
            failures: 0,
            updated_at: None,
        }
    }
}

/// Per-source cache of contributions.
///
/// Records live in a `DashMap`, so recordings for the same source are
/// serialized by its shard lock and recordings for different sources do
/// not contend. Completions are applied in the order they are recorded.
#[derive(Debug)]
pub struct ContributionRegistry {
    /// Source names in configured order.
    order: Vec<String>,
    records: DashMap<String, SourceRecord>,
}

impl ContributionRegistry {
    /// Create a registry for the configured sources.
    ///
    /// Duplicate names are collapsed; the first occurrence fixes the order.
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = DashMap::new();
        let mut order = Vec::new();

        for source in sources {
            let source = source.into();
            if records.contains_key(&source) {
                continue;
            }
            records.insert(source.clone(), SourceRecord::new());
            order.push(source);
        }

        Self { order, records }
    }

    /// Source names in configured order.
    pub fn sources(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, source: &str) -> bool {
        self.records.contains_key(source)
    }

    /// Mark a load as in flight. The current contribution is kept.
    pub fn mark_loading(&self, source: &str) {
        match self.records.get_mut(source) {
            Some(mut record) => record.state = LoadState::Loading,
            None => warn!(source = %source, "mark_loading for unknown source ignored"),
        }
    }

    /// Replace a source's contribution with a freshly loaded one.
    pub fn record_success(&self, source: &str, contribution: NavigationContribution) {
        let Some(mut record) = self.records.get_mut(source) else {
            warn!(source = %source, "record_success for unknown source ignored");
            return;
        };

        debug!(source = %source, entries = contribution.len(), "recorded contribution");
        record.state = LoadState::Loaded;
        record.contribution = contribution;
        record.last_error = None;
        record.successes += 1;
        record.updated_at = Some(Utc::now());
    }

    /// Record a failed load. The previous contribution, if any, is retained.
    pub fn record_failure(&self, source: &str, cause: impl std::fmt::Display) {
        let Some(mut record) = self.records.get_mut(source) else {
            warn!(source = %source, "record_failure for unknown source ignored");
            return;
        };

        record.state = LoadState::Failed;
        record.last_error = Some(cause.to_string());
        record.failures += 1;
        record.updated_at = Some(Utc::now());
    }

    /// Drop a source's contribution. Its state and counters are kept.
    pub fn invalidate(&self, source: &str) -> bool {
        match self.records.get_mut(source) {
            Some(mut record) => {
                record.contribution = NavigationContribution::empty();
                record.updated_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// The last successful contribution, or an empty one.
    pub fn get(&self, source: &str) -> NavigationContribution {
        self.records
            .get(source)
            .map(|r| r.contribution.clone())
            .unwrap_or_default()
    }

    pub fn state(&self, source: &str) -> Option<LoadState> {
        self.records.get(source).map(|r| r.state)
    }

    /// Contribution and state together, read under one lock.
    pub fn snapshot(&self, source: &str) -> (LoadState, NavigationContribution) {
        self.records
            .get(source)
            .map(|r| (r.state, r.contribution.clone()))
            .unwrap_or((LoadState::NotStarted, NavigationContribution::empty()))
    }

    pub fn status(&self, source: &str) -> Option<SourceStatus> {
        self.records.get(source).map(|r| SourceStatus {
            name: source.to_string(),
            state: r.state,
            entries: r.contribution.len(),
            last_error: r.last_error.clone(),
            successes: r.successes,
            failures: r.failures,
            updated_at: r.updated_at,
        })
    }

    /// Status of every source, in configured order.
    pub fn statuses(&self) -> Vec<SourceStatus> {
        self.order.iter().filter_map(|s| self.status(s)).collect()
    }
}
