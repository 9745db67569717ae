//! Navigation model types.

use std::ops::Deref;
use std::sync::Arc;

use navshell_sdk::types::NavigationEntry;
use serde::{Serialize, Serializer};

/// Load state of a remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    NotStarted,
    Loading,
    Loaded,
    Failed,
}

/// The entries one source contributes, in the order the source supplied them.
///
/// Shared, immutable, and replaced wholesale; cloning is cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationContribution(Arc<[NavigationEntry]>);

impl NavigationContribution {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.0
    }
}

impl From<Vec<NavigationEntry>> for NavigationContribution {
    fn from(entries: Vec<NavigationEntry>) -> Self {
        Self(entries.into())
    }
}

impl Deref for NavigationContribution {
    type Target = [NavigationEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for NavigationContribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// One remote's slot in the merged model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSection {
    pub source: String,
    pub state: LoadState,
    pub entries: NavigationContribution,
}

/// The complete navigation list: shell entries, then each remote in
/// configured order.
///
/// Always fully defined. A remote that has never loaded is present with an
/// empty contribution, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedNavigationModel {
    /// Increases with every publication.
    pub revision: u64,
    pub static_entries: NavigationContribution,
    pub remotes: Vec<RemoteSection>,
}

impl MergedNavigationModel {
    /// A model with only the shell's entries and an empty slot per source.
    pub fn initial(static_entries: NavigationContribution, sources: &[String]) -> Self {
        Self {
            revision: 0,
            static_entries,
            remotes: sources
                .iter()
                .map(|source| RemoteSection {
                    source: source.clone(),
                    state: LoadState::NotStarted,
                    entries: NavigationContribution::empty(),
                })
                .collect(),
        }
    }

    /// All entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &NavigationEntry> {
        self.static_entries
            .iter()
            .chain(self.remotes.iter().flat_map(|r| r.entries.iter()))
    }

    /// Entry names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.entries().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.static_entries.len() + self.remotes.iter().map(|r| r.entries.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn section(&self, source: &str) -> Option<&RemoteSection> {
        self.remotes.iter().find(|r| r.source == source)
    }

    /// Copy of the model keeping only entries visible to an account with
    /// the given authorities. Sections stay in place even when emptied.
    pub fn visible_to<S: AsRef<str>>(&self, authorities: &[S]) -> Self {
        let filter = |entries: &NavigationContribution| -> NavigationContribution {
            entries
                .iter()
                .filter(|e| e.is_visible_to(authorities))
                .cloned()
                .collect::<Vec<_>>()
                .into()
        };

        Self {
            revision: self.revision,
            static_entries: filter(&self.static_entries),
            remotes: self
                .remotes
                .iter()
                .map(|r| RemoteSection {
                    source: r.source.clone(),
                    state: r.state,
                    entries: filter(&r.entries),
                })
                .collect(),
        }
    }
}
