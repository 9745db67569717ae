//! Navigation composition.
//!
//! The shell's static entries and every remote's contribution are merged
//! into one [`MergedNavigationModel`] that is republished whenever a single
//! source resolves.

mod aggregator;
mod model;
mod registry;
mod static_entries;

pub use aggregator::{AggregatorOptions, NavigationAggregator, StaleCompletions};
pub use model::{LoadState, MergedNavigationModel, NavigationContribution, RemoteSection};
pub use registry::{ContributionRegistry, SourceStatus};
pub use static_entries::{default_static_entries, load_static_entries, parse_static_entries};
