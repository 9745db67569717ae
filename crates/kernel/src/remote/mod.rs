//! Remote micro-frontend loading.
//!
//! This module handles:
//! - The loader capability (`fetch_entries` / `fetch_localization`)
//! - Deployment variants of the loader (HTTP, local directory)
//! - The error taxonomy for per-source failures
//! - CLI diagnostics over the configured remotes
//!
//! Loaders know nothing about navigation semantics and never cache; callers
//! decide when to load again.

pub mod cli;
mod directory;
mod error;
mod http;
mod loader;

pub use directory::DirectoryRemoteLoader;
pub use error::RemoteError;
pub use http::HttpRemoteLoader;
pub use loader::{
    LOCALIZATION_DOCUMENT, LoaderKind, NAVIGATION_DOCUMENT, RemoteModuleLoader, build_loader,
    check_source_name,
};
