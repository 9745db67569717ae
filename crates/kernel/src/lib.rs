//! Navigation shell kernel library.
//!
//! This library exposes the composition core and HTTP surface for
//! integration testing. The main entry point for running the server is the
//! `navshell` binary.

pub mod config;
pub mod error;
pub mod gateway;
pub mod i18n;
pub mod menu;
pub mod metrics;
pub mod remote;
pub mod routes;
pub mod session;
pub mod state;

pub use config::Config;
pub use state::{AppState, Collaborators};
