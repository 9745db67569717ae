//! Interface translation.
//!
//! A single [`TranslationContext`] holds the process-wide current locale,
//! the shell's own catalogs and the localization units installed by
//! remotes. The [`LocalizationActivator`] is the only path by which remote
//! units enter the context.

mod activator;
mod context;

pub use activator::{ActivationOutcome, LocalizationActivator};
pub use context::{LocaleError, TranslationContext};
