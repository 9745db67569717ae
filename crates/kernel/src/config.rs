//! Configuration loaded from environment variables.

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use url::Url;

use crate::menu::StaleCompletions;
use crate::remote::LoaderKind;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 8080).
    pub port: u16,

    /// Remote source names in configured (display) order.
    pub remotes: Vec<String>,

    /// Which loader variant fetches remote bundles.
    pub remote_loader: LoaderKind,

    /// Base URL of remote bundles for the HTTP loader.
    pub remote_base_url: Url,

    /// Root directory of remote bundles for the directory loader.
    pub remote_dir: PathBuf,

    /// Per-request timeout of the HTTP loader (default: 10s).
    pub remote_timeout: Duration,

    /// Static shell navigation entries (TOML).
    pub nav_file: PathBuf,

    /// Directory of base shell catalogs, one `{lang}.json` per language.
    pub i18n_dir: PathBuf,

    /// Supported languages.
    pub languages: Vec<String>,

    /// Locale active at startup.
    pub default_language: String,

    /// Gateway-routes collaborator.
    pub gateway_url: Url,

    /// Profile collaborator.
    pub profile_url: Url,

    /// What to do with completions from an activation that has been superseded.
    pub stale_completions: StaleCompletions,

    /// Build version shown in the navigation bar.
    pub version: Option<String>,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            remotes: vec!["mfront1".to_string(), "mfront2".to_string()],
            remote_loader: LoaderKind::Http,
            remote_base_url: local_url("http://localhost:8080/services/"),
            remote_dir: PathBuf::from("./remotes"),
            remote_timeout: Duration::from_secs(10),
            nav_file: PathBuf::from("./config/navigation.toml"),
            i18n_dir: PathBuf::from("./config/i18n"),
            languages: vec!["en".to_string(), "fr".to_string()],
            default_language: "en".to_string(),
            gateway_url: local_url("http://localhost:8080/"),
            profile_url: local_url("http://localhost:8080/"),
            stale_completions: StaleCompletions::Apply,
            version: None,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = env::var("PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let remotes = match env::var("NAVSHELL_REMOTES") {
            Ok(v) => parse_remote_names(&v)?,
            Err(_) => defaults.remotes,
        };

        let remote_loader = match env::var("NAVSHELL_REMOTE_LOADER") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.remote_loader,
        };

        let remote_base_url = match env::var("NAVSHELL_REMOTE_BASE_URL") {
            Ok(v) => parse_base_url(&v).context("NAVSHELL_REMOTE_BASE_URL must be a URL")?,
            Err(_) => defaults.remote_base_url,
        };

        let remote_dir = env::var("NAVSHELL_REMOTE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.remote_dir);

        let remote_timeout = match env::var("NAVSHELL_REMOTE_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse()
                    .context("NAVSHELL_REMOTE_TIMEOUT_SECS must be a number of seconds")?,
            ),
            Err(_) => defaults.remote_timeout,
        };

        let nav_file = env::var("NAVSHELL_NAV_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.nav_file);

        let i18n_dir = env::var("NAVSHELL_I18N_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.i18n_dir);

        let languages = env::var("NAVSHELL_LANGUAGES")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.languages);
        if languages.is_empty() {
            bail!("NAVSHELL_LANGUAGES must name at least one language");
        }

        let default_language = env::var("NAVSHELL_DEFAULT_LANGUAGE")
            .unwrap_or_else(|_| languages[0].clone());
        if !languages.contains(&default_language) {
            bail!(
                "NAVSHELL_DEFAULT_LANGUAGE '{default_language}' is not one of NAVSHELL_LANGUAGES ({})",
                languages.join(", ")
            );
        }

        let gateway_url = match env::var("NAVSHELL_GATEWAY_URL") {
            Ok(v) => parse_base_url(&v).context("NAVSHELL_GATEWAY_URL must be a URL")?,
            Err(_) => defaults.gateway_url,
        };

        let profile_url = match env::var("NAVSHELL_PROFILE_URL") {
            Ok(v) => parse_base_url(&v).context("NAVSHELL_PROFILE_URL must be a URL")?,
            Err(_) => gateway_url.clone(),
        };

        let stale_completions = match env::var("NAVSHELL_DISCARD_STALE_LOADS") {
            Ok(v) if parse_flag(&v) => StaleCompletions::Discard,
            _ => StaleCompletions::Apply,
        };

        let version = env::var("NAVSHELL_VERSION")
            .ok()
            .and_then(|v| display_version(&v));

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.cors_allowed_origins);

        Ok(Self {
            port,
            remotes,
            remote_loader,
            remote_base_url,
            remote_dir,
            remote_timeout,
            nav_file,
            i18n_dir,
            languages,
            default_language,
            gateway_url,
            profile_url,
            stale_completions,
            version,
            cors_allowed_origins,
        })
    }
}

/// Parse and validate a comma-separated list of remote source names.
///
/// Names become URL segments and directory names, so they are restricted
/// to ASCII letters, digits, `-` and `_`. Order is preserved.
pub fn parse_remote_names(value: &str) -> Result<Vec<String>> {
    let names = split_list(value);
    let mut seen = HashSet::new();

    for name in &names {
        if !is_valid_source_name(name) {
            bail!("invalid remote source name '{name}': use letters, digits, '-' or '_'");
        }
        if !seen.insert(name.as_str()) {
            bail!("remote source '{name}' is configured more than once");
        }
    }

    Ok(names)
}

/// Whether `name` is usable as a remote source key.
pub fn is_valid_source_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Normalize a version for display: `1.2.0` → `v1.2.0`, `V1` stays `V1`.
pub fn display_version(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.to_lowercase().starts_with('v') {
        Some(raw.to_string())
    } else {
        Some(format!("v{raw}"))
    }
}

/// Parse a base URL, forcing a trailing slash so `Url::join` appends
/// instead of replacing the last segment.
fn parse_base_url(value: &str) -> Result<Url> {
    let trimmed = value.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn local_url(literal: &str) -> Url {
    // Only called with the literals in `Config::default`, which are valid URLs
    #[allow(clippy::expect_used)]
    Url::parse(literal).expect("default URL literal")
}
