//! CLI command implementations for remote diagnostics.
//!
//! These commands build only the configured loader, without starting the
//! server. Remote failures are reported in the table and never make the
//! command fail.

use std::sync::Arc;

use anyhow::Result;

use super::error::RemoteError;
use super::loader::{RemoteModuleLoader, build_loader};
use crate::config::Config;

/// Outcome of loading one remote once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCheck {
    pub name: String,
    pub entries: Result<usize, RemoteError>,
    pub languages: Result<Vec<String>, RemoteError>,
}

/// List configured remotes and where they are loaded from.
pub fn cmd_remotes_list(config: &Config) -> Result<()> {
    let loader = build_loader(config)?;

    println!("Loader: {}", loader.describe());
    if config.remotes.is_empty() {
        println!("No remotes configured.");
        return Ok(());
    }

    println!("{:<6} {:<24}", "ORDER", "REMOTE");
    println!("{}", "-".repeat(31));
    for (i, name) in config.remotes.iter().enumerate() {
        println!("{:<6} {}", i + 1, name);
    }

    Ok(())
}

/// Load every configured remote once and print what came back.
pub async fn cmd_remotes_check(config: &Config) -> Result<()> {
    let loader = build_loader(config)?;
    println!("Loader: {}", loader.describe());

    let checks = check_remotes(loader, &config.remotes).await;
    if checks.is_empty() {
        println!("No remotes configured.");
        return Ok(());
    }

    println!(
        "{:<20} {:<10} {:<16} {}",
        "REMOTE", "ENTRIES", "LANGUAGES", "ERROR"
    );
    println!("{}", "-".repeat(72));

    let mut failed = 0usize;
    for check in &checks {
        let entries = match &check.entries {
            Ok(count) => count.to_string(),
            Err(_) => "-".to_string(),
        };
        let languages = match &check.languages {
            Ok(langs) if langs.is_empty() => "none".to_string(),
            Ok(langs) => langs.join(","),
            Err(_) => "-".to_string(),
        };
        let errors: Vec<String> = [check.entries.as_ref().err(), check.languages.as_ref().err()]
            .into_iter()
            .flatten()
            .map(|e| e.kind().to_string())
            .collect();
        if !errors.is_empty() {
            failed += 1;
        }

        println!(
            "{:<20} {:<10} {:<16} {}",
            check.name,
            entries,
            languages,
            errors.join(", ")
        );
    }

    println!();
    println!("{} remote(s) checked, {} with errors.", checks.len(), failed);
    for check in &checks {
        for e in [check.entries.as_ref().err(), check.languages.as_ref().err()]
            .into_iter()
            .flatten()
        {
            println!("  {}", error_line(e));
        }
    }

    Ok(())
}

/// One detail line per error, tagged with the track it came from.
fn error_line(error: &RemoteError) -> String {
    let track = if error.is_localization() {
        "localization"
    } else {
        "entries"
    };
    format!("[{track}] {error}")
}

/// Load entries and localization of every remote concurrently.
///
/// Results come back in configured order.
pub async fn check_remotes(loader: Arc<dyn RemoteModuleLoader>, names: &[String]) -> Vec<RemoteCheck> {
    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let loader = loader.clone();
            let name = name.clone();
            tokio::spawn(async move {
                let (entries, languages) =
                    tokio::join!(loader.fetch_entries(&name), loader.fetch_localization(&name));
                RemoteCheck {
                    entries: entries.map(|m| m.entries.len()),
                    languages: languages.map(|u| u.languages().map(str::to_string).collect()),
                    name,
                }
            })
        })
        .collect();

    let mut checks = Vec::with_capacity(handles.len());
    for (name, handle) in names.iter().zip(handles) {
        let check = match handle.await {
            Ok(check) => check,
            Err(e) => RemoteCheck {
                name: name.clone(),
                entries: Err(RemoteError::unavailable(name, format!("check task failed: {e}"))),
                languages: Err(RemoteError::localization_unavailable(
                    name,
                    "check task failed",
                )),
            },
        };
        checks.push(check);
    }
    checks
}
