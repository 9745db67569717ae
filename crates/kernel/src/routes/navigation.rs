//! Navigation endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use navshell_sdk::types::NavigationEntry;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::i18n::TranslationContext;
use crate::menu::{MergedNavigationModel, SourceStatus};
use crate::state::AppState;

/// Create the navigation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/navigation", get(navigation))
        .route("/api/navigation/sources", get(sources))
        .route("/api/navigation/sources/{name}", delete(invalidate_source))
        .route("/api/navigation/sources/{name}/reload", post(reload_source))
}

#[derive(Debug, Deserialize)]
struct NavigationQuery {
    /// Comma-separated authorities; entries requiring others are hidden.
    authorities: Option<String>,
}

/// One entry as the navigation bar shows it.
#[derive(Debug, Serialize)]
struct RenderedEntry {
    /// Contributing remote, `None` for the shell's own entries.
    source: Option<String>,
    name: String,
    route: String,
    /// Label in the current locale.
    label: String,
}

#[derive(Debug, Serialize)]
struct NavigationResponse {
    revision: u64,
    locale: String,
    version: Option<String>,
    in_production: Option<bool>,
    open_api_enabled: Option<bool>,
    entries: Vec<RenderedEntry>,
    model: Arc<MergedNavigationModel>,
}

/// The merged navigation model, with labels in the current locale.
async fn navigation(
    State(state): State<AppState>,
    Query(query): Query<NavigationQuery>,
) -> Json<NavigationResponse> {
    let mut model = state.aggregator().current_model();
    if let Some(authorities) = query.authorities {
        let authorities: Vec<&str> = authorities
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();
        model = Arc::new(model.visible_to(&authorities));
    }

    let translations = state.translations();
    let profile = state.profile();

    Json(NavigationResponse {
        revision: model.revision,
        locale: translations.current_locale(),
        version: state.version().map(str::to_string),
        in_production: profile.as_ref().map(|p| p.in_production()),
        open_api_enabled: profile.as_ref().map(|p| p.open_api_enabled()),
        entries: render(&model, translations),
        model,
    })
}

fn render(model: &MergedNavigationModel, translations: &TranslationContext) -> Vec<RenderedEntry> {
    let statics = model.static_entries.iter().map(|e| (None, e));
    let remotes = model
        .remotes
        .iter()
        .flat_map(|r| r.entries.iter().map(move |e| (Some(r.source.as_str()), e)));

    statics
        .chain(remotes)
        .map(|(source, entry)| RenderedEntry {
            source: source.map(str::to_string),
            name: entry.name.clone(),
            route: entry.route.clone(),
            label: label(translations, entry),
        })
        .collect()
}

/// Translated label, or the display name when the key has no translation.
fn label(translations: &TranslationContext, entry: &NavigationEntry) -> String {
    match &entry.translation_key {
        Some(key) => {
            let translated = translations.translate(key);
            if translated == *key {
                entry.name.clone()
            } else {
                translated
            }
        }
        None => entry.name.clone(),
    }
}

/// Per-source load status.
async fn sources(State(state): State<AppState>) -> Json<Vec<SourceStatus>> {
    Json(state.aggregator().registry().statuses())
}

/// Start a fresh load of one source.
async fn reload_source(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    if state.aggregator().reload_source(&name) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(AppError::NotFound(format!("remote source '{name}'")))
    }
}

/// Drop the contribution retained for one source.
async fn invalidate_source(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    if state.aggregator().invalidate(&name) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("remote source '{name}'")))
    }
}
