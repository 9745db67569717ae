//! Locale and translation endpoints.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Create the locale router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/locale/{lang}", put(change_locale))
        .route("/api/i18n", get(catalog))
}

#[derive(Debug, Serialize)]
struct LocaleResponse {
    locale: String,
    languages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    locale: String,
    translations: BTreeMap<String, String>,
}

/// Switch the process-wide locale. Persisting the choice is the caller's
/// business.
async fn change_locale(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> AppResult<Json<LocaleResponse>> {
    let translations = state.translations();
    translations.use_locale(&lang)?;

    Ok(Json(LocaleResponse {
        locale: translations.current_locale(),
        languages: translations.languages().to_vec(),
    }))
}

/// Every translation available in the current locale.
async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let translations = state.translations();
    let locale = translations.current_locale();

    Json(CatalogResponse {
        translations: translations.catalog(&locale),
        locale,
    })
}
