// src/handlers/language.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::language::{CurrentLanguage, Language, LanguageQuery, SetLanguageRequest},
    services::geo::LanguageResolver,
    state::AppState,
};

/// Lists supported languages with their display names.
pub async fn list_languages(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.ui.summaries())
}

/// Current UI language and whether IP detection is still running.
pub async fn get_language(State(resolver): State<Arc<LanguageResolver>>) -> impl IntoResponse {
    Json(CurrentLanguage {
        code: resolver.current_language(),
        status: resolver.detection_status(),
    })
}

/// Sets the UI language explicitly. A running detection will not override it.
pub async fn set_language(
    State(resolver): State<Arc<LanguageResolver>>,
    Json(payload): Json<SetLanguageRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let language: Language = payload.code.parse()?;
    resolver.set_language(language);
    tracing::info!("Language set to '{}'", language);

    Ok(Json(CurrentLanguage {
        code: language,
        status: resolver.detection_status(),
    }))
}

/// UI labels for `?lang=` or the current language, English as fallback.
pub async fn get_ui_config(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> impl IntoResponse {
    let language = query
        .lang
        .map(|lang| lang.trim().to_ascii_lowercase())
        .unwrap_or_else(|| state.language.current_language().code().to_string());

    Json(state.ui.config_for(&language).clone())
}
