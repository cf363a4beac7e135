// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        analysis::{AnalysisRequest, AnalysisResponse, Validity},
        language::LanguageQuery,
        question::TestResponse,
    },
    services::selector,
    state::AppState,
};

/// Generates a new test.
///
/// * Uses `?lang=` when given, the current UI language otherwise.
/// * Unknown languages are served from the English bank.
/// * Prefers questions this device has not seen yet and records the
///   selection in the history.
pub async fn generate_test(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let language = query
        .lang
        .map(|lang| lang.trim().to_ascii_lowercase())
        .unwrap_or_else(|| state.language.current_language().code().to_string());

    let selection = {
        let mut history = state.history.lock().await;
        selector::generate_test(&language, &state.bank, &mut history).await
    };

    Ok(Json(TestResponse {
        language: selection.language,
        questions: selection.questions,
    }))
}

/// Maps a score and validity label to the narrative analysis text.
pub async fn analyze_result(
    State(state): State<AppState>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let language = payload
        .language
        .map(|lang| lang.trim().to_ascii_lowercase())
        .unwrap_or_else(|| state.language.current_language().code().to_string());

    let validity = Validity::from_label(&payload.validity);
    let (band, text) = state.analysis.analyze(payload.iq, &language, validity);

    Ok(Json(AnalysisResponse {
        band,
        text: text.to_string(),
    }))
}
