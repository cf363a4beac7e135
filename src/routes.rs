// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{history, language, quiz},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (language, quiz, history).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.cors_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let language_routes = Router::new()
        .route("/languages", get(language::list_languages))
        .route(
            "/language",
            get(language::get_language).put(language::set_language),
        )
        .route("/ui", get(language::get_ui_config));

    let quiz_routes = Router::new()
        .route("/test", get(quiz::generate_test))
        .route("/analysis", post(quiz::analyze_result));

    let history_routes = Router::new().route(
        "/history",
        get(history::get_history).delete(history::reset_history),
    );

    Router::new()
        .nest(
            "/api",
            language_routes.merge(quiz_routes).merge(history_routes),
        )
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// `*` anywhere in the list allows every origin; otherwise only the listed
/// origins are echoed back.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|origin| origin == "*") {
        if origins.len() > 1 {
            tracing::warn!("CORS_ORIGINS contains '*'; other entries are ignored");
        }
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    AllowOrigin::list(origins)
}
