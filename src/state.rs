use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::{
    config::{Config, HISTORY_KEY},
    error::AppError,
    models::{language::UiCatalog, question::QuestionBank},
    services::{
        analysis::AnalysisCatalog,
        geo::LanguageResolver,
        history::{HistoryTracker, SqliteStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub bank: Arc<QuestionBank>,
    pub analysis: Arc<AnalysisCatalog>,
    pub ui: Arc<UiCatalog>,
    /// Locked for a whole read-select-mark cycle so generations never interleave.
    pub history: Arc<Mutex<HistoryTracker>>,
    pub language: Arc<LanguageResolver>,
}

impl AppState {
    /// Loads static content and the persisted history. Does not start
    /// language detection.
    pub async fn initialize(config: Config, pool: SqlitePool) -> Result<Self, AppError> {
        let bank = match &config.question_bank_path {
            Some(path) => {
                tracing::info!("Loading question bank from {}", path.display());
                QuestionBank::from_path(path)?
            }
            None => QuestionBank::builtin()?,
        };
        let analysis = AnalysisCatalog::builtin()?;
        let ui = UiCatalog::builtin()?;

        let history = HistoryTracker::open(Arc::new(SqliteStore::new(pool)), HISTORY_KEY).await;
        tracing::info!(
            "Loaded {} seen question ids from history",
            history.seen().len()
        );

        let language = LanguageResolver::new(config.geo_probes.clone(), config.probe_timeout)?;

        Ok(Self {
            config,
            bank: Arc::new(bank),
            analysis: Arc::new(analysis),
            ui: Arc::new(ui),
            history: Arc::new(Mutex::new(history)),
            language: Arc::new(language),
        })
    }
}

impl FromRef<AppState> for Arc<LanguageResolver> {
    fn from_ref(state: &AppState) -> Self {
        state.language.clone()
    }
}
