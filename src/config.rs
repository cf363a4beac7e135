// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

use crate::{
    error::AppError,
    services::geo::{GeoProbe, default_probes},
};

/// Number of questions in one generated test.
pub const TEST_QUESTION_COUNT: usize = 10;

/// Storage key for the seen question history.
pub const HISTORY_KEY: &str = "neurometric_seen_ids";

/// Language used whenever a requested language has no content.
pub const DEFAULT_LANGUAGE: &str = "en";

pub const HIGH_SCORE_THRESHOLD: i64 = 120;
pub const AVERAGE_SCORE_THRESHOLD: i64 = 90;

const DEFAULT_DATABASE_URL: &str = "sqlite://neurometric.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
    pub probe_timeout: Duration,
    pub geo_probes: Vec<GeoProbe>,
    pub language_detection: bool,
    pub question_bank_path: Option<PathBuf>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = parse_var("BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let log_dir = PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));

        let probe_timeout_ms: u64 =
            parse_var("GEO_PROBE_TIMEOUT_MS", &DEFAULT_PROBE_TIMEOUT_MS.to_string())?;

        let language_detection = parse_var("LANGUAGE_DETECTION", "true")?;

        let question_bank_path = env::var("QUESTION_BANK_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            database_url,
            rust_log,
            bind_addr,
            log_dir,
            probe_timeout: Duration::from_millis(probe_timeout_ms),
            geo_probes: default_probes()?,
            language_detection,
            question_bank_path,
            cors_origins,
        })
    }
}

/// Reads `name` from the environment, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, AppError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_uses_default_when_unset() {
        let port: u16 = parse_var("NEUROMETRIC_TEST_UNSET_VARIABLE", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_var_reports_the_variable_name() {
        let err = parse_var::<u64>("NEUROMETRIC_TEST_UNSET_VARIABLE", "soon").unwrap_err();
        assert!(err.to_string().contains("NEUROMETRIC_TEST_UNSET_VARIABLE"));
    }
}
