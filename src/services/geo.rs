// src/services/geo.rs

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use url::Url;

use crate::{
    error::AppError,
    models::language::{DetectionStatus, Language},
};

/// One IP geolocation endpoint and the JSON field carrying the country code.
#[derive(Debug, Clone)]
pub struct GeoProbe {
    pub name: String,
    pub url: Url,
    pub country_field: String,
}

impl GeoProbe {
    pub fn new(name: &str, url: &str, country_field: &str) -> Result<Self, AppError> {
        let url = Url::parse(url)
            .map_err(|e| AppError::Config(format!("geo probe {} has a bad url: {}", name, e)))?;

        Ok(Self {
            name: name.to_string(),
            url,
            country_field: country_field.to_string(),
        })
    }
}

/// Public endpoints, tried in this order.
pub fn default_probes() -> Result<Vec<GeoProbe>, AppError> {
    Ok(vec![
        GeoProbe::new("GeoJS", "https://get.geojs.io/v1/ip/country.json", "country")?,
        GeoProbe::new("Country.is", "https://api.country.is", "country")?,
        GeoProbe::new("ipapi.co", "https://ipapi.co/json/", "country_code")?,
    ])
}

#[derive(Debug)]
struct ResolverState {
    current: Language,
    status: DetectionStatus,
    chosen_explicitly: bool,
}

/// Holds the active UI language and detects an initial one from the
/// caller's IP address.
///
/// Probes run one after another, each bounded by `timeout`, so detection
/// takes at most `probes.len() * timeout`. An explicit `set_language`
/// always wins over a detection result.
pub struct LanguageResolver {
    client: reqwest::Client,
    probes: Vec<GeoProbe>,
    timeout: Duration,
    state: RwLock<ResolverState>,
}

impl LanguageResolver {
    pub fn new(probes: Vec<GeoProbe>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            probes,
            timeout,
            state: RwLock::new(ResolverState {
                current: Language::default(),
                status: DetectionStatus::Detected,
                chosen_explicitly: false,
            }),
        })
    }

    pub fn current_language(&self) -> Language {
        self.state.read().unwrap_or_else(PoisonError::into_inner).current
    }

    pub fn detection_status(&self) -> DetectionStatus {
        self.state.read().unwrap_or_else(PoisonError::into_inner).status
    }

    pub fn set_language(&self, language: Language) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.current = language;
        state.chosen_explicitly = true;
    }

    /// Starts detection in the background. The status reads `detecting`
    /// as soon as this returns.
    pub fn spawn_detection(self: &Arc<Self>) -> JoinHandle<Language> {
        self.set_status(DetectionStatus::Detecting);
        let resolver = Arc::clone(self);
        tokio::spawn(async move { resolver.detect().await })
    }

    /// Runs the probe chain and applies the result. Returns the language the
    /// detected country maps to (English when nothing was detected).
    pub async fn detect(&self) -> Language {
        self.set_status(DetectionStatus::Detecting);

        let detected = match self.detect_country().await {
            Some(country) => {
                let language = Language::from_country(&country);
                tracing::info!("Mapping country '{}' to language '{}'", country, language);
                language
            }
            None => Language::default(),
        };

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.chosen_explicitly {
            state.current = detected;
        }
        state.status = DetectionStatus::Detected;
        detected
    }

    /// First country code any probe returns, or `None` once all failed.
    pub async fn detect_country(&self) -> Option<String> {
        for probe in &self.probes {
            match tokio::time::timeout(self.timeout, self.probe(probe)).await {
                Ok(Ok(country)) => {
                    tracing::info!("Detected country '{}' using {}", country, probe.name);
                    return Some(country);
                }
                Ok(Err(e)) => tracing::debug!("Geo probe {} failed: {}", probe.name, e),
                Err(_) => tracing::debug!(
                    "Geo probe {} timed out after {:?}",
                    probe.name,
                    self.timeout
                ),
            }
        }

        tracing::warn!("All IP detection services failed or timed out. Defaulting to English.");
        None
    }

    async fn probe(&self, probe: &GeoProbe) -> Result<String, AppError> {
        let response = self
            .client
            .get(probe.url.clone())
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;

        body.get(&probe.country_field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|country| !country.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Upstream(format!(
                    "{} returned no '{}' field",
                    probe.name, probe.country_field
                ))
            })
    }

    fn set_status(&self, status: DetectionStatus) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).status = status;
    }
}
