// src/models/language.rs

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{config::DEFAULT_LANGUAGE, error::AppError};

const BUILTIN_UI: &str = include_str!("../../data/ui.json");

/// Languages the service ships content for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
    Es,
    Fr,
    De,
    Ja,
    Hi,
    Ar,
    Pt,
    Ru,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::En,
        Language::Zh,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Ja,
        Language::Hi,
        Language::Ar,
        Language::Pt,
        Language::Ru,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Ja => "ja",
            Language::Hi => "hi",
            Language::Ar => "ar",
            Language::Pt => "pt",
            Language::Ru => "ru",
        }
    }

    /// Maps an ISO 3166 alpha-2 country code to a language.
    ///
    /// Rows are checked in order; unmapped countries get English.
    pub fn from_country(country: &str) -> Self {
        const TABLE: &[(Language, &[&str])] = &[
            (Language::Zh, &["CN", "HK", "TW", "SG", "MO"]),
            (
                Language::Es,
                &[
                    "ES", "MX", "AR", "CO", "PE", "VE", "CL", "EC", "GT", "CU", "BO", "DO", "HN",
                    "PY", "SV", "NI", "CR", "PA", "UY", "GQ",
                ],
            ),
            (
                Language::Fr,
                &["FR", "BE", "MC", "CH", "SN", "ML", "CD", "CI", "CM"],
            ),
            (Language::De, &["DE", "AT", "LI", "LU"]),
            (Language::Ja, &["JP"]),
            (Language::Hi, &["IN"]),
            (
                Language::Ar,
                &[
                    "SA", "AE", "EG", "IQ", "MA", "DZ", "SD", "YE", "OM", "SY", "TN", "JO", "KW",
                    "QA", "BH", "LB", "LY",
                ],
            ),
            (Language::Pt, &["PT", "BR", "AO", "MZ", "CV", "GW"]),
            (Language::Ru, &["RU", "UA", "KZ", "BY", "KG", "UZ"]),
        ];

        let country = country.trim().to_ascii_uppercase();
        TABLE
            .iter()
            .find(|(_, countries)| countries.contains(&country.as_str()))
            .map(|(language, _)| *language)
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported language '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    Detecting,
    Detected,
}

/// Label strings the front-end renders for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiLabels {
    pub start: String,
    pub generating: String,
    pub generating_test: String,
    pub question: String,
    pub next: String,
    pub finish: String,
    pub calculating: String,
    pub paywall_title: String,
    pub paywall_desc: String,
    pub paywall_features_title: String,
    pub paywall_features: Vec<String>,
    pub paywall_note: String,
    pub pay_button: String,
    pub crypto: String,
    pub card: String,
    pub result_title: String,
    pub download_pdf: String,
    pub iq_label: String,
    pub restart: String,
    pub exit: String,
    pub error_title: String,
    pub error_desc: String,
    pub error_action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub ui: UiLabels,
}

/// Entry of `GET /api/languages`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageSummary {
    pub code: String,
    pub name: String,
}

/// Body of `GET /api/language`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentLanguage {
    pub code: Language,
    pub status: DetectionStatus,
}

/// DTO for choosing the UI language explicitly.
#[derive(Debug, Deserialize, Validate)]
pub struct SetLanguageRequest {
    #[validate(length(min = 2, max = 2, message = "Language code must be two letters."))]
    pub code: String,
}

/// Optional `?lang=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

/// Per-language UI label catalog.
#[derive(Debug, Clone)]
pub struct UiCatalog {
    configs: HashMap<String, LanguageConfig>,
    fallback: LanguageConfig,
}

impl UiCatalog {
    pub fn builtin() -> Result<Self, AppError> {
        let configs: HashMap<String, LanguageConfig> = serde_json::from_str(BUILTIN_UI)
            .map_err(|e| AppError::InvalidContent(format!("ui labels: {}", e)))?;

        for language in Language::ALL {
            if !configs.contains_key(language.code()) {
                return Err(AppError::InvalidContent(format!(
                    "ui labels missing for '{}'",
                    language
                )));
            }
        }
        let fallback = configs[DEFAULT_LANGUAGE].clone();
        Ok(Self { configs, fallback })
    }

    /// Labels for `language`, falling back to the default language.
    pub fn config_for(&self, language: &str) -> &LanguageConfig {
        self.configs.get(language).unwrap_or(&self.fallback)
    }

    pub fn summaries(&self) -> Vec<LanguageSummary> {
        Language::ALL
            .into_iter()
            .map(|language| LanguageSummary {
                code: language.code().to_string(),
                name: self.config_for(language.code()).name.clone(),
            })
            .collect()
    }
}
