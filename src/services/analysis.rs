// src/services/analysis.rs

use std::collections::HashMap;

use crate::{
    config::{AVERAGE_SCORE_THRESHOLD, DEFAULT_LANGUAGE, HIGH_SCORE_THRESHOLD},
    error::AppError,
    models::analysis::{AnalysisBand, AnalysisTemplates, Validity},
};

const BUILTIN_TEMPLATES: &str = include_str!("../../data/analysis.json");

/// Band for a score. Low validity overrides the score entirely.
pub fn classify(score: i64, validity: Validity) -> AnalysisBand {
    if validity == Validity::LowValidity {
        AnalysisBand::Invalid
    } else if score >= HIGH_SCORE_THRESHOLD {
        AnalysisBand::High
    } else if score >= AVERAGE_SCORE_THRESHOLD {
        AnalysisBand::Avg
    } else {
        AnalysisBand::Low
    }
}

/// Fixed narrative templates per language.
#[derive(Debug, Clone)]
pub struct AnalysisCatalog {
    templates: HashMap<String, AnalysisTemplates>,
    fallback: AnalysisTemplates,
}

impl AnalysisCatalog {
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_json(BUILTIN_TEMPLATES)
    }

    /// The default language's templates must be present.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let templates: HashMap<String, AnalysisTemplates> = serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidContent(format!("analysis templates: {}", e)))?;

        let fallback = templates.get(DEFAULT_LANGUAGE).cloned().ok_or_else(|| {
            AppError::InvalidContent(format!(
                "analysis templates missing for '{}'",
                DEFAULT_LANGUAGE
            ))
        })?;

        Ok(Self {
            templates,
            fallback,
        })
    }

    pub fn templates_for(&self, language: &str) -> &AnalysisTemplates {
        self.templates.get(language).unwrap_or(&self.fallback)
    }

    pub fn analyze(&self, score: i64, language: &str, validity: Validity) -> (AnalysisBand, &str) {
        let band = classify(score, validity);
        (band, self.templates_for(language).text(band))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AnalysisCatalog {
        AnalysisCatalog::builtin().unwrap()
    }

    #[test]
    fn low_validity_always_wins() {
        for score in [0, 89, 90, 119, 120, 200] {
            assert_eq!(classify(score, Validity::LowValidity), AnalysisBand::Invalid);
        }
    }

    #[test]
    fn high_boundary_is_120() {
        assert_eq!(classify(119, Validity::Valid), AnalysisBand::Avg);
        assert_eq!(classify(120, Validity::Valid), AnalysisBand::High);
    }

    #[test]
    fn average_boundary_is_90() {
        assert_eq!(classify(90, Validity::Valid), AnalysisBand::Avg);
        assert_eq!(classify(89, Validity::Valid), AnalysisBand::Low);
        assert_eq!(classify(-5, Validity::Valid), AnalysisBand::Low);
    }

    #[test]
    fn builtin_catalog_has_all_languages() {
        let catalog = catalog();
        for language in ["en", "zh", "es", "fr", "de", "ja", "hi", "ar", "pt", "ru"] {
            assert!(catalog.templates.contains_key(language), "{}", language);
        }
    }

    #[test]
    fn analyze_returns_the_language_template() {
        let catalog = catalog();
        let (band, text) = catalog.analyze(130, "de", Validity::Valid);
        assert_eq!(band, AnalysisBand::High);
        assert_eq!(text, catalog.templates_for("de").high);
        assert!(text.starts_with("Die Testperson"));
    }

    #[test]
    fn unknown_language_uses_english_templates() {
        let catalog = catalog();
        let (_, text) = catalog.analyze(100, "xx", Validity::Valid);
        assert_eq!(text, catalog.templates_for("en").avg);
    }

    #[test]
    fn catalog_without_default_language_is_rejected() {
        let raw = r#"{"fr": {"high": "h", "avg": "a", "low": "l", "invalid": "i"}}"#;
        assert!(matches!(
            AnalysisCatalog::from_json(raw),
            Err(AppError::InvalidContent(_))
        ));
    }
}
