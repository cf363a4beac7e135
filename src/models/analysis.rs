// src/models/analysis.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Whether response timing suggests the test was taken in good faith.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Valid,
    LowValidity,
}

impl Validity {
    /// Interprets the front-end's validity label. Any label mentioning
    /// `Low` (e.g. "Low (rapid responses)") flags the result.
    pub fn from_label(label: &str) -> Self {
        if label.contains("Low") {
            Validity::LowValidity
        } else {
            Validity::Valid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisBand {
    High,
    Avg,
    Low,
    Invalid,
}

/// The four narrative templates of one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisTemplates {
    pub high: String,
    pub avg: String,
    pub low: String,
    pub invalid: String,
}

impl AnalysisTemplates {
    pub fn text(&self, band: AnalysisBand) -> &str {
        match band {
            AnalysisBand::High => &self.high,
            AnalysisBand::Avg => &self.avg,
            AnalysisBand::Low => &self.low,
            AnalysisBand::Invalid => &self.invalid,
        }
    }
}

/// DTO for `POST /api/analysis`.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalysisRequest {
    pub iq: i64,

    /// Defaults to the current UI language.
    pub language: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub validity: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub band: AnalysisBand,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_label_flags_validity() {
        assert_eq!(Validity::from_label("Low"), Validity::LowValidity);
        assert_eq!(
            Validity::from_label("Low (rapid responses)"),
            Validity::LowValidity
        );
        assert_eq!(Validity::from_label("High"), Validity::Valid);
        assert_eq!(Validity::from_label("Normal"), Validity::Valid);
    }
}
