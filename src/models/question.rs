// src/models/question.rs

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{config::DEFAULT_LANGUAGE, error::AppError};

const BUILTIN_QUESTIONS: &str = include_str!("../../data/questions.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Logic,
    Math,
    Spatial,
    Verbal,
}

/// One record of the static question bank.
///
/// `id` is unique across every language bank, since the seen history is a
/// single id set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    pub id: i64,

    pub category: Category,

    #[validate(length(min = 1, max = 1000))]
    pub text: String,

    /// Exactly four answer options.
    #[validate(length(equal = 4))]
    pub options: Vec<String>,

    /// Zero-based index into `options`.
    pub correct_index: usize,
}

/// A question as shown inside a generated test.
///
/// `id` is the 1-based position within the test, not the bank id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestQuestion {
    pub id: usize,
    pub category: Category,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl TestQuestion {
    pub fn at_position(position: usize, question: &Question) -> Self {
        Self {
            id: position,
            category: question.category,
            text: question.text.clone(),
            options: question.options.clone(),
            correct_index: question.correct_index,
        }
    }
}

/// DTO for returning a generated test.
#[derive(Debug, Serialize, Deserialize)]
pub struct TestResponse {
    /// Language of the bank the questions were drawn from.
    pub language: String,
    pub questions: Vec<TestQuestion>,
}

/// Language-keyed, immutable collection of questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    banks: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
    /// The bank shipped with the binary.
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidContent(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let banks: HashMap<String, Vec<Question>> = serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidContent(format!("question bank: {}", e)))?;

        let bank = Self { banks };
        bank.check()?;
        Ok(bank)
    }

    /// Builds a bank without the default-language requirement. Records are
    /// still checked individually.
    #[cfg(test)]
    pub(crate) fn from_banks(banks: HashMap<String, Vec<Question>>) -> Result<Self, AppError> {
        for (language, questions) in &banks {
            check_language(language, questions)?;
        }
        Ok(Self { banks })
    }

    fn check(&self) -> Result<(), AppError> {
        match self.banks.get(DEFAULT_LANGUAGE) {
            Some(questions) if !questions.is_empty() => {}
            _ => {
                return Err(AppError::InvalidContent(format!(
                    "question bank has no '{}' questions",
                    DEFAULT_LANGUAGE
                )));
            }
        }

        for (language, questions) in &self.banks {
            if questions.is_empty() {
                return Err(AppError::InvalidContent(format!(
                    "question bank for '{}' is empty",
                    language
                )));
            }
            check_language(language, questions)?;
        }
        self.check_disjoint_ids()
    }

    /// History is shared by all languages, so an id may belong to one
    /// language only.
    fn check_disjoint_ids(&self) -> Result<(), AppError> {
        let mut owners: HashMap<i64, &str> = HashMap::new();
        for (language, questions) in &self.banks {
            for question in questions {
                if let Some(other) = owners.insert(question.id, language.as_str()) {
                    return Err(AppError::InvalidContent(format!(
                        "question {} appears in both '{}' and '{}'",
                        question.id, other, language
                    )));
                }
            }
        }
        Ok(())
    }

    /// Questions for `language`, or the default language's when the key is
    /// missing. An empty-but-present bank is returned as is.
    pub fn questions_for(&self, language: &str) -> (&str, &[Question]) {
        if let Some((code, questions)) = self.banks.get_key_value(language) {
            return (code.as_str(), questions.as_slice());
        }
        match self.banks.get_key_value(DEFAULT_LANGUAGE) {
            Some((code, questions)) => (code.as_str(), questions.as_slice()),
            None => (DEFAULT_LANGUAGE, &[]),
        }
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.banks.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }
}

fn check_language(language: &str, questions: &[Question]) -> Result<(), AppError> {
    let mut ids = HashSet::new();
    for question in questions {
        question.validate().map_err(|e| {
            AppError::InvalidContent(format!("question {} ({}): {}", question.id, language, e))
        })?;
        if question.correct_index >= question.options.len() {
            return Err(AppError::InvalidContent(format!(
                "question {} ({}): correct_index {} is out of range",
                question.id, language, question.correct_index
            )));
        }
        if !ids.insert(question.id) {
            return Err(AppError::InvalidContent(format!(
                "question {} ({}): duplicate id",
                question.id, language
            )));
        }
    }
    Ok(())
}
