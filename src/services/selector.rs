// src/services/selector.rs

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{
    config::TEST_QUESTION_COUNT,
    models::question::{Question, QuestionBank, TestQuestion},
    services::history::{HistoryTracker, SeenIdSet},
};

/// Outcome of one selection, before history is updated.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Language of the bank actually used (after fallback).
    pub language: String,
    pub questions: Vec<TestQuestion>,
    /// Bank ids of the selected questions, in test order.
    pub newly_seen: Vec<i64>,
    /// Size of the unseen pool the selection was drawn from.
    pub unseen_available: usize,
}

/// Picks up to `TEST_QUESTION_COUNT` questions, preferring ones not in `seen`.
///
/// Unseen and seen questions are shuffled independently (Fisher-Yates via
/// `SliceRandom::shuffle`); the seen pool only tops up a short unseen pool.
pub fn select_test<R>(
    language: &str,
    bank: &QuestionBank,
    seen: &SeenIdSet,
    rng: &mut R,
) -> Selection
where
    R: Rng + ?Sized,
{
    let (resolved, questions) = bank.questions_for(language);

    let (mut unseen, mut already_seen): (Vec<&Question>, Vec<&Question>) =
        questions.iter().partition(|q| !seen.contains(&q.id));

    unseen.shuffle(rng);
    already_seen.shuffle(rng);

    let unseen_available = unseen.len();
    let unseen_taken = unseen_available.min(TEST_QUESTION_COUNT);
    let selected: Vec<&Question> = unseen
        .into_iter()
        .take(unseen_taken)
        .chain(already_seen.into_iter().take(TEST_QUESTION_COUNT - unseen_taken))
        .collect();

    Selection {
        language: resolved.to_string(),
        questions: selected
            .iter()
            .enumerate()
            .map(|(index, q)| TestQuestion::at_position(index + 1, q))
            .collect(),
        newly_seen: selected.iter().map(|q| q.id).collect(),
        unseen_available,
    }
}

/// Selects a test against the tracker's history and records the selection.
pub async fn generate_test(
    language: &str,
    bank: &QuestionBank,
    tracker: &mut HistoryTracker,
) -> Selection {
    // ThreadRng is !Send; keep it out of the await below.
    let selection = {
        let mut rng = rand::thread_rng();
        select_test(language, bank, tracker.seen(), &mut rng)
    };

    tracing::info!(
        "Serving {} questions for [{}] ({} unseen available)",
        selection.questions.len(),
        selection.language,
        selection.unseen_available
    );

    tracker.mark_seen(selection.newly_seen.iter().copied()).await;
    selection
}
