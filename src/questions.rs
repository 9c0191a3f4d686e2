//! Question selection: filter the word table and sample a question set

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::word::{QuizFilter, WordEntry};

/// What to do when the filters leave no words at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPoolPolicy {
    /// Fail with `QuizError::EmptyPool`.
    #[default]
    Reject,
    /// Ignore the filters and sample from the whole table.
    FallBackToFull,
}

/// Ordered questions for one quiz, fixed at selection time.
pub type QuestionSet = Vec<WordEntry>;

/// Rows of `pool` matching `filter`, in table order.
pub fn filter_pool<'a>(pool: &'a [WordEntry], filter: &QuizFilter) -> Vec<&'a WordEntry> {
    pool.iter().filter(|w| filter.matches(w)).collect()
}

/// Sample up to `count` questions from the rows matching `filter`.
///
/// Sampling is uniform and without replacement. A pool smaller than `count`
/// is returned whole (in random order), never padded.
pub fn select_questions<R: Rng>(
    pool: &[WordEntry],
    filter: &QuizFilter,
    count: usize,
    policy: EmptyPoolPolicy,
    rng: &mut R,
) -> Result<QuestionSet> {
    let mut candidates = filter_pool(pool, filter);

    if candidates.is_empty() {
        match policy {
            EmptyPoolPolicy::Reject => return Err(QuizError::EmptyPool),
            EmptyPoolPolicy::FallBackToFull => {
                warn!("filter {:?} matched no words, falling back to the full table", filter);
                candidates = pool.iter().collect();
                if candidates.is_empty() {
                    return Err(QuizError::EmptyPool);
                }
            }
        }
    }

    let questions: QuestionSet = candidates
        .choose_multiple(rng, count)
        .map(|w| (*w).clone())
        .collect();

    debug!(
        "selected {} of {} candidate words (requested {})",
        questions.len(),
        candidates.len(),
        count
    );
    Ok(questions)
}
