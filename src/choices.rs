//! Multiple-choice distractor generation

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::word::WordEntry;

/// Number of options shown per question.
pub const DEFAULT_CHOICE_COUNT: usize = 3;

/// Displayed options for one question, in on-screen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl ChoiceSet {
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Index of the first option equal to the correct meaning.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

/// Build `k` options for `target`, preferring meanings from words with the
/// same part of speech.
///
/// Duplicate meanings across options are left as drawn. The correct meaning
/// is always present at least once.
pub fn generate_choices<R: Rng>(
    target: &WordEntry,
    pool: &[WordEntry],
    k: usize,
    rng: &mut R,
) -> Result<ChoiceSet> {
    if k == 0 || pool.len() < k {
        return Err(QuizError::InsufficientPool {
            needed: k.max(1),
            available: pool.len(),
        });
    }

    let (mut candidates, others): (Vec<&WordEntry>, Vec<&WordEntry>) = pool
        .iter()
        .partition(|w| w.part_of_speech == target.part_of_speech);

    if candidates.len() < k {
        let missing = k - candidates.len();
        debug!(
            "only {} '{}' candidates for '{}', borrowing {} from other parts of speech",
            candidates.len(),
            target.part_of_speech,
            target.word,
            missing
        );
        candidates.extend(others.choose_multiple(rng, missing).copied());
    }

    let mut options: Vec<String> = candidates
        .choose_multiple(rng, k)
        .map(|w| w.meaning.clone())
        .collect();

    if !options.contains(&target.meaning) {
        let slot = rng.gen_range(0..options.len());
        options[slot] = target.meaning.clone();
    }

    options.shuffle(rng);

    Ok(ChoiceSet {
        options,
        correct_answer: target.meaning.clone(),
    })
}
