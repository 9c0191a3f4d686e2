//! Quiz orchestration: start, ask, answer, finish

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::choices::{generate_choices, ChoiceSet};
use crate::config::QuizConfig;
use crate::dataset::Dataset;
use crate::error::{QuizError, Result};
use crate::progress::{ProgressStore, UserId};
use crate::questions::{select_questions, EmptyPoolPolicy};
use crate::session::{QuizResult, QuizSession};
use crate::word::{PartOfSpeech, QuizFilter};

/// What a front-end needs to render the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position in the quiz.
    pub number: usize,
    pub total: usize,
    pub word: String,
    pub part_of_speech: PartOfSpeech,
    pub choices: ChoiceSet,
}

/// Runs quizzes over one loaded dataset and flushes results to a progress store.
pub struct QuizRunner {
    dataset: Dataset,
    store: Arc<dyn ProgressStore>,
    question_count: usize,
    choice_count: usize,
    empty_pool_policy: EmptyPoolPolicy,
}

impl QuizRunner {
    pub fn new(dataset: Dataset, store: Arc<dyn ProgressStore>, config: &QuizConfig) -> Self {
        QuizRunner {
            dataset,
            store,
            question_count: config.question_count,
            choice_count: config.choice_count,
            empty_pool_policy: config.empty_pool_policy,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Select questions and open a session.
    ///
    /// Fails before anything is asked if the table is too small to build a
    /// full set of options, so a running quiz never runs out of distractors.
    pub fn start_quiz<R: Rng>(&self, filter: &QuizFilter, rng: &mut R) -> Result<QuizSession> {
        if self.choice_count == 0 {
            return Err(QuizError::InvalidConfig(
                "choice_count must be at least 1".to_string(),
            ));
        }
        if self.dataset.len() < self.choice_count {
            return Err(QuizError::InsufficientPool {
                needed: self.choice_count,
                available: self.dataset.len(),
            });
        }
        let questions = select_questions(
            &self.dataset,
            filter,
            self.question_count,
            self.empty_pool_policy,
            rng,
        )?;

        let mut session = QuizSession::new();
        session.start(questions)?;
        info!(
            "quiz {} started: {} questions, filter {:?}",
            session.id(),
            session.total(),
            filter
        );
        Ok(session)
    }

    /// The current question with its options, or `None` once the quiz is over.
    /// Options are generated once per question and reused on repeat calls.
    pub fn current_question<R: Rng>(
        &self,
        session: &mut QuizSession,
        rng: &mut R,
    ) -> Result<Option<Question>> {
        let Some(target) = session.current_question().cloned() else {
            return Ok(None);
        };
        let choices = match session.cached_choices() {
            Some(choices) => choices.clone(),
            None => {
                let choices = generate_choices(&target, &self.dataset, self.choice_count, rng)?;
                session.cache_choices(choices.clone());
                choices
            }
        };
        Ok(Some(Question {
            number: session.question_index() + 1,
            total: session.total(),
            word: target.word,
            part_of_speech: target.part_of_speech,
            choices,
        }))
    }

    /// Answer the current question. Returns whether it was correct.
    pub fn submit_answer(&self, session: &mut QuizSession, selected: &str) -> Result<bool> {
        let correct = session
            .current_question()
            .map(|q| q.meaning.clone())
            .ok_or(QuizError::SessionClosed)?;
        session.submit_answer(selected, &correct)
    }

    /// Result of a completed quiz. The first call writes the totals to the
    /// progress store; later calls only return the result.
    pub fn finish(&self, session: &mut QuizSession, user_id: UserId) -> Result<QuizResult> {
        let result = session.result()?;
        if session.is_flushed() {
            warn!("quiz {} already recorded, not writing progress again", session.id());
        } else {
            self.store.update_progress(user_id, result.total, result.score)?;
            session.mark_flushed();
        }
        Ok(result)
    }
}

struct ActiveQuiz {
    user_id: UserId,
    session: QuizSession,
}

/// Sessions of many users, keyed by session id. Each user has at most one
/// live session.
pub struct SessionRegistry {
    runner: QuizRunner,
    sessions: Mutex<HashMap<Uuid, ActiveQuiz>>,
}

impl SessionRegistry {
    pub fn new(runner: QuizRunner) -> Self {
        SessionRegistry {
            runner,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, ActiveQuiz>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a quiz for `user_id`, discarding any unfinished quiz of that user.
    pub fn start_quiz(&self, user_id: UserId, filter: &QuizFilter) -> Result<Uuid> {
        let session = self.runner.start_quiz(filter, &mut rand::thread_rng())?;
        let id = session.id();
        let mut sessions = self.sessions();
        sessions.retain(|old_id, active| {
            let stale = active.user_id == user_id;
            if stale {
                info!("user {} restarted, dropping quiz {}", user_id, old_id);
            }
            !stale
        });
        sessions.insert(id, ActiveQuiz { user_id, session });
        Ok(id)
    }

    /// Drop a quiz without recording progress. Returns whether it existed.
    pub fn abandon(&self, id: Uuid) -> bool {
        let removed = self.sessions().remove(&id).is_some();
        if removed {
            info!("quiz {} abandoned", id);
        }
        removed
    }

    pub fn current_question(&self, id: Uuid) -> Result<Option<Question>> {
        let mut sessions = self.sessions();
        let active = sessions.get_mut(&id).ok_or(QuizError::UnknownSession)?;
        self.runner
            .current_question(&mut active.session, &mut rand::thread_rng())
    }

    pub fn submit_answer(&self, id: Uuid, selected: &str) -> Result<bool> {
        let mut sessions = self.sessions();
        let active = sessions.get_mut(&id).ok_or(QuizError::UnknownSession)?;
        self.runner.submit_answer(&mut active.session, selected)
    }

    /// Finish a completed quiz, record progress and drop the session.
    pub fn finish(&self, id: Uuid) -> Result<QuizResult> {
        let mut sessions = self.sessions();
        let active = sessions.get_mut(&id).ok_or(QuizError::UnknownSession)?;
        let result = self.runner.finish(&mut active.session, active.user_id)?;
        sessions.remove(&id);
        Ok(result)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions().len()
    }
}
