//! Per-quiz session state: question cursor, running score and answer log

use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::choices::ChoiceSet;
use crate::error::{QuizError, Result};
use crate::questions::QuestionSet;
use crate::word::WordEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub word: String,
    pub selected: String,
    pub correct: String,
    pub is_correct: bool,
}

/// Final tally of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: u32,
    pub total: u32,
    pub answers: Vec<AnswerRecord>,
}

impl QuizResult {
    pub fn mistakes(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answers.iter().filter(|a| !a.is_correct)
    }
}

/// A single quiz run. Holds `score <= question_index <= questions.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    id: Uuid,
    state: SessionState,
    questions: QuestionSet,
    question_index: usize,
    score: u32,
    answers: Vec<AnswerRecord>,
    /// Options for the current question, kept so a re-render shows the same order.
    choices: Option<ChoiceSet>,
    flushed: bool,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        QuizSession {
            id: Uuid::new_v4(),
            state: SessionState::NotStarted,
            questions: Vec::new(),
            question_index: 0,
            score: 0,
            answers: Vec::new(),
            choices: None,
            flushed: false,
        }
    }

    /// Bind a question set and move to `InProgress` (or straight to
    /// `Completed` if there is nothing to ask).
    pub fn start(&mut self, questions: QuestionSet) -> Result<()> {
        if self.state != SessionState::NotStarted {
            return Err(QuizError::SessionClosed);
        }
        self.questions = questions;
        self.question_index = 0;
        self.score = 0;
        self.answers.clear();
        self.choices = None;
        self.state = if self.questions.is_empty() {
            SessionState::Completed
        } else {
            SessionState::InProgress
        };
        info!("session {} started with {} questions", self.id, self.questions.len());
        Ok(())
    }

    /// Record an answer. Scores iff `selected == correct`; always advances.
    /// Returns whether the answer was correct.
    pub fn submit_answer(&mut self, selected: &str, correct: &str) -> Result<bool> {
        if self.state != SessionState::InProgress {
            return Err(QuizError::SessionClosed);
        }
        let is_correct = selected == correct;
        if is_correct {
            self.score += 1;
        }
        let word = self
            .questions
            .get(self.question_index)
            .map(|q| q.word.clone())
            .unwrap_or_default();
        self.answers.push(AnswerRecord {
            word,
            selected: selected.to_string(),
            correct: correct.to_string(),
            is_correct,
        });

        self.question_index += 1;
        self.choices = None;
        if self.question_index >= self.questions.len() {
            self.state = SessionState::Completed;
            info!(
                "session {} completed: {}/{}",
                self.id,
                self.score,
                self.questions.len()
            );
        }
        Ok(is_correct)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[WordEntry] {
        &self.questions
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// The question awaiting an answer, if the session is in progress.
    pub fn current_question(&self) -> Option<&WordEntry> {
        match self.state {
            SessionState::InProgress => self.questions.get(self.question_index),
            _ => None,
        }
    }

    pub(crate) fn cached_choices(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref()
    }

    pub(crate) fn cache_choices(&mut self, choices: ChoiceSet) {
        self.choices = Some(choices);
    }

    /// Whether the result has already been written to the progress store.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub(crate) fn mark_flushed(&mut self) {
        self.flushed = true;
    }

    /// Summary of a completed session.
    pub fn result(&self) -> Result<QuizResult> {
        if !self.is_completed() {
            return Err(QuizError::SessionClosed);
        }
        Ok(QuizResult {
            score: self.score,
            total: self.questions.len() as u32,
            answers: self.answers.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog_and_cat() -> QuestionSet {
        vec![
            WordEntry::new("dog", "名", "犬", 1000),
            WordEntry::new("cat", "名", "猫", 1000),
        ]
    }

    #[test]
    fn wrong_then_right_answer() {
        let mut session = QuizSession::new();
        session.start(dog_and_cat()).unwrap();

        assert!(!session.submit_answer("猫", "犬").unwrap());
        assert_eq!(session.score(), 0);
        assert_eq!(session.question_index(), 1);

        assert!(session.submit_answer("猫", "猫").unwrap());
        assert_eq!(session.question_index(), 2);
        assert_eq!(session.score(), 1);
        assert!(session.is_completed());
    }

    #[test]
    fn submit_after_completion_is_closed() {
        let mut session = QuizSession::new();
        session.start(dog_and_cat()).unwrap();
        session.submit_answer("犬", "犬").unwrap();
        session.submit_answer("猫", "猫").unwrap();
        assert!(matches!(
            session.submit_answer("犬", "犬"),
            Err(QuizError::SessionClosed)
        ));
        assert_eq!(session.question_index(), 2);
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn submit_before_start_is_closed() {
        let mut session = QuizSession::new();
        assert_eq!(session.state(), SessionState::NotStarted);
        assert!(matches!(
            session.submit_answer("犬", "犬"),
            Err(QuizError::SessionClosed)
        ));
        assert!(session.current_question().is_none());
    }

    #[test]
    fn cannot_restart_a_session() {
        let mut session = QuizSession::new();
        session.start(dog_and_cat()).unwrap();
        assert!(matches!(session.start(dog_and_cat()), Err(QuizError::SessionClosed)));
    }

    #[test]
    fn empty_question_set_completes_immediately() {
        let mut session = QuizSession::new();
        session.start(Vec::new()).unwrap();
        assert!(session.is_completed());
        let result = session.result().unwrap();
        assert_eq!((result.score, result.total), (0, 0));
    }

    #[test]
    fn score_counts_exact_matches() {
        let questions: QuestionSet = (0..5)
            .map(|i| WordEntry::new(&format!("w{}", i), "名", &format!("m{}", i), 1000))
            .collect();
        let picks = ["m0", "x", "m2", "m3 ", "m4"];
        let mut session = QuizSession::new();
        session.start(questions.clone()).unwrap();
        for (n, (q, pick)) in questions.iter().zip(picks).enumerate() {
            assert_eq!(session.current_question(), Some(q));
            session.submit_answer(pick, &q.meaning).unwrap();
            assert_eq!(session.question_index(), n + 1);
            assert!(session.score() as usize <= session.question_index());
        }
        let result = session.result().unwrap();
        assert_eq!(result.score, 3);
        let missed: Vec<_> = result.mistakes().map(|a| a.word.as_str()).collect();
        assert_eq!(missed, vec!["w1", "w3"]);
    }

    #[test]
    fn result_requires_completion() {
        let mut session = QuizSession::new();
        session.start(dog_and_cat()).unwrap();
        assert!(session.result().is_err());
    }

    #[test]
    fn flush_marker_survives_serialization() {
        let mut session = QuizSession::new();
        session.start(dog_and_cat()).unwrap();
        session.submit_answer("犬", "犬").unwrap();
        session.mark_flushed();
        let json = serde_json::to_string(&session).unwrap();
        let restored: QuizSession = serde_json::from_str(&json).unwrap();
        assert!(restored.is_flushed());
        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.question_index(), 1);
        assert_eq!(restored.current_question().map(|q| q.word.as_str()), Some("cat"));
    }
}
