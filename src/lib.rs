//! Chutan Core - vocabulary quiz engine
//!
//! Loads a word table (Excel or CSV), samples filtered question sets, builds
//! multiple-choice options, tracks per-session scores and records cumulative
//! progress per user in SQLite.

mod auth;
mod choices;
mod config;
mod dataset;
mod db;
mod error;
mod fuzzy;
mod progress;
mod questions;
mod quiz;
mod session;
mod word;

pub use auth::User;
pub use choices::{generate_choices, ChoiceSet, DEFAULT_CHOICE_COUNT};
pub use config::{QuizConfig, DEFAULT_QUESTION_COUNT};
pub use dataset::{parse_csv, parse_excel, ColumnMapping, Dataset};
pub use db::{init_schema, Database};
pub use error::{QuizError, Result};
pub use fuzzy::{resolve_choice, similarity, DEFAULT_THRESHOLD};
pub use progress::{ProgressRecord, ProgressStore, UserId, LAST_PLAYED_FORMAT};
pub use questions::{filter_pool, select_questions, EmptyPoolPolicy, QuestionSet};
pub use quiz::{Question, QuizRunner, SessionRegistry};
pub use session::{AnswerRecord, QuizResult, QuizSession, SessionState};
pub use word::{GradeRange, PartOfSpeech, QuizFilter, WordEntry};
