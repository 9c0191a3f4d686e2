//! Error type shared by every quiz operation

use thiserror::Error;

/// Errors emitted by the quiz core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    /// Dataset file missing, unreadable or lacking the expected columns.
    #[error("cannot start quiz: {0}")]
    DataUnavailable(String),
    #[error("no words match the selected filters")]
    EmptyPool,
    #[error("not enough words to build a question: need {needed}, have {available}")]
    InsufficientPool { needed: usize, available: usize },
    #[error("username '{0}' already exists")]
    DuplicateUser(String),
    /// Never says whether the user or the password was wrong.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("quiz session is closed")]
    SessionClosed,
    #[error("unknown quiz session")]
    UnknownSession,
    #[error("correct answers ({correct}) exceed answered questions ({total})")]
    InvalidProgress { total: u32, correct: u32 },
    #[error("invalid quiz settings: {0}")]
    InvalidConfig(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl From<calamine::Error> for QuizError {
    fn from(e: calamine::Error) -> Self {
        QuizError::DataUnavailable(format!("failed to read spreadsheet: {}", e))
    }
}

impl From<csv::Error> for QuizError {
    fn from(e: csv::Error) -> Self {
        QuizError::DataUnavailable(format!("failed to read CSV file: {}", e))
    }
}

impl From<argon2::password_hash::Error> for QuizError {
    fn from(e: argon2::password_hash::Error) -> Self {
        QuizError::PasswordHash(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
