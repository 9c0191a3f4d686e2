//! Cumulative per-user progress

use chrono::{Local, NaiveDateTime};
use log::info;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::Database;
use crate::error::{QuizError, Result};

/// Storage format of `last_play`, minute precision.
pub const LAST_PLAYED_FORMAT: &str = "%Y-%m-%d %H:%M";

pub type UserId = i64;

/// Totals across every completed quiz of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub total_answered: u32,
    pub total_correct: u32,
    pub last_played: Option<NaiveDateTime>,
}

impl ProgressRecord {
    /// Record for a user who has never finished a quiz.
    pub fn empty(user_id: UserId) -> Self {
        ProgressRecord {
            user_id,
            total_answered: 0,
            total_correct: 0,
            last_played: None,
        }
    }

    pub fn accuracy_percent(&self) -> f64 {
        if self.total_answered == 0 {
            0.0
        } else {
            self.total_correct as f64 / self.total_answered as f64 * 100.0
        }
    }

    /// `last_played` as shown to users, `-` when never played.
    pub fn last_played_display(&self) -> String {
        self.last_played
            .map(|t| t.format(LAST_PLAYED_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl fmt::Display for ProgressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} correct ({:.1}%), last played {}",
            self.total_correct,
            self.total_answered,
            self.accuracy_percent(),
            self.last_played_display()
        )
    }
}

/// Persistence of cumulative progress, keyed by user.
pub trait ProgressStore: Send + Sync {
    /// Current totals; a zero record when the user has none yet.
    fn get_progress(&self, user_id: UserId) -> Result<ProgressRecord>;

    /// Add to the user's totals and stamp `last_played` with the current time.
    fn update_progress(
        &self,
        user_id: UserId,
        delta_total: u32,
        delta_correct: u32,
    ) -> Result<ProgressRecord>;
}

impl Database {
    /// Same as `update_progress` with an explicit timestamp.
    pub fn update_progress_at(
        &self,
        user_id: UserId,
        delta_total: u32,
        delta_correct: u32,
        now: NaiveDateTime,
    ) -> Result<ProgressRecord> {
        if delta_correct > delta_total {
            return Err(QuizError::InvalidProgress {
                total: delta_total,
                correct: delta_correct,
            });
        }
        let stamp = now.format(LAST_PLAYED_FORMAT).to_string();

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO progress (user_id, total, correct, last_play) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                total = total + excluded.total,
                correct = correct + excluded.correct,
                last_play = excluded.last_play",
            params![user_id, delta_total, delta_correct, stamp],
        )?;
        let record = read_progress(&tx, user_id)?;
        tx.commit()?;

        info!(
            "progress for user {}: +{}/{} -> {}/{}",
            user_id, delta_correct, delta_total, record.total_correct, record.total_answered
        );
        Ok(record)
    }
}

impl ProgressStore for Database {
    fn get_progress(&self, user_id: UserId) -> Result<ProgressRecord> {
        read_progress(&self.conn(), user_id)
    }

    fn update_progress(
        &self,
        user_id: UserId,
        delta_total: u32,
        delta_correct: u32,
    ) -> Result<ProgressRecord> {
        let now = Local::now().naive_local();
        self.update_progress_at(user_id, delta_total, delta_correct, now)
    }
}

fn read_progress(conn: &rusqlite::Connection, user_id: UserId) -> Result<ProgressRecord> {
    let row = conn
        .query_row(
            "SELECT total, correct, last_play FROM progress WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    Ok(match row {
        Some((total, correct, last_play)) => ProgressRecord {
            user_id,
            total_answered: total,
            total_correct: correct,
            last_played: last_play
                .and_then(|s| NaiveDateTime::parse_from_str(&s, LAST_PLAYED_FORMAT).ok()),
        },
        None => ProgressRecord::empty(user_id),
    })
}
