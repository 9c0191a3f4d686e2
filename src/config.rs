//! Quiz settings, loadable from a JSON file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::choices::DEFAULT_CHOICE_COUNT;
use crate::error::{QuizError, Result};
use crate::questions::EmptyPoolPolicy;

pub const DEFAULT_QUESTION_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub dataset_path: PathBuf,
    pub db_path: PathBuf,
    pub question_count: usize,
    pub choice_count: usize,
    pub empty_pool_policy: EmptyPoolPolicy,
}

impl Default for QuizConfig {
    fn default() -> Self {
        QuizConfig {
            dataset_path: PathBuf::from("static/Chutan.xlsx"),
            db_path: PathBuf::from("chutan.db"),
            question_count: DEFAULT_QUESTION_COUNT,
            choice_count: DEFAULT_CHOICE_COUNT,
            empty_pool_policy: EmptyPoolPolicy::default(),
        }
    }
}

impl QuizConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            QuizError::DataUnavailable(format!("failed to read config {}: {}", path.display(), e))
        })?;
        let config: QuizConfig = serde_json::from_str(&contents).map_err(|e| {
            QuizError::DataUnavailable(format!("failed to parse config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would let a quiz start and then fail mid-way.
    pub fn validate(&self) -> Result<()> {
        if self.choice_count == 0 {
            return Err(QuizError::InvalidConfig(
                "choice_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
