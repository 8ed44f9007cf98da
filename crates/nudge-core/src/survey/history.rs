//! Records of finished survey runs.
//!
//! Kept under the `"surveys"` store key, oldest first, capped at a
//! configurable length.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::TaskScore;
use crate::storage::Store;

pub const SURVEYS_KEY: &str = "surveys";

/// Snapshot of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub id: String,
    pub task_scores: Vec<TaskScore>,
    #[serde(default)]
    pub answers: IndexMap<String, bool>,
    pub completed_at: DateTime<Utc>,
}

impl SurveyRecord {
    pub fn new(task_scores: Vec<TaskScore>, answers: IndexMap<String, bool>, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_scores,
            answers,
            completed_at,
        }
    }
}

/// Store-backed list of completed runs.
pub struct SurveyHistory<S: Store> {
    store: S,
    limit: usize,
    records: Vec<SurveyRecord>,
}

impl<S: Store> SurveyHistory<S> {
    /// Load existing records, keeping at most `limit` of the newest.
    pub fn open(store: S, limit: usize) -> Result<Self> {
        let mut records: Vec<SurveyRecord> = match store
            .get(SURVEYS_KEY)
            .map_err(|e| CoreError::persistence(SURVEYS_KEY, e))?
        {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        trim_to(&mut records, limit);
        Ok(Self { store, limit, records })
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&SurveyRecord> {
        self.records.last()
    }

    /// Append a record, dropping the oldest beyond the limit.
    ///
    /// Nothing changes in memory if the write fails.
    pub fn push(&mut self, record: SurveyRecord) -> Result<()> {
        let mut next = self.records.clone();
        next.push(record);
        trim_to(&mut next, self.limit);
        self.commit(next)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }

    fn commit(&mut self, next: Vec<SurveyRecord>) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        self.store
            .set(SURVEYS_KEY, &json)
            .map_err(|e| CoreError::persistence(SURVEYS_KEY, e))?;
        tracing::debug!(records = next.len(), "survey history saved");
        self.records = next;
        Ok(())
    }
}

fn trim_to(records: &mut Vec<SurveyRecord>, limit: usize) {
    if records.len() > limit {
        let excess = records.len() - limit;
        records.drain(..excess);
    }
}
