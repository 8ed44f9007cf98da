use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every survey state change produces an Event.
/// UI layers re-render from these instead of polling the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurveyEvent {
    SurveyStarted {
        total_questions: usize,
        at: DateTime<Utc>,
    },
    QuestionAnswered {
        question_id: String,
        property: String,
        answer: bool,
        /// Number of tasks that gained a point.
        matched_tasks: usize,
        next_index: Option<usize>,
        at: DateTime<Utc>,
    },
    QuestionSkipped {
        question_id: String,
        next_index: Option<usize>,
        at: DateTime<Utc>,
    },
    SurveyCompleted {
        answered: usize,
        total_questions: usize,
        at: DateTime<Utc>,
    },
    SurveyReset {
        at: DateTime<Utc>,
    },
}

impl SurveyEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            SurveyEvent::SurveyStarted { at, .. }
            | SurveyEvent::QuestionAnswered { at, .. }
            | SurveyEvent::QuestionSkipped { at, .. }
            | SurveyEvent::SurveyCompleted { at, .. }
            | SurveyEvent::SurveyReset { at } => *at,
        }
    }
}
