//! Survey state machine.
//!
//! Walks the question list one question at a time. Answers feed the score
//! ledger; skips only advance.
//!
//! ## State Transitions
//!
//! ```text
//! NotStarted -> InProgress(0) -> InProgress(i+1) -> ... -> Completed
//!      ^                                                       |
//!      +-------------------------- reset ----------------------+
//! ```
//!
//! Two completion signals are kept apart:
//!
//! - [`Survey::is_flow_finished`]: the last question was answered or skipped.
//! - [`Survey::has_complete_answers`]: every question received a real answer.
//!
//! A run where some questions were skipped finishes the flow without ever
//! having complete answers.
//!
//! ## Usage
//!
//! ```ignore
//! let mut survey = Survey::new();
//! survey.begin(&questions, &tasks)?;
//! survey.answer(true)?;
//! survey.skip()?;
//! let pick = survey.recommend_random();
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::history::SurveyRecord;
use crate::error::{CoreError, Result};
use crate::events::SurveyEvent;
use crate::model::{Question, Task};
use crate::scoring::{self, RankedTask, ScoreEvent, ScoreLedger};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SurveyState {
    #[default]
    NotStarted,
    InProgress { index: usize },
    Completed,
}

impl SurveyState {
    fn label(&self) -> &'static str {
        match self {
            SurveyState::NotStarted => "not started",
            SurveyState::InProgress { .. } => "in progress",
            SurveyState::Completed => "completed",
        }
    }
}

/// Entry action to offer from the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    /// Nothing answered yet.
    Begin,
    /// A run is underway.
    Continue,
    /// The run is over; a reset comes first.
    StartFresh,
}

/// One survey run over a fixed snapshot of questions and tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Survey {
    state: SurveyState,
    questions: Vec<Question>,
    tasks: Vec<Task>,
    /// Question id -> answer. Skips never land here.
    answered: IndexMap<String, bool>,
    ledger: ScoreLedger,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl Survey {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SurveyState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SurveyState::InProgress { index } => Some(index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|i| self.questions.get(i))
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn answered(&self) -> &IndexMap<String, bool> {
        &self.answered
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// 0.0 .. 1.0, counting the question on screen as reached.
    pub fn progress(&self) -> f64 {
        match self.state {
            SurveyState::NotStarted => 0.0,
            SurveyState::InProgress { index } => {
                let total = self.total_questions();
                if total == 0 {
                    return 0.0;
                }
                (index + 1) as f64 / total as f64
            }
            SurveyState::Completed => 1.0,
        }
    }

    /// The last question has been answered or skipped.
    pub fn is_flow_finished(&self) -> bool {
        self.state == SurveyState::Completed
    }

    /// Every question in the run received an answer.
    pub fn has_complete_answers(&self) -> bool {
        !self.answered.is_empty() && self.answered.len() >= self.total_questions()
    }

    pub fn journey(&self) -> JourneyStatus {
        if self.is_flow_finished() || self.has_complete_answers() {
            JourneyStatus::StartFresh
        } else if !self.answered.is_empty() || self.current_index().is_some() {
            JourneyStatus::Continue
        } else {
            JourneyStatus::Begin
        }
    }

    pub fn ranked(&self) -> Vec<RankedTask<'_>> {
        scoring::compute_ranked(&self.tasks, &self.ledger)
    }

    pub fn top_n(&self, n: usize) -> Vec<RankedTask<'_>> {
        scoring::top_n(&self.tasks, &self.ledger, n)
    }

    pub fn recommend<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<RankedTask<'_>> {
        scoring::select_recommendation(&self.tasks, &self.ledger, rng)
    }

    pub fn recommend_random(&self) -> Option<RankedTask<'_>> {
        scoring::select_recommendation_random(&self.tasks, &self.ledger)
    }

    /// Snapshot of a finished run, for history.
    pub fn record(&self) -> Option<SurveyRecord> {
        let completed_at = self.completed_at?;
        Some(SurveyRecord::new(
            self.ledger.to_task_scores(),
            self.answered.clone(),
            completed_at,
        ))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a run over `questions`, scoring against `tasks`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EmptyQuestionSet`] if `questions` is empty, or
    /// [`CoreError::InvalidTransition`] unless the survey is `NotStarted`.
    /// The state is unchanged in both cases.
    pub fn begin(&mut self, questions: &[Question], tasks: &[Task]) -> Result<SurveyEvent> {
        if self.state != SurveyState::NotStarted {
            return Err(self.invalid("begin"));
        }
        if questions.is_empty() {
            return Err(CoreError::EmptyQuestionSet);
        }

        self.questions = questions.to_vec();
        self.tasks = tasks.to_vec();
        self.answered.clear();
        self.ledger.clear();
        self.completed_at = None;
        self.state = SurveyState::InProgress { index: 0 };
        tracing::debug!(total = questions.len(), tasks = tasks.len(), "survey started");

        Ok(SurveyEvent::SurveyStarted {
            total_questions: questions.len(),
            at: Utc::now(),
        })
    }

    /// Answer the current question and move on.
    pub fn answer(&mut self, answer: bool) -> Result<Vec<SurveyEvent>> {
        let index = self.current_index().ok_or_else(|| self.invalid("answer"))?;
        let question = self.questions.get(index).cloned().ok_or_else(|| self.invalid("answer"))?;

        let before = self.ledger.clone();
        let event = ScoreEvent::Answered {
            property: question.property.clone(),
            answer,
        };
        self.ledger = scoring::reduce(std::mem::take(&mut self.ledger), &event, &self.tasks);
        let matched_tasks = self
            .tasks
            .iter()
            .filter(|t| self.ledger.score(&t.id) > before.score(&t.id))
            .count();
        self.answered.insert(question.id.clone(), answer);
        tracing::debug!(question = %question.id, property = %question.property, answer, matched_tasks, "question answered");

        let next_index = self.advance(index);
        let mut events = vec![SurveyEvent::QuestionAnswered {
            question_id: question.id,
            property: question.property,
            answer,
            matched_tasks,
            next_index,
            at: Utc::now(),
        }];
        events.extend(self.completion_event());
        Ok(events)
    }

    /// Move past the current question without recording it.
    pub fn skip(&mut self) -> Result<Vec<SurveyEvent>> {
        let index = self.current_index().ok_or_else(|| self.invalid("skip"))?;
        let question_id = self
            .questions
            .get(index)
            .map(|q| q.id.clone())
            .ok_or_else(|| self.invalid("skip"))?;
        tracing::debug!(question = %question_id, "question skipped");

        let next_index = self.advance(index);
        let mut events = vec![SurveyEvent::QuestionSkipped {
            question_id,
            next_index,
            at: Utc::now(),
        }];
        events.extend(self.completion_event());
        Ok(events)
    }

    /// Back to `NotStarted` from any state. Clears answers and scores.
    pub fn reset(&mut self) -> SurveyEvent {
        self.state = SurveyState::NotStarted;
        self.questions.clear();
        self.tasks.clear();
        self.answered.clear();
        self.ledger = scoring::reduce(std::mem::take(&mut self.ledger), &ScoreEvent::Reset, &[]);
        self.completed_at = None;
        tracing::debug!("survey reset");
        SurveyEvent::SurveyReset { at: Utc::now() }
    }

    /// Reset, then begin a new run.
    ///
    /// If beginning fails the survey is left `NotStarted`.
    pub fn restart(&mut self, questions: &[Question], tasks: &[Task]) -> Result<Vec<SurveyEvent>> {
        let reset = self.reset();
        let started = self.begin(questions, tasks)?;
        Ok(vec![reset, started])
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self, index: usize) -> Option<usize> {
        let next = index + 1;
        if next < self.questions.len() {
            self.state = SurveyState::InProgress { index: next };
            Some(next)
        } else {
            self.state = SurveyState::Completed;
            self.completed_at = Some(Utc::now());
            None
        }
    }

    fn completion_event(&self) -> Option<SurveyEvent> {
        if self.state != SurveyState::Completed {
            return None;
        }
        tracing::debug!(answered = self.answered.len(), total = self.total_questions(), "survey completed");
        Some(SurveyEvent::SurveyCompleted {
            answered: self.answered.len(),
            total_questions: self.total_questions(),
            at: self.completed_at.unwrap_or_else(Utc::now),
        })
    }

    fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            state: self.state.label(),
            action,
        }
    }
}
