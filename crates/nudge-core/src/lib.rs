//! # Nudge Core Library
//!
//! Core logic for Nudge, a small "what should I do now?" helper. The user
//! answers a handful of yes/no questions, each tied to a property such as
//! `indoor` or `quick`, and every activity that matches an answer gains a
//! point. The best-scoring activity is offered as a suggestion, picked at
//! random when several tie.
//!
//! Screens and navigation live elsewhere; this crate only holds state and
//! decisions.
//!
//! ## Architecture
//!
//! - **Scoring**: pure functions over a per-run score ledger
//! - **Survey**: state machine for one pass through the questions
//! - **Catalog**: tasks and questions persisted through a key/value [`Store`]
//! - **Storage**: in-memory and JSON-file stores, TOML configuration
//!
//! ## Key Components
//!
//! - [`Survey`]: question flow, answers, and the run's ledger
//! - [`Catalog`]: CRUD over tasks and questions
//! - [`ScoreLedger`]: per-task match counts
//! - [`select_recommendation`]: tie-aware random pick

pub mod catalog;
pub mod error;
pub mod events;
pub mod model;
pub mod scoring;
pub mod seed;
pub mod storage;
pub mod survey;

pub use catalog::{Catalog, CatalogSnapshot, QUESTIONS_KEY, TASKS_KEY};
pub use error::{ConfigError, CoreError, EntityKind, Result, StoreError, ValidationError};
pub use events::SurveyEvent;
pub use model::{Properties, Question, QuestionUpdate, Task, TaskScore, TaskUpdate};
pub use scoring::{
    apply_answer, compute_ranked, reduce, select_recommendation, select_recommendation_random, top_n,
    RankedTask, ScoreEvent, ScoreLedger,
};
pub use storage::{Config, JsonFileStore, MemoryStore, Store};
pub use survey::{JourneyStatus, Survey, SurveyHistory, SurveyRecord, SurveyState};
