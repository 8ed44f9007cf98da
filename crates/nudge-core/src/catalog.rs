//! Task and question catalog over a [`Store`].
//!
//! The catalog keeps the last committed state as an immutable snapshot.
//! Readers clone an `Arc` to it; writers take a single writer lock, build the
//! next snapshot, persist the full collection(s), and only then swap the new
//! snapshot in. A failed write therefore leaves memory exactly as it was.
//!
//! ## Store keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `tasks` | JSON array of [`Task`] |
//! | `questions` | JSON array of [`Question`] |
//!
//! A missing key is seeded with the sample catalog on open.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, EntityKind, Result, ValidationError};
use crate::events::SurveyEvent;
use crate::model::{normalize_property, Question, QuestionUpdate, Task, TaskUpdate};
use crate::scoring::{self, ScoreLedger};
use crate::seed;
use crate::storage::{Config, Store};
use crate::survey::Survey;

pub const TASKS_KEY: &str = "tasks";
pub const QUESTIONS_KEY: &str = "questions";

/// Committed catalog state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub tasks: Vec<Task>,
    pub questions: Vec<Question>,
}

impl CatalogSnapshot {
    /// Property names in use: question properties first, then any extra
    /// keys found on tasks.
    pub fn known_properties(&self) -> Vec<String> {
        let mut names: IndexSet<&str> = self.questions.iter().map(|q| q.property.as_str()).collect();
        for task in &self.tasks {
            names.extend(task.properties.keys().map(String::as_str));
        }
        names.into_iter().map(str::to_string).collect()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))
    }

    fn question_mut(&mut self, id: &str) -> Result<&mut Question> {
        self.questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Question, id))
    }
}

/// Which collections a mutation rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Touched {
    Tasks,
    Questions,
    Both,
}

/// Owner of the task and question collections.
pub struct Catalog<S: Store> {
    store: S,
    committed: RwLock<Arc<CatalogSnapshot>>,
    writer: Mutex<()>,
}

impl<S: Store> Catalog<S> {
    /// Load the catalog, seeding any missing key with the sample data.
    pub fn open(store: S) -> Result<Self> {
        Self::open_with(store, true)
    }

    /// Load the catalog. With `seed_defaults` off, a missing key loads as
    /// an empty collection and nothing is written.
    pub fn open_with(store: S, seed_defaults: bool) -> Result<Self> {
        let tasks = load_or_seed(&store, TASKS_KEY, seed_defaults, seed::default_tasks)?;
        let questions = load_or_seed(&store, QUESTIONS_KEY, seed_defaults, seed::default_questions)?;
        tracing::debug!(tasks = tasks.len(), questions = questions.len(), "catalog loaded");

        Ok(Self {
            store,
            committed: RwLock::new(Arc::new(CatalogSnapshot { tasks, questions })),
            writer: Mutex::new(()),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Last committed state.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.snapshot().tasks.clone()
    }

    pub fn questions(&self) -> Vec<Question> {
        self.snapshot().questions.clone()
    }

    pub fn known_properties(&self) -> Vec<String> {
        self.snapshot().known_properties()
    }

    /// Up to `n` tasks by score, with their `score` field filled in.
    pub fn top_tasks(&self, ledger: &ScoreLedger, n: usize) -> Vec<Task> {
        let snapshot = self.snapshot();
        scoring::top_n(&snapshot.tasks, ledger, n)
            .iter()
            .map(|r| r.to_scored_task())
            .collect()
    }

    /// [`top_tasks`](Self::top_tasks) with the configured list length.
    pub fn top_matches(&self, ledger: &ScoreLedger, config: &Config) -> Vec<Task> {
        self.top_tasks(ledger, config.top_matches)
    }

    /// Begin `survey` over the current questions and tasks.
    pub fn begin_survey(&self, survey: &mut Survey) -> Result<SurveyEvent> {
        let snapshot = self.snapshot();
        survey.begin(&snapshot.questions, &snapshot.tasks)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Add a task. Known properties it lacks are filled in as `false`.
    pub fn add_task(&self, mut task: Task) -> Result<Task> {
        task.name = required("name", &task.name)?;
        required("id", &task.id)?;

        self.mutate(Touched::Tasks, |next| {
            if next.task(&task.id).is_some() {
                return Err(ValidationError::DuplicateId {
                    kind: "Task",
                    id: task.id.clone(),
                }
                .into());
            }
            for property in next.known_properties() {
                task.backfill(&property);
            }
            next.tasks.push(task.clone());
            Ok(task)
        })
    }

    pub fn update_task(&self, id: &str, mut update: TaskUpdate) -> Result<Task> {
        if let Some(name) = &update.name {
            update.name = Some(required("name", name)?);
        }

        self.mutate(Touched::Tasks, |next| {
            let known = next.known_properties();
            let task = next.task_mut(id)?;
            update.apply(task);
            for property in &known {
                task.backfill(property);
            }
            Ok(task.clone())
        })
    }

    pub fn delete_task(&self, id: &str) -> Result<Task> {
        self.mutate(Touched::Tasks, |next| {
            let pos = next
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| CoreError::not_found(EntityKind::Task, id))?;
            Ok(next.tasks.remove(pos))
        })
    }

    // ── Questions ────────────────────────────────────────────────────

    /// Add a question. A property no task carries yet is backfilled as
    /// `false` on every task.
    pub fn add_question(&self, mut question: Question) -> Result<Question> {
        question.text = required("text", &question.text)?;
        question.property = required("property", &question.property)?;
        required("id", &question.id)?;

        self.mutate(Touched::Both, |next| {
            if next.question(&question.id).is_some() {
                return Err(ValidationError::DuplicateId {
                    kind: "Question",
                    id: question.id.clone(),
                }
                .into());
            }
            backfill_all(&mut next.tasks, &question.property);
            next.questions.push(question.clone());
            Ok(question)
        })
    }

    /// Update a question. Rebinding it to a new property backfills that
    /// property on every task.
    pub fn update_question(&self, id: &str, mut update: QuestionUpdate) -> Result<Question> {
        if let Some(text) = &update.text {
            update.text = Some(required("text", text)?);
        }
        if let Some(property) = &update.property {
            update.property = Some(required("property", property)?);
        }

        self.mutate(Touched::Both, |next| {
            let question = next.question_mut(id)?;
            update.apply(question);
            let question = question.clone();
            backfill_all(&mut next.tasks, &question.property);
            Ok(question)
        })
    }

    /// Remove a question. Task properties are left alone.
    pub fn delete_question(&self, id: &str) -> Result<Question> {
        self.mutate(Touched::Questions, |next| {
            let pos = next
                .questions
                .iter()
                .position(|q| q.id == id)
                .ok_or_else(|| CoreError::not_found(EntityKind::Question, id))?;
            Ok(next.questions.remove(pos))
        })
    }

    // ── Properties ───────────────────────────────────────────────────

    /// Register a new property with its question and backfill it as
    /// `false` on every task.
    ///
    /// Tasks and questions are written together: if either write fails the
    /// store is put back and memory is untouched.
    pub fn add_property(&self, name: &str, question_text: &str) -> Result<Question> {
        let property = normalize_property(name);
        if property.is_empty() {
            return Err(ValidationError::EmptyField { field: "property" }.into());
        }
        let text = required("text", question_text)?;

        let question = self.mutate(Touched::Both, |next| {
            if next.questions.iter().any(|q| q.property == property) {
                return Err(ValidationError::DuplicateProperty(property.clone()).into());
            }
            let question = Question::new(text, property.clone());
            next.questions.push(question.clone());
            backfill_all(&mut next.tasks, &property);
            Ok(question)
        })?;

        tracing::info!(property = %question.property, question = %question.id, "property added");
        Ok(question)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn mutate<T>(&self, touched: Touched, f: impl FnOnce(&mut CatalogSnapshot) -> Result<T>) -> Result<T> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        let mut next = (*current).clone();
        let out = f(&mut next)?;

        self.persist(&current, &next, touched)?;
        *self.committed.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        Ok(out)
    }

    fn persist(&self, current: &CatalogSnapshot, next: &CatalogSnapshot, touched: Touched) -> Result<()> {
        match touched {
            Touched::Tasks => write_key(&self.store, TASKS_KEY, &next.tasks),
            Touched::Questions => write_key(&self.store, QUESTIONS_KEY, &next.questions),
            Touched::Both if current.tasks == next.tasks => write_key(&self.store, QUESTIONS_KEY, &next.questions),
            Touched::Both => {
                write_key(&self.store, TASKS_KEY, &next.tasks)?;
                if let Err(e) = write_key(&self.store, QUESTIONS_KEY, &next.questions) {
                    tracing::warn!(error = %e, "questions write failed, restoring tasks");
                    if let Err(restore) = write_key(&self.store, TASKS_KEY, &current.tasks) {
                        tracing::error!(error = %restore, "failed to restore tasks after partial write");
                    }
                    return Err(e);
                }
                Ok(())
            }
        }
    }
}

fn backfill_all(tasks: &mut [Task], property: &str) {
    let added = tasks.iter_mut().map(|t| t.backfill(property)).filter(|added| *added).count();
    if added > 0 {
        tracing::debug!(property, tasks = added, "property backfilled");
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field }.into());
    }
    Ok(trimmed.to_string())
}

fn write_key<S: Store, T: Serialize>(store: &S, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json).map_err(|e| {
        tracing::warn!(key, error = %e, "store write failed");
        CoreError::persistence(key, e)
    })?;
    tracing::debug!(key, bytes = json.len(), "collection saved");
    Ok(())
}

fn load_or_seed<S, T>(store: &S, key: &str, seed_defaults: bool, seed: impl FnOnce() -> Vec<T>) -> Result<Vec<T>>
where
    S: Store,
    T: Serialize + DeserializeOwned,
{
    match store.get(key).map_err(|e| CoreError::persistence(key, e))? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None if seed_defaults => {
            let items = seed();
            write_key(store, key, &items)?;
            tracing::info!(key, count = items.len(), "seeded default catalog");
            Ok(items)
        }
        None => Ok(Vec::new()),
    }
}
