//! Answer-driven task scoring and recommendation.
//!
//! Every answered question awards one point to each task whose property
//! matches the answer. Scores only grow during a run; nothing is subtracted
//! for a mismatch.
//!
//! ## Ranking vs. recommendation
//!
//! | Function | Ties |
//! |----------|------|
//! | [`compute_ranked`] / [`top_n`] | stable, catalog order |
//! | [`select_recommendation`] | uniform random pick among the top score |
//!
//! The ledger is updated through a pure reducer ([`reduce`]) so callers can
//! treat it as `(ledger, event) -> ledger` and publish the new value however
//! they like.
//!
//! Answering the same question twice without a reset counts it twice. The
//! ledger keys on task id, not question id, so re-answering mid-run requires
//! a reset first.

use indexmap::IndexMap;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskScore};

/// Per-run mapping from task id to accumulated match count.
///
/// Serialized as a `[TaskScore]` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<TaskScore>", from = "Vec<TaskScore>")]
pub struct ScoreLedger {
    entries: IndexMap<String, u32>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score for `task_id`; 0 if it has never been awarded a point.
    pub fn score(&self, task_id: &str) -> u32 {
        self.entries.get(task_id).copied().unwrap_or(0)
    }

    pub fn award(&mut self, task_id: &str) {
        *self.entries.entry(task_id.to_string()).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(id, score)| (id.as_str(), *score))
    }

    /// Wire form, in the order tasks first scored.
    pub fn to_task_scores(&self) -> Vec<TaskScore> {
        self.entries
            .iter()
            .map(|(task_id, score)| TaskScore {
                task_id: task_id.clone(),
                score: *score,
            })
            .collect()
    }

    /// Build from the wire form. Later duplicates overwrite earlier ones.
    pub fn from_task_scores(scores: Vec<TaskScore>) -> Self {
        let entries = scores.into_iter().map(|s| (s.task_id, s.score)).collect();
        Self { entries }
    }
}

impl From<ScoreLedger> for Vec<TaskScore> {
    fn from(ledger: ScoreLedger) -> Self {
        ledger.to_task_scores()
    }
}

impl From<Vec<TaskScore>> for ScoreLedger {
    fn from(scores: Vec<TaskScore>) -> Self {
        ScoreLedger::from_task_scores(scores)
    }
}

/// Input to the ledger reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreEvent {
    Answered { property: String, answer: bool },
    Reset,
}

/// A task paired with its ledger score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedTask<'a> {
    pub task: &'a Task,
    pub score: u32,
}

impl RankedTask<'_> {
    /// Owned copy of the task with its `score` cache filled in.
    pub fn to_scored_task(&self) -> Task {
        let mut task = self.task.clone();
        task.score = self.score;
        task
    }
}

/// Award one point to every task whose `property` equals `answer`.
pub fn apply_answer(property: &str, answer: bool, tasks: &[Task], mut ledger: ScoreLedger) -> ScoreLedger {
    for task in tasks.iter().filter(|t| t.has(property) == answer) {
        ledger.award(&task.id);
    }
    ledger
}

/// Pure reducer: `(ledger, event) -> ledger'`.
pub fn reduce(ledger: ScoreLedger, event: &ScoreEvent, tasks: &[Task]) -> ScoreLedger {
    match event {
        ScoreEvent::Answered { property, answer } => apply_answer(property, *answer, tasks, ledger),
        ScoreEvent::Reset => ScoreLedger::new(),
    }
}

/// All tasks, highest score first. Equal scores keep catalog order.
pub fn compute_ranked<'a>(tasks: &'a [Task], ledger: &ScoreLedger) -> Vec<RankedTask<'a>> {
    let mut ranked: Vec<_> = tasks
        .iter()
        .map(|task| RankedTask {
            task,
            score: ledger.score(&task.id),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Up to `n` best matches, deterministic.
pub fn top_n<'a>(tasks: &'a [Task], ledger: &ScoreLedger, n: usize) -> Vec<RankedTask<'a>> {
    let mut ranked = compute_ranked(tasks, ledger);
    ranked.truncate(n);
    ranked
}

/// Tasks sharing the highest score, in catalog order.
pub fn top_scoring<'a>(tasks: &'a [Task], ledger: &ScoreLedger) -> Vec<RankedTask<'a>> {
    let max = tasks.iter().map(|t| ledger.score(&t.id)).max().unwrap_or(0);
    tasks
        .iter()
        .map(|task| RankedTask {
            task,
            score: ledger.score(&task.id),
        })
        .filter(|r| r.score == max)
        .collect()
}

/// Pick one of the top-scoring tasks uniformly at random.
///
/// Returns `None` only when there are no tasks. A run where nothing scored
/// still yields a pick among all tasks at 0.
pub fn select_recommendation<'a, R>(tasks: &'a [Task], ledger: &ScoreLedger, rng: &mut R) -> Option<RankedTask<'a>>
where
    R: Rng + ?Sized,
{
    let tied = top_scoring(tasks, ledger);
    if tied.is_empty() {
        return None;
    }
    let pick = rng.gen_range(0..tied.len());
    tied.get(pick).copied()
}

/// [`select_recommendation`] with a generator freshly seeded from entropy.
pub fn select_recommendation_random<'a>(tasks: &'a [Task], ledger: &ScoreLedger) -> Option<RankedTask<'a>> {
    let mut rng = Mcg128Xsl64::from_entropy();
    select_recommendation(tasks, ledger, &mut rng)
}
