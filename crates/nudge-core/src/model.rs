//! Plain records for tasks, questions and scores.
//!
//! Field names serialize to the same JSON shape the catalog has always been
//! stored in (`taskId` for score entries, everything else lowercase).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered property map. Insertion order is kept for display.
pub type Properties = IndexMap<String, bool>;

/// A candidate activity with named boolean traits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,
    /// Cached score for display. The ledger is authoritative.
    #[serde(default)]
    pub score: u32,
}

impl Task {
    /// Create a task with a freshly minted id.
    pub fn new(name: impl Into<String>, properties: Properties) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            properties,
            score: 0,
        }
    }

    /// Value of `property`, with missing entries read as `false`.
    pub fn has(&self, property: &str) -> bool {
        self.properties.get(property).copied().unwrap_or(false)
    }

    /// Insert `false` for `property` if absent. Returns true if inserted.
    pub fn backfill(&mut self, property: &str) -> bool {
        if self.properties.contains_key(property) {
            return false;
        }
        self.properties.insert(property.to_string(), false);
        true
    }
}

/// A yes/no prompt bound to one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub property: String,
}

impl Question {
    /// Create a question with a freshly minted id.
    pub fn new(text: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            property: property.into(),
        }
    }
}

/// One entry of the score ledger in its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskScore {
    pub task_id: String,
    pub score: u32,
}

/// Partial update for a task. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub properties: Option<Properties>,
}

impl TaskUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(properties) = self.properties {
            task.properties = properties;
        }
    }
}

/// Partial update for a question. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionUpdate {
    pub text: Option<String>,
    pub property: Option<String>,
}

impl QuestionUpdate {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub(crate) fn apply(self, question: &mut Question) {
        if let Some(text) = self.text {
            question.text = text;
        }
        if let Some(property) = self.property {
            question.property = property;
        }
    }
}

/// Normalize a property name the way new properties are registered.
pub fn normalize_property(name: &str) -> String {
    name.trim().to_lowercase()
}
