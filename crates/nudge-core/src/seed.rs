//! Built-in catalog written to the store on first run.

use crate::model::{Properties, Question, Task};

fn task(id: &str, name: &str, indoor: bool, physical: bool, quick: bool, creative: bool) -> Task {
    let mut properties = Properties::new();
    properties.insert("indoor".into(), indoor);
    properties.insert("physical".into(), physical);
    properties.insert("quick".into(), quick);
    properties.insert("creative".into(), creative);
    Task {
        id: id.to_string(),
        name: name.to_string(),
        properties,
        score: 0,
    }
}

fn question(id: &str, text: &str, property: &str) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        property: property.to_string(),
    }
}

/// The five sample activities.
pub fn default_tasks() -> Vec<Task> {
    vec![
        task("1", "Clean the kitchen", true, true, false, false),
        task("2", "Write a blog post", true, false, false, true),
        task("3", "Go for a run", false, true, true, false),
        task("4", "Paint a picture", true, false, false, true),
        task("5", "Organize desk", true, true, true, false),
    ]
}

/// One question per sample property.
pub fn default_questions() -> Vec<Question> {
    vec![
        question("1", "Do you want to work indoors today?", "indoor"),
        question("2", "Do you feel like doing something physical?", "physical"),
        question("3", "Do you want to do something quick?", "quick"),
        question("4", "Do you want to do something creative?", "creative"),
    ]
}
