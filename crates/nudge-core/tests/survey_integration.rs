//! Integration tests for a full survey run against the seeded catalog.

use std::sync::Arc;

use nudge_core::{
    Catalog, CoreError, JourneyStatus, MemoryStore, Properties, Survey, SurveyEvent, SurveyHistory, SurveyState,
    Task,
};
use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

fn seeded_catalog() -> Catalog<Arc<MemoryStore>> {
    Catalog::open(Arc::new(MemoryStore::new())).unwrap()
}

#[test]
fn test_all_yes_ties_every_task() {
    let catalog = seeded_catalog();
    let mut survey = Survey::new();
    catalog.begin_survey(&mut survey).unwrap();

    let mut events = Vec::new();
    for _ in 0..4 {
        events.extend(survey.answer(true).unwrap());
    }

    assert!(matches!(events.last(), Some(SurveyEvent::SurveyCompleted { .. })));
    assert!(survey.is_flow_finished());
    assert!(survey.has_complete_answers());
    for ranked in survey.ranked() {
        assert_eq!(ranked.score, 2, "{}", ranked.task.name);
    }

    // Every tied task must be reachable.
    let mut rng = Mcg128Xsl64::seed_from_u64(2024);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        seen.insert(survey.recommend(&mut rng).unwrap().task.id.clone());
    }
    assert_eq!(seen.len(), 5);
}

#[test]
fn test_single_indoor_answer_then_stop() {
    let catalog = seeded_catalog();
    let mut survey = Survey::new();
    catalog.begin_survey(&mut survey).unwrap();
    survey.answer(true).unwrap();

    assert_eq!(survey.answered().len(), 1);
    assert!(!survey.has_complete_answers());
    assert!(!survey.is_flow_finished());
    assert_eq!(survey.journey(), JourneyStatus::Continue);

    let top = catalog.top_tasks(survey.ledger(), 2);
    let names: Vec<_> = top.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Clean the kitchen", "Write a blog post"]);
    assert!(top.iter().all(|t| t.score == 1));
}

#[test]
fn test_mixed_answers_pick_unique_winner() {
    let catalog = seeded_catalog();
    let mut survey = Survey::new();
    catalog.begin_survey(&mut survey).unwrap();

    // indoor: no, physical: yes, quick: yes, creative: skip
    survey.answer(false).unwrap();
    survey.answer(true).unwrap();
    survey.answer(true).unwrap();
    survey.skip().unwrap();

    assert_eq!(survey.state(), SurveyState::Completed);
    assert!(!survey.has_complete_answers());

    let pick = survey.recommend(&mut StepRng::new(0, 0)).unwrap();
    assert_eq!(pick.task.name, "Go for a run");
    assert_eq!(pick.score, 3);
}

#[test]
fn test_empty_question_set_cannot_begin() {
    let catalog = Catalog::open_with(Arc::new(MemoryStore::new()), false).unwrap();
    let mut survey = Survey::new();

    let err = catalog.begin_survey(&mut survey).unwrap_err();
    assert!(matches!(err, CoreError::EmptyQuestionSet));
    assert_eq!(survey.state(), SurveyState::NotStarted);
}

#[test]
fn test_no_tasks_means_no_recommendation() {
    let catalog = seeded_catalog();
    for task in catalog.tasks() {
        catalog.delete_task(&task.id).unwrap();
    }

    let mut survey = Survey::new();
    catalog.begin_survey(&mut survey).unwrap();
    for _ in 0..4 {
        survey.answer(true).unwrap();
    }
    assert!(survey.recommend_random().is_none());
}

#[test]
fn test_new_property_joins_next_run() {
    let catalog = seeded_catalog();
    let mut props = Properties::new();
    props.insert("outdoor".into(), true);
    catalog.add_task(Task::new("Walk the dog", props)).unwrap();
    catalog.add_property("outdoor", "Do you want to go outside?").unwrap();

    let mut survey = Survey::new();
    catalog.begin_survey(&mut survey).unwrap();
    assert_eq!(survey.total_questions(), 5);

    for _ in 0..4 {
        survey.skip().unwrap();
    }
    assert_eq!(survey.current_question().map(|q| q.property.as_str()), Some("outdoor"));
    survey.answer(true).unwrap();

    let pick = survey.recommend_random().unwrap();
    assert_eq!(pick.task.name, "Walk the dog");
}

#[test]
fn test_completed_runs_go_to_history() {
    let store = Arc::new(MemoryStore::new());
    let catalog = Catalog::open(store.clone()).unwrap();
    let mut history = SurveyHistory::open(store.clone(), 10).unwrap();

    let mut survey = Survey::new();
    for round in 0..2 {
        if round == 0 {
            catalog.begin_survey(&mut survey).unwrap();
        } else {
            survey.restart(&catalog.questions(), &catalog.tasks()).unwrap();
        }
        for _ in 0..4 {
            survey.answer(round == 0).unwrap();
        }
        history.push(survey.record().unwrap()).unwrap();
    }

    let reopened = SurveyHistory::open(store, 10).unwrap();
    assert_eq!(reopened.records().len(), 2);
    assert_eq!(reopened.records()[0].answers.values().filter(|a| **a).count(), 4);
    assert_eq!(reopened.records()[1].answers.values().filter(|a| !**a).count(), 4);
}

#[test]
fn test_reset_mid_run_clears_scores() {
    let catalog = seeded_catalog();
    let mut survey = Survey::new();
    catalog.begin_survey(&mut survey).unwrap();
    survey.answer(true).unwrap();
    survey.answer(true).unwrap();

    let event = survey.reset();
    assert!(matches!(event, SurveyEvent::SurveyReset { .. }));
    assert_eq!(survey.state(), SurveyState::NotStarted);
    assert!(survey.ledger().is_empty());
    assert!(survey.answered().is_empty());
    assert_eq!(survey.progress(), 0.0);
    assert_eq!(survey.journey(), JourneyStatus::Begin);
}
