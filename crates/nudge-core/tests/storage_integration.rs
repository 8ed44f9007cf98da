//! Integration tests for catalog persistence on disk.

use nudge_core::{
    Catalog, Config, CoreError, JsonFileStore, Question, Store, SurveyHistory, TaskUpdate, QUESTIONS_KEY, TASKS_KEY,
};

#[test]
fn test_first_run_seeds_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    let catalog = Catalog::open(store).unwrap();

    assert_eq!(catalog.tasks().len(), 5);
    assert!(dir.path().join("tasks.json").exists());
    assert!(dir.path().join("questions.json").exists());
}

#[test]
fn test_edits_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let catalog = Catalog::open(JsonFileStore::open(dir.path()).unwrap()).unwrap();
        catalog.add_property("social", "Do you want company?").unwrap();
        catalog
            .update_task("4", TaskUpdate::default().name("Paint a mural"))
            .unwrap();
        catalog.delete_question("3").unwrap();
    }

    let catalog = Catalog::open(JsonFileStore::open(dir.path()).unwrap()).unwrap();
    let snapshot = catalog.snapshot();
    assert_eq!(snapshot.task("4").map(|t| t.name.as_str()), Some("Paint a mural"));
    assert!(snapshot.tasks.iter().all(|t| t.properties.get("social") == Some(&false)));
    assert!(snapshot.question("3").is_none());
    assert_eq!(snapshot.questions.len(), 4);
}

#[test]
fn test_blob_with_numeric_ids_loads() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    store
        .set(
            TASKS_KEY,
            r#"[{"id":"1700000000000","name":"Call mom","properties":{"indoor":true,"social":true},"score":0}]"#,
        )
        .unwrap();
    store
        .set(
            QUESTIONS_KEY,
            r#"[{"id":"1","text":"Feeling social?","property":"social"}]"#,
        )
        .unwrap();

    let catalog = Catalog::open(store).unwrap();
    assert_eq!(catalog.tasks()[0].name, "Call mom");
    assert_eq!(catalog.known_properties(), vec!["social".to_string(), "indoor".to_string()]);
}

#[test]
fn test_duplicate_question_id_rejected_on_disk_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::open(JsonFileStore::open(dir.path()).unwrap()).unwrap();
    let dup = Question {
        id: "1".into(),
        text: "Again?".into(),
        property: "indoor".into(),
    };
    assert!(matches!(catalog.add_question(dup), Err(CoreError::Validation(_))));
}

#[test]
fn test_config_points_store_at_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let mut config = Config::load_from(&config_path).unwrap();
    config.data_dir = Some(dir.path().join("catalog"));
    config.history_limit = 1;
    config.save_to(&config_path).unwrap();

    let config = Config::load_from(&config_path).unwrap();
    let store = JsonFileStore::open(config.store_dir().unwrap()).unwrap();
    let catalog = Catalog::open_with(store.clone(), config.seed_defaults).unwrap();
    assert_eq!(catalog.questions().len(), 4);

    let history = SurveyHistory::open(store, config.history_limit).unwrap();
    assert!(history.records().is_empty());
    assert!(dir.path().join("catalog").join("tasks.json").exists());
}
