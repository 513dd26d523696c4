//! QA tests for save/load and persistence functionality.
//!
//! These tests verify that character state is properly saved and restored.
//! Run with: `cargo test -p litrpg-core --test qa_persistence`

use litrpg_core::persist::{character_save_path, list_character_saves};
use litrpg_core::{
    create_sample_character, Catalog, Monster, PersistError, ProgressionRules, Rank, Registry,
    RewardRequest, SaveDocument, Selection, Session, SessionError,
};
use tempfile::TempDir;

// =============================================================================
// TEST 1: Save and load through the session
// =============================================================================

#[test]
fn test_save_and_load_session() {
    let registry = Registry::builtin().expect("builtin registry is valid");
    let catalog = Catalog::builtin();
    let rules = ProgressionRules::default();

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let save_path = character_save_path(temp_dir.path(), "Zorian Kazinski");

    let mut session = Session::new(create_sample_character("Zorian Kazinski"), &registry, &catalog, &rules);
    let id = session.queue_reward(
        RewardRequest::combat(vec![Selection::new("wolf", 4)])
            .with_loot(vec![Selection::new("wolf_pelt", 2)]),
    );
    session.apply(id, Some("Ch. 2")).expect("Failed to apply");
    session.save(&save_path).expect("Failed to save");

    assert!(save_path.exists(), "Save file should exist after saving");

    let loaded = Session::load(&save_path, &registry, &catalog, &rules).expect("Failed to load");
    assert_eq!(loaded.character(), session.character());
    assert!(loaded.pending().is_empty());

    let saves = list_character_saves(temp_dir.path()).expect("Failed to list saves");
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].metadata.name, "Zorian Kazinski");
    assert_eq!(saves[0].metadata.level, session.character().level);
}

// =============================================================================
// TEST 2: Quests and custom monsters survive a round trip
// =============================================================================

#[test]
fn test_quests_and_monsters_survive() {
    let registry = Registry::builtin().expect("builtin registry is valid");
    let catalog = Catalog::builtin();
    let rules = ProgressionRules::default();

    let quests = serde_json::json!([
        {"title": "Find the Key", "status": "active", "steps": [1, 2, 3]}
    ]);
    let document = SaveDocument::new(create_sample_character("Zach"))
        .with_quests(quests.clone())
        .with_monsters(vec![Monster::new("aranea", "Aranea Scout", 6, Rank::Regular, 80, 15)]);
    let json = document.to_json().expect("Failed to serialize");

    let mut session = Session::new(create_sample_character("Placeholder"), &registry, &catalog, &rules);
    session.import_json(&json).expect("Failed to import");

    assert_eq!(session.character().name, "Zach");
    assert_eq!(session.quests(), &quests);
    assert!(session.catalog().monster("aranea").is_some());

    let exported: serde_json::Value =
        serde_json::from_str(&session.export_json().expect("Failed to export")).unwrap();
    assert_eq!(exported["quests"], quests);
    assert_eq!(exported["monsters"][0]["id"], "aranea");
}

// =============================================================================
// TEST 3: Bad files
// =============================================================================

#[test]
fn test_load_rejects_bad_files() {
    let registry = Registry::builtin().expect("builtin registry is valid");
    let catalog = Catalog::builtin();
    let rules = ProgressionRules::default();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    let missing = temp_dir.path().join("missing.json");
    assert!(matches!(
        Session::load(&missing, &registry, &catalog, &rules),
        Err(SessionError::Persist(PersistError::Io(_)))
    ));

    let wrong_shape = temp_dir.path().join("wrong.json");
    std::fs::write(&wrong_shape, r#"{"name": "Zorian", "level": 3}"#).unwrap();
    assert!(matches!(
        Session::load(&wrong_shape, &registry, &catalog, &rules),
        Err(SessionError::Persist(PersistError::InvalidFormat))
    ));

    let future = temp_dir.path().join("future.json");
    let mut value: serde_json::Value =
        serde_json::from_str(&SaveDocument::new(create_sample_character("Zorian")).to_json().unwrap())
            .unwrap();
    value["version"] = serde_json::Value::from(99u32);
    std::fs::write(&future, value.to_string()).unwrap();
    assert!(matches!(
        Session::load(&future, &registry, &catalog, &rules),
        Err(SessionError::Persist(PersistError::VersionMismatch { found: 99, .. }))
    ));
}
