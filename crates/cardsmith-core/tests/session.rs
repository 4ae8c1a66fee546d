//! Editor session tests with background saving and recovery
//!
//! Runs on paused tokio time so idle periods elapse instantly and
//! deterministically.

use std::sync::Arc;
use std::time::Duration;

use cardsmith_core::{
    AutoSaver, CardEditor, CardState, CardStore, EditorConfig, MemoryStore, RecoveryFile,
    SaveNotice,
};
use tempfile::tempdir;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_commit_burst_is_saved_once() {
    let _ = tracing_subscriber::fmt::try_init();
    let config = EditorConfig::default();
    let store = MemoryStore::new();
    let saver = AutoSaver::spawn(Arc::new(store.clone()), config.autosave_idle());
    let mut notices = saver.subscribe();
    let mut ed = CardEditor::from_config(config.clone()).with_autosave(saver);

    for name in ["A", "Al", "Ali"] {
        ed.set_input("name", name);
        ed.commit();
        sleep(Duration::from_millis(200)).await;
    }
    assert!(store.is_empty());

    sleep(config.autosave_idle()).await;
    let SaveNotice::Saved(id) = notices.recv().await.unwrap() else {
        panic!("expected a save");
    };
    assert_eq!(store.len(), 1);
    assert_eq!(store.fetch(&id).unwrap().unwrap().input("name"), Some(&"Ali".into()));

    ed.assign_card_id(&id);
    assert_eq!(ed.state().card_id.as_ref(), Some(&id));
}

#[tokio::test(start_paused = true)]
async fn test_uncommitted_edits_are_not_saved() {
    let store = MemoryStore::new();
    let saver = AutoSaver::spawn(Arc::new(store.clone()), Duration::from_millis(100));
    let mut ed = CardEditor::from_config(EditorConfig::default()).with_autosave(saver);

    ed.set_input("name", "Ali");
    sleep(Duration::from_secs(5)).await;
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loading_another_card_drops_pending_save() {
    let store = MemoryStore::new();
    let saver = AutoSaver::spawn(Arc::new(store.clone()), Duration::from_millis(500));
    let mut ed = CardEditor::from_config(EditorConfig::default()).with_autosave(saver);

    ed.set_input("name", "Draft");
    ed.commit();
    ed.load(CardState::default());
    sleep(Duration::from_secs(2)).await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_recovery_file_follows_commits() {
    let _ = tracing_subscriber::fmt::try_init();
    let dir = tempdir().unwrap();
    let recovery = RecoveryFile::in_dir(dir.path());
    let mut ed = CardEditor::from_config(EditorConfig::default()).with_recovery(recovery.clone());

    ed.set_input("name", "Ali");
    assert!(recovery.read().unwrap().is_none());
    ed.commit();

    let restored = recovery.read().unwrap().unwrap();
    assert_eq!(&restored, ed.state());

    let mut resumed = CardEditor::from_config(EditorConfig::default());
    resumed.load(restored);
    assert_eq!(resumed.static_markup(), ed.static_markup());
}
