use std::time::{SystemTime, UNIX_EPOCH};

use quickcuts_core::config::Config;
use quickcuts_core::history::History;
use quickcuts_core::history_store;

#[test]
fn empty_store_loads_empty_history() {
    let db = history_store::open_memory().unwrap();
    assert!(history_store::load(&db).unwrap().is_empty());
}

#[test]
fn save_then_load_keeps_most_recent_first_order() {
    let mut db = history_store::open_memory().unwrap();
    let mut history = History::default();
    for text in ["build", "test", "deploy prod", "build"] {
        history.insert(text);
    }

    history_store::save(&mut db, &history).unwrap();
    let loaded = history_store::load(&db).unwrap();

    assert_eq!(loaded.entries(), ["build", "deploy prod", "test"]);
}

#[test]
fn save_replaces_previous_contents() {
    let mut db = history_store::open_memory().unwrap();
    history_store::save(&mut db, &History::from_entries(["a", "b", "c"])).unwrap();
    history_store::save(&mut db, &History::from_entries(["z"])).unwrap();

    assert_eq!(history_store::load(&db).unwrap().entries(), ["z"]);
}

#[test]
fn file_store_persists_across_connections() {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "quickcuts-history-{}-{unique}",
        std::process::id()
    ));
    let cfg = Config {
        history_db_path: dir.join("history.sqlite3"),
        ..Default::default()
    };

    {
        let mut db = history_store::open_from_config(&cfg).unwrap();
        history_store::save(&mut db, &History::from_entries(["run fast", "Run Fast"])).unwrap();
    }
    let db = history_store::open_from_config(&cfg).unwrap();
    let loaded = history_store::load(&db).unwrap();
    drop(db);
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(loaded.entries(), ["run fast", "Run Fast"]);
}
