use spacetraders_intent_agent::storage::{now_ts, AgentStore, StorageError};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> AgentStore {
    let mut store = AgentStore::new(dir.path().join("agent.db"));
    store.connect().expect("Failed to connect store");
    store
}

#[test]
fn test_strategy_notes_overwrite() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    assert!(store.fetch_strategy_notes().unwrap().is_none());
    store.save_strategy_notes("2030-01-01T00:00:00Z", "first").unwrap();
    store.save_strategy_notes("2030-01-01T00:01:00Z", "second").unwrap();

    let notes = store.fetch_strategy_notes().unwrap().unwrap();
    assert_eq!(notes.content, "second");
    assert_eq!(notes.updated_ts, "2030-01-01T00:01:00Z");
}

#[test]
fn test_error_context_save_and_clear() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .save_error_context(&now_ts(), Some("trade: Sell ore"), "agent: 401", "[]")
        .unwrap();
    store.save_error_context(&now_ts(), None, "ships: -1", "{}").unwrap();

    let context = store.fetch_error_context().unwrap().unwrap();
    assert_eq!(context.error_message, "ships: -1");
    assert!(context.intent_summary.is_none());

    store.clear_error_context().unwrap();
    assert!(store.fetch_error_context().unwrap().is_none());

    // Clearing twice is harmless
    store.clear_error_context().unwrap();
    assert!(store.fetch_error_context().unwrap().is_none());
}

#[test]
fn test_logs_newest_first_and_durable() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);

    store.append_log("t1", "advisory", "go mining").unwrap();
    assert_eq!(store.fetch_logs(10).unwrap()[0].message, "go mining");
    store.append_log("t2", "intent", "explore: Scout").unwrap();
    store.append_log("t3", "execute", "explore (TODO)").unwrap();

    let logs = store.fetch_logs(10).unwrap();
    let categories: Vec<&str> = logs.iter().map(|l| l.category.as_str()).collect();
    assert_eq!(categories, vec!["execute", "intent", "advisory"]);
    assert_eq!(store.fetch_logs(2).unwrap().len(), 2);

    store.close();
    assert!(!store.is_connected());
    store.connect().unwrap();

    let reopened = store.fetch_logs(10).unwrap();
    assert_eq!(reopened, logs);
    assert_eq!(
        store.recent_log_lines(2).unwrap(),
        vec!["t2 intent: explore: Scout", "t3 execute: explore (TODO)"]
    );
}

#[test]
fn test_snapshots_persist() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store.save_state_snapshot(&now_ts(), r#"{"source":"SpaceTraders"}"#).unwrap();
    store.save_state_snapshot(&now_ts(), r#"{"source":"SpaceTraders"}"#).unwrap();
    assert_eq!(store.count_state_snapshots().unwrap(), 2);
}

#[test]
fn test_use_before_connect_fails() {
    let dir = TempDir::new().unwrap();
    let mut store = AgentStore::new(dir.path().join("nested").join("agent.db"));

    assert!(matches!(store.append_log("t", "c", "m"), Err(StorageError::NotConnected)));
    assert!(matches!(store.fetch_logs(1), Err(StorageError::NotConnected)));
    assert!(matches!(store.fetch_strategy_notes(), Err(StorageError::NotConnected)));

    // Connecting creates missing parent directories and is idempotent
    store.connect().unwrap();
    store.connect().unwrap();
    store.append_log("t", "c", "m").unwrap();

    store.close();
    assert!(matches!(store.clear_error_context(), Err(StorageError::NotConnected)));
}
