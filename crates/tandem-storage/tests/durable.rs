//! The file-backed durable area across facade restarts.

use futures::StreamExt;
use serde_json::json;
use tandem_storage::{AsyncSingle, ClearTarget, StorageMode};
use tandem_test::{file_storage, setup_test_logging_default, test_dir};

async fn first<T>(mut single: AsyncSingle<T>) -> T {
    single.next().await.unwrap()
}

#[tokio::test]
async fn local_values_survive_restart() {
    setup_test_logging_default();
    let dir = test_dir();

    let storage = file_storage(dir.path());
    assert!(first(storage.set("count", &0, StorageMode::Local)).await);
    assert!(first(storage.set("user", &json!({"name": "a"}), StorageMode::Local)).await);
    drop(storage);

    let restarted = file_storage(dir.path());
    assert_eq!(
        first(restarted.get("count", StorageMode::Local)).await,
        Some(json!(0))
    );
    assert_eq!(
        first(restarted.get("user", StorageMode::Local)).await,
        Some(json!({"name": "a"}))
    );
}

#[tokio::test]
async fn session_values_do_not_survive_restart() {
    let dir = test_dir();

    let storage = file_storage(dir.path());
    assert!(first(storage.set("token", "abc", StorageMode::Session)).await);
    assert_eq!(
        first(storage.get("token", None)).await,
        Some(json!("abc"))
    );
    drop(storage);

    let restarted = file_storage(dir.path());
    assert_eq!(first(restarted.get("token", None)).await, None);
}

#[tokio::test]
async fn removals_and_clears_are_persisted() {
    let dir = test_dir();

    let storage = file_storage(dir.path());
    assert!(first(storage.set("a", &1, StorageMode::Local)).await);
    assert!(first(storage.set("b", &2, StorageMode::Local)).await);
    assert!(first(storage.remove("a", StorageMode::Local)).await);
    drop(storage);

    let restarted = file_storage(dir.path());
    assert_eq!(
        first(restarted.keys(StorageMode::Local)).await,
        vec!["b".to_owned()]
    );

    assert!(first(restarted.clear(ClearTarget::Local)).await);
    drop(restarted);

    let again = file_storage(dir.path());
    assert!(first(again.keys(StorageMode::Local)).await.is_empty());
}

#[tokio::test]
async fn clear_session_keeps_durable_entries() {
    let dir = test_dir();

    let storage = file_storage(dir.path());
    assert!(first(storage.set("a", "s", StorageMode::Session)).await);
    assert!(first(storage.set("b", "l", StorageMode::Local)).await);

    assert!(first(storage.clear(ClearTarget::Session)).await);
    assert_eq!(first(storage.get("a", StorageMode::Session)).await, None);
    assert_eq!(
        first(storage.get("b", StorageMode::Local)).await,
        Some(json!("l"))
    );
}

#[tokio::test]
async fn facades_sharing_a_file_keep_each_others_writes() {
    let dir = test_dir();
    let first_facade = file_storage(dir.path());
    let second_facade = file_storage(dir.path());

    assert!(first(first_facade.set("a", &1, StorageMode::Local)).await);
    assert!(first(second_facade.set("b", &2, StorageMode::Local)).await);

    assert_eq!(
        first(first_facade.get("b", StorageMode::Local)).await,
        Some(json!(2))
    );
    let restarted = file_storage(dir.path());
    assert_eq!(
        first(restarted.keys(StorageMode::Local)).await,
        vec!["a".to_owned(), "b".to_owned()]
    );
}
