use super::*;

fn temp_root(label: &str) -> PathBuf {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("ves_attendee_{label}_{suffix}"))
}

#[tokio::test]
async fn stores_reads_and_removes_items() {
    let store = LocalStore::new("sqlite::memory:").await.expect("db");
    assert_eq!(store.get_item("ves_jwt_token").await.expect("get"), None);

    store.set_item("ves_jwt_token", "abc").await.expect("set");
    assert_eq!(
        store.get_item("ves_jwt_token").await.expect("get"),
        Some("abc".to_string())
    );

    store.set_item("ves_jwt_token", "def").await.expect("overwrite");
    assert_eq!(
        store.get_item("ves_jwt_token").await.expect("get"),
        Some("def".to_string())
    );

    store.remove_item("ves_jwt_token").await.expect("remove");
    assert_eq!(store.get_item("ves_jwt_token").await.expect("get"), None);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = LocalStore::new("sqlite::memory:").await.expect("db");
    store.health_check().await.expect("health check");
}

#[tokio::test]
async fn items_survive_reopening_the_store_file() {
    let temp_root = temp_root("reopen");
    let db_path = temp_root.join("nested").join("local.db");
    let url = normalize_store_url(db_path.to_string_lossy().as_ref());

    let store = LocalStore::new(&url).await.expect("db");
    store.set_item("ves_jwt_token", "persisted").await.expect("set");
    store.pool().close().await;
    drop(store);

    assert!(db_path.exists(), "store file should exist: {}", db_path.display());

    let reopened = LocalStore::new(&url).await.expect("reopen");
    assert_eq!(
        reopened.get_item("ves_jwt_token").await.expect("get"),
        Some("persisted".to_string())
    );
    reopened.pool().close().await;

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn memory_store_behaves_like_session_storage() {
    let store = MemoryStore::new();
    store.set_item("ves_admin_jwt", "admin").await.expect("set");
    assert_eq!(
        store.get_item("ves_admin_jwt").await.expect("get"),
        Some("admin".to_string())
    );
    store.remove_item("ves_admin_jwt").await.expect("remove");
    assert_eq!(store.get_item("ves_admin_jwt").await.expect("get"), None);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(normalize_store_url("./data/local.db"), "sqlite://./data/local.db");
    assert_eq!(normalize_store_url("sqlite::memory:"), "sqlite::memory:");
}
