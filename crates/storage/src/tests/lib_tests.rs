use super::*;

#[tokio::test]
async fn saves_and_loads_snapshot() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .save_snapshot("pimpMyCase_state", r#"{"brand":"iphone"}"#)
        .await
        .expect("save");

    let snapshot = storage
        .load_snapshot("pimpMyCase_state")
        .await
        .expect("load")
        .expect("snapshot present");
    assert_eq!(snapshot.key, "pimpMyCase_state");
    assert_eq!(snapshot.value, r#"{"brand":"iphone"}"#);
}

#[tokio::test]
async fn missing_snapshot_loads_as_none() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.load_snapshot("absent").await.expect("load").is_none());
}

#[tokio::test]
async fn save_overwrites_previous_value() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.save_snapshot("k", "first").await.expect("first");
    storage.save_snapshot("k", "second").await.expect("second");

    let snapshot = storage.load_snapshot("k").await.expect("load").expect("row");
    assert_eq!(snapshot.value, "second");
    assert_eq!(storage.list_snapshot_keys().await.expect("keys"), vec!["k"]);
}

#[tokio::test]
async fn delete_reports_whether_row_existed() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.save_snapshot("k", "v").await.expect("save");

    assert!(storage.delete_snapshot("k").await.expect("delete"));
    assert!(!storage.delete_snapshot("k").await.expect("delete again"));
    assert!(storage.load_snapshot("k").await.expect("load").is_none());
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("kiosk.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[test]
fn memory_urls_have_no_file_path() {
    assert!(database_file("sqlite::memory:").is_none());
    assert!(database_file("sqlite://file:kiosk?mode=memory&cache=shared").is_none());
    assert!(database_file("postgres://db/kiosk").is_none());
    assert_eq!(
        database_file("sqlite://./data/kiosk.db?mode=rwc"),
        Some(Path::new("./data/kiosk.db"))
    );
}
