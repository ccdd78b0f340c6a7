use super::*;

use std::collections::HashMap;

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn empty_database_url_falls_back_to_default() {
    assert_eq!(normalize_database_url("   "), Settings::default().database_url);
}

#[test]
fn keeps_in_memory_url_untouched() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert!(sqlite_path("sqlite::memory:").is_none());
}

#[test]
fn keeps_windows_absolute_path_with_single_sqlite_colon() {
    assert_eq!(
        normalize_database_url("sqlite:C:\\Users\\alice\\test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn converts_sqlite_double_slash_windows_path() {
    assert_eq!(
        normalize_database_url("sqlite://C:/Users/alice/test.db"),
        "sqlite:C:/Users/alice/test.db"
    );
}

#[test]
fn creates_parent_dir_for_sqlite_file_path() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(temp_root.path().join("data").exists());
}

#[test]
fn file_then_env_overrides_apply_in_order() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
        bind_addr = "0.0.0.0:4000"
        database_url = "sqlite://./file.db"
        max_body_bytes = "2048"
        "#,
    );
    assert_eq!(settings.server_bind, "0.0.0.0:4000");
    assert_eq!(settings.max_body_bytes, 2048);

    let env: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "sqlite://./env.db"),
        ("APP__DATABASE_URL", "sqlite://./app.db"),
    ]);
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));
    assert_eq!(settings.server_bind, "0.0.0.0:4000");
    assert_eq!(settings.database_url, "sqlite://./app.db");
}

#[test]
fn unreadable_settings_file_keeps_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "this is = = not toml");
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn prepared_database_url_creates_openable_sqlite_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("server.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    let storage = storage::Storage::new(&prepared).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}
