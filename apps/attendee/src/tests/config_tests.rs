use super::{apply_env, apply_file, prepare_store_url, Settings};

use std::collections::HashMap;

#[test]
fn defaults_point_at_local_backend() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, "http://localhost:8000/");
    assert_eq!(settings.event_key, None);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_base_url = "https://api.example.com/"
event_key = "summit"
"#,
    );

    assert_eq!(settings.api_base_url, "https://api.example.com/");
    assert_eq!(settings.event_key.as_deref(), Some("summit"));
    assert_eq!(settings.store_path, Settings::default().store_path);
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "api_base_url = [");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("VES_API_BASE_URL", "https://plain.example/"),
        ("APP__API_BASE_URL", "https://app.example/"),
        ("VES_STORE_PATH", "/tmp/attendee.db"),
        ("APP__EVENT_KEY", "expo"),
    ]);
    let mut settings = Settings::default();
    apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.api_base_url, "https://app.example/");
    assert_eq!(settings.store_path, "/tmp/attendee.db");
    assert_eq!(settings.event_key.as_deref(), Some("expo"));
}

#[test]
fn store_paths_become_sqlite_urls() {
    assert_eq!(
        prepare_store_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(prepare_store_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(prepare_store_url("  "), "sqlite://./data/attendee.db");
}
