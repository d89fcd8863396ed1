use std::{collections::HashMap, fs};

use client_core::session::DEFAULT_API_BASE_URL;
use serde::Deserialize;
use storage::normalize_store_url;

pub const CONFIG_FILE: &str = "attendee.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub store_path: String,
    pub event_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            store_path: "./data/attendee.db".into(),
            event_key: None,
        }
    }
}

/// Defaults, then `attendee.toml`, then the environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("store_path") {
        settings.store_path = v.clone();
    }
    if let Some(v) = file_cfg.get("event_key") {
        settings.event_key = Some(v.clone());
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("VES_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("VES_STORE_PATH") {
        settings.store_path = v;
    }
    if let Some(v) = var("APP__STORE_PATH") {
        settings.store_path = v;
    }

    if let Some(v) = var("VES_EVENT_KEY") {
        settings.event_key = Some(v);
    }
    if let Some(v) = var("APP__EVENT_KEY") {
        settings.event_key = Some(v);
    }
}

/// Turns the configured store path into a sqlite url. An empty path falls
/// back to the default location.
pub fn prepare_store_url(raw_store_path: &str) -> String {
    let raw_store_path = raw_store_path.trim();
    if raw_store_path.is_empty() {
        return normalize_store_url(&Settings::default().store_path);
    }
    normalize_store_url(raw_store_path)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
