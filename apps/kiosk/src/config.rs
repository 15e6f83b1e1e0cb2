use std::{collections::HashMap, fs, path::Path};

use client_core::{ai::DEFAULT_AI_BASE_URL, catalog::DEFAULT_AI_CREDITS, STATE_KEY};
use serde::Serialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "kiosk.toml";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub ai_base_url: String,
    pub database_url: String,
    pub state_key: String,
    pub ai_credits: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ai_base_url: DEFAULT_AI_BASE_URL.into(),
            database_url: "sqlite://./data/kiosk.db".into(),
            state_key: STATE_KEY.into(),
            ai_credits: DEFAULT_AI_CREDITS,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |name| std::env::var(name).ok())
}

/// Defaults, then the TOML file, then environment overrides. `APP__` names
/// win over the plain ones.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_value(&file_cfg, "ai_base_url") {
                    settings.ai_base_url = v;
                }
                if let Some(v) = file_value(&file_cfg, "database_url") {
                    settings.database_url = v;
                }
                if let Some(v) = file_value(&file_cfg, "state_key") {
                    settings.state_key = v;
                }
                if let Some(v) = file_value(&file_cfg, "ai_credits") {
                    apply_credits(&mut settings, &v);
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "config: ignoring unreadable file"),
        }
    }

    if let Some(v) = env("AI_API_BASE_URL") {
        settings.ai_base_url = v;
    }
    if let Some(v) = env("APP__AI_API_BASE_URL") {
        settings.ai_base_url = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__STATE_KEY") {
        settings.state_key = v;
    }

    if let Some(v) = env("APP__AI_CREDITS") {
        apply_credits(&mut settings, &v);
    }

    settings.database_url = normalize_database_url(&settings.database_url);
    settings
}

fn file_value(file_cfg: &HashMap<String, toml::Value>, key: &str) -> Option<String> {
    match file_cfg.get(key)? {
        toml::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn apply_credits(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u32>() {
        Ok(credits) => settings.ai_credits = credits,
        Err(_) => warn!(value = raw, "config: ai_credits is not a number, keeping default"),
    }
}

/// Plain file paths become `sqlite://` urls; blank values fall back to the default.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
