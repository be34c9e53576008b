use std::{fs, path::Path};

use server_api::OpenAiConfig;
use tracing::warn;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_bind: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:8000".into(),
            openai_api_key: None,
            openai_model: "gpt-4.1-mini".into(),
            openai_base_url: "https://api.openai.com/v1".into(),
            temperature: 0.2,
        }
    }
}

impl Settings {
    /// `None` when no API key is configured.
    pub fn openai_config(&self) -> Option<OpenAiConfig> {
        let api_key = self.openai_api_key.clone()?;
        Some(OpenAiConfig {
            api_key,
            model: self.openai_model.clone(),
            base_url: self.openai_base_url.clone(),
            temperature: self.temperature,
        })
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

/// Defaults, then the settings file, then environment variables.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<toml::Table>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(err) => warn!(path = %path.display(), %err, "ignoring unparseable settings file"),
        }
    }

    let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(v) = lookup("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = lookup("OPENAI_API_KEY") {
        settings.openai_api_key = Some(v);
    }
    if let Some(v) = lookup("APP__OPENAI_API_KEY") {
        settings.openai_api_key = Some(v);
    }

    if let Some(v) = lookup("OPENAI_MODEL") {
        settings.openai_model = v;
    }
    if let Some(v) = lookup("APP__OPENAI_MODEL") {
        settings.openai_model = v;
    }

    if let Some(v) = lookup("OPENAI_BASE_URL") {
        settings.openai_base_url = v;
    }
    if let Some(v) = lookup("APP__OPENAI_BASE_URL") {
        settings.openai_base_url = v;
    }

    if let Some(v) = lookup("APP__TEMPERATURE") {
        match v.parse::<f32>() {
            Ok(parsed) => settings.temperature = parsed,
            Err(err) => warn!(value = %v, %err, "ignoring invalid APP__TEMPERATURE"),
        }
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: &toml::Table) {
    let text = |key: &str| {
        file_cfg
            .get(key)
            .and_then(toml::Value::as_str)
            .map(str::to_string)
    };

    if let Some(v) = text("bind_addr") {
        settings.server_bind = v;
    }
    if let Some(v) = text("openai_api_key") {
        settings.openai_api_key = Some(v);
    }
    if let Some(v) = text("openai_model") {
        settings.openai_model = v;
    }
    if let Some(v) = text("openai_base_url") {
        settings.openai_base_url = v;
    }
    match file_cfg.get("temperature") {
        Some(toml::Value::Float(v)) => settings.temperature = *v as f32,
        Some(toml::Value::Integer(v)) => settings.temperature = *v as f32,
        _ => {}
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
