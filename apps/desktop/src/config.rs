use std::{fs, time::Duration};

use serde::Deserialize;

use client_core::DEFAULT_API_URL;

const CONFIG_FILE: &str = "postboard.toml";

#[derive(Debug, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Defaults, overridden by `postboard.toml` in the working directory,
/// overridden by `POSTBOARD_*` environment variables. Command-line flags are
/// applied on top by the caller.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(api_url) = std::env::var("POSTBOARD_API_URL") {
        settings.api_url = api_url;
    }
    if let Ok(raw) = std::env::var("POSTBOARD_TIMEOUT_SECS") {
        if let Ok(timeout_secs) = raw.parse::<u64>() {
            settings.request_timeout_secs = Some(timeout_secs);
        }
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    // A file that does not parse is ignored wholesale.
    if let Ok(file_config) = toml::from_str::<FileConfig>(raw) {
        if let Some(api_url) = file_config.api_url {
            settings.api_url = api_url;
        }
        if let Some(timeout_secs) = file_config.timeout_secs {
            settings.request_timeout_secs = Some(timeout_secs);
        }
    }
}
