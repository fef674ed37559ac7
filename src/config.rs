use std::fs;
use std::time::Duration;

use serde::Deserialize;
use tracing::Level;

use crate::campaign::manager::{SoftDeletePolicy, DEFAULT_SOFT_DELETE_POLICY};
use crate::error::Error;

pub const DEFAULT_CONFIG_PATH: &str = "outreach.toml";

#[derive(Clone, Debug)]
pub struct Settings {
    pub bind_addr: String,
    pub log_level: Level,
    pub generation_delay: Duration,
    pub soft_delete_policy: SoftDeletePolicy,
    pub seed_demo_data: bool,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            bind_addr: "127.0.0.1:8080".into(),
            log_level: Level::DEBUG,
            generation_delay: Duration::from_millis(2000),
            soft_delete_policy: DEFAULT_SOFT_DELETE_POLICY,
            seed_demo_data: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    bind_addr: Option<String>,
    log_level: Option<String>,
    generation_delay_ms: Option<u64>,
    soft_delete_policy: Option<SoftDeletePolicy>,
    seed_demo_data: Option<bool>,
}

/// Reads `outreach.toml` (or the file named by `OUTREACH_CONFIG`) if present,
/// then applies `OUTREACH_*` environment overrides.
pub fn load_settings() -> Result<Settings, Error> {
    let path = std::env::var("OUTREACH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let file = fs::read_to_string(path).ok();

    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

pub fn load_settings_from<F>(file: Option<&str>, env: F) -> Result<Settings, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_settings: FileSettings = toml::from_str(raw).map_err(|err| {
            Error::InvalidSetting {
                key: DEFAULT_CONFIG_PATH,
                value: err.to_string(),
            }
        })?;

        if let Some(v) = file_settings.bind_addr {
            settings.bind_addr = v;
        }
        if let Some(v) = file_settings.log_level {
            settings.log_level = parse_setting("log_level", &v)?;
        }
        if let Some(v) = file_settings.generation_delay_ms {
            settings.generation_delay = Duration::from_millis(v);
        }
        if let Some(v) = file_settings.soft_delete_policy {
            settings.soft_delete_policy = v;
        }
        if let Some(v) = file_settings.seed_demo_data {
            settings.seed_demo_data = v;
        }
    }

    if let Some(v) = env("OUTREACH_BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("OUTREACH_LOG_LEVEL") {
        settings.log_level = parse_setting("OUTREACH_LOG_LEVEL", &v)?;
    }
    if let Some(v) = env("OUTREACH_GENERATION_DELAY_MS") {
        let millis: u64 = parse_setting("OUTREACH_GENERATION_DELAY_MS", &v)?;
        settings.generation_delay = Duration::from_millis(millis);
    }
    if let Some(v) = env("OUTREACH_SOFT_DELETE_POLICY") {
        settings.soft_delete_policy = parse_setting("OUTREACH_SOFT_DELETE_POLICY", &v)?;
    }
    if let Some(v) = env("OUTREACH_SEED_DEMO_DATA") {
        settings.seed_demo_data = parse_setting("OUTREACH_SEED_DEMO_DATA", &v)?;
    }

    Ok(settings)
}

fn parse_setting<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, Error> {
    value.trim().parse().map_err(|_| Error::InvalidSetting {
        key,
        value: value.to_string(),
    })
}
