use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub auth: Auth,
    pub token_store: TokenStorage,
    pub log: Log,
    pub stub: Stub,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub refresh_path: String,
    /// Case-insensitive fragments that mark a 403 as "account pending approval".
    pub pending_approval_markers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenStorage {
    pub backend: String, // "memory" or "file"
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Stub {
    pub address: String,
    pub refresh_delay_ms: u64,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("DISCOVER_HAITI").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
