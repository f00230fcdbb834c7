use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde_aux::field_attributes::deserialize_number_from_string;

pub const DEFAULT_CONFIG_FILE: &str = "configuration/base.yaml";
pub const DEFAULT_MODEL_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com/search.json";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub api_keys: ApiKeys,
    pub model: ModelSettings,
    pub search: SearchSettings,
    pub gathering: GatheringSettings,
    pub fetch: FetchSettings,
    pub render: RenderSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApiKeys {
    pub openai: String,
    pub serpapi: String,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ModelApi {
    Responses,
    Chat,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ModelSettings {
    pub api_base: String,
    pub deployment: String,
    pub api: ModelApi,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub base_delay_ms: u64,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SearchProviderKind {
    Serpapi,
    GoogleHtml,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct SearchSettings {
    pub provider: SearchProviderKind,
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub results_per_query: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    /// Query templates; `{host}` is replaced by the target's canonical host.
    pub queries: Vec<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct GatheringSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_pages: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_chars: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_char_cap: usize,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct FetchSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct RenderSettings {
    pub webdriver_url: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    get_configuration_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Layers, lowest first: conventional provider variables, the yaml file, `APP_` variables.
pub fn get_configuration_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .set_default("api_keys.openai", env_or("AZURE_OPENAI_API_KEY", ""))?
        .set_default("api_keys.serpapi", env_or("SERPAPI_API_KEY", ""))?
        .set_default(
            "model.api_base",
            env_or("AZURE_OPENAI_ENDPOINT", DEFAULT_MODEL_API_BASE),
        )?
        .set_default("search.base_url", env_or("SERP_API_URL", DEFAULT_SERPAPI_URL))?
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}
