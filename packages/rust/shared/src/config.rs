//! Application configuration for Scribe.
//!
//! User config lives at `~/.scribe/scribe.toml`.
//! CLI flags override config file values, which override defaults.
//! Credentials are never stored in the file; it only names the env vars
//! that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScribeError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "scribe.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".scribe";

/// Hosted vocabulary used when neither flag nor config names one.
pub const DEFAULT_VOCABULARY_URL: &str = "https://ejfox.com/tags.json";

/// Default model for the tagging utility (OpenRouter-namespaced).
pub const DEFAULT_TAG_MODEL: &str = "openai/gpt-3.5-turbo";

/// Default model for the summary utility.
pub const DEFAULT_DEK_MODEL: &str = "gpt-3.5-turbo";

// ---------------------------------------------------------------------------
// Config structs (matching scribe.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tagging utility defaults.
    #[serde(default)]
    pub tagging: TaggingDefaults,

    /// Summary utility defaults.
    #[serde(default)]
    pub summary: SummaryDefaults,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Direct OpenAI provider.
    #[serde(default)]
    pub openai: OpenAiSection,

    /// OpenRouter routing proxy.
    #[serde(default)]
    pub openrouter: OpenRouterSection,
}

/// `[tagging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingDefaults {
    /// URL of the JSON array of permitted tags.
    #[serde(default = "default_vocabulary_url")]
    pub vocabulary_url: String,

    /// Model id used for tag suggestions.
    #[serde(default = "default_tag_model")]
    pub model: String,
}

impl Default for TaggingDefaults {
    fn default() -> Self {
        Self {
            vocabulary_url: default_vocabulary_url(),
            model: default_tag_model(),
        }
    }
}

fn default_vocabulary_url() -> String {
    DEFAULT_VOCABULARY_URL.into()
}
fn default_tag_model() -> String {
    DEFAULT_TAG_MODEL.into()
}

/// `[summary]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDefaults {
    /// Model id used for the dek.
    #[serde(default = "default_dek_model")]
    pub model: String,
}

impl Default for SummaryDefaults {
    fn default() -> Self {
        Self {
            model: default_dek_model(),
        }
    }
}

fn default_dek_model() -> String {
    DEFAULT_DEK_MODEL.into()
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for completion requests, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for the vocabulary fetch, in seconds.
    #[serde(default = "default_vocabulary_timeout_secs")]
    pub vocabulary_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            vocabulary_timeout_secs: default_vocabulary_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}
fn default_vocabulary_timeout_secs() -> u64 {
    30
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSection {
    /// Name of the env var holding the API key.
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,

    /// API base URL.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_key_env(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterSection {
    /// Name of the env var holding the API key.
    #[serde(default = "default_openrouter_key_env")]
    pub api_key_env: String,

    /// Name of the env var that may override the base URL.
    #[serde(default = "default_openrouter_base_url_env")]
    pub base_url_env: String,

    /// Base URL used when the override env var is unset.
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,

    /// `HTTP-Referer` attribution header.
    #[serde(default = "default_openrouter_referer")]
    pub http_referer: Option<String>,

    /// `X-Title` attribution header.
    #[serde(default)]
    pub x_title: Option<String>,
}

impl Default for OpenRouterSection {
    fn default() -> Self {
        Self {
            api_key_env: default_openrouter_key_env(),
            base_url_env: default_openrouter_base_url_env(),
            base_url: default_openrouter_base_url(),
            http_referer: default_openrouter_referer(),
            x_title: None,
        }
    }
}

fn default_openrouter_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_openrouter_base_url_env() -> String {
    "OPENROUTER_BASE_URL".into()
}
fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_openrouter_referer() -> Option<String> {
    Some("https://github.com/OpenRouterTeam/openrouter-examples".into())
}

// ---------------------------------------------------------------------------
// Provider selection
// ---------------------------------------------------------------------------

/// A completion provider the credential chain can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
        }
    }
}

/// Resolved endpoint and credentials handed to the completion client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which candidate won.
    pub kind: ProviderKind,
    /// API base URL (without `/chat/completions`).
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Optional `HTTP-Referer` header.
    pub http_referer: Option<String>,
    /// Optional `X-Title` header.
    pub x_title: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Build the candidate for `kind` if its key is present and non-empty.
fn candidate(
    config: &AppConfig,
    kind: ProviderKind,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Option<ProviderConfig> {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    match kind {
        ProviderKind::OpenAi => {
            let api_key = non_empty(&config.openai.api_key_env)?;
            Some(ProviderConfig {
                kind,
                base_url: config.openai.base_url.clone(),
                api_key,
                http_referer: None,
                x_title: None,
                timeout_secs: config.http.timeout_secs,
            })
        }
        ProviderKind::OpenRouter => {
            let section = &config.openrouter;
            let api_key = non_empty(&section.api_key_env)?;
            let base_url =
                non_empty(&section.base_url_env).unwrap_or_else(|| section.base_url.clone());
            Some(ProviderConfig {
                kind,
                base_url,
                api_key,
                http_referer: section.http_referer.clone(),
                x_title: section.x_title.clone(),
                timeout_secs: config.http.timeout_secs,
            })
        }
    }
}

/// Walk `order` and return the first provider with a populated key.
pub fn resolve_provider_with(
    config: &AppConfig,
    order: &[ProviderKind],
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<ProviderConfig> {
    if let Some(provider) = order
        .iter()
        .find_map(|kind| candidate(config, *kind, lookup))
    {
        tracing::debug!(provider = provider.kind.as_str(), base_url = %provider.base_url, "selected completion provider");
        return Ok(provider);
    }

    let vars: Vec<&str> = order
        .iter()
        .map(|kind| match kind {
            ProviderKind::OpenAi => config.openai.api_key_env.as_str(),
            ProviderKind::OpenRouter => config.openrouter.api_key_env.as_str(),
        })
        .collect();
    Err(ScribeError::config(format!(
        "no completion API key found. Set one of: {}",
        vars.join(", ")
    )))
}

/// [`resolve_provider_with`] against the process environment.
pub fn resolve_provider(config: &AppConfig, order: &[ProviderKind]) -> Result<ProviderConfig> {
    resolve_provider_with(config, order, &|name| std::env::var(name).ok())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.scribe/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ScribeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.scribe/scribe.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScribeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScribeError::config(format!("failed to parse {}: {e}", path.display())))
}
