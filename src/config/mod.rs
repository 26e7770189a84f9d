use crate::models::{ChartKind, Metric};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Where the financials CSV comes from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Local file; takes precedence over `url` when set.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt. Transient failures only.
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Refresh the cached dataset after this long; never when unset.
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
}

/// Hosted language model used for Q&A
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Falls back to `OPENAI_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_persona")]
    pub persona: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Initial selection state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default = "default_metric")]
    pub default_metric: Metric,

    #[serde(default)]
    pub default_chart: ChartKind,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_source_url() -> String {
    "https://raw.githubusercontent.com/JoseLuis2024-1/Proyecto/refs/heads/main/Datos_corregido.csv"
        .to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_user_agent() -> String {
    "ratio-dashboard/0.1".to_string()
}
fn default_assistant_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_persona() -> String {
    crate::assistant::DEFAULT_PERSONA.to_string()
}
fn default_max_tokens() -> u32 {
    256
}
fn default_temperature() -> f32 {
    0.3
}
fn default_metric() -> Metric {
    Metric::LiquidityRatio
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            path: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
            cache_ttl_secs: None,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_assistant_base_url(),
            model: default_model(),
            api_key: None,
            persona: default_persona(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_metric: default_metric(),
            default_chart: ChartKind::default(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("RATIOS").separator("__"))
            .build()?;

        let mut app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;

        if app_cfg.assistant.api_key.is_none() {
            app_cfg.assistant.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        app_cfg.assistant.api_key = app_cfg
            .assistant
            .api_key
            .take()
            .filter(|k| !k.trim().is_empty());

        Ok(app_cfg)
    }
}
