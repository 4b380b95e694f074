use anyhow::{ensure, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub windowing: WindowingConfig,
    pub answering: AnsweringConfig,
    pub session: SessionConfig,
    pub extractor: ExtractorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty list means any origin is allowed
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Window size is a character budget, only an approximation of the
/// extraction model's token limit. Dense scripts can still overflow it.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WindowingConfig {
    pub max_length: usize,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self { max_length: 512 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AnsweringConfig {
    pub relevance_threshold: f64,
    pub no_answer_message: String,
}

impl Default for AnsweringConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.1,
            no_answer_message: "No relevant answer found in the document.".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub history_cap: usize,
    /// Idle time after which a session is evicted. `None` keeps sessions
    /// until the process exits.
    pub idle_ttl_seconds: Option<u64>,
    pub sweep_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_cap: 50,
            idle_ttl_seconds: None,
            sweep_interval_seconds: 300,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ExtractorConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub max_concurrency: usize,
    pub acquire_timeout_ms: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            endpoint: "/qa".to_string(),
            timeout_seconds: 60,
            max_concurrency: 4,
            acquire_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Daily-rolling log files are written here when set
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,docqa_server=debug".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.windowing.max_length >= 1,
            "windowing.max_length must be at least 1"
        );
        ensure!(
            (0.0..=1.0).contains(&self.answering.relevance_threshold),
            "answering.relevance_threshold must be within [0, 1], got {}",
            self.answering.relevance_threshold
        );
        ensure!(
            self.session.history_cap >= 1,
            "session.history_cap must be at least 1"
        );
        ensure!(
            self.session.sweep_interval_seconds >= 1,
            "session.sweep_interval_seconds must be at least 1"
        );
        ensure!(
            self.extractor.max_concurrency >= 1,
            "extractor.max_concurrency must be at least 1"
        );
        Ok(())
    }
}
