use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CLICKHOUSE_DEFAULT_DATABASE, CLICKHOUSE_DEFAULT_URL, CONFIG_FILE_NAME,
    DEFAULT_BATCH_SIZE, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_SECS,
    POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS, POSTGRES_DEFAULT_DATABASE, POSTGRES_DEFAULT_HOST,
    POSTGRES_DEFAULT_MAX_CONNECTIONS, POSTGRES_DEFAULT_PORT, POSTGRES_DEFAULT_USER,
};
use crate::domain::pipeline::Stage;
use crate::utils::file::expand_path;
use crate::utils::retry::RetryPolicy;

// =============================================================================
// Staging Mode Enum
// =============================================================================

/// Policy for rows already present in the staging table when a load starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagingMode {
    /// Append to whatever is there (reruns re-append every row)
    #[default]
    Append,
    /// Truncate inside the load transaction before inserting
    Truncate,
    /// Refuse to load into a non-empty staging table
    RequireEmpty,
}

impl fmt::Display for StagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingMode::Append => write!(f, "append"),
            StagingMode::Truncate => write!(f, "truncate"),
            StagingMode::RequireEmpty => write!(f, "require-empty"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Spreadsheet input section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InputFileConfig {
    pub path: Option<String>,
    pub sheet: Option<String>,
}

/// Pipeline section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PipelineFileConfig {
    pub batch_size: Option<usize>,
    pub staging_mode: Option<StagingMode>,
}

/// Stage retry section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RetryFileConfig {
    /// Retries after the first attempt (default: 1)
    pub retries: Option<u32>,
    /// Delay before the first retry in seconds (default: 300)
    pub delay_secs: Option<u64>,
    /// Double the delay after every failed retry (default: true)
    pub exponential_backoff: Option<bool>,
}

/// PostgreSQL section
///
/// Either `url` or the discrete connection fields may be given; `url` wins.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostgresFileConfig {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// Maximum number of pooled connections (default: 4)
    pub max_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Statement timeout in seconds, 0 to disable (default: 0)
    pub statement_timeout_secs: Option<u64>,
}

/// ClickHouse section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClickhouseFileConfig {
    pub url: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Enable LZ4 compression (default: true)
    pub compression: Option<bool>,
    /// Server-side `max_execution_time` in seconds, 0 to disable (default: 0)
    pub query_timeout_secs: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub input: Option<InputFileConfig>,
    pub pipeline: Option<PipelineFileConfig>,
    pub retry: Option<RetryFileConfig>,
    pub postgres: Option<PostgresFileConfig>,
    pub clickhouse: Option<ClickhouseFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Names of top-level keys this version does not understand
    fn unknown_fields(&self) -> Vec<String> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(input) = other.input {
            let current = self.input.get_or_insert_with(InputFileConfig::default);
            if input.path.is_some() {
                tracing::trace!(path = ?input.path, "Merging input.path");
                current.path = input.path;
            }
            if input.sheet.is_some() {
                tracing::trace!(sheet = ?input.sheet, "Merging input.sheet");
                current.sheet = input.sheet;
            }
        }

        if let Some(pipeline) = other.pipeline {
            let current = self
                .pipeline
                .get_or_insert_with(PipelineFileConfig::default);
            if pipeline.batch_size.is_some() {
                tracing::trace!(batch_size = ?pipeline.batch_size, "Merging pipeline.batch_size");
                current.batch_size = pipeline.batch_size;
            }
            if pipeline.staging_mode.is_some() {
                tracing::trace!(staging_mode = ?pipeline.staging_mode, "Merging pipeline.staging_mode");
                current.staging_mode = pipeline.staging_mode;
            }
        }

        if let Some(retry) = other.retry {
            let current = self.retry.get_or_insert_with(RetryFileConfig::default);
            if retry.retries.is_some() {
                current.retries = retry.retries;
            }
            if retry.delay_secs.is_some() {
                current.delay_secs = retry.delay_secs;
            }
            if retry.exponential_backoff.is_some() {
                current.exponential_backoff = retry.exponential_backoff;
            }
        }

        if let Some(postgres) = other.postgres {
            let current = self
                .postgres
                .get_or_insert_with(PostgresFileConfig::default);
            if postgres.url.is_some() {
                tracing::trace!(url = "***", "Merging postgres.url");
                current.url = postgres.url;
            }
            if postgres.host.is_some() {
                current.host = postgres.host;
            }
            if postgres.port.is_some() {
                current.port = postgres.port;
            }
            if postgres.user.is_some() {
                current.user = postgres.user;
            }
            if postgres.password.is_some() {
                tracing::trace!(password = "***", "Merging postgres.password");
                current.password = postgres.password;
            }
            if postgres.database.is_some() {
                current.database = postgres.database;
            }
            if postgres.max_connections.is_some() {
                current.max_connections = postgres.max_connections;
            }
            if postgres.acquire_timeout_secs.is_some() {
                current.acquire_timeout_secs = postgres.acquire_timeout_secs;
            }
            if postgres.statement_timeout_secs.is_some() {
                current.statement_timeout_secs = postgres.statement_timeout_secs;
            }
        }

        if let Some(clickhouse) = other.clickhouse {
            let current = self
                .clickhouse
                .get_or_insert_with(ClickhouseFileConfig::default);
            if clickhouse.url.is_some() {
                tracing::trace!(url = "***", "Merging clickhouse.url");
                current.url = clickhouse.url;
            }
            if clickhouse.database.is_some() {
                current.database = clickhouse.database;
            }
            if clickhouse.user.is_some() {
                current.user = clickhouse.user;
            }
            if clickhouse.password.is_some() {
                tracing::trace!(password = "***", "Merging clickhouse.password");
                current.password = clickhouse.password;
            }
            if clickhouse.compression.is_some() {
                current.compression = clickhouse.compression;
            }
            if clickhouse.query_timeout_secs.is_some() {
                current.query_timeout_secs = clickhouse.query_timeout_secs;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Spreadsheet input (final/runtime)
#[derive(Debug, Clone, Default)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    pub sheet: Option<String>,
}

/// Pipeline behaviour (final/runtime)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub staging_mode: StagingMode,
}

/// PostgreSQL configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Full connection URL; takes precedence over the discrete fields
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Statement timeout in seconds (0 = disabled)
    pub statement_timeout_secs: u64,
}

/// ClickHouse configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct ClickhouseConfig {
    pub url: String,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub compression: bool,
    /// Server-side query timeout in seconds (0 = disabled)
    pub query_timeout_secs: u64,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub pipeline: PipelineConfig,
    pub retry: RetryPolicy,
    pub postgres: PostgresConfig,
    pub clickhouse: ClickhouseConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.retail-etl/retail-etl.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_with_profile(cli, get_profile_config_path())
    }

    fn load_with_profile(cli: &CliConfig, profile_path: Option<PathBuf>) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = profile_path
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;

        tracing::debug!(
            input = ?config.input.path,
            sheet = ?config.input.sheet,
            batch_size = config.pipeline.batch_size,
            staging_mode = %config.pipeline.staging_mode,
            retries = config.retry.retries,
            retry_delay_secs = config.retry.delay.as_secs(),
            postgres_host = %config.postgres.host,
            clickhouse_database = %config.clickhouse.database,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_input = file_config.input.unwrap_or_default();
        let file_pipeline = file_config.pipeline.unwrap_or_default();
        let file_retry = file_config.retry.unwrap_or_default();
        let file_pg = file_config.postgres.unwrap_or_default();
        let file_ch = file_config.clickhouse.unwrap_or_default();

        let input = InputConfig {
            path: cli
                .input
                .as_deref()
                .map(|p| expand_path(&p.to_string_lossy()))
                .or_else(|| file_input.path.map(|p| expand_path(&p))),
            sheet: cli.sheet.clone().or(file_input.sheet),
        };

        let pipeline = PipelineConfig {
            batch_size: cli
                .batch_size
                .or(file_pipeline.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            staging_mode: cli
                .staging_mode
                .or(file_pipeline.staging_mode)
                .unwrap_or_default(),
        };

        let retry = RetryPolicy {
            retries: cli
                .retries
                .or(file_retry.retries)
                .unwrap_or(DEFAULT_RETRIES),
            delay: std::time::Duration::from_secs(
                cli.retry_delay
                    .or(file_retry.delay_secs)
                    .unwrap_or(DEFAULT_RETRY_DELAY_SECS),
            ),
            exponential_backoff: file_retry.exponential_backoff.unwrap_or(true),
        };

        let postgres = PostgresConfig {
            url: cli.postgres_url.clone().or(file_pg.url),
            host: file_pg
                .host
                .unwrap_or_else(|| POSTGRES_DEFAULT_HOST.to_string()),
            port: file_pg.port.unwrap_or(POSTGRES_DEFAULT_PORT),
            user: file_pg
                .user
                .unwrap_or_else(|| POSTGRES_DEFAULT_USER.to_string()),
            password: file_pg.password,
            database: file_pg
                .database
                .unwrap_or_else(|| POSTGRES_DEFAULT_DATABASE.to_string()),
            max_connections: file_pg
                .max_connections
                .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
            acquire_timeout_secs: file_pg
                .acquire_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
            statement_timeout_secs: file_pg.statement_timeout_secs.unwrap_or(0),
        };

        let clickhouse = ClickhouseConfig {
            url: cli
                .clickhouse_url
                .clone()
                .or(file_ch.url)
                .unwrap_or_else(|| CLICKHOUSE_DEFAULT_URL.to_string()),
            database: file_ch
                .database
                .unwrap_or_else(|| CLICKHOUSE_DEFAULT_DATABASE.to_string()),
            user: cli.clickhouse_user.clone().or(file_ch.user),
            password: cli.clickhouse_password.clone().or(file_ch.password),
            compression: file_ch.compression.unwrap_or(true),
            query_timeout_secs: file_ch.query_timeout_secs.unwrap_or(0),
        };

        Self {
            input,
            pipeline,
            retry,
            postgres,
            clickhouse,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.pipeline.batch_size == 0 {
            anyhow::bail!("Configuration error: pipeline.batch_size must be greater than 0");
        }

        if let Some(ref url) = self.postgres.url
            && !(url.starts_with("postgres://") || url.starts_with("postgresql://"))
        {
            anyhow::bail!(
                "Configuration error: postgres.url must start with postgres:// or postgresql://"
            );
        }

        if self.postgres.max_connections == 0 {
            anyhow::bail!("Configuration error: postgres.max_connections must be greater than 0");
        }

        if !self.clickhouse.url.starts_with("http://") && !self.clickhouse.url.starts_with("https://")
        {
            anyhow::bail!(
                "Configuration error: clickhouse.url must start with http:// or https://. Got: {}",
                self.clickhouse.url
            );
        }

        if self.clickhouse.database.is_empty() {
            anyhow::bail!("Configuration error: clickhouse.database must not be empty");
        }

        if self.retry.retries > 0 && self.retry.delay.is_zero() {
            tracing::warn!("retry.delay_secs is 0, failed stages will be retried immediately");
        }

        Ok(())
    }

    /// Fail before connecting when a run that reads the spreadsheet has no input
    pub fn ensure_input_for(&self, stages: &[Stage]) -> Result<()> {
        if !stages.contains(&Stage::StageLoad) {
            return Ok(());
        }
        match &self.input.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(()),
            _ => anyhow::bail!(
                "Configuration error: input.path is required when the run includes {}",
                Stage::StageLoad
            ),
        }
    }
}

/// Get the profile config path (~/.retail-etl/retail-etl.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
