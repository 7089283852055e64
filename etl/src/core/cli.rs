use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::StagingMode;
use super::constants::{
    ENV_BATCH_SIZE, ENV_CLICKHOUSE_PASSWORD, ENV_CLICKHOUSE_URL, ENV_CLICKHOUSE_USER, ENV_CONFIG,
    ENV_INPUT_PATH, ENV_INPUT_SHEET, ENV_JSON_LOGS, ENV_POSTGRES_URL, ENV_RETRIES,
    ENV_RETRY_DELAY_SECS, ENV_STAGING_MODE,
};
use crate::domain::pipeline::Stage;

#[derive(Parser)]
#[command(name = "retail-etl")]
#[command(
    version,
    about = "Load retail sales from a spreadsheet into PostgreSQL and ClickHouse",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = ENV_JSON_LOGS)]
    pub json_logs: bool,

    /// Spreadsheet to load (xls, xlsx, xlsb, ods)
    #[arg(long, short = 'i', global = true, env = ENV_INPUT_PATH)]
    pub input: Option<PathBuf>,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long, global = true, env = ENV_INPUT_SHEET)]
    pub sheet: Option<String>,

    /// Rows per ClickHouse insert
    #[arg(long, global = true, env = ENV_BATCH_SIZE)]
    pub batch_size: Option<usize>,

    /// What to do with rows already in the staging table (append, truncate, require-empty)
    #[arg(long, global = true, env = ENV_STAGING_MODE, value_parser = parse_staging_mode)]
    pub staging_mode: Option<StagingMode>,

    /// Retries per stage after the first attempt
    #[arg(long, global = true, env = ENV_RETRIES)]
    pub retries: Option<u32>,

    /// Delay before the first stage retry, in seconds
    #[arg(long, global = true, env = ENV_RETRY_DELAY_SECS)]
    pub retry_delay: Option<u64>,

    /// PostgreSQL connection URL
    #[arg(long, global = true, env = ENV_POSTGRES_URL)]
    pub postgres_url: Option<String>,

    /// ClickHouse HTTP URL
    #[arg(long, global = true, env = ENV_CLICKHOUSE_URL)]
    pub clickhouse_url: Option<String>,

    /// ClickHouse user
    #[arg(long, global = true, env = ENV_CLICKHOUSE_USER)]
    pub clickhouse_user: Option<String>,

    /// ClickHouse password
    #[arg(long, global = true, env = ENV_CLICKHOUSE_PASSWORD, hide_env_values = true)]
    pub clickhouse_password: Option<String>,
}

/// Parse staging mode from CLI/env string
fn parse_staging_mode(s: &str) -> Result<StagingMode, String> {
    match s.to_lowercase().as_str() {
        "append" => Ok(StagingMode::Append),
        "truncate" => Ok(StagingMode::Truncate),
        "require-empty" | "require_empty" => Ok(StagingMode::RequireEmpty),
        _ => Err(format!(
            "Invalid staging mode '{}'. Valid options: append, truncate, require-empty",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run the pipeline (default command)
    Run {
        /// First stage to execute
        #[arg(long, value_enum)]
        from: Option<Stage>,
        /// Last stage to execute
        #[arg(long, value_enum)]
        to: Option<Stage>,
    },
    /// List pipeline stages in execution order
    Stages,
    /// Print revenue totals and daily rollups from ClickHouse
    Report {
        /// Only print the revenue for this gender
        #[arg(long)]
        gender: Option<String>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub json_logs: bool,
    pub input: Option<PathBuf>,
    pub sheet: Option<String>,
    pub batch_size: Option<usize>,
    pub staging_mode: Option<StagingMode>,
    pub retries: Option<u32>,
    pub retry_delay: Option<u64>,
    pub postgres_url: Option<String>,
    pub clickhouse_url: Option<String>,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        json_logs: cli.json_logs,
        input: cli.input,
        sheet: cli.sheet,
        batch_size: cli.batch_size,
        staging_mode: cli.staging_mode,
        retries: cli.retries,
        retry_delay: cli.retry_delay,
        postgres_url: cli.postgres_url,
        clickhouse_url: cli.clickhouse_url,
        clickhouse_user: cli.clickhouse_user,
        clickhouse_password: cli.clickhouse_password,
    };
    (config, cli.command)
}
