//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_LOG_TARGET, ENV_LOG};
use crate::core::summary;
use crate::data::{self, AnalyticalStore, RelationalStore, Stores};
use crate::domain::pipeline::{Pipeline, PipelineSettings, Stage};
use crate::domain::report;

pub struct EtlApp;

impl EtlApp {
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.json_logs);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        match command.unwrap_or(Commands::Run {
            from: None,
            to: None,
        }) {
            Commands::Stages => {
                summary::print_stages();
                Ok(())
            }
            Commands::Run { from, to } => Self::run_pipeline(&cli_config, from, to).await,
            Commands::Report { gender } => Self::report(&cli_config, gender.as_deref()).await,
        }
    }

    async fn run_pipeline(cli: &CliConfig, from: Option<Stage>, to: Option<Stage>) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let stages = Pipeline::plan(from, to)?;
        config.ensure_input_for(stages)?;

        tracing::info!(
            stages = ?stages.iter().map(Stage::as_str).collect::<Vec<_>>(),
            batch_size = config.pipeline.batch_size,
            staging_mode = %config.pipeline.staging_mode,
            "Starting pipeline"
        );

        let stores = Stores::connect(&config.postgres, &config.clickhouse)
            .await
            .context("Failed to connect to the databases")?;

        let relational: Arc<dyn RelationalStore> = Arc::new(stores.relational.clone());
        let analytical: Arc<dyn AnalyticalStore> = Arc::new(stores.analytical.clone());
        let pipeline = Pipeline::new(relational, analytical, PipelineSettings::from_config(&config));

        let report = pipeline.run(stages).await;
        stores.close().await;

        summary::print_run_summary(&report);
        report.into_result()?;
        Ok(())
    }

    async fn report(cli: &CliConfig, gender: Option<&str>) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let analytical = data::connect_analytical(&config.clickhouse)
            .await
            .context("Failed to connect to ClickHouse")?;

        let result = match gender {
            Some(gender) => report::gender_revenue(&analytical, gender)
                .await
                .map(|row| summary::print_gender_revenue(&row)),
            None => report::revenue_report(&analytical)
                .await
                .map(|report| summary::print_report(&report)),
        };
        analytical.close().await;

        result.context("Failed to query revenue")
    }

    fn init_logging(json: bool) {
        let default_filter = format!("info,{}=info", APP_LOG_TARGET);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        if json {
            tracing_subscriber::fmt()
                .json()
                .with_target(true)
                .with_current_span(false)
                .with_env_filter(filter)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_thread_ids(false)
                .with_level(true)
                .with_ansi(true)
                .compact()
                .with_env_filter(filter)
                .init();
        }
    }
}
