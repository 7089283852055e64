//! Executes a range of stages against the two stores

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use super::error::{PipelineError, StageError};
use super::stage::Stage;
use crate::core::config::{AppConfig, StagingMode};
use crate::data::traits::{AnalyticalStore, RelationalStore};
use crate::data::types::NormalizeSummary;
use crate::domain::aggregate::{AggregateProgress, AggregateSummary, build_aggregates};
use crate::domain::ingest::{IngestError, load_input};
use crate::domain::transfer::{TransferProgress, TransferSummary, transfer_purchases};
use crate::utils::retry::{RetryPolicy, retry_with_backoff_async};

/// Run parameters handed to every stage
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub input: Option<PathBuf>,
    pub sheet: Option<String>,
    pub batch_size: usize,
    pub staging_mode: StagingMode,
    pub retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            input: config.input.path.clone(),
            sheet: config.input.sheet.clone(),
            batch_size: config.pipeline.batch_size,
            staging_mode: config.pipeline.staging_mode,
            retry: config.retry.clone(),
        }
    }
}

/// What a successful stage did
#[derive(Debug, Clone, PartialEq)]
pub enum StageDetail {
    /// DDL stages
    Created,
    Staged { inserted: u64, skipped: usize },
    Normalized(NormalizeSummary),
    Transferred(TransferSummary),
    Aggregated(AggregateSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageStatus {
    Succeeded(StageDetail),
    Failed(String),
    /// Not attempted because an earlier stage failed
    Skipped,
}

#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Per-stage outcomes of one run plus the error that halted it
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<StageOutcome>,
    pub error: Option<PipelineError>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        self.outcomes.iter().map(|o| o.elapsed).sum()
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    pub fn into_result(self) -> Result<(), PipelineError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Work of the current stage that survives a failed attempt
#[derive(Debug, Default)]
struct StageProgress {
    transfer: TransferProgress,
    aggregate: AggregateProgress,
}

pub struct Pipeline {
    relational: Arc<dyn RelationalStore>,
    analytical: Arc<dyn AnalyticalStore>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        analytical: Arc<dyn AnalyticalStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            relational,
            analytical,
            settings,
        }
    }

    /// Stages between `from` and `to`, both inclusive
    pub fn plan(
        from: Option<Stage>,
        to: Option<Stage>,
    ) -> Result<&'static [Stage], PipelineError> {
        Stage::range(from, to).ok_or(PipelineError::InvalidRange {
            from: from.unwrap_or(Stage::StageCreate),
            to: to.unwrap_or(Stage::Aggregate),
        })
    }

    /// Run `stages` in order
    ///
    /// The first stage that still fails after its retries halts the run;
    /// every later stage is recorded as skipped. A retried attempt resumes
    /// the writes of the failed one rather than repeating them.
    pub async fn run(&self, stages: &[Stage]) -> RunReport {
        let now = chrono::Utc::now().naive_utc();
        let mut report = RunReport::default();

        for &stage in stages {
            if report.error.is_some() {
                report.outcomes.push(StageOutcome {
                    stage,
                    status: StageStatus::Skipped,
                    attempts: 0,
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            tracing::info!(stage = %stage, "Stage started");
            let started = Instant::now();
            let progress = StageProgress::default();
            let result = retry_with_backoff_async(
                &self.settings.retry,
                StageError::is_retryable,
                || self.execute(stage, now, &progress),
            )
            .await;
            let elapsed = started.elapsed();

            match result {
                Ok((detail, attempts)) => {
                    tracing::info!(
                        stage = %stage,
                        attempts,
                        elapsed_ms = elapsed.as_millis(),
                        "Stage finished"
                    );
                    report.outcomes.push(StageOutcome {
                        stage,
                        status: StageStatus::Succeeded(detail),
                        attempts,
                        elapsed,
                    });
                }
                Err((source, attempts)) => {
                    tracing::error!(
                        stage = %stage,
                        attempts,
                        backend = source.backend().unwrap_or("-"),
                        error = %source,
                        "Stage failed, halting pipeline"
                    );
                    report.outcomes.push(StageOutcome {
                        stage,
                        status: StageStatus::Failed(source.to_string()),
                        attempts,
                        elapsed,
                    });
                    report.error = Some(PipelineError::Stage {
                        stage,
                        attempts,
                        source,
                    });
                }
            }
        }
        report
    }

    async fn execute(
        &self,
        stage: Stage,
        now: NaiveDateTime,
        progress: &StageProgress,
    ) -> Result<StageDetail, StageError> {
        match stage {
            Stage::StageCreate => {
                self.relational.create_staging_table().await?;
                Ok(StageDetail::Created)
            }
            Stage::StageLoad => self.load_staging().await,
            Stage::NormalizeCreate => {
                self.relational.create_star_schema().await?;
                Ok(StageDetail::Created)
            }
            Stage::NormalizePopulate => {
                let summary = self.relational.populate_star_schema().await?;
                tracing::info!(rows = summary.total_rows(), "Star schema populated");
                Ok(StageDetail::Normalized(summary))
            }
            Stage::AnalyticRebuild => {
                self.analytical.rebuild_tables().await?;
                Ok(StageDetail::Created)
            }
            Stage::AnalyticLoad => {
                let summary = transfer_purchases(
                    self.relational.as_ref(),
                    self.analytical.as_ref(),
                    self.settings.batch_size,
                    now,
                    &progress.transfer,
                )
                .await?;
                tracing::info!(
                    loaded = summary.loaded,
                    skipped = summary.skipped,
                    batches = summary.batches,
                    "Purchases transferred"
                );
                Ok(StageDetail::Transferred(summary))
            }
            Stage::Aggregate => {
                let summary =
                    build_aggregates(self.analytical.as_ref(), &progress.aggregate).await?;
                Ok(StageDetail::Aggregated(summary))
            }
        }
    }

    async fn load_staging(&self) -> Result<StageDetail, StageError> {
        let path = self.settings.input.clone().ok_or(IngestError::NoInput)?;
        let sheet = self.settings.sheet.clone();

        // calamine is synchronous; keep the runtime free while it parses
        let validated = tokio::task::spawn_blocking(move || load_input(&path, sheet.as_deref()))
            .await
            .map_err(|e| StageError::Task(e.to_string()))??;

        let inserted = self
            .relational
            .load_staging(&validated.rows, self.settings.staging_mode)
            .await?;
        tracing::info!(
            inserted,
            mode = %self.settings.staging_mode,
            "Staging table loaded"
        );

        Ok(StageDetail::Staged {
            inserted,
            skipped: validated.skipped.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::DataError;
    use crate::data::types::StagingRow;
    use crate::domain::ingest::sheet::tests::write_fixture;
    use crate::testing::{MemoryAnalytical, MemoryRelational};

    const HEADER: &[&str] = &["CLIENTCODE", "GENDER", "PRICE", "AMOUNT", "DATE_", "FICHENO"];

    struct Harness {
        relational: Arc<MemoryRelational>,
        analytical: Arc<MemoryAnalytical>,
        _dir: tempfile::TempDir,
        input: PathBuf,
    }

    impl Harness {
        fn new(rows: &[&[&str]]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("sales.xlsx");
            let mut all: Vec<&[&str]> = vec![HEADER];
            all.extend_from_slice(rows);
            write_fixture(&input, "Sheet1", &all);
            Self {
                relational: Arc::new(MemoryRelational::default()),
                analytical: Arc::new(MemoryAnalytical::default()),
                _dir: dir,
                input,
            }
        }

        fn pipeline(&self, retries: u32, staging_mode: StagingMode) -> Pipeline {
            Pipeline::new(
                self.relational.clone(),
                self.analytical.clone(),
                PipelineSettings {
                    input: Some(self.input.clone()),
                    sheet: None,
                    batch_size: 2,
                    staging_mode,
                    retry: RetryPolicy {
                        retries,
                        delay: Duration::from_millis(1),
                        exponential_backoff: true,
                    },
                },
            )
        }
    }

    const SALES: &[&[&str]] = &[
        &["1001", "F", "10", "2", "2024-03-05 09:00:00", "T-1"],
        &["1002", "M", "15", "3", "2024-03-05 17:30:00", "T-2"],
        &["1003", "F", "4", "abc", "2024-03-06 10:00:00", "T-3"],
    ];

    #[tokio::test]
    async fn test_full_run_loads_every_layer() {
        let harness = Harness::new(SALES);
        let pipeline = harness.pipeline(0, StagingMode::Append);

        let report = pipeline.run(Pipeline::plan(None, None).unwrap()).await;
        assert!(report.succeeded(), "{:?}", report.error);
        assert_eq!(report.outcomes.len(), Stage::ALL.len());

        let staged = report.outcome(Stage::StageLoad).unwrap();
        assert_eq!(
            staged.status,
            StageStatus::Succeeded(StageDetail::Staged {
                inserted: 2,
                skipped: 1,
            })
        );

        assert_eq!(harness.relational.staged().len(), 2);
        assert_eq!(harness.analytical.purchases().len(), 2);
        assert_eq!(harness.analytical.rebuilds(), 1);

        let daily = harness.analytical.daily_rollups().await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date_amount, 5.0);
        assert_eq!(daily[0].date_price, 25.0);
        assert_eq!(daily[0].average_price, 5.0);
    }

    #[tokio::test]
    async fn test_failure_halts_downstream_stages() {
        let harness = Harness::new(SALES);
        harness.relational.fail_populate(1);
        let pipeline = harness.pipeline(0, StagingMode::Append);

        let report = pipeline.run(&Stage::ALL).await;
        assert!(!report.succeeded());

        let failed = report.outcome(Stage::NormalizePopulate).unwrap();
        assert!(matches!(failed.status, StageStatus::Failed(_)));
        assert_eq!(failed.attempts, 1);
        for stage in [Stage::AnalyticRebuild, Stage::AnalyticLoad, Stage::Aggregate] {
            assert_eq!(report.outcome(stage).unwrap().status, StageStatus::Skipped);
        }
        assert_eq!(harness.analytical.rebuilds(), 0);

        match report.into_result() {
            Err(PipelineError::Stage {
                stage,
                attempts,
                source: StageError::Data(DataError::BackendUnavailable { .. }),
            }) => {
                assert_eq!(stage, Stage::NormalizePopulate);
                assert_eq!(attempts, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let harness = Harness::new(SALES);
        harness.relational.fail_populate(1);
        let pipeline = harness.pipeline(2, StagingMode::Append);

        let report = pipeline.run(&Stage::ALL).await;
        assert!(report.succeeded());
        assert_eq!(report.outcome(Stage::NormalizePopulate).unwrap().attempts, 2);
        assert_eq!(harness.relational.populate_calls(), 2);
    }

    #[tokio::test]
    async fn test_retried_transfer_does_not_duplicate_purchases() {
        const FOUR: &[&[&str]] = &[
            &["1", "F", "10", "1", "2024-03-05 09:00:00", "T-1"],
            &["2", "M", "10", "1", "2024-03-05 10:00:00", "T-2"],
            &["3", "F", "10", "1", "2024-03-05 11:00:00", "T-3"],
            &["4", "M", "10", "1", "2024-03-05 12:00:00", "T-4"],
        ];
        let harness = Harness::new(FOUR);
        harness.analytical.fail_insert_at(1);
        let pipeline = harness.pipeline(1, StagingMode::Append);

        let report = pipeline.run(&Stage::ALL).await;
        assert!(report.succeeded(), "{:?}", report.error);
        assert_eq!(report.outcome(Stage::AnalyticLoad).unwrap().attempts, 2);

        let codes: Vec<i64> = harness
            .analytical
            .purchases()
            .iter()
            .map(|p| p.client_code)
            .collect();
        assert_eq!(codes, vec![1, 2, 3, 4]);
        assert_eq!(harness.analytical.batch_sizes(), vec![2, 2]);
    }

    #[tokio::test]
    async fn test_retried_aggregate_does_not_duplicate_rollups() {
        let harness = Harness::new(SALES);
        harness.analytical.fail_gender_totals(1);
        let pipeline = harness.pipeline(1, StagingMode::Append);

        let report = pipeline.run(&Stage::ALL).await;
        assert!(report.succeeded(), "{:?}", report.error);
        let outcome = report.outcome(Stage::Aggregate).unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(
            outcome.status,
            StageStatus::Succeeded(StageDetail::Aggregated(AggregateSummary {
                daily_rows: 1,
                gender_rows: 2,
            }))
        );
        assert_eq!(harness.analytical.daily_rollups().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_valid_data_is_not_retried() {
        const REJECTED: &[&[&str]] = &[
            &["x", "F", "10", "2", "2024-03-05", "T-1"],
            &["1002", "M", "", "3", "2024-03-05", "T-2"],
        ];
        let harness = Harness::new(REJECTED);
        let pipeline = harness.pipeline(3, StagingMode::Append);

        let report = pipeline.run(&Stage::ALL).await;
        let outcome = report.outcome(Stage::StageLoad).unwrap();
        assert_eq!(outcome.attempts, 1);
        assert!(matches!(
            report.error,
            Some(PipelineError::Stage {
                source: StageError::Ingest(IngestError::NoValidData { total: 2 }),
                ..
            })
        ));
        assert!(harness.relational.staged().is_empty());
    }

    #[tokio::test]
    async fn test_missing_input_fails_stage_load() {
        let harness = Harness::new(SALES);
        let pipeline = Pipeline::new(
            harness.relational.clone(),
            harness.analytical.clone(),
            PipelineSettings {
                input: None,
                sheet: None,
                batch_size: 10,
                staging_mode: StagingMode::Append,
                retry: RetryPolicy::none(),
            },
        );

        let report = pipeline.run(&[Stage::StageLoad]).await;
        assert!(matches!(
            report.error,
            Some(PipelineError::Stage {
                source: StageError::Ingest(IngestError::NoInput),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_require_empty_conflict_is_not_retried() {
        let harness = Harness::new(SALES);
        harness.relational.seed_staging(vec![StagingRow::default()]);
        let pipeline = harness.pipeline(3, StagingMode::RequireEmpty);

        let report = pipeline.run(&[Stage::StageLoad]).await;
        assert_eq!(report.outcome(Stage::StageLoad).unwrap().attempts, 1);
        assert!(matches!(
            report.error,
            Some(PipelineError::Stage {
                source: StageError::Data(DataError::Conflict(_)),
                ..
            })
        ));
        assert_eq!(harness.relational.staged().len(), 1);
    }

    #[tokio::test]
    async fn test_truncate_replaces_staged_rows() {
        let harness = Harness::new(SALES);
        harness.relational.seed_staging(vec![StagingRow::default()]);
        let pipeline = harness.pipeline(0, StagingMode::Truncate);

        let report = pipeline.run(&[Stage::StageLoad]).await;
        assert!(report.succeeded());
        assert_eq!(harness.relational.staged().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_range_runs_only_selected_stages() {
        let harness = Harness::new(SALES);
        let pipeline = harness.pipeline(0, StagingMode::Append);

        let stages = Pipeline::plan(Some(Stage::AnalyticRebuild), None).unwrap();
        let report = pipeline.run(stages).await;
        assert!(report.succeeded());
        assert_eq!(report.outcomes.len(), 3);
        assert!(harness.relational.staged().is_empty());
        assert!(harness.analytical.purchases().is_empty());
    }

    #[test]
    fn test_plan_rejects_reversed_range() {
        let err = Pipeline::plan(Some(Stage::AnalyticLoad), Some(Stage::StageLoad)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidRange {
                from: Stage::AnalyticLoad,
                to: Stage::StageLoad,
            }
        ));
    }
}
