//! Terminal output for runs, stage listings and reports

use super::constants::APP_NAME;
use crate::data::types::GenderRevenue;
use crate::domain::pipeline::{PipelineError, RunReport, Stage, StageDetail, StageStatus};
use crate::domain::report::RevenueReport;

// Label width: "normalize-populate" is 18 chars, pad to 20 for alignment
const W: usize = 20;

fn print_header(title: &str) {
    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m  {}",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        title
    );
    println!();
}

/// One-line description of what a successful stage did
pub fn describe_detail(detail: &StageDetail) -> String {
    match detail {
        StageDetail::Created => "ok".to_string(),
        StageDetail::Staged { inserted, skipped } => {
            format!("{} rows staged, {} skipped", inserted, skipped)
        }
        StageDetail::Normalized(summary) => format!(
            "{} rows across {} tables",
            summary.total_rows(),
            summary.tables.len()
        ),
        StageDetail::Transferred(summary) => format!(
            "{} purchases in {} batches, {} skipped",
            summary.loaded, summary.batches, summary.skipped
        ),
        StageDetail::Aggregated(summary) => format!(
            "{} daily rows, {} daily-by-gender rows",
            summary.daily_rows, summary.gender_rows
        ),
    }
}

/// Stage and store a run failed at
pub fn describe_failure(error: &PipelineError) -> String {
    match (error.stage(), error.backend()) {
        (Some(stage), Some(backend)) => format!("failed at {} ({})", stage, backend),
        (Some(stage), None) => format!("failed at {}", stage),
        _ => "failed".to_string(),
    }
}

/// Print stage names in execution order
pub fn print_stages() {
    print_header("stages");
    for (i, stage) in Stage::ALL.iter().enumerate() {
        println!(
            "  \x1b[90m{}.\x1b[0m \x1b[1m{:<W$}\x1b[0m {}",
            i + 1,
            stage.as_str(),
            stage.description()
        );
    }
    println!();
}

/// Print the per-stage outcome table at the end of a run
pub fn print_run_summary(report: &RunReport) {
    print_header("run summary");
    for outcome in &report.outcomes {
        match &outcome.status {
            StageStatus::Succeeded(detail) => println!(
                "  \x1b[32m✔\x1b[0m  \x1b[1m{:<W$}\x1b[0m {} \x1b[90m({} attempt(s), {:.2}s)\x1b[0m",
                outcome.stage.as_str(),
                describe_detail(detail),
                outcome.attempts,
                outcome.elapsed.as_secs_f64()
            ),
            StageStatus::Failed(reason) => println!(
                "  \x1b[31m✘\x1b[0m  \x1b[1m{:<W$}\x1b[0m {} \x1b[90m({} attempt(s), {:.2}s)\x1b[0m",
                outcome.stage.as_str(),
                reason,
                outcome.attempts,
                outcome.elapsed.as_secs_f64()
            ),
            StageStatus::Skipped => println!(
                "  \x1b[90m-  {:<W$} skipped\x1b[0m",
                outcome.stage.as_str()
            ),
        }
    }
    let status = match &report.error {
        None => "\x1b[32mcompleted\x1b[0m".to_string(),
        Some(e) => format!("\x1b[31m{}\x1b[0m", describe_failure(e)),
    };
    println!();
    println!(
        "  \x1b[90m➜  {:<W$}\x1b[0m {} in {:.2}s",
        "Pipeline:",
        status,
        report.elapsed().as_secs_f64()
    );
    println!();
}

fn gender_label(gender: &str) -> &str {
    if gender.is_empty() { "(none)" } else { gender }
}

/// Print all-time revenue, the gender split and daily rollups
pub fn print_report(report: &RevenueReport) {
    print_header("revenue");
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {:.2}",
        "Total revenue:", report.total
    );
    for row in &report.by_gender {
        println!(
            "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {:.2}",
            gender_label(&row.gender),
            row.revenue
        );
    }

    if report.daily.is_empty() {
        println!("  \x1b[90m➜  {:<W$} none\x1b[0m", "Daily rollups:");
    } else {
        println!();
        println!(
            "  \x1b[1m{:<W$} {:>12} {:>14} {:>14}\x1b[0m",
            "day", "amount", "price", "avg price"
        );
        for day in &report.daily {
            println!(
                "  {:<W$} {:>12.2} {:>14.2} {:>14.2}",
                day.day.format("%Y-%m-%d"),
                day.date_amount,
                day.date_price,
                day.average_price
            );
        }
    }
    println!();
}

/// Print the revenue of one gender
pub fn print_gender_revenue(row: &GenderRevenue) {
    print_header("revenue");
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {:.2}",
        gender_label(&row.gender),
        row.revenue
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{NormalizeSummary, TableLoad};
    use crate::domain::aggregate::AggregateSummary;
    use crate::domain::transfer::TransferSummary;

    #[test]
    fn test_describe_detail() {
        assert_eq!(
            describe_detail(&StageDetail::Staged {
                inserted: 9,
                skipped: 1,
            }),
            "9 rows staged, 1 skipped"
        );
        assert_eq!(
            describe_detail(&StageDetail::Normalized(NormalizeSummary {
                tables: vec![
                    TableLoad {
                        table: "branches",
                        rows: 2,
                    },
                    TableLoad {
                        table: "sales",
                        rows: 5,
                    },
                ],
            })),
            "7 rows across 2 tables"
        );
        assert_eq!(
            describe_detail(&StageDetail::Transferred(TransferSummary {
                fetched: 10,
                loaded: 9,
                skipped: 1,
                batches: 3,
            })),
            "9 purchases in 3 batches, 1 skipped"
        );
        assert_eq!(
            describe_detail(&StageDetail::Aggregated(AggregateSummary {
                daily_rows: 4,
                gender_rows: 8,
            })),
            "4 daily rows, 8 daily-by-gender rows"
        );
    }

    #[test]
    fn test_describe_failure() {
        use crate::data::error::DataError;
        use crate::domain::ingest::IngestError;
        use crate::domain::pipeline::StageError;

        let err = PipelineError::Stage {
            stage: Stage::NormalizePopulate,
            attempts: 2,
            source: StageError::Data(DataError::backend_unavailable("postgres", "reset")),
        };
        assert_eq!(describe_failure(&err), "failed at normalize-populate (postgres)");

        let err = PipelineError::Stage {
            stage: Stage::StageLoad,
            attempts: 1,
            source: StageError::Ingest(IngestError::NoInput),
        };
        assert_eq!(describe_failure(&err), "failed at stage-load");
    }

    #[test]
    fn test_gender_label() {
        assert_eq!(gender_label(""), "(none)");
        assert_eq!(gender_label("F"), "F");
    }
}
