//! Pipeline stages in execution order

use std::fmt;

use clap::ValueEnum;

/// One node of the linear pipeline
///
/// Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Stage {
    StageCreate,
    StageLoad,
    NormalizeCreate,
    NormalizePopulate,
    AnalyticRebuild,
    AnalyticLoad,
    Aggregate,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::StageCreate,
        Stage::StageLoad,
        Stage::NormalizeCreate,
        Stage::NormalizePopulate,
        Stage::AnalyticRebuild,
        Stage::AnalyticLoad,
        Stage::Aggregate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::StageCreate => "stage-create",
            Stage::StageLoad => "stage-load",
            Stage::NormalizeCreate => "normalize-create",
            Stage::NormalizePopulate => "normalize-populate",
            Stage::AnalyticRebuild => "analytic-rebuild",
            Stage::AnalyticLoad => "analytic-load",
            Stage::Aggregate => "aggregate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::StageCreate => "Create the temp_data staging table",
            Stage::StageLoad => "Validate the spreadsheet and insert rows into temp_data",
            Stage::NormalizeCreate => "Create the star schema tables",
            Stage::NormalizePopulate => "Populate the star schema from temp_data",
            Stage::AnalyticRebuild => "Drop and recreate the ClickHouse tables",
            Stage::AnalyticLoad => "Copy purchases from temp_data to ClickHouse in batches",
            Stage::Aggregate => "Build the daily rollup tables",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Contiguous run of stages from `from` to `to` (inclusive)
    ///
    /// Missing bounds default to the first and last stage. Returns `None`
    /// when `from` comes after `to`.
    pub fn range(from: Option<Stage>, to: Option<Stage>) -> Option<&'static [Stage]> {
        let start = from.unwrap_or(Stage::StageCreate).index();
        let end = to.unwrap_or(Stage::Aggregate).index();
        if start > end {
            return None;
        }
        Some(&Self::ALL[start..=end])
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_names_match_cli_values() {
        for stage in Stage::ALL {
            let parsed = Stage::from_str(stage.as_str(), false).unwrap();
            assert_eq!(parsed, stage);
        }
    }

    #[test]
    fn test_range_defaults_to_full_pipeline() {
        assert_eq!(Stage::range(None, None), Some(&Stage::ALL[..]));
    }

    #[test]
    fn test_range_slices() {
        assert_eq!(
            Stage::range(Some(Stage::AnalyticRebuild), None),
            Some(&[Stage::AnalyticRebuild, Stage::AnalyticLoad, Stage::Aggregate][..])
        );
        assert_eq!(
            Stage::range(None, Some(Stage::StageLoad)),
            Some(&[Stage::StageCreate, Stage::StageLoad][..])
        );
        assert_eq!(
            Stage::range(Some(Stage::Aggregate), Some(Stage::Aggregate)),
            Some(&[Stage::Aggregate][..])
        );
    }

    #[test]
    fn test_range_rejects_reversed_bounds() {
        assert_eq!(
            Stage::range(Some(Stage::Aggregate), Some(Stage::StageCreate)),
            None
        );
    }
}
