//! Typed failures of the derivation engine.

use crate::model::Year;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Horizontal analysis needs the base-year balance sheet row
    #[error("balance sheet has no base year row (year {year})")]
    MissingBaseYear { year: Year },

    /// Ratio computation needs a balance sheet row for every income statement year
    #[error("no balance sheet row for income statement year {year}")]
    MissingBalanceSheetYear { year: Year },

    /// A year-indexed table is out of order or repeats a year
    #[error("table '{table}' is not strictly ascending at key {key}")]
    UnsortedTable { table: &'static str, key: i64 },
}

impl EngineError {
    /// True for the missing-data faults (as opposed to malformed input)
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            EngineError::MissingBaseYear { .. } | EngineError::MissingBalanceSheetYear { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
