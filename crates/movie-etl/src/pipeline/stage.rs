//! Pipeline stages, used for logging.

use serde::{Deserialize, Serialize};

/// Stages of one ETL run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtlStage {
    /// Reading the input CSV and checking required columns
    Loading,
    /// Applying the five cleaning rules
    Transforming,
    /// Writing cleaned and demo CSVs
    WritingOutputs,
    /// Re-checking the rules on the cleaned table
    Validating,
    /// Bulk-loading into PostgreSQL
    DatabaseLoad,
    /// Run finished
    Complete,
}

impl EtlStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Input",
            Self::Transforming => "Applying Rules",
            Self::WritingOutputs => "Writing Outputs",
            Self::Validating => "Validating",
            Self::DatabaseLoad => "Loading Database",
            Self::Complete => "Complete",
        }
    }

    /// 1-based position among the working stages; `Complete` has none.
    pub fn step(&self) -> Option<u8> {
        match self {
            Self::Loading => Some(1),
            Self::Transforming => Some(2),
            Self::WritingOutputs => Some(3),
            Self::Validating => Some(4),
            Self::DatabaseLoad => Some(5),
            Self::Complete => None,
        }
    }
}

impl std::fmt::Display for EtlStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.step() {
            Some(step) => write!(f, "[{}/5] {}", step, self.display_name()),
            None => f.write_str(self.display_name()),
        }
    }
}
