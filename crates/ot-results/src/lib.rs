//! ot-results: result snapshots, summary export and benchmark reports.

pub mod bench;
pub mod export;
pub mod hash;
pub mod types;

pub use bench::{BenchmarkRow, BenchmarkTable, PASS_THRESHOLD_PERCENT};
pub use export::{NodeSummary, summarize, summary_csv, summary_json, write_summary_csv};
pub use hash::compute_run_id;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Run {run_id} has no temperature history")]
    Empty { run_id: String },
}
