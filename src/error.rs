//! Error taxonomy for the reporting core.
//!
//! Per-vehicle data problems (no last message, unparsable timestamp) are not
//! errors here: the normalizer degrades them to an empty snapshot. Only
//! structural problems surface as [`ReportError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid reporting period: {days} days (must be at least 1)")]
    InvalidPeriod { days: i64 },
    #[error("report needs {rows} rows but the worksheet holds at most {limit}")]
    LayoutOverflow { rows: usize, limit: usize },
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
