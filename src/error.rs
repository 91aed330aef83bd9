use thiserror::Error;

/// Failure to turn uploaded bytes into a table. This is the only error
/// category the core reports; degenerate-but-parseable data (empty
/// tables, missing columns) flows through the documented fallbacks
/// instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file format for {0:?}: expected .csv or .xlsx")]
    UnsupportedFormat(String),

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed XLSX input: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("workbook contains no worksheets")]
    EmptyWorkbook,
}
