use thiserror::Error;

// ---------------------------------------------------------------------------
// Data-layer errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while loading, transforming or exporting a
/// table.
#[derive(Debug, Error)]
pub enum DataError {
    /// The file extension is not one of `.csv`, `.xls`, `.xlsx`.
    #[error("File type {extension} not supported. Please upload a CSV or Excel file.")]
    UnsupportedFormat { extension: String },

    /// The input has no header row to take column names from.
    #[error("No columns to parse from file")]
    NoColumns,

    /// The workbook does not contain a single worksheet.
    #[error("Workbook contains no worksheets")]
    NoWorksheet,

    /// A CSV record has more fields than the header.
    #[error("Row {row}: expected {expected} fields, saw {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Columns passed to [`Table::new`](super::model::Table::new) differ in length.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("XLSX writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Whether the error only concerns the file's extension, i.e. the file
    /// was skipped without its content being read.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
