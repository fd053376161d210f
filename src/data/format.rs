use std::fmt;
use std::path::Path;

use super::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Input formats
// ---------------------------------------------------------------------------

/// The closed set of formats accepted on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xls,
    Xlsx,
}

/// Extensions offered by the upload dialog.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["csv", "xls", "xlsx"];

impl FileFormat {
    /// Dispatch by extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = extension_of(name).to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xls" => Ok(FileFormat::Xls),
            "xlsx" => Ok(FileFormat::Xlsx),
            other => Err(DataError::UnsupportedFormat {
                extension: if other.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{other}")
                },
            }),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, ".csv"),
            FileFormat::Xls => write!(f, ".xls"),
            FileFormat::Xlsx => write!(f, ".xlsx"),
        }
    }
}

fn extension_of(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

// ---------------------------------------------------------------------------
// Export formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Excel];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "Excel",
        }
    }
}

/// Replace the final extension of `original` with the export extension,
/// appending one when `original` has none.
pub fn output_file_name(original: &str, format: ExportFormat) -> String {
    let stem = match Path::new(original).extension() {
        Some(ext) => &original[..original.len() - ext.len() - 1],
        None => original,
    };
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_is_case_insensitive() {
        assert_eq!(FileFormat::from_file_name("data.csv").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("DATA.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("book.Xls").unwrap(), FileFormat::Xls);
        assert_eq!(FileFormat::from_file_name("book.xlsx").unwrap(), FileFormat::Xlsx);
    }

    #[test]
    fn unknown_extension_is_reported() {
        let err = FileFormat::from_file_name("notes.txt").unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(
            err.to_string(),
            "File type .txt not supported. Please upload a CSV or Excel file."
        );
        assert!(FileFormat::from_file_name("README").unwrap_err().is_unsupported());
    }

    #[test]
    fn output_name_replaces_only_final_extension() {
        assert_eq!(output_file_name("data.csv", ExportFormat::Excel), "data.xlsx");
        assert_eq!(output_file_name("DATA.CSV", ExportFormat::Excel), "DATA.xlsx");
        assert_eq!(output_file_name("report.csv.xlsx", ExportFormat::Csv), "report.csv.csv");
        assert_eq!(output_file_name("book.xls", ExportFormat::Csv), "book.csv");
        assert_eq!(output_file_name("noext", ExportFormat::Csv), "noext.csv");
    }

    #[test]
    fn mime_types() {
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(
            ExportFormat::Excel.mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
