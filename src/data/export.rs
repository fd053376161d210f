use std::borrow::Cow;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use super::error::{DataError, Result};
use super::format::{ExportFormat, output_file_name};
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Export buffer
// ---------------------------------------------------------------------------

/// A table serialized in memory, ready to be offered for download.
#[derive(Debug, Clone)]
pub struct ExportBuffer {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportBuffer {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Serialize `table` into `format`, naming the result after `original_name`.
pub fn export_table(
    table: &Table,
    format: ExportFormat,
    original_name: &str,
) -> Result<ExportBuffer> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Excel => write_xlsx(table)?,
    };
    let file_name = output_file_name(original_name, format);
    log::info!(
        "Converted {original_name} to {} ({} bytes, {})",
        file_name,
        bytes.len(),
        format.mime_type()
    );
    Ok(ExportBuffer {
        file_name,
        format,
        bytes,
    })
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Header row, then one record per row. Missing cells are empty fields.
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    if table.width() == 0 {
        return Ok(Vec::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for i in 0..table.len() {
        for value in table.row(i) {
            writer.write_field(csv_field(value).as_bytes())?;
        }
        writer.write_record(None::<&[u8]>)?;
    }
    writer
        .into_inner()
        .map_err(|e| DataError::Io(e.into_error()))
}

fn csv_field(value: &CellValue) -> Cow<'_, str> {
    match value {
        CellValue::Missing => Cow::Borrowed(""),
        CellValue::Text(s) | CellValue::Date(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// XLSX writer
// ---------------------------------------------------------------------------

/// A single `Sheet1` with a bold header row and one row per table row.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);

    let sheet = workbook.add_worksheet();
    for (c, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string_with_format(0, col, &column.name, &header)?;

        for (r, value) in column.values.iter().enumerate() {
            let row = u32::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            write_cell(sheet, row, col, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
) -> std::result::Result<(), XlsxError> {
    match value {
        CellValue::Int(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) if f.is_finite() => {
            sheet.write_number(row, col, *f)?;
        }
        CellValue::Float(f) => {
            sheet.write_string(row, col, format!("{f:?}"))?;
        }
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Text(s) | CellValue::Date(s) => {
            sheet.write_string(row, col, s)?;
        }
        CellValue::Missing => {}
    }
    Ok(())
}
