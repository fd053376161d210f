use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use calamine::{Data, DataType, Reader};

use super::error::{DataError, Result};
use super::format::FileFormat;
use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Uploaded file
// ---------------------------------------------------------------------------

/// Raw bytes of an uploaded file plus the name it was uploaded under.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file picked from disk.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;
        Ok(Self { name, bytes })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded file into a [`Table`]. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – header row followed by records
/// * `.xls` / `.xlsx` – first worksheet, first row is the header
pub fn load_table(file: &UploadedFile) -> Result<(FileFormat, Table)> {
    let format = FileFormat::from_file_name(&file.name)?;
    let table = match format {
        FileFormat::Csv => load_csv(&file.bytes)?,
        FileFormat::Xls | FileFormat::Xlsx => load_spreadsheet(&file.bytes)?,
    };
    log::debug!(
        "Parsed {} as {format}: {} rows x {} columns",
        file.name,
        table.len(),
        table.width()
    );
    Ok((format, table))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Cell texts read as missing values.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

/// Parse CSV bytes. Records shorter than the header are padded with
/// missing values; longer ones are an error.
pub fn load_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(DataError::NoColumns);
    }
    let width = headers.len();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > width {
            return Err(DataError::RaggedRow {
                row: row_no + 1,
                expected: width,
                found: record.len(),
            });
        }
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            let cell = record
                .get(col_idx)
                .filter(|s| !is_missing_marker(s))
                .map(str::to_string);
            cells.push(cell);
        }
    }

    let columns = normalize_headers(headers)
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();
    Table::new(columns)
}

/// Pick one type for the whole column, the way dataframe loaders do:
/// all integers without gaps → `Int`, all numbers → `Float`,
/// all booleans → `Bool`, anything else → `Text`.
fn infer_column(cells: Vec<Option<String>>) -> Vec<CellValue> {
    let present = || cells.iter().flatten();
    let has_missing = cells.iter().any(Option::is_none);

    if !has_missing && present().all(|s| s.trim().parse::<i64>().is_ok()) {
        return cells
            .iter()
            .flatten()
            .filter_map(|s| s.trim().parse().ok())
            .map(CellValue::Int)
            .collect();
    }

    if present().all(|s| s.trim().parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|cell| match cell.as_deref().map(|s| s.trim().parse::<f64>()) {
                Some(Ok(v)) if !v.is_nan() => CellValue::Float(v),
                _ => CellValue::Missing,
            })
            .collect();
    }

    if present().all(|s| parse_bool(s).is_some()) {
        return cells
            .iter()
            .map(|cell| match cell.as_deref().and_then(parse_bool) {
                Some(b) => CellValue::Bool(b),
                None => CellValue::Missing,
            })
            .collect();
    }

    cells
        .into_iter()
        .map(|cell| cell.map_or(CellValue::Missing, CellValue::Text))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Make header names usable as keys: blanks become `Unnamed: <i>`,
/// repeats get `.1`, `.2`, … appended.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();

    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut candidate = base.clone();
            while used.contains(&candidate) {
                let n = counters.entry(base.clone()).or_insert(0);
                *n += 1;
                candidate = format!("{base}.{n}");
            }
            used.insert(candidate.clone());
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Parse the first worksheet of an `.xls` / `.xlsx` workbook.
pub fn load_spreadsheet(bytes: &[u8]) -> Result<Table> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DataError::NoWorksheet)??;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(DataError::NoColumns)?;
    let headers = normalize_headers(header_row.iter().map(header_text).collect());

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, cell) in row.iter().enumerate() {
            cells[col_idx].push(spreadsheet_value(cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, tighten_integers(values)))
        .collect();
    Table::new(columns)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn spreadsheet_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Missing,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) if f.is_nan() => CellValue::Missing,
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.is_empty() => CellValue::Missing,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => CellValue::Date(
            cell.as_datetime()
                .map(|dt| dt.to_string())
                .unwrap_or_else(|| cell.to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Spreadsheets store every number as a float. A gap-free column of whole
/// numbers is read back as integers.
fn tighten_integers(values: Vec<CellValue>) -> Vec<CellValue> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53

    let integral = values.iter().all(|v| match v {
        CellValue::Int(_) => true,
        CellValue::Float(f) => f.fract() == 0.0 && f.abs() <= MAX_EXACT,
        _ => false,
    });
    if !integral {
        return values;
    }
    values
        .into_iter()
        .map(|v| match v {
            CellValue::Float(f) => CellValue::Int(f as i64),
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn col<'a>(table: &'a Table, name: &str) -> &'a [CellValue] {
        &table.column(name).unwrap().values
    }

    #[test]
    fn csv_columns_get_a_single_type() {
        let table = load_csv(b"a,b,c,d\n1,2.5,x,True\n3,,y,false\n").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b", "c", "d"]);
        assert_eq!(col(&table, "a"), &[CellValue::Int(1), CellValue::Int(3)]);
        assert_eq!(col(&table, "b"), &[CellValue::Float(2.5), CellValue::Missing]);
        assert_eq!(
            col(&table, "c"),
            &[CellValue::Text("x".into()), CellValue::Text("y".into())]
        );
        assert_eq!(col(&table, "d"), &[CellValue::Bool(true), CellValue::Bool(false)]);
    }

    #[test]
    fn integer_column_with_gap_becomes_float() {
        let table = load_csv(b"a,b\n1,2\n1,2\n3,\n").unwrap();
        let b = table.column("b").unwrap();
        assert!(matches!(b.values[0], CellValue::Float(v) if v == 2.0));
        assert_eq!(b.values[2], CellValue::Missing);
        assert!(b.is_numeric());
    }

    #[test]
    fn missing_markers_are_recognised() {
        let table = load_csv(b"a,b\nNA,x\nnull,N/A\n1.5,None\n").unwrap();
        assert_eq!(
            col(&table, "a"),
            &[CellValue::Missing, CellValue::Missing, CellValue::Float(1.5)]
        );
        assert_eq!(
            col(&table, "b"),
            &[CellValue::Text("x".into()), CellValue::Missing, CellValue::Missing]
        );
    }

    #[test]
    fn mixed_column_keeps_text_verbatim() {
        let table = load_csv(b"a\n1\nabc\n").unwrap();
        assert_eq!(
            col(&table, "a"),
            &[CellValue::Text("1".into()), CellValue::Text("abc".into())]
        );
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let table = load_csv(b"a,b\n1\n").unwrap();
        assert_eq!(col(&table, "b"), &[CellValue::Missing]);

        let err = load_csv(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, DataError::RaggedRow { row: 1, expected: 2, found: 3 }));
    }

    #[test]
    fn empty_input_has_no_columns() {
        assert!(matches!(load_csv(b""), Err(DataError::NoColumns)));
    }

    #[test]
    fn headers_are_made_unique() {
        assert_eq!(
            normalize_headers(vec!["a".into(), "".into(), "a".into(), "a".into()]),
            vec!["a", "Unnamed: 1", "a.1", "a.2"]
        );
    }

    #[test]
    fn unsupported_extension_fails_before_parsing() {
        let file = UploadedFile::new("notes.txt", b"a,b\n1,2\n".to_vec());
        assert!(load_table(&file).unwrap_err().is_unsupported());
    }

    #[test]
    fn corrupt_spreadsheet_is_a_parse_error() {
        let file = UploadedFile::new("broken.xlsx", b"not a zip archive".to_vec());
        assert!(matches!(load_table(&file), Err(DataError::Spreadsheet(_))));
    }

    #[test]
    fn xlsx_first_sheet_is_read() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "id").unwrap();
        sheet.write_string(0, 1, "score").unwrap();
        sheet.write_string(0, 2, "name").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_number(1, 1, 0.5).unwrap();
        sheet.write_string(1, 2, "ann").unwrap();
        sheet.write_number(2, 0, 2.0).unwrap();
        sheet.write_string(2, 2, "bo").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let (format, table) = load_table(&UploadedFile::new("Book.XLSX", bytes)).unwrap();
        assert_eq!(format, FileFormat::Xlsx);
        assert_eq!(table.column_names(), vec!["id", "score", "name"]);
        assert!(matches!(col(&table, "id")[1], CellValue::Int(2)));
        assert_eq!(col(&table, "score"), &[CellValue::Float(0.5), CellValue::Missing]);
        assert_eq!(
            col(&table, "name"),
            &[CellValue::Text("ann".into()), CellValue::Text("bo".into())]
        );
    }

    #[test]
    fn empty_sheet_has_no_columns() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        workbook.add_worksheet();
        let bytes = workbook.save_to_buffer().unwrap();

        let file = UploadedFile::new("empty.xlsx", bytes);
        assert!(matches!(load_table(&file), Err(DataError::NoColumns)));
    }

    #[test]
    fn xlsx_headers_are_made_unique() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "a").unwrap();
        sheet.write_string(0, 2, "a").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_number(1, 1, 2.0).unwrap();
        sheet.write_number(1, 2, 3.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load_spreadsheet(&bytes).unwrap();
        assert_eq!(table.column_names(), vec!["a", "Unnamed: 1", "a.1"]);
        assert_eq!(col(&table, "Unnamed: 1"), &[CellValue::Int(2)]);
    }

    #[test]
    fn xlsx_booleans_stay_booleans() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "open").unwrap();
        sheet.write_boolean(1, 0, true).unwrap();
        sheet.write_boolean(2, 0, false).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load_spreadsheet(&bytes).unwrap();
        assert_eq!(col(&table, "open"), &[CellValue::Bool(true), CellValue::Bool(false)]);
    }

    #[test]
    fn error_cells_become_text() {
        assert_eq!(
            spreadsheet_value(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Text("#DIV/0!".into())
        );
        assert_eq!(
            spreadsheet_value(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Text("#N/A".into())
        );
        assert_eq!(spreadsheet_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(spreadsheet_value(&Data::String(String::new())), CellValue::Missing);
    }
}
