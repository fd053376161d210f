use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::{DataError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
///
/// Numbers compare by value across `Int` / `Float`, so a column read back
/// from a spreadsheet as integers still equals the floats it was written
/// from. `Missing` equals `Missing`, which duplicate detection relies on.
#[derive(Debug, Clone)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Date / time kept as ISO-8601 text.
    Date(String),
    Missing,
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        use CellValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Int(a), Float(b)) | (Float(b), Int(a)) => int_equals_float(*a, *b),
            (Bool(a), Bool(b)) => a == b,
            (Text(a), Text(b)) | (Date(a), Date(b)) => a == b,
            (Missing, Missing) => true,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            // Int and Float share a hash so equal numbers collide.
            CellValue::Int(i) => {
                0u8.hash(state);
                number_bits(*i as f64).hash(state);
            }
            CellValue::Float(f) => {
                0u8.hash(state);
                number_bits(*f).hash(state);
            }
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            CellValue::Text(s) => {
                2u8.hash(state);
                s.hash(state);
            }
            CellValue::Date(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            CellValue::Missing => 4u8.hash(state),
        }
    }
}

/// Exact comparison. Casting the integer to `f64` would round above 2^53
/// and make `Int(2^53 + 1) == Float(2^53)`, breaking transitivity.
fn int_equals_float(i: i64, f: f64) -> bool {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0; // 2^63
    f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) && f as i64 == i
}

fn number_bits(v: f64) -> u64 {
    // 0.0 == -0.0 must hash alike
    if v == 0.0 { 0 } else { v.to_bits() }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Text(s) | CellValue::Date(s) => write!(f, "{s}"),
            CellValue::Missing => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named sequence of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A column is numeric when every non-missing value is a number.
    /// An all-missing column counts as numeric.
    pub fn is_numeric(&self) -> bool {
        self.values
            .iter()
            .all(|v| v.is_missing() || v.is_numeric())
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }
}

// ---------------------------------------------------------------------------
// Table – ordered named columns of equal length
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(DataError::ColumnLengthMismatch {
                    column: bad.name.clone(),
                    expected,
                    found: bad.values.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to the cells. Callers must not change column lengths.
    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// The cells of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Keep only the rows whose index is in `keep` (ascending).
    pub(crate) fn retain_rows(&mut self, keep: &[usize]) {
        for column in &mut self.columns {
            let values = std::mem::take(&mut column.values);
            column.values = keep.iter().map(|&i| values[i].clone()).collect();
        }
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        let n = n.min(self.len());
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values[..n].to_vec()))
                .collect(),
        }
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}
