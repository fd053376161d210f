use crate::data::chart::{ChartSeries, chart_series};
use crate::data::cleaning::{CleaningStep, StepReport};
use crate::data::error::Result;
use crate::data::export::{ExportBuffer, export_table};
use crate::data::format::FileFormat;
use crate::data::loader::{UploadedFile, load_table};
use crate::data::model::Table;
use crate::data::selection::select_columns;
use crate::state::WidgetState;

/// Rows shown in the preview.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Per-file pipeline
// ---------------------------------------------------------------------------

/// Everything the UI shows for one file after a pass.
#[derive(Debug, Clone)]
pub struct FileView {
    pub name: String,
    pub format: FileFormat,
    /// Row count as parsed, before cleaning.
    pub parsed_rows: usize,
    /// Column names as parsed; the options of the column picker.
    pub parsed_columns: Vec<String>,
    /// First [`PREVIEW_ROWS`] rows as parsed.
    pub preview: Table,
    /// Cleaning steps applied this pass, with what each changed.
    pub applied: Vec<(CleaningStep, StepReport)>,
    /// The working table after cleaning and column selection.
    pub table: Table,
    pub chart: Option<Vec<ChartSeries>>,
    pub export: Option<ExportBuffer>,
}

/// Run every stage for one file from its raw bytes:
/// ingest → preview → clean → select → chart → export.
pub fn run_file(file: &UploadedFile, widgets: &WidgetState) -> Result<FileView> {
    let (format, mut table) = load_table(file)?;
    let preview = table.head(PREVIEW_ROWS);
    let parsed_rows = table.len();
    let parsed_columns = table.column_names();
    log::debug!(
        "{}: parsed {} rows x {} columns as {format}",
        file.name,
        parsed_rows,
        parsed_columns.len()
    );

    let mut applied = Vec::new();
    if widgets.clean_enabled {
        for &step in &widgets.cleaning_steps {
            let report = step.apply(&mut table);
            applied.push((step, report));
        }
    }

    let table = match &widgets.selected_columns {
        Some(names) => select_columns(table, names)?,
        None => table,
    };

    log::debug!(
        "{}: working table {} rows x {} columns",
        file.name,
        table.len(),
        table.width()
    );

    let chart = widgets.show_chart.then(|| chart_series(&table));

    let export = if widgets.convert_requested {
        Some(export_table(&table, widgets.export_format, &file.name)?)
    } else {
        None
    };

    Ok(FileView {
        name: file.name.clone(),
        format,
        parsed_rows,
        parsed_columns,
        preview,
        applied,
        table,
        chart,
        export,
    })
}
