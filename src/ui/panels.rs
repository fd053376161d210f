use std::path::{Path, PathBuf};

use anyhow::Context;
use eframe::egui::{self, Color32, DroppedFile, RichText, Ui};

use crate::data::cleaning::StepReport;
use crate::data::export::ExportBuffer;
use crate::data::format::{ExportFormat, SUPPORTED_EXTENSIONS};
use crate::data::loader::UploadedFile;
use crate::pipeline::FileView;
use crate::state::{FileId, FileOutcome, SessionState, UiEvent, WidgetState};
use crate::ui::{plot, preview};

// ---------------------------------------------------------------------------
// Actions collected while rendering
// ---------------------------------------------------------------------------

/// What the user asked for during one frame. Applied after rendering so
/// the session is never mutated while it is being drawn.
#[derive(Default)]
pub struct Actions {
    pub events: Vec<UiEvent>,
    pub downloads: Vec<FileId>,
    pub open_upload_dialog: bool,
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &SessionState, actions: &mut Actions) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload files…").clicked() {
                actions.open_upload_dialog = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.button("📂 Upload your files (CSV or Excel)").clicked() {
            actions.open_upload_dialog = true;
        }

        ui.separator();

        let n = state.files().len();
        ui.label(format!("{n} file{} loaded", if n == 1 { "" } else { "s" }));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – one section per uploaded file
// ---------------------------------------------------------------------------

pub fn file_sections(ui: &mut Ui, state: &SessionState, actions: &mut Actions) {
    ui.heading("Data Cleaner");
    ui.label("This app will help you clean your data. Upload a file and we'll do the rest.");
    ui.separator();

    if state.files().is_empty() {
        ui.label("No files uploaded. Use File → Upload files… or drop files onto the window.");
    }

    for file in state.files() {
        egui::CollapsingHeader::new(RichText::new(&file.upload.name).strong().size(16.0))
            .id_salt(("file", file.id))
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("✖ Remove file").clicked() {
                    actions.events.push(UiEvent::RemoveFile(file.id));
                }
                match state.outcome(file.id) {
                    Some(FileOutcome::Ready(view)) => {
                        file_view(ui, file.id, view, &file.widgets, actions);
                    }
                    Some(FileOutcome::Unsupported { message })
                    | Some(FileOutcome::Failed { message }) => {
                        ui.label(RichText::new(message).color(Color32::RED));
                    }
                    None => {
                        let at = state.aborted_at().unwrap_or("an earlier file");
                        ui.label(
                            RichText::new(format!("Not processed: processing stopped at {at}."))
                                .color(Color32::YELLOW),
                        );
                    }
                }
            });
        ui.separator();
    }

    ui.add_space(8.0);
    ui.label(RichText::new("🎉 Thank you for using Data Cleaner!").color(Color32::GREEN));
}

fn file_view(
    ui: &mut Ui,
    id: FileId,
    view: &FileView,
    widgets: &WidgetState,
    actions: &mut Actions,
) {
    // ---- File info + preview ----
    ui.label(format!("File Name: {}", view.name));
    ui.label(format!("File Type: {}", view.format));
    ui.label(format!(
        "{} rows × {} columns",
        view.parsed_rows,
        view.parsed_columns.len()
    ));
    ui.strong("Preview The Head Of The DataFrame");
    preview::table_grid(ui, ("preview", id), &view.preview);

    // ---- Cleaning ----
    ui.add_space(6.0);
    ui.heading("Data Cleaning Options");
    let mut clean = widgets.clean_enabled;
    if ui
        .checkbox(&mut clean, format!("Clean Data For {}", view.name))
        .changed()
    {
        actions.events.push(UiEvent::SetCleaning {
            file: id,
            enabled: clean,
        });
    }
    if widgets.clean_enabled {
        ui.columns(2, |cols| {
            if cols[0].button("Remove Duplicates").clicked() {
                actions.events.push(UiEvent::RemoveDuplicates(id));
            }
            if cols[1].button("Remove Null Values").clicked() {
                actions.events.push(UiEvent::FillMissingWithMean(id));
            }
        });
        for (step, report) in &view.applied {
            ui.label(format!("✔ {step} ({})", describe(report)));
        }
    }

    // ---- Column selection ----
    ui.add_space(6.0);
    ui.heading("Select Columns To Keep");
    column_picker(ui, id, view, widgets, actions);
    ui.label(format!(
        "Working table: {} rows × {} columns",
        view.table.len(),
        view.table.width()
    ));

    // ---- Chart ----
    ui.add_space(6.0);
    ui.heading("📊 Visualizations");
    let mut show = widgets.show_chart;
    if ui
        .checkbox(&mut show, format!("Show Visualization for {}", view.name))
        .changed()
    {
        actions.events.push(UiEvent::SetShowChart { file: id, show });
    }
    if let Some(series) = &view.chart {
        plot::bar_chart(ui, ("chart", id), series);
    }

    // ---- Conversion ----
    ui.add_space(6.0);
    ui.heading("Conversion Option");
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Select Conversion Type For {} to:", view.name));
        let mut format = widgets.export_format;
        for option in ExportFormat::ALL {
            if ui.radio_value(&mut format, option, option.label()).changed() {
                actions.events.push(UiEvent::SetExportFormat { file: id, format });
            }
        }
    });
    if ui
        .button(format!(
            "Convert {} to {}",
            view.name,
            widgets.export_format.label()
        ))
        .clicked()
    {
        actions.events.push(UiEvent::Convert(id));
    }
    if let Some(export) = &view.export {
        if ui
            .button(format!(
                "⬇ Click Here To Download {} as {}",
                export.file_name,
                export.format.label()
            ))
            .clicked()
        {
            actions.downloads.push(id);
        }
    }
}

fn describe(report: &StepReport) -> String {
    match report {
        StepReport::Deduplicated { removed } => format!("{removed} rows removed"),
        StepReport::Filled(columns) if columns.is_empty() => "nothing to fill".to_string(),
        StepReport::Filled(columns) => columns
            .iter()
            .map(|c| format!("{}: {} × {:.4}", c.column, c.filled, c.mean))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Multi-select over the parsed columns. Order is the order of picking.
fn column_picker(
    ui: &mut Ui,
    id: FileId,
    view: &FileView,
    widgets: &WidgetState,
    actions: &mut Actions,
) {
    let selected: Vec<String> = widgets
        .selected_columns
        .clone()
        .unwrap_or_else(|| view.parsed_columns.clone());

    let mut next: Option<Vec<String>> = None;

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (i, name) in selected.iter().enumerate() {
            if ui
                .button(format!("{name} ✖"))
                .on_hover_text("Remove column")
                .clicked()
            {
                let mut cols = selected.clone();
                cols.remove(i);
                next = Some(cols);
            }
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        let available: Vec<&String> = view
            .parsed_columns
            .iter()
            .filter(|c| !selected.contains(c))
            .collect();

        ui.add_enabled_ui(!available.is_empty(), |ui: &mut Ui| {
            egui::ComboBox::from_id_salt(("add_column", id))
                .selected_text("Add column…")
                .show_ui(ui, |ui: &mut Ui| {
                    for name in &available {
                        if ui.selectable_label(false, name.as_str()).clicked() {
                            let mut cols = selected.clone();
                            cols.push((*name).clone());
                            next = Some(cols);
                        }
                    }
                });
        });

        if ui.small_button("All").clicked() {
            next = Some(view.parsed_columns.clone());
        }
        if ui.small_button("None").clicked() {
            next = Some(Vec::new());
        }
    });

    if let Some(columns) = next {
        actions.events.push(UiEvent::SetColumns { file: id, columns });
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_upload_dialog(state: &mut SessionState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload your files (CSV or Excel)")
        .add_filter("CSV or Excel", &SUPPORTED_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xls", "xlsx"])
        .add_filter("All files", &["*"])
        .pick_files();

    if let Some(paths) = files {
        upload_paths(state, &paths);
    }
}

fn upload_paths(state: &mut SessionState, paths: &[PathBuf]) {
    let mut uploads = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match UploadedFile::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                log::error!("Failed to read upload: {e:#}");
                errors.push(format!("{e:#}"));
            }
        }
    }
    finish_upload(state, uploads, errors);
}

/// Turn files dropped onto the window into uploads.
pub fn upload_dropped(state: &mut SessionState, dropped: Vec<DroppedFile>) {
    let mut uploads = Vec::new();
    let mut errors = Vec::new();
    for file in dropped {
        if let Some(bytes) = file.bytes {
            uploads.push(UploadedFile::new(file.name, bytes.to_vec()));
        } else if let Some(path) = file.path {
            match UploadedFile::from_path(&path) {
                Ok(upload) => uploads.push(upload),
                Err(e) => {
                    log::error!("Failed to read dropped file: {e:#}");
                    errors.push(format!("{e:#}"));
                }
            }
        }
    }
    finish_upload(state, uploads, errors);
}

fn finish_upload(state: &mut SessionState, uploads: Vec<UploadedFile>, errors: Vec<String>) {
    if !uploads.is_empty() {
        state.handle(UiEvent::FilesUploaded(uploads));
    }
    if !errors.is_empty() {
        state.status_message = Some(format!("Error: {}", errors.join("; ")));
    }
}

/// Offer the converted buffer through a native save dialog.
pub fn save_export(state: &mut SessionState, id: FileId) {
    let Some(buffer) = state.take_export(id) else {
        return;
    };

    let target = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(&buffer.file_name)
        .add_filter(buffer.format.label(), &[buffer.format.extension()])
        .save_file();

    let Some(path) = target else {
        log::debug!("Save of {} cancelled", buffer.file_name);
        return;
    };

    match write_export(&path, &buffer) {
        Ok(()) => {
            log::info!(
                "Saved {} ({}) to {}",
                buffer.file_name,
                buffer.mime_type(),
                path.display()
            );
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to save export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_export(path: &Path, buffer: &ExportBuffer) -> anyhow::Result<()> {
    std::fs::write(path, &buffer.bytes)
        .with_context(|| format!("writing {}", path.display()))
}
