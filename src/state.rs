use crate::data::cleaning::CleaningStep;
use crate::data::export::ExportBuffer;
use crate::data::format::ExportFormat;
use crate::data::loader::UploadedFile;
use crate::pipeline::{FileView, run_file};

// ---------------------------------------------------------------------------
// Per-file widget state
// ---------------------------------------------------------------------------

/// Session-unique handle of an uploaded file.
pub type FileId = u64;

/// Current values of the controls belonging to one file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetState {
    /// "Clean data" checkbox.
    pub clean_enabled: bool,
    /// Cleaning buttons pressed while cleaning was enabled, in press order.
    /// Back-to-back presses of the same button are kept once.
    pub cleaning_steps: Vec<CleaningStep>,
    /// Columns to keep, in chosen order. `None` keeps every column.
    pub selected_columns: Option<Vec<String>>,
    /// "Show visualization" checkbox.
    pub show_chart: bool,
    pub export_format: ExportFormat,
    /// Set by the Convert button; only lasts until the next event.
    pub convert_requested: bool,
}

/// One uploaded file and its controls.
#[derive(Debug, Clone)]
pub struct FileSession {
    pub id: FileId,
    pub upload: UploadedFile,
    pub widgets: WidgetState,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Every interaction the UI can report.
#[derive(Debug, Clone)]
pub enum UiEvent {
    FilesUploaded(Vec<UploadedFile>),
    RemoveFile(FileId),
    SetCleaning { file: FileId, enabled: bool },
    RemoveDuplicates(FileId),
    FillMissingWithMean(FileId),
    SetColumns { file: FileId, columns: Vec<String> },
    SetShowChart { file: FileId, show: bool },
    SetExportFormat { file: FileId, format: ExportFormat },
    Convert(FileId),
}

// ---------------------------------------------------------------------------
// Pass results
// ---------------------------------------------------------------------------

/// What one pass produced for one file.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Ready(Box<FileView>),
    /// Skipped because of its extension; the pass went on.
    Unsupported { message: String },
    /// Parsing or processing failed; the pass stopped here.
    Failed { message: String },
}

/// Outcomes of one pass, in upload order. Files after a failure have none.
#[derive(Debug, Clone, Default)]
pub struct Pass {
    pub outcomes: Vec<(FileId, FileOutcome)>,
    /// Name of the file whose failure ended the pass early.
    pub aborted_at: Option<String>,
}

/// Process every file in order from its raw bytes and current widgets.
pub fn run_pass(files: &[FileSession]) -> Pass {
    let mut pass = Pass::default();

    for file in files {
        match run_file(&file.upload, &file.widgets) {
            Ok(view) => pass
                .outcomes
                .push((file.id, FileOutcome::Ready(Box::new(view)))),
            Err(e) if e.is_unsupported() => {
                log::warn!("Skipping {}: {e}", file.upload.name);
                pass.outcomes
                    .push((file.id, FileOutcome::Unsupported { message: e.to_string() }));
            }
            Err(e) => {
                log::error!("Processing {} failed: {e}", file.upload.name);
                pass.outcomes
                    .push((file.id, FileOutcome::Failed { message: e.to_string() }));
                pass.aborted_at = Some(file.upload.name.clone());
                break;
            }
        }
    }

    log::debug!(
        "Pass over {} files produced {} outcomes",
        files.len(),
        pass.outcomes.len()
    );
    pass
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The full session, independent of rendering.
#[derive(Default)]
pub struct SessionState {
    files: Vec<FileSession>,

    /// Result of the latest pass.
    pass: Pass,

    next_id: FileId,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl SessionState {
    /// Apply one UI event, then recompute every file's pipeline.
    pub fn handle(&mut self, event: UiEvent) {
        // Buttons only count for the pass they were pressed in.
        for file in &mut self.files {
            file.widgets.convert_requested = false;
        }

        match event {
            UiEvent::FilesUploaded(uploads) => {
                for upload in uploads {
                    log::info!("Uploaded {} ({} bytes)", upload.name, upload.bytes.len());
                    self.files.push(FileSession {
                        id: self.next_id,
                        upload,
                        widgets: WidgetState::default(),
                    });
                    self.next_id += 1;
                }
                self.status_message = None;
            }
            UiEvent::RemoveFile(id) => {
                self.files.retain(|f| f.id != id);
            }
            UiEvent::SetCleaning { file, enabled } => {
                if let Some(w) = self.widgets_mut(file) {
                    w.clean_enabled = enabled;
                    if !enabled {
                        w.cleaning_steps.clear();
                    }
                }
            }
            UiEvent::RemoveDuplicates(file) => {
                self.record_step(file, CleaningStep::RemoveDuplicates);
            }
            UiEvent::FillMissingWithMean(file) => {
                self.record_step(file, CleaningStep::FillMissingWithMean);
            }
            UiEvent::SetColumns { file, columns } => {
                if let Some(w) = self.widgets_mut(file) {
                    w.selected_columns = Some(columns);
                }
            }
            UiEvent::SetShowChart { file, show } => {
                if let Some(w) = self.widgets_mut(file) {
                    w.show_chart = show;
                }
            }
            UiEvent::SetExportFormat { file, format } => {
                if let Some(w) = self.widgets_mut(file) {
                    w.export_format = format;
                }
            }
            UiEvent::Convert(file) => {
                if let Some(w) = self.widgets_mut(file) {
                    w.convert_requested = true;
                }
            }
        }

        self.pass = run_pass(&self.files);
    }

    fn widgets_mut(&mut self, id: FileId) -> Option<&mut WidgetState> {
        self.files
            .iter_mut()
            .find(|f| f.id == id)
            .map(|f| &mut f.widgets)
    }

    /// Remember a cleaning button press. Ignored while cleaning is off.
    /// Both steps are idempotent, so a press equal to the last recorded
    /// step is dropped; an earlier step pressed again is replayed again.
    fn record_step(&mut self, id: FileId, step: CleaningStep) {
        if let Some(w) = self.widgets_mut(id) {
            if w.clean_enabled && w.cleaning_steps.last() != Some(&step) {
                w.cleaning_steps.push(step);
            }
        }
    }

    pub fn files(&self) -> &[FileSession] {
        &self.files
    }

    pub fn outcome(&self, id: FileId) -> Option<&FileOutcome> {
        self.pass
            .outcomes
            .iter()
            .find(|(fid, _)| *fid == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn aborted_at(&self) -> Option<&str> {
        self.pass.aborted_at.as_deref()
    }

    /// Hand the converted buffer to the download control. It is gone
    /// from the session afterwards.
    pub fn take_export(&mut self, id: FileId) -> Option<ExportBuffer> {
        self.pass
            .outcomes
            .iter_mut()
            .find(|(fid, _)| *fid == id)
            .and_then(|(_, outcome)| match outcome {
                FileOutcome::Ready(view) => view.export.take(),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use pretty_assertions::assert_eq;

    fn upload(name: &str, body: &str) -> UploadedFile {
        UploadedFile::new(name, body.as_bytes().to_vec())
    }

    fn view(state: &SessionState, id: FileId) -> &FileView {
        match state.outcome(id) {
            Some(FileOutcome::Ready(view)) => &**view,
            other => panic!("file {id} not ready: {other:?}"),
        }
    }

    fn widgets(state: &SessionState, id: FileId) -> &WidgetState {
        &state.files().iter().find(|f| f.id == id).unwrap().widgets
    }

    fn session_with_data_csv() -> SessionState {
        let mut state = SessionState::default();
        state.handle(UiEvent::FilesUploaded(vec![upload(
            "data.csv",
            "a,b\n1,2\n1,2\n3,\n",
        )]));
        state
    }

    #[test]
    fn unsupported_file_is_skipped_and_others_processed() {
        let mut state = SessionState::default();
        state.handle(UiEvent::FilesUploaded(vec![
            upload("notes.txt", "hello"),
            upload("data.csv", "a\n1\n"),
        ]));

        assert!(matches!(
            state.outcome(0),
            Some(FileOutcome::Unsupported { message }) if message.contains(".txt")
        ));
        assert_eq!(view(&state, 1).table.len(), 1);
        assert_eq!(state.aborted_at(), None);
    }

    #[test]
    fn parse_failure_ends_the_pass() {
        let mut state = SessionState::default();
        state.handle(UiEvent::FilesUploaded(vec![
            upload("first.csv", "a\n1\n"),
            upload("broken.csv", "a,b\n1,2,3\n"),
            upload("last.csv", "a\n1\n"),
        ]));

        assert!(matches!(state.outcome(0), Some(FileOutcome::Ready(_))));
        assert!(matches!(state.outcome(1), Some(FileOutcome::Failed { .. })));
        assert!(state.outcome(2).is_none());
        assert_eq!(state.aborted_at(), Some("broken.csv"));

        // removing the offending file lets the next pass complete
        state.handle(UiEvent::RemoveFile(1));
        assert!(matches!(state.outcome(2), Some(FileOutcome::Ready(_))));
        assert_eq!(state.aborted_at(), None);
    }

    #[test]
    fn cleaning_steps_replay_on_every_pass() {
        let mut state = session_with_data_csv();

        // buttons do nothing until cleaning is enabled
        state.handle(UiEvent::RemoveDuplicates(0));
        assert_eq!(view(&state, 0).table.len(), 3);

        state.handle(UiEvent::SetCleaning { file: 0, enabled: true });
        state.handle(UiEvent::RemoveDuplicates(0));
        state.handle(UiEvent::FillMissingWithMean(0));
        state.handle(UiEvent::RemoveDuplicates(0));
        state.handle(UiEvent::RemoveDuplicates(0));
        assert_eq!(
            widgets(&state, 0).cleaning_steps,
            vec![
                CleaningStep::RemoveDuplicates,
                CleaningStep::FillMissingWithMean,
                CleaningStep::RemoveDuplicates,
            ]
        );

        // an unrelated event still yields the cleaned table
        state.handle(UiEvent::SetShowChart { file: 0, show: true });
        let cleaned = view(&state, 0);
        assert_eq!(cleaned.table.len(), 2);
        assert_eq!(cleaned.table.column("b").unwrap().values[1], CellValue::Float(2.0));
        assert!(cleaned.chart.is_some());

        state.handle(UiEvent::SetCleaning { file: 0, enabled: false });
        assert!(widgets(&state, 0).cleaning_steps.is_empty());
        assert_eq!(view(&state, 0).table.len(), 3);
    }

    #[test]
    fn dedup_pressed_after_fill_removes_rows_the_fill_made_equal() {
        let mut state = SessionState::default();
        state.handle(UiEvent::FilesUploaded(vec![upload("d.csv", "a,b\n1,\n1,4\n1,\n")]));
        state.handle(UiEvent::SetCleaning { file: 0, enabled: true });
        state.handle(UiEvent::RemoveDuplicates(0));
        state.handle(UiEvent::FillMissingWithMean(0));

        // (1, 4.0) twice: the fill turned the surviving gap into the mean
        assert_eq!(view(&state, 0).table.len(), 2);

        state.handle(UiEvent::RemoveDuplicates(0));
        let cleaned = view(&state, 0);
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(
            cleaned.table.row(0),
            vec![&CellValue::Int(1), &CellValue::Float(4.0)]
        );
        assert_eq!(cleaned.applied.len(), 3);
    }

    #[test]
    fn column_selection_applies_after_cleaning() {
        let mut state = session_with_data_csv();
        state.handle(UiEvent::SetCleaning { file: 0, enabled: true });
        state.handle(UiEvent::RemoveDuplicates(0));
        state.handle(UiEvent::SetColumns {
            file: 0,
            columns: vec!["a".to_string()],
        });

        let v = view(&state, 0);
        assert_eq!(v.table.column_names(), vec!["a"]);
        assert_eq!(
            v.table.column("a").unwrap().values,
            vec![CellValue::Int(1), CellValue::Int(3)]
        );
        assert_eq!(v.parsed_columns, vec!["a", "b"]);
    }

    #[test]
    fn convert_lasts_one_pass_and_export_is_taken_once() {
        let mut state = session_with_data_csv();
        state.handle(UiEvent::SetExportFormat {
            file: 0,
            format: ExportFormat::Excel,
        });
        state.handle(UiEvent::Convert(0));

        let export = state.take_export(0).unwrap();
        assert_eq!(export.file_name, "data.xlsx");
        assert!(state.take_export(0).is_none());

        state.handle(UiEvent::Convert(0));
        state.handle(UiEvent::SetShowChart { file: 0, show: false });
        assert!(!widgets(&state, 0).convert_requested);
        assert!(state.take_export(0).is_none());
    }

    #[test]
    fn files_keep_upload_order_and_unique_ids() {
        let mut state = SessionState::default();
        state.handle(UiEvent::FilesUploaded(vec![upload("a.csv", "x\n1\n")]));
        state.handle(UiEvent::FilesUploaded(vec![upload("a.csv", "x\n2\n")]));
        let ids: Vec<FileId> = state.files().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1]);

        state.handle(UiEvent::RemoveFile(0));
        assert_eq!(state.files().len(), 1);
        assert!(state.outcome(0).is_none());
        assert_eq!(view(&state, 1).name, "a.csv");
    }
}
