use eframe::egui;

use crate::state::SessionState;
use crate::ui::panels::{self, Actions};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DataCleanerApp {
    pub state: SessionState,
}

impl eframe::App for DataCleanerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Actions::default();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state, &mut actions);
        });

        // ---- Central panel: one section per file ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::file_sections(ui, &self.state, &mut actions);
                });
        });

        // ---- Apply what happened this frame ----
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            panels::upload_dropped(&mut self.state, dropped);
        }
        if actions.open_upload_dialog {
            panels::open_upload_dialog(&mut self.state);
        }
        for event in actions.events {
            log::debug!("UI event: {event:?}");
            self.state.handle(event);
        }
        for id in actions.downloads {
            panels::save_export(&mut self.state, id);
        }
    }
}
