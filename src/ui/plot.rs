use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::generate_palette;
use crate::data::chart::ChartSeries;

// ---------------------------------------------------------------------------
// Bar chart of the first numeric columns
// ---------------------------------------------------------------------------

/// Total width of one row's group of bars.
const GROUP_WIDTH: f64 = 0.8;

/// Render one grouped bar chart keyed by row position.
pub fn bar_chart(ui: &mut Ui, id: impl std::hash::Hash, series: &[ChartSeries]) {
    if series.is_empty() {
        ui.label("No numeric columns to chart.");
        return;
    }

    let colors = generate_palette(series.len());
    let bar_width = GROUP_WIDTH / series.len() as f64;

    Plot::new(id)
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Row")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (s, (column, color)) in series.iter().zip(colors).enumerate() {
                let offset = -GROUP_WIDTH / 2.0 + bar_width * (s as f64 + 0.5);

                // missing values draw no bar
                let bars: Vec<Bar> = column
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(row, v)| {
                        v.map(|value| Bar::new(row as f64 + offset, value).width(bar_width))
                    })
                    .collect();

                let chart = BarChart::new(bars)
                    .name(&column.name)
                    .color(color);

                plot_ui.bar_chart(chart);
            }
        });
}
