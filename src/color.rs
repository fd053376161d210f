use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Chart series colours
// ---------------------------------------------------------------------------

const SERIES_SATURATION: f32 = 0.75;
const SERIES_LIGHTNESS: f32 = 0.55;

/// One colour per chart series: `n` hues spread evenly around the wheel,
/// at a fixed saturation and lightness.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, SERIES_SATURATION, SERIES_LIGHTNESS);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}
