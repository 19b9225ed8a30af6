// Display attributes for a rider series

use crate::settings::{ChartOptions, GlobalSettings};

use super::RiderSeries;

/// Line thickness shared by all series; not user-configurable.
pub const LINE_WIDTH: f32 = 2.0;

const COLOR_SATURATION: f32 = 0.8;
const COLOR_LIGHTNESS: f32 = 0.4;
const HIGHLIGHTED_POINT_RADIUS: f32 = 3.0;
const UNSELECTED_POINT_RADIUS: f32 = 2.0;

/// Resolved display attributes for one rider series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub label: String,
    pub color: (u8, u8, u8),
    pub alpha: f32,
    pub point_radius: f32,
    pub line_width: f32,
}

/// Hue in `[0, 360)` derived from the rider name. The hash is the classic
/// `hash * 31 + char` rolling sum, so identical names always map to the
/// same hue with no persisted color table.
pub fn rider_hue(name: &str) -> f32 {
    let mut hash: i32 = 0;
    for c in name.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(c as i32);
    }
    hash.rem_euclid(360) as f32
}

pub fn rider_color(name: &str) -> (u8, u8, u8) {
    hsl_to_rgb(rider_hue(name), COLOR_SATURATION, COLOR_LIGHTNESS)
}

pub fn resolve_style(
    series: &RiderSeries,
    options: &ChartOptions,
    settings: &GlobalSettings,
) -> SeriesStyle {
    let alpha = if series.is_highlighted {
        1.0
    } else {
        settings.unselected_alpha
    };

    let point_radius = if !options.show_points {
        0.0
    } else if series.is_highlighted {
        HIGHLIGHTED_POINT_RADIUS
    } else {
        UNSELECTED_POINT_RADIUS
    };

    let label = match series.best_time {
        Some(best) if settings.show_best_times => {
            format!("{} ({:.3}s)", series.rider, best)
        }
        _ => series.rider.clone(),
    };

    SeriesStyle {
        label,
        color: rider_color(&series.rider),
        alpha,
        point_radius,
        line_width: LINE_WIDTH,
    }
}

fn hsl_to_rgb(hue_deg: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let c = (1. - (2. * lightness - 1.).abs()) * saturation;
    let h = hue_deg / 60.;
    let x = c * (1. - (h % 2. - 1.).abs());
    let (r, g, b) = match h {
        h if h < 1. => (c, x, 0.),
        h if h < 2. => (x, c, 0.),
        h if h < 3. => (0., c, x),
        h if h < 4. => (0., x, c),
        h if h < 5. => (x, 0., c),
        _ => (c, 0., x),
    };
    let m = lightness - c / 2.;
    (
        ((r + m) * 255.).round() as u8,
        ((g + m) * 255.).round() as u8,
        ((b + m) * 255.).round() as u8,
    )
}
