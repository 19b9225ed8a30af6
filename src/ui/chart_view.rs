// Rendering adapter: drives egui_plot from synthesized, styled series

use std::collections::{BTreeSet, HashMap};

use chrono::DateTime;
use egui::{Color32, Ui, Vec2b};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::series::{SessionPosition, TrackSeries, resolve_style};
use crate::settings::{ChartOptions, GlobalSettings};

const CHART_HEIGHT: f32 = 320.;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AxisKind {
    Categorical,
    Time,
}

/// One styled line ready for plotting. `points` keeps gaps as `None`; the
/// renderer connects the line across them.
pub(crate) struct StyledSeries {
    pub(crate) label: String,
    pub(crate) points: Vec<(f64, Option<f64>)>,
    pub(crate) color: Color32,
    pub(crate) alpha: f32,
    pub(crate) point_radius: f32,
    pub(crate) line_width: f32,
}

/// Everything the chart library needs for one track.
pub(crate) struct TrackChart {
    pub(crate) track: String,
    pub(crate) axis: AxisKind,
    /// Tick labels for the categorical axis, one per session. Empty for the
    /// time axis.
    pub(crate) labels: Vec<String>,
    pub(crate) series: Vec<StyledSeries>,
    pub(crate) invert_y: bool,
    pub(crate) show_grid: bool,
}

impl TrackChart {
    pub(crate) fn from_series(
        series: &TrackSeries,
        options: &ChartOptions,
        settings: &GlobalSettings,
    ) -> Self {
        let mut axis = AxisKind::Categorical;
        let mut labels = Vec::new();
        let mut xs = Vec::with_capacity(series.positions.len());
        for (index, position) in series.positions.iter().enumerate() {
            match position {
                SessionPosition::Label(label) => {
                    labels.push(label.clone());
                    xs.push(index as f64);
                }
                SessionPosition::Timestamp(ms) => {
                    axis = AxisKind::Time;
                    xs.push(*ms);
                }
            }
        }

        let styled = series
            .riders
            .iter()
            .map(|rider| {
                let style = resolve_style(rider, options, settings);
                let (r, g, b) = style.color;
                StyledSeries {
                    label: style.label,
                    points: rider
                        .points
                        .iter()
                        .zip(xs.iter())
                        .map(|(p, x)| (*x, p.value))
                        .collect(),
                    color: Color32::from_rgb(r, g, b),
                    alpha: style.alpha,
                    point_radius: style.point_radius,
                    line_width: style.line_width,
                }
            })
            .collect();

        Self {
            track: series.track.clone(),
            axis,
            labels,
            series: styled,
            invert_y: options.invert_y,
            show_grid: options.show_grid,
        }
    }

    pub(crate) fn show(&self, ui: &mut Ui) {
        let invert_y = self.invert_y;
        let mut plot = Plot::new(format!("chart-{}", self.track))
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .show_grid(Vec2b::new(self.show_grid, self.show_grid))
            .label_formatter(move |name, point| {
                let value = if invert_y { -point.y } else { point.y };
                if name.is_empty() {
                    format!("{:.3}s", value)
                } else {
                    format!("{}\n{:.3}s", name, value)
                }
            });

        plot = match self.axis {
            AxisKind::Categorical => {
                let labels = self.labels.clone();
                plot.x_axis_formatter(move |mark, _range| {
                    let index = mark.value.round();
                    if (mark.value - index).abs() > f64::EPSILON || index < 0. {
                        return String::new();
                    }
                    labels
                        .get(index as usize)
                        .cloned()
                        .unwrap_or_default()
                })
            }
            AxisKind::Time => plot.x_axis_formatter(|mark, _range| {
                DateTime::from_timestamp_millis(mark.value as i64)
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            }),
        };

        if self.invert_y {
            plot = plot.y_axis_formatter(|mark, _range| format!("{}", -mark.value));
        }

        plot.show(ui, |plot_ui| {
            for series in &self.series {
                // Gaps are skipped so the line connects across absent results
                let points: Vec<[f64; 2]> = series
                    .points
                    .iter()
                    .filter_map(|(x, value)| {
                        value.map(|v| [*x, if invert_y { -v } else { v }])
                    })
                    .collect();

                let color = series.color.gamma_multiply(series.alpha);
                plot_ui.line(
                    Line::new(series.label.clone(), PlotPoints::new(points.clone()))
                        .color(color)
                        .width(series.line_width),
                );
                if series.point_radius > 0. {
                    plot_ui.points(
                        Points::new(series.label.clone(), PlotPoints::new(points))
                            .color(color)
                            .radius(series.point_radius),
                    );
                }
            }
        });
    }
}

/// Rendered charts keyed by track. Replacing an entry drops the previous
/// chart data; deselected tracks are pruned with `retain_tracks`.
#[derive(Default)]
pub(crate) struct ChartArena {
    charts: HashMap<String, TrackChart>,
}

impl ChartArena {
    pub(crate) fn replace(&mut self, track: &str, chart: TrackChart) {
        self.charts.insert(track.to_string(), chart);
    }

    pub(crate) fn get(&self, track: &str) -> Option<&TrackChart> {
        self.charts.get(track)
    }

    pub(crate) fn retain_tracks(&mut self, keep: &BTreeSet<String>) {
        self.charts.retain(|track, _| keep.contains(track));
    }
}
