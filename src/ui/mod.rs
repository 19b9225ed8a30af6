// Application shell: selection panels and per-track chart sections

use egui::{Color32, RichText, ScrollArea};

use crate::LaptraceError;
use crate::dataset::Dataset;
use crate::series::synthesize_track;
use crate::settings::{
    GlobalSettings, RefreshScope, SelectionKind, SelectionState, SettingsStore, SpacingMode,
};

mod chart_view;

use chart_view::{ChartArena, TrackChart};

enum UiState {
    Error { message: String },
    Display { dataset: Dataset },
}

/// `LapTrendsApp` renders one lap-time trend chart per selected track, with
/// checkbox lists for track/rider selection and per-track chart options.
///
/// All state changes flow through `SelectionState`/`GlobalSettings`, which
/// persist a snapshot on every mutation and report which charts to
/// recompute. The dataset itself is immutable for the process lifetime.
pub struct LapTrendsApp {
    state: UiState,
    store: Box<dyn SettingsStore>,
    selection: SelectionState,
    settings: GlobalSettings,
    arena: ChartArena,
}

impl LapTrendsApp {
    pub fn new(
        dataset: Result<Dataset, LaptraceError>,
        store: Box<dyn SettingsStore>,
        _cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let (state, selection, settings) = match dataset {
            Ok(dataset) => {
                let selection = SelectionState::load(store.as_ref(), &dataset);
                let settings = GlobalSettings::load(store.as_ref());
                (UiState::Display { dataset }, selection, settings)
            }
            // Terminal state: the dataset failed to load, nothing to select
            Err(e) => (
                UiState::Error {
                    message: format!("Failed to load data: {}", e),
                },
                SelectionState::load(store.as_ref(), &Dataset::default()),
                GlobalSettings::default(),
            ),
        };

        let mut app = Self {
            state,
            store,
            selection,
            settings,
            arena: ChartArena::default(),
        };
        app.refresh(RefreshScope::AllTracks);
        app
    }

    /// Recompute the charts a mutation invalidated and drop charts for
    /// deselected tracks.
    fn refresh(&mut self, scope: RefreshScope) {
        let UiState::Display { dataset } = &self.state else {
            return;
        };

        match scope {
            RefreshScope::SingleTrack(track) => {
                if self.selection.is_track_selected(&track) {
                    let chart = build_chart(dataset, &track, &self.selection, &self.settings);
                    self.arena.replace(&track, chart);
                }
            }
            RefreshScope::AllTracks => {
                self.arena.retain_tracks(self.selection.selected_tracks());
                for track in self.selection.selected_tracks().clone() {
                    let chart = build_chart(dataset, &track, &self.selection, &self.settings);
                    self.arena.replace(&track, chart);
                }
            }
        }
    }

    fn show_selectors(&mut self, ui: &mut egui::Ui, refreshes: &mut Vec<RefreshScope>) {
        let UiState::Display { dataset } = &self.state else {
            return;
        };

        ui.heading("Tracks");
        if ui.button("Select All / None").clicked() {
            refreshes.push(self.selection.toggle_select_all(
                SelectionKind::Tracks,
                dataset,
                self.store.as_mut(),
            ));
        }
        for track in &dataset.tracks {
            let mut checked = self.selection.is_track_selected(track);
            if ui.checkbox(&mut checked, track).changed() {
                let mut tracks = self.selection.selected_tracks().clone();
                if checked {
                    tracks.insert(track.clone());
                } else {
                    tracks.remove(track);
                }
                refreshes.push(
                    self.selection
                        .set_selected_tracks(tracks, self.store.as_mut()),
                );
            }
        }

        ui.separator();
        ui.heading("Riders");
        if ui.button("Select All / None").clicked() {
            refreshes.push(self.selection.toggle_select_all(
                SelectionKind::Riders,
                dataset,
                self.store.as_mut(),
            ));
        }
        for rider in &dataset.riders {
            let mut checked = self.selection.is_rider_selected(rider);
            if ui.checkbox(&mut checked, rider).changed() {
                let mut riders = self.selection.selected_riders().clone();
                if checked {
                    riders.insert(rider.clone());
                } else {
                    riders.remove(rider);
                }
                refreshes.push(
                    self.selection
                        .set_selected_riders(riders, self.store.as_mut()),
                );
            }
        }

        ui.separator();
        ui.heading("Display");
        let mut alpha = self.settings.unselected_alpha;
        if ui
            .add(egui::Slider::new(&mut alpha, 0.0..=1.0).text("Unselected opacity"))
            .changed()
        {
            refreshes.push(
                self.settings
                    .set_unselected_alpha(alpha, self.store.as_mut()),
            );
        }
        let mut show_best_times = self.settings.show_best_times;
        if ui.checkbox(&mut show_best_times, "Show best times").changed() {
            refreshes.push(
                self.settings
                    .set_show_best_times(show_best_times, self.store.as_mut()),
            );
        }
    }

    fn show_track_section(
        &mut self,
        ui: &mut egui::Ui,
        track: &str,
        refreshes: &mut Vec<RefreshScope>,
    ) {
        ui.heading(track);

        let options = self.selection.chart_options_for(track);
        ui.horizontal(|ui| {
            let mut equally_spaced = options.spacing == SpacingMode::Equal;
            if ui
                .checkbox(&mut equally_spaced, "Equally Spaced Sessions")
                .changed()
            {
                refreshes.push(self.selection.set_chart_option(
                    track,
                    |o| {
                        o.spacing = if equally_spaced {
                            SpacingMode::Equal
                        } else {
                            SpacingMode::Real
                        };
                    },
                    self.store.as_mut(),
                ));
            }

            let mut invert_y = options.invert_y;
            if ui
                .checkbox(&mut invert_y, "Invert Y-Axis (Lower Better)")
                .changed()
            {
                refreshes.push(self.selection.set_chart_option(
                    track,
                    |o| o.invert_y = invert_y,
                    self.store.as_mut(),
                ));
            }

            let mut show_points = options.show_points;
            if ui.checkbox(&mut show_points, "Show Points").changed() {
                refreshes.push(self.selection.set_chart_option(
                    track,
                    |o| o.show_points = show_points,
                    self.store.as_mut(),
                ));
            }

            let mut show_grid = options.show_grid;
            if ui.checkbox(&mut show_grid, "Show Grid").changed() {
                refreshes.push(self.selection.set_chart_option(
                    track,
                    |o| o.show_grid = show_grid,
                    self.store.as_mut(),
                ));
            }
        });

        if let Some(chart) = self.arena.get(track) {
            chart.show(ui);
        }
        ui.separator();
    }
}

fn build_chart(
    dataset: &Dataset,
    track: &str,
    selection: &SelectionState,
    settings: &GlobalSettings,
) -> TrackChart {
    let options = selection.chart_options_for(track);
    let series = synthesize_track(dataset, track, options.spacing, selection.selected_riders());
    TrackChart::from_series(&series, &options, settings)
}

impl eframe::App for LapTrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let UiState::Error { message } = &self.state {
            let message = message.clone();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading(RichText::new(message).color(Color32::RED).strong());
            });
            return;
        }

        // Mutations are collected during the frame and applied afterwards so
        // the affected charts are rebuilt exactly once.
        let mut refreshes: Vec<RefreshScope> = Vec::new();

        egui::SidePanel::left("selectors")
            .resizable(true)
            .min_width(180.)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| {
                    self.show_selectors(ui, &mut refreshes);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.selection.selected_tracks().is_empty()
                || self.selection.selected_riders().is_empty()
            {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new("Select at least one track and one rider")
                            .color(Color32::GRAY),
                    );
                });
                return;
            }

            ScrollArea::vertical().show(ui, |ui| {
                // BTreeSet iteration keeps the sections in sorted track order
                for track in self.selection.selected_tracks().clone() {
                    self.show_track_section(ui, &track, &mut refreshes);
                }
            });
        });

        for scope in refreshes {
            self.refresh(scope);
        }
    }
}
