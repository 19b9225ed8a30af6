// Selection state, per-track chart options, and global display settings

use std::collections::{BTreeSet, HashMap};

use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

pub mod store;

pub use store::{FileStore, MemoryStore, SettingsStore, default_store};

const KEY_SELECTED_TRACKS: &str = "selectedTracks";
const KEY_SELECTED_RIDERS: &str = "selectedRiders";
const KEY_CHART_SETTINGS: &str = "chartSettings";
const KEY_UNSELECTED_ALPHA: &str = "unselectedAlpha";
const KEY_SHOW_BEST_TIMES: &str = "showBestTimes";

pub const DEFAULT_UNSELECTED_ALPHA: f32 = 0.18;

/// How a track's sessions are placed on the x-axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpacingMode {
    /// Every session is one equally-spaced tick, ignoring calendar gaps.
    #[default]
    Equal,
    /// Sessions sit at true calendar distance; same-date sessions are spread
    /// evenly across their day.
    Real,
}

/// Chart options for one track. Missing persisted keys fall back to these
/// defaults, never to another track's settings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    pub spacing: SpacingMode,
    pub invert_y: bool,
    pub show_points: bool,
    pub show_grid: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            spacing: SpacingMode::Equal,
            invert_y: false,
            show_points: true,
            show_grid: true,
        }
    }
}

/// Process-wide display settings, persisted as individual keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSettings {
    /// Opacity applied to riders outside the selected set, in `[0, 1]`.
    pub unselected_alpha: f32,
    pub show_best_times: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            unselected_alpha: DEFAULT_UNSELECTED_ALPHA,
            show_best_times: true,
        }
    }
}

impl GlobalSettings {
    pub fn load(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();
        let unselected_alpha = match store.get(KEY_UNSELECTED_ALPHA) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unparseable {} value {:?}, using default", KEY_UNSELECTED_ALPHA, raw);
                defaults.unselected_alpha
            }),
            None => defaults.unselected_alpha,
        };
        let show_best_times = match store.get(KEY_SHOW_BEST_TIMES) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unparseable {} value {:?}, using default", KEY_SHOW_BEST_TIMES, raw);
                defaults.show_best_times
            }),
            None => defaults.show_best_times,
        };
        Self {
            unselected_alpha,
            show_best_times,
        }
    }

    pub fn set_unselected_alpha(
        &mut self,
        alpha: f32,
        store: &mut dyn SettingsStore,
    ) -> RefreshScope {
        self.unselected_alpha = alpha.clamp(0., 1.);
        persist(store, KEY_UNSELECTED_ALPHA, &self.unselected_alpha.to_string());
        RefreshScope::AllTracks
    }

    pub fn set_show_best_times(
        &mut self,
        show: bool,
        store: &mut dyn SettingsStore,
    ) -> RefreshScope {
        self.show_best_times = show;
        persist(store, KEY_SHOW_BEST_TIMES, &self.show_best_times.to_string());
        RefreshScope::AllTracks
    }
}

/// Which charts a mutation invalidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshScope {
    AllTracks,
    SingleTrack(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Tracks,
    Riders,
}

/// The user's selected tracks/riders and per-track chart options. Selection
/// sets are always subsets of the dataset's derived track/rider sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    selected_tracks: BTreeSet<String>,
    selected_riders: BTreeSet<String>,
    chart_options: HashMap<String, ChartOptions>,
}

impl SelectionState {
    /// Read persisted selections, defaulting to "all items selected" when a
    /// key is absent or unparseable. Persisted names that no longer exist in
    /// the dataset are dropped.
    pub fn load(store: &dyn SettingsStore, dataset: &Dataset) -> Self {
        let selected_tracks = load_selection_set(store, KEY_SELECTED_TRACKS, &dataset.tracks);
        let selected_riders = load_selection_set(store, KEY_SELECTED_RIDERS, &dataset.riders);
        let chart_options = match store.get(KEY_CHART_SETTINGS) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Unparseable {}, using defaults: {}", KEY_CHART_SETTINGS, e);
                HashMap::new()
            }),
            None => HashMap::new(),
        };

        Self {
            selected_tracks,
            selected_riders,
            chart_options,
        }
    }

    pub fn selected_tracks(&self) -> &BTreeSet<String> {
        &self.selected_tracks
    }

    pub fn selected_riders(&self) -> &BTreeSet<String> {
        &self.selected_riders
    }

    pub fn is_track_selected(&self, track: &str) -> bool {
        self.selected_tracks.contains(track)
    }

    pub fn is_rider_selected(&self, rider: &str) -> bool {
        self.selected_riders.contains(rider)
    }

    /// Chart options for one track; tracks with no persisted options get the
    /// defaults.
    pub fn chart_options_for(&self, track: &str) -> ChartOptions {
        self.chart_options
            .get(track)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_selected_tracks(
        &mut self,
        tracks: BTreeSet<String>,
        store: &mut dyn SettingsStore,
    ) -> RefreshScope {
        self.selected_tracks = tracks;
        self.persist_snapshot(store);
        RefreshScope::AllTracks
    }

    pub fn set_selected_riders(
        &mut self,
        riders: BTreeSet<String>,
        store: &mut dyn SettingsStore,
    ) -> RefreshScope {
        self.selected_riders = riders;
        self.persist_snapshot(store);
        RefreshScope::AllTracks
    }

    /// Mutate one track's chart options and persist the snapshot. Only that
    /// track's chart needs recomputing.
    pub fn set_chart_option(
        &mut self,
        track: &str,
        mutate: impl FnOnce(&mut ChartOptions),
        store: &mut dyn SettingsStore,
    ) -> RefreshScope {
        let options = self
            .chart_options
            .entry(track.to_string())
            .or_default();
        mutate(options);
        self.persist_snapshot(store);
        RefreshScope::SingleTrack(track.to_string())
    }

    /// If every item of the kind is selected, deselect all; otherwise select
    /// all. Not a three-way cycle.
    pub fn toggle_select_all(
        &mut self,
        kind: SelectionKind,
        dataset: &Dataset,
        store: &mut dyn SettingsStore,
    ) -> RefreshScope {
        let (selection, all_items) = match kind {
            SelectionKind::Tracks => (&mut self.selected_tracks, &dataset.tracks),
            SelectionKind::Riders => (&mut self.selected_riders, &dataset.riders),
        };

        if selection.len() == all_items.len() {
            selection.clear();
        } else {
            *selection = all_items.iter().cloned().collect();
        }
        self.persist_snapshot(store);
        RefreshScope::AllTracks
    }

    /// Write the full selection snapshot. Keys are written independently;
    /// there is no multi-key transaction.
    fn persist_snapshot(&self, store: &mut dyn SettingsStore) {
        match serde_json::to_string(&self.selected_tracks) {
            Ok(raw) => persist(store, KEY_SELECTED_TRACKS, &raw),
            Err(e) => error!("Could not serialize selected tracks: {}", e),
        }
        match serde_json::to_string(&self.selected_riders) {
            Ok(raw) => persist(store, KEY_SELECTED_RIDERS, &raw),
            Err(e) => error!("Could not serialize selected riders: {}", e),
        }
        match serde_json::to_string(&self.chart_options) {
            Ok(raw) => persist(store, KEY_CHART_SETTINGS, &raw),
            Err(e) => error!("Could not serialize chart settings: {}", e),
        }
    }
}

fn load_selection_set(
    store: &dyn SettingsStore,
    key: &str,
    all_items: &[String],
) -> BTreeSet<String> {
    let Some(raw) = store.get(key) else {
        return all_items.iter().cloned().collect();
    };

    match serde_json::from_str::<BTreeSet<String>>(&raw) {
        Ok(persisted) => {
            // Enforce the subset invariant against the current dataset
            persisted
                .into_iter()
                .filter(|item| all_items.contains(item))
                .collect()
        }
        Err(e) => {
            warn!("Unparseable {} value, selecting all: {}", key, e);
            all_items.iter().cloned().collect()
        }
    }
}

fn persist(store: &mut dyn SettingsStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        error!("Error persisting {}: {}", key, e);
    }
}
