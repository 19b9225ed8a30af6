// Library interface for laptrace
// This allows integration tests to access internal modules

pub mod dataset;
pub mod errors;
pub mod series;
pub mod settings;
pub mod ui;

// Re-export commonly used types
pub use dataset::{Dataset, Session, load_dataset, parse_dataset};
pub use errors::LaptraceError;
pub use series::{RiderSeries, SessionPosition, TimeSeriesPoint, TrackSeries, synthesize_track};
pub use settings::{
    ChartOptions, GlobalSettings, RefreshScope, SelectionKind, SelectionState, SettingsStore,
    SpacingMode,
};
