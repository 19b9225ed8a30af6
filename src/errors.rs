// Error types for laptrace

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum LaptraceError {
    // Errors while loading the results dataset. Any of these is fatal to the
    // session: there is no partial-dataset mode, the app shows a load-failed
    // state instead.
    #[snafu(display("Error reading dataset file"))]
    DatasetIo { source: io::Error },
    #[snafu(display("Error parsing dataset document"))]
    DatasetParse { source: serde_json::Error },
    #[snafu(display("Malformed session record at index {index}: {reason}"))]
    MalformedRecord { index: usize, reason: String },
    #[snafu(display("Invalid date \"{value}\" in session record at index {index}"))]
    InvalidDate { index: usize, value: String },

    // Settings store errors. Read failures are not represented here: a
    // missing or unparseable key falls back to defaults locally.
    #[snafu(display("Could not find application data directory to save settings"))]
    NoConfigDir,
    #[snafu(display("Error writing settings file"))]
    SettingsIo { source: io::Error },
    #[snafu(display("Error serializing settings"))]
    SettingsSerialize { source: serde_json::Error },
}
