// Key-value persistence for selections and chart settings

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::LaptraceError;

const SETTINGS_FILE_NAME: &str = "settings.json";

/// String-keyed get/set store backing the persisted selection state. The
/// production implementation writes a JSON map to the user's config
/// directory; tests inject `MemoryStore`.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), LaptraceError>;
}

/// File-backed store holding all keys in a single JSON object.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Could not parse settings file {:?}, starting fresh: {}", path, e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    /// Open the store in the default application config directory.
    pub fn from_local_file() -> Result<Self, LaptraceError> {
        let path = dirs::config_dir()
            .ok_or(LaptraceError::NoConfigDir)?
            .join("laptrace")
            .join(SETTINGS_FILE_NAME);
        Ok(Self::new(path))
    }

    fn save(&self) -> Result<(), LaptraceError> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| LaptraceError::SettingsIo { source: e })?;
        }

        let file = fs::File::create(&self.path)
            .map_err(|e| LaptraceError::SettingsIo { source: e })?;
        serde_json::to_writer(file, &self.values)
            .map_err(|e| LaptraceError::SettingsSerialize { source: e })
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LaptraceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

/// In-memory store for tests and for running without a config directory.
#[derive(Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LaptraceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The store used by the application: file-backed when a config directory
/// exists, in-memory otherwise so the app still runs.
pub fn default_store() -> Box<dyn SettingsStore> {
    match FileStore::from_local_file() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Settings will not persist: {}", e);
            Box::new(MemoryStore::default())
        }
    }
}
