//! Named map storage.
//!
//! Maps are saved as `<dir>/<name>.json` with a format version and the time
//! they were written. Saving under an existing name replaces that map.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::grid::HeightField;

const SAVE_VERSION: u32 = 1;
const MAP_EXTENSION: &str = "json";

#[derive(Serialize, Deserialize)]
struct MapSaveFile {
    version: u32,
    saved_at: String,
    name: String,
    field: HeightField,
}

/// A map read back from the store.
#[derive(Clone, Debug)]
pub struct StoredMap {
    pub name: String,
    /// Local time the map was saved, `%Y-%m-%d %H:%M:%S`
    pub saved_at: String,
    pub field: HeightField,
}

/// Directory of saved maps.
pub struct MapStore {
    dir: PathBuf,
}

impl MapStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a map name resolves to. Accepts names with or without `.json`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let name = normalize_name(name)?;
        Ok(self.dir.join(format!("{}.{}", name, MAP_EXTENSION)))
    }

    /// Save a field under `name`, creating the directory if needed.
    pub fn save(&self, name: &str, field: &HeightField) -> Result<PathBuf, StorageError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let save = MapSaveFile {
            version: SAVE_VERSION,
            saved_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            name: normalize_name(name)?.to_string(),
            field: field.clone(),
        };
        let json = serde_json::to_string(&save)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json)?;

        Ok(path)
    }

    /// Load the map saved under `name`.
    pub fn load(&self, name: &str) -> Result<StoredMap, StorageError> {
        let path = self.path_for(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let save: MapSaveFile = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Deserialization(e.to_string()))?;

        if save.version > SAVE_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: save.version,
                supported: SAVE_VERSION,
            });
        }

        save.field
            .check_consistency()
            .map_err(StorageError::Deserialization)?;

        Ok(StoredMap {
            name: save.name,
            saved_at: save.saved_at,
            field: save.field,
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Names of all saved maps, sorted. A missing directory has no maps.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MAP_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn normalize_name(name: &str) -> Result<&str, StorageError> {
    let trimmed = name.trim();
    let stem = trimmed
        .strip_suffix(".json")
        .unwrap_or(trimmed);
    if stem.is_empty() || stem.contains('/') || stem.contains('\\') || stem.contains("..") {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(stem)
}

/// Errors that can occur while saving or loading maps.
#[derive(Debug)]
pub enum StorageError {
    /// IO error (permissions, full disk, etc.)
    Io(io::Error),
    /// No map saved under this name
    NotFound(String),
    /// Name is empty or would escape the map directory
    InvalidName(String),
    /// Save file was written by a newer version
    UnsupportedVersion { found: u32, supported: u32 },
    Serialization(String),
    /// Corrupted or incompatible save file
    Deserialization(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::NotFound(name) => write!(f, "Map '{}' could not be found", name),
            StorageError::InvalidName(name) => write!(f, "Invalid map name '{}'", name),
            StorageError::UnsupportedVersion { found, supported } => write!(
                f,
                "Save file version {} is newer than supported version {}",
                found, supported
            ),
            StorageError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StorageError::Deserialization(e) => write!(f, "Deserialization error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}
