//! Favorite cities persisted in a single key-value slot.
//!
//! The whole list is read and written as one JSON value. There is no locking:
//! the last writer wins.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{collections::HashMap, fs, io, path::PathBuf};

use crate::{
    error::WeatherError,
    model::{FavoriteLocation, WeatherSnapshot},
};

pub const FAVORITES_KEY: &str = "sunnyweather_favorites";

pub const ADDED_MESSAGE: &str = "Added to favorites.";
pub const ALREADY_EXISTS_MESSAGE: &str = "This city is already in favorites.";

/// Durable string slots addressed by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read slot: {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create favorites directory: {}", self.dir.display())
        })?;

        let path = self.slot_path(key);
        fs::write(&path, value).with_context(|| format!("Failed to write slot: {}", path.display()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

impl AddOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            AddOutcome::Added => ADDED_MESSAGE,
            AddOutcome::AlreadyExists => ALREADY_EXISTS_MESSAGE,
        }
    }
}

/// The favorites collection. Open one and pass it by reference to every view.
#[derive(Debug)]
pub struct FavoritesStore<S> {
    storage: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read the list. Absent, unreadable, or non-list data yields an empty list;
    /// individual malformed entries are skipped.
    pub fn load(&self) -> Vec<FavoriteLocation> {
        let raw = match self.storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("could not read favorites, treating as empty: {e:#}");
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "favorites slot is corrupt, treating as empty");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(favorite) => Some(favorite),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed favorite entry");
                    None
                }
            })
            .collect()
    }

    /// Replace the whole persisted list.
    pub fn save(&self, favorites: &[FavoriteLocation]) -> Result<(), WeatherError> {
        let json = serde_json::to_string(favorites)
            .map_err(|e| WeatherError::Storage(format!("Could not save favorites: {e}")))?;

        self.storage.set(FAVORITES_KEY, &json).map_err(|e| {
            tracing::warn!("could not write favorites: {e:#}");
            WeatherError::Storage("Could not save favorites.".to_string())
        })
    }

    /// Append `favorite` unless its id is already stored.
    pub fn add(&self, favorite: FavoriteLocation) -> Result<AddOutcome, WeatherError> {
        let mut favorites = self.load();

        if favorites.iter().any(|f| f.id == favorite.id) {
            return Ok(AddOutcome::AlreadyExists);
        }

        tracing::debug!(id = %favorite.id, name = %favorite.name, "adding favorite");
        favorites.push(favorite);
        self.save(&favorites)?;

        Ok(AddOutcome::Added)
    }

    /// Remove by id. Returns whether an entry was removed.
    pub fn remove(&self, id: &str) -> Result<bool, WeatherError> {
        let mut favorites = self.load();
        let before = favorites.len();
        favorites.retain(|f| f.id != id);

        if favorites.len() == before {
            return Ok(false);
        }

        self.save(&favorites)?;
        Ok(true)
    }

    pub fn find(&self, id: &str) -> Option<FavoriteLocation> {
        self.load().into_iter().find(|f| f.id == id)
    }
}

/// Project a snapshot's location into a favorite entry.
pub fn to_favorite(snapshot: &WeatherSnapshot) -> FavoriteLocation {
    FavoriteLocation::from(&snapshot.location)
}
