//! Persistent key→coordinate store backing the geocoding service
//!
//! Resolved coordinates are kept in memory and mirrored to a single JSON
//! file: a flat object mapping cache keys to `{latitude, longitude}` pairs.
//! The file is read once at construction and rewritten wholesale after every
//! insert. Storage failures are logged and otherwise ignored so that a
//! broken cache can never fail a lookup.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use directories::ProjectDirs;

use crate::geocode::{CacheKey, Coordinate};

/// File name of the persisted cache blob
const STORE_FILE: &str = "coordinates.json";

/// Unbounded coordinate cache with whole-blob JSON persistence
///
/// Entries live for the lifetime of the persisted storage; there is no TTL
/// and no eviction. Address data changes rarely enough that the original
/// design makes this tradeoff deliberately.
#[derive(Debug)]
pub struct CoordinateCache {
    /// In-memory view of the persisted blob
    entries: Mutex<HashMap<String, Coordinate>>,
    /// Where the blob lives on disk; `None` disables persistence
    store_path: Option<PathBuf>,
}

impl CoordinateCache {
    /// Creates a cache persisted under the XDG cache directory
    /// (`~/.cache/otokonum/coordinates.json` on Linux).
    ///
    /// Falls back to a memory-only cache when no cache directory can be
    /// determined (e.g. no home directory).
    pub fn persistent() -> Self {
        match ProjectDirs::from("", "", "otokonum") {
            Some(project_dirs) => Self::with_path(project_dirs.cache_dir().join(STORE_FILE)),
            None => {
                log::warn!("no cache directory available; coordinates will not persist");
                Self::in_memory()
            }
        }
    }

    /// Creates a cache persisted at a specific file path
    ///
    /// Useful for testing or when a custom storage location is needed.
    /// Existing entries at that path are loaded immediately; an unreadable
    /// or corrupt blob is treated as an empty cache.
    pub fn with_path(store_path: PathBuf) -> Self {
        let entries = load_entries(&store_path);
        Self {
            entries: Mutex::new(entries),
            store_path: Some(store_path),
        }
    }

    /// Creates a cache with no backing storage
    pub fn in_memory() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store_path: None,
        }
    }

    /// Looks up a coordinate by its composed cache key
    pub fn get(&self, key: &CacheKey) -> Option<Coordinate> {
        self.entries().get(key.as_str()).copied()
    }

    /// Inserts or overwrites an entry, then rewrites the entire blob on disk
    ///
    /// A persistence failure is logged and swallowed; the in-memory entry is
    /// kept either way.
    pub fn insert(&self, key: &CacheKey, coordinate: Coordinate) {
        let snapshot = {
            let mut entries = self.entries();
            entries.insert(key.as_str().to_owned(), coordinate);
            entries.clone()
        };
        self.persist(&snapshot);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Coordinate>> {
        // A panic while holding the lock leaves the map intact; keep serving it.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, snapshot: &HashMap<String, Coordinate>) {
        let Some(path) = &self.store_path else {
            return;
        };
        if let Err(err) = write_entries(path, snapshot) {
            log::warn!(
                "failed to persist coordinate cache to {}: {err}",
                path.display()
            );
        }
    }
}

/// Reads the persisted blob, treating any failure as an empty cache
fn load_entries(path: &Path) -> HashMap<String, Coordinate> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "failed to read coordinate cache from {}: {err}",
                    path.display()
                );
            }
            return HashMap::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!(
                "discarding unreadable coordinate cache at {}: {err}",
                path.display()
            );
            HashMap::new()
        }
    }
}

/// Serializes and writes the full entry map
fn write_entries(path: &Path, entries: &HashMap<String, Coordinate>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (CoordinateCache, TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(STORE_FILE);
        let cache = CoordinateCache::with_path(path.clone());
        (cache, temp_dir, path)
    }

    fn kadikoy_key() -> CacheKey {
        CacheKey::from_parts("İstanbul", "Kadıköy", "Fenerbahçe")
    }

    fn kadikoy_coordinate() -> Coordinate {
        Coordinate {
            latitude: 40.9819,
            longitude: 29.0365,
        }
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _temp_dir, _path) = create_test_cache();

        assert!(cache.get(&kadikoy_key()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_then_get_returns_coordinate() {
        let (cache, _temp_dir, _path) = create_test_cache();

        cache.insert(&kadikoy_key(), kadikoy_coordinate());

        assert_eq!(cache.get(&kadikoy_key()), Some(kadikoy_coordinate()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_writes_flat_json_blob() {
        let (cache, _temp_dir, path) = create_test_cache();

        cache.insert(&kadikoy_key(), kadikoy_coordinate());

        let content = fs::read_to_string(&path).expect("Should read blob");
        assert!(content.contains("fenerbahçe|kadıköy|istanbul"));
        assert!(content.contains("latitude"));
        assert!(content.contains("longitude"));

        // The blob is a flat key→coordinate object, nothing more.
        let parsed: HashMap<String, Coordinate> =
            serde_json::from_str(&content).expect("Blob should parse as flat map");
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_entries_survive_reload_from_same_path() {
        let (cache, _temp_dir, path) = create_test_cache();
        cache.insert(&kadikoy_key(), kadikoy_coordinate());

        let reloaded = CoordinateCache::with_path(path);

        assert_eq!(reloaded.get(&kadikoy_key()), Some(kadikoy_coordinate()));
    }

    #[test]
    fn test_corrupt_blob_is_treated_as_empty_cache() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(STORE_FILE);
        fs::write(&path, "{not valid json").expect("Should write corrupt blob");

        let cache = CoordinateCache::with_path(path.clone());

        assert!(cache.is_empty());

        // The next insert replaces the corrupt blob with a valid one.
        cache.insert(&kadikoy_key(), kadikoy_coordinate());
        let content = fs::read_to_string(&path).expect("Should read blob");
        let parsed: HashMap<String, Coordinate> =
            serde_json::from_str(&content).expect("Rewritten blob should parse");
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_insert_overwrites_existing_entry() {
        let (cache, _temp_dir, _path) = create_test_cache();
        let updated = Coordinate {
            latitude: 41.0,
            longitude: 29.1,
        };

        cache.insert(&kadikoy_key(), kadikoy_coordinate());
        cache.insert(&kadikoy_key(), updated);

        assert_eq!(cache.get(&kadikoy_key()), Some(updated));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_creates_missing_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("cache").join(STORE_FILE);
        let cache = CoordinateCache::with_path(path.clone());

        cache.insert(&kadikoy_key(), kadikoy_coordinate());

        assert!(path.exists(), "Blob should exist under created directories");
    }

    #[test]
    fn test_in_memory_cache_never_touches_disk() {
        let cache = CoordinateCache::in_memory();

        cache.insert(&kadikoy_key(), kadikoy_coordinate());

        assert_eq!(cache.get(&kadikoy_key()), Some(kadikoy_coordinate()));
        assert!(cache.store_path.is_none());
    }
}
