//! Disk cache for provider responses
//!
//! Provides a `CacheManager` that stores small serializable values as JSON
//! envelopes and large list bodies as raw files. Published ranking lists never
//! change, so entries carry no expiry.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Result of reading from cache
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
}

/// Manages reading and writing cached data to disk
///
/// Files live in an XDG-compliant cache directory (`~/.cache/rankwatch/` on
/// Linux) unless a directory is given explicitly.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "rankwatch")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory this manager reads from and writes to
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a JSON cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes a value to the cache as JSON
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> io::Result<()> {
        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_file(&self.cache_path(key), json.as_bytes())
    }

    /// Reads a value from the cache
    ///
    /// Returns `None` if the entry doesn't exist or cannot be parsed.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
        })
    }

    /// Writes an opaque text body under `name`
    pub fn write_raw(&self, name: &str, body: &str) -> io::Result<()> {
        self.write_file(&self.cache_dir.join(name), body.as_bytes())
    }

    /// Reads an opaque text body, `None` if absent or unreadable
    pub fn read_raw(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.cache_dir.join(name)).ok()
    }

    /// Writes through a temporary file so readers never see a partial body
    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.ensure_dir()?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)
    }
}
