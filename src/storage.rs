//! Key-value persistence clients backing the engine's durable state.
//!
//! Reads never fail: a missing or undecodable value is an empty list or an
//! absent blob, not an error. Write failures are logged and swallowed — the
//! engine treats every save as fire and forget.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Fixed key for the past-search history list.
pub const PAST_SEARCHES_KEY: &str = "savedSearchedTermsList";
/// Fixed key for the full category list.
pub const CATEGORIES_KEY: &str = "savedCategoriesList";
/// Fixed key for the serialized cache blob.
pub const LOCAL_DATA_KEY: &str = "localData";

/// Synchronous get/set-by-key persistence primitive.
///
/// The three fixed keys above are the only ones the engine uses. No
/// transactions, no schema versioning beyond what callers encode.
pub trait KvStore: Send + Sync {
    /// Load a string list; missing or undecodable keys yield an empty list.
    fn load_string_list(&self, key: &str) -> Vec<String>;
    /// Persist a string list wholesale.
    fn save_string_list(&self, key: &str, values: &[String]);
    /// Load an opaque blob; missing keys yield `None`.
    fn load_bytes(&self, key: &str) -> Option<Vec<u8>>;
    /// Persist an opaque blob wholesale.
    fn save_bytes(&self, key: &str, bytes: &[u8]);
}

/// File-backed store: one `<key>.json` file per key under a state directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// What: Open a store rooted at `dir`, creating the directory.
    ///
    /// Inputs:
    /// - `dir`: State directory (see `util::state_dir`)
    ///
    /// Output:
    /// - A usable store. Directory creation failure is logged; subsequent
    ///   writes will then fail (and log) individually.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!(path = %dir.display(), error = %e, "[Persist] Failed to create state directory");
        }
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write(&self, path: &Path, contents: &[u8]) {
        match fs::write(path, contents) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), bytes = contents.len(), "[Persist] Value written");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "[Persist] Failed to write value");
            }
        }
    }
}

impl KvStore for FileStore {
    fn load_string_list(&self, key: &str) -> Vec<String> {
        let path = self.path_for(key);
        let Ok(body) = fs::read_to_string(&path) else {
            return Vec::new();
        };
        match serde_json::from_str(&body) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "[Persist] Ignoring undecodable string list");
                Vec::new()
            }
        }
    }

    fn save_string_list(&self, key: &str, values: &[String]) {
        if let Ok(body) = serde_json::to_string(values) {
            self.write(&self.path_for(key), body.as_bytes());
        }
    }

    fn load_bytes(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.path_for(key)).ok()
    }

    fn save_bytes(&self, key: &str, bytes: &[u8]) {
        self.write(&self.path_for(key), bytes);
    }
}

/// In-memory store for tests and `--ephemeral` runs; nothing survives the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, Vec<String>>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Fresh, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn load_string_list(&self, key: &str) -> Vec<String> {
        self.lists
            .lock()
            .map(|g| g.get(key).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn save_string_list(&self, key: &str, values: &[String]) {
        if let Ok(mut g) = self.lists.lock() {
            g.insert(key.to_string(), values.to_vec());
        }
    }

    fn load_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok().and_then(|g| g.get(key).cloned())
    }

    fn save_bytes(&self, key: &str, bytes: &[u8]) {
        if let Ok(mut g) = self.blobs.lock() {
            g.insert(key.to_string(), bytes.to_vec());
        }
    }
}
