//! Faculty directory lookups.
//!
//! The directory is a bundled JSON array of faculty records. It is read-only;
//! the last good copy is kept in the key-value store so lookups still work
//! when the bundled file cannot be read.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::{read_json, write_json, KeyValueStore, FACULTY_CACHE_KEY, FACULTY_CACHE_UPDATED_KEY};

/// Display name used when a faculty id has no record.
pub const UNKNOWN_FACULTY: &str = "Unknown";

/// A faculty member as listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: u64,
    pub name: String,
    /// Hours worked in the current pay period.
    #[serde(default)]
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any other fields the directory carries.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Read-only source of faculty records.
pub trait FacultyDirectory {
    fn fetch(&self) -> Result<Vec<Faculty>>;
}

/// Directory backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileDirectory {
    path: PathBuf,
}

impl JsonFileDirectory {
    pub fn new(path: &Path) -> Self {
        JsonFileDirectory { path: path.to_path_buf() }
    }
}

impl FacultyDirectory for JsonFileDirectory {
    fn fetch(&self) -> Result<Vec<Faculty>> {
        let data = fs::read_to_string(&self.path)?;
        let list: Vec<Faculty> = serde_json::from_str(&data)?;
        debug!(path = %self.path.display(), count = list.len(), "fetched faculty directory");
        Ok(list)
    }
}

/// Fetch the directory, refreshing the stored copy, or fall back to the stored copy on failure.
pub fn load_faculty(directory: &impl FacultyDirectory, store: &mut impl KeyValueStore) -> Vec<Faculty> {
    match directory.fetch() {
        Ok(list) => {
            let cached = write_json(store, FACULTY_CACHE_KEY, &list)
                .and_then(|_| store.set(FACULTY_CACHE_UPDATED_KEY, Utc::now().to_rfc3339()));
            if let Err(e) = cached {
                warn!("failed to cache faculty directory: {e}");
            }
            list
        }
        Err(e) => {
            warn!("error loading faculty directory, using cached copy: {e}");
            read_json(&*store, FACULTY_CACHE_KEY).unwrap_or_default()
        }
    }
}

pub fn find_faculty(list: &[Faculty], id: u64) -> Option<&Faculty> {
    list.iter().find(|f| f.id == id)
}

/// Name for `id`, or `UNKNOWN_FACULTY` when it is not listed.
pub fn faculty_name(list: &[Faculty], id: u64) -> &str {
    find_faculty(list, id).map(|f| f.name.as_str()).unwrap_or(UNKNOWN_FACULTY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::MemoryStore;

    const DIRECTORY: &str = r#"[
        {"id": 1, "name": "Dr. Asha Rao", "hours": 32, "department": "Mathematics", "room": "B-204"},
        {"id": 2, "name": "Prof. Ken Ito", "hours": 18.5}
    ]"#;

    struct Unreachable;

    impl FacultyDirectory for Unreachable {
        fn fetch(&self) -> Result<Vec<Faculty>> {
            Err(Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "faculty.json")))
        }
    }

    fn write_directory() -> (tempfile::TempDir, JsonFileDirectory) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faculty.json");
        fs::write(&path, DIRECTORY).unwrap();
        let directory = JsonFileDirectory::new(&path);
        (dir, directory)
    }

    #[test]
    fn test_fetch_keeps_unknown_fields() {
        let (_dir, directory) = write_directory();
        let list = directory.fetch().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].department.as_deref(), Some("Mathematics"));
        assert_eq!(list[0].extra.get("room"), Some(&serde_json::json!("B-204")));
        assert_eq!(list[1].hours, 18.5);
    }

    #[test]
    fn test_load_caches_and_falls_back() {
        let (_dir, directory) = write_directory();
        let mut store = MemoryStore::new();

        let fresh = load_faculty(&directory, &mut store);
        assert_eq!(fresh.len(), 2);
        assert!(store.get(FACULTY_CACHE_UPDATED_KEY).is_some());

        let fallback = load_faculty(&Unreachable, &mut store);
        assert_eq!(fallback, fresh);
    }

    #[test]
    fn test_load_without_cache_is_empty() {
        let mut store = MemoryStore::new();
        assert!(load_faculty(&Unreachable, &mut store).is_empty());
    }

    #[test]
    fn test_name_lookup_falls_back_to_unknown() {
        let list: Vec<Faculty> = serde_json::from_str(DIRECTORY).unwrap();
        assert_eq!(faculty_name(&list, 2), "Prof. Ken Ito");
        assert_eq!(faculty_name(&list, 9), UNKNOWN_FACULTY);
    }
}
