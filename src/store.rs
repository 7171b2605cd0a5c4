//! Key-value storage backing every persisted piece of Workfolio state.
//!
//! The store is a flat map from string keys to string values. `FileStore`
//! keeps the whole map in a single JSON object on disk and rewrites it on every
//! change; `MemoryStore` keeps it in process and is what the tests run against.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::stats::DEFAULT_WEEKLY_GOAL;

pub const TASKS_KEY: &str = "workfolio_tasks";
pub const TASK_STATS_KEY: &str = "workfolio_task_stats";
pub const WEEKLY_GOAL_KEY: &str = "workfolio_weekly_goal";
pub const SALARY_PER_HOUR_KEY: &str = "workfolio_salary_per_hour";
pub const SALARY_CHANGES_KEY: &str = "workfolio_salary_changes";
pub const APPRAISALS_KEY: &str = "workfolio_appraisals";
pub const APPRAISAL_HISTORY_KEY: &str = "workfolio_appraisal_history";
pub const PAYMENT_STATUS_KEY: &str = "workfolio_payment_status";
pub const PAYMENT_HISTORY_KEY: &str = "workfolio_payment_history";
pub const REVIEW_SUBMISSIONS_KEY: &str = "workfolio_review_submissions";
pub const FACULTY_CACHE_KEY: &str = "workfolio_faculty_list_cache";
pub const FACULTY_CACHE_UPDATED_KEY: &str = "workfolio_faculty_list_last_updated";

/// Synchronous string-keyed storage.
///
/// Reads never fail: an unreadable entry is simply absent. Writes report
/// failures so callers can decide whether to surface them.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-process store with no persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store persisted as one JSON object file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file is missing or unreadable.
    pub fn open(path: &Path) -> Self {
        let entries = if path.exists() {
            let mut buf = String::new();
            match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
                Ok(_) => match serde_json::from_str(&buf) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(path = %path.display(), "Error parsing store, starting fresh: {e}");
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), "Error reading store, starting fresh: {e}");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "opened store");

        FileStore {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole map using temp file + rename.
    fn save(&self) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(&self.entries)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// Saved weekly goal in hours, or the default.
pub fn weekly_goal(store: &impl KeyValueStore) -> f64 {
    read_json::<f64>(store, WEEKLY_GOAL_KEY)
        .filter(|goal| goal.is_finite() && *goal > 0.0)
        .unwrap_or(DEFAULT_WEEKLY_GOAL)
}

pub fn set_weekly_goal(store: &mut impl KeyValueStore, goal: f64) -> Result<()> {
    if !goal.is_finite() || goal <= 0.0 {
        return Err(Error::InvalidAmount(format!("weekly goal must be positive, got {goal}")));
    }
    write_json(store, WEEKLY_GOAL_KEY, &goal)
}

/// Read and decode a JSON entry. Absent and malformed entries both yield `None`.
pub fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, "ignoring malformed entry: {e}");
            None
        }
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn write_json<T: Serialize + ?Sized>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}
