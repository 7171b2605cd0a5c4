//! Single-slot cache of the statistics for one version of the task list.

use crate::stats::TaskStatistics;

#[derive(Debug, Clone)]
struct Entry {
    version: u64,
    stats: TaskStatistics,
}

/// Holds the last computed statistics together with the list version they describe.
///
/// A lookup only hits when the caller's version matches, so a stale entry can
/// never be served even if a refresh is skipped.
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    slot: Option<Entry>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, version: u64, stats: TaskStatistics) {
        self.slot = Some(Entry { version, stats });
    }

    pub fn get(&self, version: u64) -> Option<&TaskStatistics> {
        self.slot
            .as_ref()
            .filter(|entry| entry.version == version)
            .map(|entry| &entry.stats)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::compute_stats;
    use crate::task::Task;

    #[test]
    fn test_hit_only_on_matching_version() {
        let mut cache = StatsCache::new();
        assert!(cache.get(0).is_none());

        let stats = compute_stats(&[Task::new("Math", "Grading", 2.0, "2024-01-01")]);
        cache.store(3, stats.clone());
        assert_eq!(cache.get(3), Some(&stats));
        assert!(cache.get(4).is_none());

        cache.invalidate();
        assert!(cache.get(3).is_none());
    }
}
