//! The task repository: the single owner of the logged task list.
//!
//! Every mutation runs the same sequence: replace the list, notify
//! subscribers, persist the list, then refresh and persist statistics.
//! Mutations take `&mut self`, so the sequence is never interleaved and
//! subscribers always see versions in increasing order.

use tracing::{debug, info, warn};

use crate::cache::StatsCache;
use crate::error::Result;
use crate::stats::{compute_stats, TaskStatistics};
use crate::store::{read_json, write_json, KeyValueStore, TASKS_KEY, TASK_STATS_KEY};
use crate::task::Task;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(Vec<Task>)>;

/// Owns the task list and mirrors it into a key-value store.
pub struct TaskRepository<S: KeyValueStore> {
    store: S,
    tasks: Vec<Task>,
    version: u64,
    cache: StatsCache,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Load the task list from `store`.
    ///
    /// A missing or malformed list starts empty. Persisted statistics are
    /// adopted as the cache only when they describe a list of the same length.
    pub fn initialize(store: S) -> Self {
        let tasks: Vec<Task> = read_json(&store, TASKS_KEY).unwrap_or_default();
        let mut cache = StatsCache::new();
        if let Some(stats) = read_json::<TaskStatistics>(&store, TASK_STATS_KEY) {
            if stats.total_tasks == tasks.len() {
                cache.store(0, stats);
            } else {
                debug!(cached = stats.total_tasks, loaded = tasks.len(), "discarding stale statistics");
            }
        }
        debug!(count = tasks.len(), "loaded tasks");

        TaskRepository {
            store,
            tasks,
            version: 0,
            cache,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Increments once per mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct access for auxiliary keys. Writing the task keys through this bypasses the repository.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Register `handler`. It receives the current list immediately, then a fresh copy after each mutation.
    pub fn subscribe<F>(&mut self, mut handler: F) -> SubscriptionId
    where
        F: FnMut(Vec<Task>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        handler(self.tasks.clone());
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Append `task` without validating it.
    ///
    /// The in-memory list, subscribers and cache advance even when the store
    /// rejects the write; the store error is returned afterwards.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        info!(subject = %task.subject, work_type = %task.work_type, hours = task.hours, "adding task");
        self.tasks.push(task);
        self.version += 1;
        self.notify();

        let persisted = write_json(&mut self.store, TASKS_KEY, &self.tasks);
        let stats = compute_stats(&self.tasks);
        let stats_persisted = write_json(&mut self.store, TASK_STATS_KEY, &stats);
        self.cache.store(self.version, stats);

        persisted.and(stats_persisted).inspect_err(|e| {
            warn!("failed to persist tasks: {e}");
        })
    }

    /// Drop every task and the persisted statistics.
    pub fn clear_tasks(&mut self) -> Result<()> {
        info!(count = self.tasks.len(), "clearing tasks");
        self.tasks.clear();
        self.version += 1;
        self.notify();

        self.cache.invalidate();
        let persisted = write_json(&mut self.store, TASKS_KEY, &self.tasks);
        let removed = self.store.remove(TASK_STATS_KEY);

        persisted.and(removed).inspect_err(|e| {
            warn!("failed to persist cleared tasks: {e}");
        })
    }

    /// Number of tasks whose subject matches exactly.
    pub fn get_task_count_by_subject(&self, subject: &str) -> usize {
        self.tasks.iter().filter(|t| t.subject == subject).count()
    }

    /// Statistics for the current list, from the cache when it matches this version.
    pub fn get_task_stats(&self) -> TaskStatistics {
        if !self.tasks.is_empty() {
            if let Some(stats) = self.cache.get(self.version) {
                debug!(version = self.version, "statistics cache hit");
                return stats.clone();
            }
        }
        debug!(version = self.version, "statistics cache miss");
        compute_stats(&self.tasks)
    }

    fn notify(&mut self) {
        for (_, handler) in self.subscribers.iter_mut() {
            handler(self.tasks.clone());
        }
    }
}
