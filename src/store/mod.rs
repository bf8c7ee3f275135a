pub mod clock;

pub use clock::{Clock, SystemClock};

use crate::domain::{self, NameSummary, Task, TaskError, TaskId};
use crate::persistence::TaskGateway;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors returned by store mutations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Task(#[from] TaskError),

    /// The mutation was applied in memory but could not be persisted
    #[error("failed to save tasks: {0:#}")]
    Save(anyhow::Error),
}

/// Position of a task inside the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    TopLevel(usize),
    Subtask(usize, usize),
}

/// Owns the task collection. Every mutation is persisted immediately and
/// raises the changed flag for the presenter.
pub struct TaskStore {
    tasks: Vec<Task>,
    gateway: TaskGateway,
    clock: Box<dyn Clock>,
    changed: bool,
}

impl TaskStore {
    /// Load the collection through the gateway (empty on any load failure)
    pub fn open(gateway: TaskGateway, clock: impl Clock + 'static) -> Self {
        let tasks = gateway.load();
        info!(count = tasks.len(), "task store opened");
        Self {
            tasks,
            gateway,
            clock: Box::new(clock),
            changed: true,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Unfinished top-level tasks
    pub fn active_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.finished)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Returns whether anything changed since the last call, and clears the flag
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        match self.locate(id)? {
            Location::TopLevel(idx) => self.tasks.get(idx),
            Location::Subtask(parent, idx) => self.tasks.get(parent)?.subtasks.get(idx),
        }
    }

    pub fn is_top_level(&self, id: TaskId) -> bool {
        matches!(self.locate(id), Some(Location::TopLevel(_)))
    }

    /// Id of the top-level task owning `id` (itself when top-level)
    pub fn top_level_of(&self, id: TaskId) -> Option<TaskId> {
        match self.locate(id)? {
            Location::TopLevel(idx) | Location::Subtask(idx, _) => Some(self.tasks[idx].id),
        }
    }

    fn locate(&self, id: TaskId) -> Option<Location> {
        for (idx, task) in self.tasks.iter().enumerate() {
            if task.id == id {
                return Some(Location::TopLevel(idx));
            }
            if let Some(st_idx) = task.subtasks.iter().position(|st| st.id == id) {
                return Some(Location::Subtask(idx, st_idx));
            }
        }
        None
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, TaskError> {
        match self.locate(id).ok_or(TaskError::NotFound(id))? {
            Location::TopLevel(idx) => Ok(&mut self.tasks[idx]),
            Location::Subtask(parent, idx) => Ok(&mut self.tasks[parent].subtasks[idx]),
        }
    }

    fn top_level_mut(&mut self, id: TaskId) -> Result<&mut Task, TaskError> {
        match self.locate(id).ok_or(TaskError::NotFound(id))? {
            Location::TopLevel(idx) => Ok(&mut self.tasks[idx]),
            Location::Subtask(..) => Err(TaskError::NotTopLevel(id)),
        }
    }

    /// Persist the full snapshot and flag a re-render
    fn commit(&mut self) -> Result<(), StoreError> {
        self.changed = true;
        self.gateway.save(&self.tasks).map_err(|e| {
            error!("failed to save tasks: {:#}", e);
            StoreError::Save(e)
        })
    }

    /// Append a top-level task. Blank names are ignored and return `None`.
    pub fn add_task(&mut self, name: &str) -> Result<Option<TaskId>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let task = Task::new(name);
        let id = task.id;
        self.tasks.push(task);
        debug!(%id, name = %name, "added task");

        self.commit()?;
        Ok(Some(id))
    }

    /// Append a subtask to a top-level task. Blank names are ignored.
    pub fn add_subtask(&mut self, parent: TaskId, name: &str) -> Result<Option<TaskId>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let subtask = Task::new(name);
        let id = subtask.id;
        self.top_level_mut(parent)?.subtasks.push(subtask);
        debug!(%id, %parent, name = %name, "added subtask");

        self.commit()?;
        Ok(Some(id))
    }

    /// Start a stopped timer, or stop a running one crediting whole elapsed seconds.
    /// Finished tasks are left alone.
    pub fn toggle_timer(&mut self, id: TaskId) -> Result<(), StoreError> {
        let now = self.clock.now();
        let task = self.task_mut(id)?;
        if task.finished {
            return Ok(());
        }
        task.toggle(now);
        debug!(%id, running = task.running, time = task.time, "toggled timer");

        self.commit()
    }

    /// Finish a task, flushing its running timer. Finishing twice is a no-op.
    pub fn finish_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        let now = self.clock.now();
        let task = self.task_mut(id)?;
        if task.finished {
            return Ok(());
        }
        task.finish(now);
        debug!(%id, time = task.time, "finished task");

        self.commit()
    }

    /// Remove a task (with its subtasks) or a subtask from whichever parent owns it
    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let removed = match self.locate(id).ok_or(TaskError::NotFound(id))? {
            Location::TopLevel(idx) => self.tasks.remove(idx),
            Location::Subtask(parent, idx) => self.tasks[parent].subtasks.remove(idx),
        };
        debug!(%id, name = %removed.name, "deleted task");

        self.commit()?;
        Ok(removed)
    }

    /// Parse `text` and store it as the task's due date. Invalid text leaves
    /// the task unchanged.
    pub fn set_due_date(&mut self, id: TaskId, text: &str) -> Result<DateTime<Utc>, StoreError> {
        let task = self.top_level_mut(id)?;
        let due = domain::parse_due_date(text)?;
        task.due_date = Some(due);
        debug!(%id, due = %domain::format_due_date(due), "set due date");

        self.commit()?;
        Ok(due)
    }

    pub fn clear_due_date(&mut self, id: TaskId) -> Result<(), StoreError> {
        let task = self.top_level_mut(id)?;
        if task.due_date.take().is_none() {
            return Ok(());
        }
        debug!(%id, "cleared due date");

        self.commit()
    }

    /// Advance every running timer by one second. Persists only when
    /// something was running; returns the number of timers advanced.
    pub fn tick(&mut self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let mut updated = 0;

        for task in &mut self.tasks {
            if task.tick(now) {
                updated += 1;
            }
            for subtask in &mut task.subtasks {
                if subtask.tick(now) {
                    updated += 1;
                }
            }
        }

        if updated > 0 {
            self.commit()?;
        }
        Ok(updated)
    }

    /// Stop every running timer, crediting elapsed time
    pub fn stop_all_timers(&mut self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let mut stopped = 0;

        for task in &mut self.tasks {
            if task.running {
                task.stop(now);
                stopped += 1;
            }
            for subtask in task.subtasks.iter_mut().filter(|st| st.running) {
                subtask.stop(now);
                stopped += 1;
            }
        }

        if stopped > 0 {
            debug!(stopped, "stopped all timers");
            self.commit()?;
        }
        Ok(stopped)
    }

    /// Teardown: optionally stop running timers, then flush a final snapshot
    pub fn shutdown(&mut self, stop_timers: bool) -> Result<(), StoreError> {
        if stop_timers {
            self.stop_all_timers()?;
        }
        self.commit()?;
        info!(count = self.tasks.len(), "task store flushed");
        Ok(())
    }

    /// See [`domain::average_finished_time`]
    pub fn average_finished_time(&self, name: &str) -> Option<u64> {
        domain::average_finished_time(&self.tasks, name)
    }

    pub fn finished_summaries(&self) -> Vec<NameSummary> {
        domain::finished_summaries(&self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::clock::ManualClock;
    use super::*;
    use crate::persistence::{KeyValueStore, MemoryStore};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    /// Store over a shared in-memory backend; the backend clone lets tests
    /// inspect what was persisted.
    fn create_test_store() -> (TaskStore, MemoryStore, ManualClock) {
        let backend = MemoryStore::new();
        let clock = ManualClock::new();
        let store = TaskStore::open(TaskGateway::new(backend.clone()), clock.clone());
        (store, backend, clock)
    }

    fn persisted(backend: &MemoryStore) -> Vec<Task> {
        TaskGateway::new(backend.clone()).load()
    }

    /// Backend whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }
    }

    #[test]
    fn test_open_empty() {
        let (mut store, _, _) = create_test_store();
        assert!(store.tasks().is_empty());
        // First render is always due
        assert!(store.take_changed());
        assert!(!store.take_changed());
    }

    #[test]
    fn test_add_task() {
        let (mut store, backend, _) = create_test_store();
        store.take_changed();

        let id = store.add_task("  Write report ").unwrap().unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.name, "Write report");
        assert_eq!(task.time, 0);
        assert!(!task.running);
        assert!(!task.finished);
        assert!(store.take_changed());
        assert_eq!(persisted(&backend), store.tasks().to_vec());
    }

    #[test]
    fn test_add_blank_task_is_ignored() {
        let (mut store, backend, _) = create_test_store();
        store.take_changed();

        assert_eq!(store.add_task("   ").unwrap(), None);
        assert_eq!(store.add_task("").unwrap(), None);
        assert!(store.tasks().is_empty());
        assert!(!store.take_changed());
        assert_eq!(backend.get(crate::persistence::TASKS_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_subtask() {
        let (mut store, backend, _) = create_test_store();
        let parent = store.add_task("Parent").unwrap().unwrap();

        let sub = store.add_subtask(parent, "Child").unwrap().unwrap();
        assert_eq!(store.add_subtask(parent, " ").unwrap(), None);

        assert_eq!(store.get(parent).unwrap().subtasks.len(), 1);
        assert_eq!(store.get(sub).unwrap().name, "Child");
        assert!(!store.is_top_level(sub));
        assert_eq!(store.top_level_of(sub), Some(parent));
        assert_eq!(persisted(&backend)[0].subtasks[0].name, "Child");
    }

    #[test]
    fn test_subtasks_cannot_nest() {
        let (mut store, _, _) = create_test_store();
        let parent = store.add_task("Parent").unwrap().unwrap();
        let sub = store.add_subtask(parent, "Child").unwrap().unwrap();

        let err = store.add_subtask(sub, "Grandchild").unwrap_err();
        assert!(matches!(err, StoreError::Task(TaskError::NotTopLevel(id)) if id == sub));

        let missing = uuid::Uuid::new_v4();
        let err = store.add_subtask(missing, "Orphan").unwrap_err();
        assert!(matches!(err, StoreError::Task(TaskError::NotFound(_))));
    }

    #[test]
    fn test_toggle_timer_credits_whole_seconds() {
        let (mut store, backend, clock) = create_test_store();
        let id = store.add_task("Focus").unwrap().unwrap();

        store.toggle_timer(id).unwrap();
        let task = store.get(id).unwrap();
        assert!(task.running);
        assert_eq!(task.last_start, Some(clock.now()));

        clock.advance(Duration::milliseconds(12_750));
        store.toggle_timer(id).unwrap();

        let task = store.get(id).unwrap();
        assert!(!task.running);
        assert!(task.last_start.is_none());
        assert_eq!(task.time, 12);
        assert_eq!(persisted(&backend)[0].time, 12);

        // Stopped time is not counted again
        clock.advance(Duration::seconds(30));
        store.toggle_timer(id).unwrap();
        store.toggle_timer(id).unwrap();
        assert_eq!(store.get(id).unwrap().time, 12);
    }

    #[test]
    fn test_finish_running_task() {
        let (mut store, _, clock) = create_test_store();
        let id = store.add_task("Focus").unwrap().unwrap();
        store.add_task("Other").unwrap();

        store.toggle_timer(id).unwrap();
        clock.advance(Duration::seconds(8));
        store.finish_task(id).unwrap();

        let task = store.get(id).unwrap();
        assert!(task.finished);
        assert!(!task.running);
        assert!(task.last_start.is_none());
        assert_eq!(task.time, 8);

        let active: Vec<&str> = store.active_tasks().map(|t| t.name.as_str()).collect();
        assert_eq!(active, vec!["Other"]);
    }

    #[test]
    fn test_finish_twice_is_noop() {
        let (mut store, _, _) = create_test_store();
        let id = store.add_task("Focus").unwrap().unwrap();
        store.finish_task(id).unwrap();
        store.take_changed();

        store.finish_task(id).unwrap();
        assert!(store.get(id).unwrap().finished);
        assert!(!store.take_changed());
    }

    #[test]
    fn test_toggle_finished_task_is_noop() {
        let (mut store, _, clock) = create_test_store();
        let id = store.add_task("Focus").unwrap().unwrap();
        store.finish_task(id).unwrap();
        store.take_changed();

        store.toggle_timer(id).unwrap();
        clock.advance(Duration::seconds(1));
        assert_eq!(store.tick().unwrap(), 0);

        let task = store.get(id).unwrap();
        assert!(task.finished);
        assert!(!task.running);
        assert_eq!(task.last_start, None);
        assert_eq!(task.time, 0);
        assert!(!store.take_changed());
    }

    #[test]
    fn test_delete_subtask_finds_its_parent() {
        let (mut store, backend, _) = create_test_store();
        let first = store.add_task("First").unwrap().unwrap();
        let second = store.add_task("Second").unwrap().unwrap();
        store.add_subtask(first, "A").unwrap();
        let b1 = store.add_subtask(second, "B1").unwrap().unwrap();
        let b2 = store.add_subtask(second, "B2").unwrap().unwrap();
        let b3 = store.add_subtask(second, "B3").unwrap().unwrap();

        let removed = store.delete_task(b2).unwrap();
        assert_eq!(removed.name, "B2");

        let remaining: Vec<TaskId> = store.get(second).unwrap().subtasks.iter().map(|t| t.id).collect();
        assert_eq!(remaining, vec![b1, b3]);
        assert_eq!(store.get(first).unwrap().subtasks.len(), 1);
        assert_eq!(persisted(&backend)[1].subtasks.len(), 2);
    }

    #[test]
    fn test_delete_top_level_task() {
        let (mut store, _, _) = create_test_store();
        let first = store.add_task("First").unwrap().unwrap();
        store.add_subtask(first, "Child").unwrap();
        store.add_task("Second").unwrap();

        store.delete_task(first).unwrap();
        let names: Vec<&str> = store.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Second"]);

        let err = store.delete_task(first).unwrap_err();
        assert!(matches!(err, StoreError::Task(TaskError::NotFound(_))));
    }

    #[test]
    fn test_set_due_date_invalid_leaves_task_unchanged() {
        let (mut store, _, _) = create_test_store();
        let id = store.add_task("Ship").unwrap().unwrap();
        store.set_due_date(id, "2025-05-08T15:00:00Z").unwrap();
        let before = store.get(id).unwrap().due_date;
        store.take_changed();

        let err = store.set_due_date(id, "next tuesday").unwrap_err();
        assert!(matches!(err, StoreError::Task(TaskError::InvalidDueDate(_))));
        assert_eq!(store.get(id).unwrap().due_date, before);
        assert!(!store.take_changed());
    }

    #[test]
    fn test_set_due_date_round_trips() {
        let (mut store, backend, _) = create_test_store();
        let id = store.add_task("Ship").unwrap().unwrap();

        let due = store.set_due_date(id, "2025-05-08T15:00").unwrap();
        assert_eq!(store.get(id).unwrap().due_date, Some(due));

        let reparsed = domain::parse_due_date(&domain::format_due_date(due)).unwrap();
        assert_eq!(reparsed, due);
        assert_eq!(persisted(&backend)[0].due_date, Some(due));

        store.clear_due_date(id).unwrap();
        assert_eq!(store.get(id).unwrap().due_date, None);
    }

    #[test]
    fn test_subtasks_have_no_due_date() {
        let (mut store, _, _) = create_test_store();
        let parent = store.add_task("Parent").unwrap().unwrap();
        let sub = store.add_subtask(parent, "Child").unwrap().unwrap();

        let err = store.set_due_date(sub, "2025-05-08").unwrap_err();
        assert!(matches!(err, StoreError::Task(TaskError::NotTopLevel(_))));
        assert_eq!(store.get(sub).unwrap().due_date, None);
    }

    #[test]
    fn test_three_ticks_add_three_seconds() {
        let (mut store, backend, clock) = create_test_store();
        let id = store.add_task("Focus").unwrap().unwrap();
        store.toggle_timer(id).unwrap();

        for _ in 0..3 {
            clock.advance(Duration::seconds(1));
            assert_eq!(store.tick().unwrap(), 1);
        }

        let task = store.get(id).unwrap();
        assert_eq!(task.time, 3);
        assert!(task.running);
        assert_eq!(task.last_start, Some(clock.now()));
        assert_eq!(persisted(&backend)[0].time, 3);

        // Stopping right after a tick adds nothing extra
        store.toggle_timer(id).unwrap();
        assert_eq!(store.get(id).unwrap().time, 3);
    }

    #[test]
    fn test_tick_reaches_subtasks() {
        let (mut store, _, clock) = create_test_store();
        let parent = store.add_task("Parent").unwrap().unwrap();
        let sub = store.add_subtask(parent, "Child").unwrap().unwrap();
        store.toggle_timer(sub).unwrap();

        clock.advance(Duration::seconds(1));
        assert_eq!(store.tick().unwrap(), 1);
        assert_eq!(store.get(sub).unwrap().time, 1);
        assert_eq!(store.get(parent).unwrap().time, 0);
    }

    #[test]
    fn test_idle_tick_skips_persist_and_render() {
        let (mut store, _, _) = create_test_store();
        store.add_task("Idle").unwrap();
        store.take_changed();

        assert_eq!(store.tick().unwrap(), 0);
        assert!(!store.take_changed());
    }

    #[test]
    fn test_shutdown_stops_timers() {
        let (mut store, backend, clock) = create_test_store();
        let parent = store.add_task("Parent").unwrap().unwrap();
        let sub = store.add_subtask(parent, "Child").unwrap().unwrap();
        store.toggle_timer(parent).unwrap();
        store.toggle_timer(sub).unwrap();
        clock.advance(Duration::seconds(4));

        store.shutdown(true).unwrap();

        let saved = persisted(&backend);
        assert!(!saved[0].running);
        assert_eq!(saved[0].time, 4);
        assert!(!saved[0].subtasks[0].running);
        assert_eq!(saved[0].subtasks[0].time, 4);
    }

    #[test]
    fn test_shutdown_can_keep_timers_running() {
        let (mut store, backend, _) = create_test_store();
        let id = store.add_task("Focus").unwrap().unwrap();
        store.toggle_timer(id).unwrap();

        store.shutdown(false).unwrap();
        assert!(persisted(&backend)[0].running);
    }

    #[test]
    fn test_average_finished_time() {
        let (mut store, _, clock) = create_test_store();
        assert_eq!(store.average_finished_time("X"), None);

        for secs in [4, 6] {
            let id = store.add_task("X").unwrap().unwrap();
            store.toggle_timer(id).unwrap();
            clock.advance(Duration::seconds(secs));
            store.finish_task(id).unwrap();
        }

        assert_eq!(store.average_finished_time("X"), Some(5));
        assert_eq!(store.finished_summaries().len(), 1);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let mut store = TaskStore::open(TaskGateway::new(ReadOnlyStore), ManualClock::new());

        let err = store.add_task("Unsaved").unwrap_err();
        assert!(matches!(err, StoreError::Save(_)));
        // The mutation itself stays applied in memory
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_reopen_restores_state() {
        let backend = MemoryStore::new();
        let clock = ManualClock::new();
        let mut store = TaskStore::open(TaskGateway::new(backend.clone()), clock.clone());
        let id = store.add_task("Persisted").unwrap().unwrap();
        store.add_subtask(id, "Child").unwrap();

        let reopened = TaskStore::open(TaskGateway::new(backend), clock);
        assert_eq!(reopened.tasks(), store.tasks());
    }
}
