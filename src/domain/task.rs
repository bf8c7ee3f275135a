use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a task or subtask
pub type TaskId = Uuid;

/// A task or subtask.
///
/// Subtasks share this type but never own subtasks or a due date; the store
/// enforces that. Field names follow the persisted document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Generated for documents written before ids existed
    #[serde(default = "Uuid::new_v4")]
    pub id: TaskId,
    pub name: String,
    /// Accumulated seconds
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub running: bool,
    /// Set exactly while running (stored as epoch milliseconds)
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub subtasks: Vec<Task>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            time: 0,
            running: false,
            last_start: None,
            finished: false,
            subtasks: Vec::new(),
            due_date: None,
        }
    }

    /// Whole seconds since the timer was started (0 when stopped or clock went back)
    pub fn pending_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.last_start {
            Some(started) => {
                let millis = now.signed_duration_since(started).num_milliseconds();
                (millis.max(0) / 1000) as u64
            }
            None => 0,
        }
    }

    /// Start the timer. Finished tasks stay stopped.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if !self.running && !self.finished {
            self.running = true;
            self.last_start = Some(now);
        }
    }

    /// Stop the timer and credit the elapsed whole seconds; returns the seconds added
    pub fn stop(&mut self, now: DateTime<Utc>) -> u64 {
        if !self.running {
            return 0;
        }
        let added = self.pending_seconds(now);
        self.time += added;
        self.running = false;
        self.last_start = None;
        added
    }

    /// Toggle between running and stopped
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.running {
            self.stop(now);
        } else {
            self.start(now);
        }
    }

    /// Mark as finished, flushing a running timer first
    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.stop(now);
        self.finished = true;
        self.running = false;
        self.last_start = None;
    }

    /// Advance a running timer by one tick. Does not touch subtasks.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.running && self.last_start.is_some() {
            self.time += 1;
            self.last_start = Some(now);
            true
        } else {
            false
        }
    }

    /// Finished and total subtask counts, if there are subtasks
    pub fn subtask_progress(&self) -> Option<(usize, usize)> {
        if self.subtasks.is_empty() {
            return None;
        }
        let done = self.subtasks.iter().filter(|st| st.finished).count();
        Some((done, self.subtasks.len()))
    }

    /// This task followed by its subtasks
    pub fn with_subtasks(&self) -> impl Iterator<Item = &Task> {
        std::iter::once(self).chain(self.subtasks.iter())
    }

    /// Restore the timer invariants on data loaded from disk.
    /// Returns true if anything had to change.
    pub fn repair(&mut self) -> bool {
        let mut repaired = false;

        if self.finished && (self.running || self.last_start.is_some()) {
            self.running = false;
            self.last_start = None;
            repaired = true;
        }
        if self.running != self.last_start.is_some() {
            self.running = false;
            self.last_start = None;
            repaired = true;
        }
        for subtask in &mut self.subtasks {
            repaired |= subtask.repair();
        }

        repaired
    }
}
