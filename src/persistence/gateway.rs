use super::kv::KeyValueStore;
use crate::domain::Task;
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Key under which the task collection is stored
pub const TASKS_KEY: &str = "tasks";

/// Loads and saves the whole task collection as one JSON document
pub struct TaskGateway {
    store: Box<dyn KeyValueStore>,
}

impl TaskGateway {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Load tasks, falling back to an empty collection when the document
    /// is missing, unreadable or malformed
    pub fn load(&self) -> Vec<Task> {
        let content = match self.store.get(TASKS_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!("no stored tasks, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!("failed to read stored tasks, starting empty: {:#}", e);
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        let mut tasks: Vec<Task> = match serde_json::from_str(&content) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("stored tasks are not valid, starting empty: {}", e);
                return Vec::new();
            }
        };

        for task in &mut tasks {
            if task.repair() {
                warn!(task = %task.name, "repaired inconsistent timer state");
            }
        }

        debug!(count = tasks.len(), "loaded tasks");
        tasks
    }

    /// Save the full collection
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")?;
        self.store
            .set(TASKS_KEY, &json)
            .context("Failed to store tasks")
    }
}
