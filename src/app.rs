use crate::config::Config;
use crate::domain::due::due_input_value;
use crate::domain::{build_rows, TaskError, TaskId, TaskRow, UiMode};
use crate::store::{StoreError, TaskStore};
use anyhow::Result;
use tracing::info;

/// What an open input form will create or change on submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    Task,
    Subtask { parent: TaskId },
    DueDate { task: TaskId },
}

/// Input form state (replaces blocking prompts)
#[derive(Debug, Clone)]
pub struct InputFormState {
    pub target: FormTarget,
    pub text: String,
}

/// One-line feedback shown under the task list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct AppState {
    pub store: TaskStore,
    pub config: Config,
    pub selected_index: usize,
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub status: Option<StatusMessage>,
}

impl AppState {
    pub fn new(store: TaskStore, config: Config) -> Self {
        Self {
            store,
            config,
            selected_index: 0,
            ui_mode: UiMode::Normal,
            input_form: None,
            status: None,
        }
    }

    /// Rows of the active task list, recomputed from the store
    pub fn rows(&self) -> Vec<TaskRow> {
        build_rows(
            self.store.tasks(),
            self.store.now(),
            &self.config.view_options(),
        )
    }

    /// Get the currently selected row
    pub fn get_selected_row(&self) -> Option<TaskRow> {
        self.rows().into_iter().nth(self.selected_index)
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.get_selected_row().map(|row| row.id)
    }

    /// Move selection up
    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Move selection down
    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.rows().len() {
            self.selected_index += 1;
        }
    }

    /// Keep the selection inside the visible rows
    fn clamp_selection(&mut self) {
        let count = self.rows().len();
        if count == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }

    fn select_id(&mut self, id: TaskId) {
        if let Some(idx) = self.rows().iter().position(|row| row.id == id) {
            self.selected_index = idx;
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Turn a store result into user feedback
    fn report<T>(&mut self, result: Result<T, StoreError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(StoreError::Task(e)) => {
                self.set_error(e.to_string());
                None
            }
            Err(StoreError::Save(e)) => {
                self.set_error(format!("Could not save tasks: {:#}", e));
                None
            }
        }
    }

    /// Start or stop the selected task's timer
    pub fn toggle_timer(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.store.toggle_timer(id);
            self.report(result);
        }
    }

    /// Mark the selected task or subtask finished
    pub fn finish_selected(&mut self) {
        if let Some(row) = self.get_selected_row() {
            let result = self.store.finish_task(row.id);
            if self.report(result).is_some() {
                self.set_info(format!("Finished \"{}\"", row.name));
            }
            self.clamp_selection();
        }
    }

    /// Delete the selected task (with its subtasks) or subtask
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.store.delete_task(id);
            if let Some(removed) = self.report(result) {
                self.set_info(format!("Deleted \"{}\"", removed.name));
            }
            self.clamp_selection();
        }
    }

    fn open_form(&mut self, target: FormTarget, mode: UiMode, text: String) {
        self.input_form = Some(InputFormState { target, text });
        self.ui_mode = mode;
    }

    /// Start adding a new task (opens input form)
    pub fn start_add_task(&mut self) {
        self.open_form(FormTarget::Task, UiMode::AddingTask, String::new());
    }

    /// Start adding a subtask to the selected task, or to the selected subtask's parent
    pub fn start_add_subtask(&mut self) {
        let parent = self
            .selected_id()
            .and_then(|id| self.store.top_level_of(id));

        match parent {
            Some(parent) => self.open_form(
                FormTarget::Subtask { parent },
                UiMode::AddingSubtask,
                String::new(),
            ),
            None => self.set_error("Select a task first"),
        }
    }

    /// Start editing the selected task's due date, prefilled with the current one
    pub fn start_set_due_date(&mut self) {
        let Some(id) = self.selected_id() else {
            self.set_error("Select a task first");
            return;
        };

        if !self.store.is_top_level(id) {
            self.set_error(TaskError::NotTopLevel(id).to_string());
            return;
        }

        let current = self
            .store
            .get(id)
            .and_then(|task| task.due_date)
            .map(due_input_value)
            .unwrap_or_default();
        self.open_form(FormTarget::DueDate { task: id }, UiMode::SettingDueDate, current);
    }

    /// Add character to the input form
    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.input_form {
            form.text.push(c);
        }
    }

    /// Backspace in the input form
    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.input_form {
            form.text.pop();
        }
    }

    /// Submit the input form. An invalid due date keeps the form open.
    pub fn submit_input_form(&mut self) {
        let Some(form) = self.input_form.take() else {
            return;
        };

        match form.target {
            FormTarget::Task => {
                let result = self.store.add_task(&form.text);
                if let Some(Some(id)) = self.report(result) {
                    self.select_id(id);
                }
            }
            FormTarget::Subtask { parent } => {
                let result = self.store.add_subtask(parent, &form.text);
                if let Some(Some(id)) = self.report(result) {
                    self.select_id(id);
                }
            }
            FormTarget::DueDate { task } => {
                if form.text.trim().is_empty() {
                    let result = self.store.clear_due_date(task);
                    self.report(result);
                } else {
                    match self.store.set_due_date(task, &form.text) {
                        Ok(_) => {}
                        Err(StoreError::Task(e @ TaskError::InvalidDueDate(_))) => {
                            self.set_error(format!("{} (try 2025-05-08T15:00)", e));
                            self.input_form = Some(form);
                            return;
                        }
                        Err(e) => {
                            self.report::<()>(Err(e));
                        }
                    }
                }
            }
        }

        self.ui_mode = UiMode::Normal;
    }

    /// Cancel input form
    pub fn cancel_input_form(&mut self) {
        self.input_form = None;
        self.ui_mode = UiMode::Normal;
    }

    /// Advance running timers (called once per tick)
    pub fn tick(&mut self) {
        let result = self.store.tick();
        self.report(result);
    }

    /// Flush final state on exit
    pub fn shutdown(&mut self) -> Result<()> {
        self.store.shutdown(self.config.stop_timers_on_exit)?;
        info!("shutdown complete");
        Ok(())
    }
}
