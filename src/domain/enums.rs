/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    AddingTask,
    AddingSubtask,
    SettingDueDate,
}

impl UiMode {
    /// Whether an input form is open
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}
