use crate::domain::due::DEFAULT_DUE_SOON_HOURS;
use crate::domain::ViewOptions;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Upper bound for the due-soon window (one year)
pub const MAX_DUE_SOON_HOURS: i64 = 24 * 365;

/// User settings stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_due_soon_hours")]
    pub due_soon_hours: i64,
    /// Stop running timers when the app exits
    #[serde(default = "default_true")]
    pub stop_timers_on_exit: bool,
    #[serde(default = "default_true")]
    pub show_averages: bool,
}

fn default_due_soon_hours() -> i64 {
    DEFAULT_DUE_SOON_HOURS
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            due_soon_hours: DEFAULT_DUE_SOON_HOURS,
            stop_timers_on_exit: true,
            show_averages: true,
        }
    }
}

impl Config {
    /// Due-soon window in hours, clamped to `0..=MAX_DUE_SOON_HOURS`
    pub fn view_options(&self) -> ViewOptions {
        let hours = self.due_soon_hours.clamp(0, MAX_DUE_SOON_HOURS);
        let due_soon_window = chrono::Duration::try_hours(hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_DUE_SOON_HOURS));
        ViewOptions {
            due_soon_window,
            show_averages: self.show_averages,
        }
    }
}

/// Load config, falling back to defaults when the file is missing or malformed
pub fn load_config<P: AsRef<Path>>(path: P) -> Config {
    let path = path.as_ref();

    let content = match crate::persistence::read_file(path) {
        Ok(Some(content)) => content,
        Ok(None) => return Config::default(),
        Err(e) => {
            warn!("{:#}; using default config", e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("invalid config {}: {}; using defaults", path.display(), e);
            Config::default()
        }
    }
}

/// Save config to config.json
pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::persistence::atomic_write(path, &json)?;
    Ok(())
}
