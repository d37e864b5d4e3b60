pub mod scheduler;

use std::path::PathBuf;

pub use scheduler::{
    get_scheduler_config, ActivityMinutes, GenerationSettings, ReviewSettings, SchedulerConfig,
    SelectionSettings, SequencingSettings,
};

const APP_DIR: &str = "studyplan";

/// Platform-specific application data directory.
/// `STUDYPLAN_DATA_DIR` wins over everything else.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("STUDYPLAN_DATA_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support");
            dir.push(APP_DIR);
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push(APP_DIR);
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share");
            dir.push(APP_DIR);
            return dir;
        }
    }

    // Fallback
    PathBuf::from(APP_DIR)
}
