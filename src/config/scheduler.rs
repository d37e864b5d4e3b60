use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;

use crate::error::PlanError;
use crate::resources::ActivityType;

/// Review block thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Fewer due items than this produce no review block
    pub min_due_items: usize,
    pub max_items: usize,
    pub items_per_minute: f64,
    /// Due words a single resource must share before the block becomes contextual
    pub min_contextual_shared: usize,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        ReviewSettings {
            min_due_items: 5,
            max_items: 20,
            items_per_minute: 3.5,
            min_contextual_shared: 5,
        }
    }
}

/// Additive scoring weights for primary resource selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub long_unused_days: i64,
    pub long_unused_bonus: f64,
    /// Applies to resources unused for 2 up to `long_unused_days - 1` days
    pub recent_unused_bonus: f64,
    pub per_day_bonus: f64,
    pub contextual_bonus: f64,
    pub vocabulary_log_weight: f64,
    pub media_bonus: f64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        SelectionSettings {
            long_unused_days: 5,
            long_unused_bonus: 100.0,
            recent_unused_bonus: 50.0,
            per_day_bonus: 10.0,
            contextual_bonus: 75.0,
            vocabulary_log_weight: 10.0,
            media_bonus: 20.0,
        }
    }
}

/// Default allotment per activity type, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityMinutes {
    pub reading: u32,
    pub listening: u32,
    pub video_watching: u32,
    pub shadowing: u32,
    pub translation: u32,
    pub cloze: u32,
    pub writing: u32,
    pub vocabulary_game: u32,
}

impl Default for ActivityMinutes {
    fn default() -> Self {
        ActivityMinutes {
            reading: 10,
            listening: 10,
            video_watching: 12,
            shadowing: 10,
            translation: 10,
            cloze: 8,
            writing: 12,
            vocabulary_game: 5,
        }
    }
}

impl ActivityMinutes {
    /// Vocabulary review has no fixed default; its length comes from the review block.
    pub fn for_activity(&self, activity: ActivityType) -> Option<u32> {
        match activity {
            ActivityType::VocabularyReview => None,
            ActivityType::Reading => Some(self.reading),
            ActivityType::Listening => Some(self.listening),
            ActivityType::VideoWatching => Some(self.video_watching),
            ActivityType::Shadowing => Some(self.shadowing),
            ActivityType::Translation => Some(self.translation),
            ActivityType::Cloze => Some(self.cloze),
            ActivityType::Writing => Some(self.writing),
            ActivityType::VocabularyGame => Some(self.vocabulary_game),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencingSettings {
    pub review_min_minutes: u32,
    pub input_min_minutes: u32,
    pub output_min_minutes: u32,
    pub closer_min_minutes: u32,
    /// Smallest input allotment accepted when trimming input to leave room for output
    pub min_reserved_input_minutes: u32,
    /// Trailing window used for least-recently-used activity counts
    pub history_window_days: i64,
    pub activity_minutes: ActivityMinutes,
}

impl Default for SequencingSettings {
    fn default() -> Self {
        SequencingSettings {
            review_min_minutes: 5,
            input_min_minutes: 8,
            output_min_minutes: 8,
            closer_min_minutes: 5,
            min_reserved_input_minutes: 5,
            history_window_days: 14,
            activity_minutes: ActivityMinutes::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub gather_timeout_secs: u64,
    pub plan_ttl_hours: i64,
    pub plan_cache_capacity: usize,
    pub data_dir: Option<PathBuf>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            gather_timeout_secs: 10,
            plan_ttl_hours: 24,
            plan_cache_capacity: 30,
            data_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub review: ReviewSettings,
    pub selection: SelectionSettings,
    pub sequencing: SequencingSettings,
    pub generation: GenerationSettings,
}

impl SchedulerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, PlanError> {
        Ok(toml::from_str::<SchedulerConfig>(content)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, PlanError> {
        let content = fs::read_to_string(path)
            .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", path)))?;
        Self::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("path: {:?}", path)))
    }

    /// Directory holding the JSON store and the persisted plan.
    pub fn data_dir(&self) -> PathBuf {
        self.generation
            .data_dir
            .clone()
            .unwrap_or_else(super::data_dir)
    }
}

fn get_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("STUDYPLAN_CONFIG") {
        return PathBuf::from(path);
    }
    let candidate = super::data_dir().join("studyplan.toml");
    if candidate.exists() {
        return candidate;
    }
    PathBuf::from("studyplan.toml")
}

fn load_scheduler_config_internal() -> SchedulerConfig {
    let config_path = get_config_path();

    if !config_path.exists() {
        tracing::info!(path = ?config_path, "No scheduler config found, using defaults");
        return SchedulerConfig::default();
    }

    match SchedulerConfig::load_from(&config_path) {
        Ok(config) => {
            tracing::info!(path = ?config_path, "Loaded scheduler config");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load scheduler config, using defaults");
            SchedulerConfig::default()
        }
    }
}

lazy_static! {
    static ref SCHEDULER_CONFIG: SchedulerConfig = load_scheduler_config_internal();
}

/// Get the cached scheduler configuration (loaded once on first use)
pub fn get_scheduler_config() -> &'static SchedulerConfig {
    &SCHEDULER_CONFIG
}
