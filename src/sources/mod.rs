//! Collaborator contracts the scheduler reads from and writes to.
//!
//! Planning only reads through [`StudyDataSource`]; practice recording writes
//! through [`ProgressSink`]. Implementations decide where the data lives.

pub mod json_store;
pub mod memory;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::resources::{CompletionRecord, Resource};
use crate::skills::Skill;
use crate::vocab::{LearningContext, VocabularyProgress};

pub use json_store::JsonStore;
pub use memory::InMemorySource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub preferred_session_minutes: u32,
}

/// Read side used while gathering plan inputs. Calls are independent and
/// may run concurrently.
#[allow(async_fn_in_trait)]
pub trait StudyDataSource {
    /// None when the user never saved preferences
    async fn user_preferences(&self) -> Result<Option<UserPreferences>, PlanError>;

    async fn due_vocabulary(&self, as_of: NaiveDate) -> Result<Vec<VocabularyProgress>, PlanError>;

    async fn vocabulary_counts_by_resource(&self) -> Result<HashMap<String, usize>, PlanError>;

    /// Word ids contained in each resource
    async fn resource_vocabulary(&self) -> Result<HashMap<String, Vec<String>>, PlanError>;

    async fn recent_completions(&self, since: NaiveDate) -> Result<Vec<CompletionRecord>, PlanError>;

    async fn resource_catalog(&self) -> Result<Vec<Resource>, PlanError>;

    async fn skills(&self) -> Result<Vec<Skill>, PlanError>;
}

/// Write side used when a practice attempt is recorded.
#[allow(async_fn_in_trait)]
pub trait ProgressSink {
    async fn load_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<VocabularyProgress>, PlanError>;

    /// Single-record upsert
    async fn save_vocabulary_progress(&self, progress: &VocabularyProgress) -> Result<(), PlanError>;

    async fn save_learning_context(&self, context: &LearningContext) -> Result<(), PlanError>;
}
