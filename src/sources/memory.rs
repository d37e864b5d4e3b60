use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::analytics;
use crate::error::PlanError;
use crate::resources::{CompletionRecord, Resource};
use crate::skills::Skill;
use crate::vocab::{LearningContext, VocabularyProgress};
use super::{ProgressSink, StudyDataSource, UserPreferences};

#[derive(Default)]
struct Inner {
    preferences: Option<UserPreferences>,
    progress: HashMap<(String, String), VocabularyProgress>,
    contexts: Vec<LearningContext>,
    resource_vocabulary: HashMap<String, Vec<String>>,
    completions: Vec<CompletionRecord>,
    catalog: Vec<Resource>,
    skills: Vec<Skill>,
}

/// Collaborator kept entirely in memory. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct InMemorySource {
    inner: Arc<RwLock<Inner>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(self, session_minutes: u32) -> Self {
        self.inner.write().preferences = Some(UserPreferences {
            preferred_session_minutes: session_minutes,
        });
        self
    }

    pub fn with_catalog(self, catalog: Vec<Resource>) -> Self {
        self.inner.write().catalog = catalog;
        self
    }

    pub fn with_skills(self, skills: Vec<Skill>) -> Self {
        self.inner.write().skills = skills;
        self
    }

    pub fn with_progress(self, progress: Vec<VocabularyProgress>) -> Self {
        {
            let mut inner = self.inner.write();
            for p in progress {
                inner
                    .progress
                    .insert((p.user_id.clone(), p.word_id.clone()), p);
            }
        }
        self
    }

    pub fn with_resource_vocabulary(self, links: HashMap<String, Vec<String>>) -> Self {
        self.inner.write().resource_vocabulary = links;
        self
    }

    pub fn with_completions(self, completions: Vec<CompletionRecord>) -> Self {
        self.inner.write().completions = completions;
        self
    }

    /// Make every read fail, as if the backing service were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    pub fn progress_for(&self, user_id: &str, word_id: &str) -> Option<VocabularyProgress> {
        self.inner
            .read()
            .progress
            .get(&(user_id.to_string(), word_id.to_string()))
            .cloned()
    }

    pub fn contexts(&self) -> Vec<LearningContext> {
        self.inner.read().contexts.clone()
    }

    fn check_available(&self, what: &str) -> Result<(), PlanError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(PlanError::data_source("Source unavailable", "in_memory_source")
                .with_context(what.to_string()));
        }
        Ok(())
    }
}

impl StudyDataSource for InMemorySource {
    async fn user_preferences(&self) -> Result<Option<UserPreferences>, PlanError> {
        self.check_available("user_preferences")?;
        Ok(self.inner.read().preferences.clone())
    }

    async fn due_vocabulary(&self, as_of: NaiveDate) -> Result<Vec<VocabularyProgress>, PlanError> {
        self.check_available("due_vocabulary")?;
        let mut due: Vec<VocabularyProgress> = self
            .inner
            .read()
            .progress
            .values()
            .filter(|p| p.is_due(as_of))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.word_id.cmp(&b.word_id));
        Ok(due)
    }

    async fn vocabulary_counts_by_resource(&self) -> Result<HashMap<String, usize>, PlanError> {
        self.check_available("vocabulary_counts_by_resource")?;
        let inner = self.inner.read();
        Ok(analytics::vocabulary_counts(&inner.resource_vocabulary, &inner.contexts))
    }

    async fn resource_vocabulary(&self) -> Result<HashMap<String, Vec<String>>, PlanError> {
        self.check_available("resource_vocabulary")?;
        Ok(self.inner.read().resource_vocabulary.clone())
    }

    async fn recent_completions(&self, since: NaiveDate) -> Result<Vec<CompletionRecord>, PlanError> {
        self.check_available("recent_completions")?;
        Ok(self
            .inner
            .read()
            .completions
            .iter()
            .filter(|c| c.date() >= since)
            .cloned()
            .collect())
    }

    async fn resource_catalog(&self) -> Result<Vec<Resource>, PlanError> {
        self.check_available("resource_catalog")?;
        Ok(self.inner.read().catalog.clone())
    }

    async fn skills(&self) -> Result<Vec<Skill>, PlanError> {
        self.check_available("skills")?;
        Ok(self.inner.read().skills.clone())
    }
}

impl ProgressSink for InMemorySource {
    async fn load_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<VocabularyProgress>, PlanError> {
        self.check_available("load_progress")?;
        Ok(self.progress_for(user_id, word_id))
    }

    async fn save_vocabulary_progress(&self, progress: &VocabularyProgress) -> Result<(), PlanError> {
        self.check_available("save_vocabulary_progress")?;
        self.inner.write().progress.insert(
            (progress.user_id.clone(), progress.word_id.clone()),
            progress.clone(),
        );
        Ok(())
    }

    async fn save_learning_context(&self, context: &LearningContext) -> Result<(), PlanError> {
        self.check_available("save_learning_context")?;
        self.inner.write().contexts.push(context.clone());
        Ok(())
    }
}
