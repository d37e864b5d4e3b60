use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::analytics;
use crate::error::PlanError;
use crate::resources::{CompletionRecord, Resource};
use crate::skills::Skill;
use crate::vocab::{LearningContext, VocabularyProgress};
use super::{ProgressSink, StudyDataSource, UserPreferences};

const PREFERENCES_FILE: &str = "preferences.json";
const CATALOG_FILE: &str = "catalog.json";
const SKILLS_FILE: &str = "skills.json";
const COMPLETIONS_FILE: &str = "completions.json";
const RESOURCE_VOCABULARY_FILE: &str = "resource_vocabulary.json";
const CONTEXTS_FILE: &str = "contexts.jsonl";
const PROGRESS_DIR: &str = "progress";

/// Distinguishes temp files of concurrent progress writers
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-backed collaborator rooted at a data directory.
///
/// Layout: one JSON document per collection, one file per progress record
/// under `progress/`, learning contexts appended to `contexts.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

/// Read and parse a JSON file. A missing file yields None.
async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize record")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn progress_file_name(user_id: &str, word_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(word_id.as_bytes());
    format!("{:x}.json", hasher.finalize())
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        JsonStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    fn progress_path(&self, user_id: &str, word_id: &str) -> PathBuf {
        self.root
            .join(PROGRESS_DIR)
            .join(progress_file_name(user_id, word_id))
    }

    async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, PlanError> {
        Ok(read_json::<Vec<T>>(&self.path(file)).await?.unwrap_or_default())
    }

    /// Every stored progress record. Unreadable files are skipped with a warning.
    pub async fn load_all_progress(&self) -> Result<Vec<VocabularyProgress>, PlanError> {
        let dir = self.root.join(PROGRESS_DIR);
        let mut records = Vec::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
            Err(e) => {
                return Err(PlanError::from(e).with_context(format!("path: {:?}", dir)));
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", dir)))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match read_json::<VocabularyProgress>(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Skipping unreadable progress file");
                }
            }
        }

        records.sort_by(|a, b| a.word_id.cmp(&b.word_id));
        Ok(records)
    }

    /// Every stored learning context. Malformed lines are skipped with a warning.
    pub async fn load_contexts(&self) -> Result<Vec<LearningContext>, PlanError> {
        let path = self.path(CONTEXTS_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PlanError::from(e).with_context(format!("path: {:?}", path))),
        };

        let mut contexts = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LearningContext>(line) {
                Ok(context) => contexts.push(context),
                Err(e) => {
                    tracing::warn!(path = ?path, line = line_no + 1, error = %e, "Skipping malformed learning context");
                }
            }
        }
        Ok(contexts)
    }

    pub async fn save_preferences(&self, preferences: &UserPreferences) -> Result<(), PlanError> {
        Ok(write_json(&self.path(PREFERENCES_FILE), preferences).await?)
    }

    pub async fn save_catalog(&self, catalog: &[Resource]) -> Result<(), PlanError> {
        Ok(write_json(&self.path(CATALOG_FILE), &catalog).await?)
    }

    pub async fn save_skills(&self, skills: &[Skill]) -> Result<(), PlanError> {
        Ok(write_json(&self.path(SKILLS_FILE), &skills).await?)
    }

    pub async fn save_completions(&self, completions: &[CompletionRecord]) -> Result<(), PlanError> {
        Ok(write_json(&self.path(COMPLETIONS_FILE), &completions).await?)
    }

    pub async fn save_resource_vocabulary(
        &self,
        links: &HashMap<String, Vec<String>>,
    ) -> Result<(), PlanError> {
        Ok(write_json(&self.path(RESOURCE_VOCABULARY_FILE), links).await?)
    }
}

impl StudyDataSource for JsonStore {
    async fn user_preferences(&self) -> Result<Option<UserPreferences>, PlanError> {
        Ok(read_json(&self.path(PREFERENCES_FILE)).await?)
    }

    async fn due_vocabulary(&self, as_of: NaiveDate) -> Result<Vec<VocabularyProgress>, PlanError> {
        let all = self.load_all_progress().await?;
        Ok(all.into_iter().filter(|p| p.is_due(as_of)).collect())
    }

    async fn vocabulary_counts_by_resource(&self) -> Result<HashMap<String, usize>, PlanError> {
        let (links, contexts) = tokio::try_join!(self.resource_vocabulary(), self.load_contexts())?;
        Ok(analytics::vocabulary_counts(&links, &contexts))
    }

    async fn resource_vocabulary(&self) -> Result<HashMap<String, Vec<String>>, PlanError> {
        Ok(read_json(&self.path(RESOURCE_VOCABULARY_FILE))
            .await?
            .unwrap_or_default())
    }

    async fn recent_completions(&self, since: NaiveDate) -> Result<Vec<CompletionRecord>, PlanError> {
        let mut completions: Vec<CompletionRecord> = self.read_collection(COMPLETIONS_FILE).await?;
        completions.retain(|c| c.date() >= since);
        completions.sort_by_key(|c| c.completed_at);
        Ok(completions)
    }

    async fn resource_catalog(&self) -> Result<Vec<Resource>, PlanError> {
        self.read_collection(CATALOG_FILE).await
    }

    async fn skills(&self) -> Result<Vec<Skill>, PlanError> {
        self.read_collection(SKILLS_FILE).await
    }
}

impl ProgressSink for JsonStore {
    async fn load_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<VocabularyProgress>, PlanError> {
        Ok(read_json(&self.progress_path(user_id, word_id)).await?)
    }

    async fn save_vocabulary_progress(&self, progress: &VocabularyProgress) -> Result<(), PlanError> {
        // Write to a sibling file and rename so readers never see a half-written record
        let path = self.progress_path(&progress.user_id, &progress.word_id);
        let tmp = path.with_extension(format!(
            "json.{}-{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        write_json(&tmp, progress).await?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", path)))?;
        Ok(())
    }

    async fn save_learning_context(&self, context: &LearningContext) -> Result<(), PlanError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", self.root)))?;

        let mut line = serde_json::to_string(context)?;
        line.push('\n');

        let path = self.path(CONTEXTS_FILE);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", path)))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
