pub mod mastery;
pub mod review;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Mastery score at or above which a word counts as known (phase permitting).
pub const KNOWN_MASTERY_THRESHOLD: f64 = 0.8;

/// Ordered learning stage of a vocabulary item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LearningPhase {
    #[default]
    Recognition,
    Production,
    Application,
}

impl LearningPhase {
    pub fn promoted(self) -> Self {
        match self {
            Self::Recognition => Self::Production,
            Self::Production | Self::Application => Self::Application,
        }
    }

    pub fn demoted(self) -> Self {
        match self {
            Self::Recognition | Self::Production => Self::Recognition,
            Self::Application => Self::Production,
        }
    }
}

/// Mastery record for one (user, word) pair.
/// Only `mastery::record_attempt` produces new versions of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyProgress {
    pub word_id: String,
    pub user_id: String,
    pub mastery_score: f64,
    pub total_attempts: u32,
    pub correct_attempts: u32,
    pub phase: LearningPhase,
    /// Consecutive successes since the last failure or phase change
    #[serde(default)]
    pub correct_streak: u32,
    /// Consecutive failures since the last success or phase change
    #[serde(default)]
    pub failure_streak: u32,
    #[serde(default)]
    pub interval_days: f64,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
}

impl VocabularyProgress {
    /// Zero-state record used the first time a word is practiced.
    pub fn new(word_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        VocabularyProgress {
            word_id: word_id.into(),
            user_id: user_id.into(),
            mastery_score: 0.0,
            total_attempts: 0,
            correct_attempts: 0,
            phase: LearningPhase::Recognition,
            correct_streak: 0,
            failure_streak: 0,
            interval_days: 0.0,
            last_attempt_at: None,
            next_review_at: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.mastery_score >= KNOWN_MASTERY_THRESHOLD && self.phase >= LearningPhase::Production
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.correct_attempts as f64 / self.total_attempts as f64
        }
    }

    pub fn next_review_date(&self) -> Option<NaiveDate> {
        self.next_review_at.map(|at| at.date_naive())
    }

    /// Due means: scheduled on or before `today` and not yet known.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.is_known()
            && self
                .next_review_date()
                .map(|date| date <= today)
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    MultipleChoice,
    Typed,
    Spoken,
    Matching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextType {
    Isolated,
    Sentence,
    Conversation,
    Passage,
}

/// One practice event for a word. Consumed once by `mastery::record_attempt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyAttempt {
    pub word_id: String,
    pub user_id: String,
    pub was_correct: bool,
    /// Strictly positive; harder activities and contexts weigh more
    pub difficulty_weight: f64,
    /// Activity type name, validated against `ActivityType`
    pub activity: String,
    pub input_mode: InputMode,
    pub context_type: ContextType,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub response_time_ms: u64,
    /// Self-reported confidence in [0, 1]
    #[serde(default)]
    pub user_confidence: Option<f64>,
    pub attempted_at: DateTime<Utc>,
}

/// Links a progress record to where the practice happened. Analytics only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningContext {
    pub word_id: String,
    pub user_id: String,
    pub activity: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub skill_id: Option<String>,
    pub was_correct: bool,
    pub recorded_at: DateTime<Utc>,
}

impl LearningContext {
    /// Only attempts tied to a resource or skill produce a context.
    pub fn from_attempt(attempt: &VocabularyAttempt) -> Option<Self> {
        if attempt.resource_id.is_none() && attempt.skill_id.is_none() {
            return None;
        }
        Some(LearningContext {
            word_id: attempt.word_id.clone(),
            user_id: attempt.user_id.clone(),
            activity: attempt.activity.clone(),
            resource_id: attempt.resource_id.clone(),
            skill_id: attempt.skill_id.clone(),
            was_correct: attempt.was_correct,
            recorded_at: attempt.attempted_at,
        })
    }
}
