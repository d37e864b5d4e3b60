pub mod selector;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every kind of activity a plan can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivityType {
    VocabularyReview,
    Reading,
    Listening,
    VideoWatching,
    Shadowing,
    Translation,
    Cloze,
    Writing,
    VocabularyGame,
}

/// Cognitive-load category; plans run review, then input, then output, then closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActivityCategory {
    Review,
    Input,
    Output,
    Closer,
}

impl ActivityType {
    pub const ALL: [ActivityType; 9] = [
        ActivityType::VocabularyReview,
        ActivityType::Reading,
        ActivityType::Listening,
        ActivityType::VideoWatching,
        ActivityType::Shadowing,
        ActivityType::Translation,
        ActivityType::Cloze,
        ActivityType::Writing,
        ActivityType::VocabularyGame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VocabularyReview => "VocabularyReview",
            Self::Reading => "Reading",
            Self::Listening => "Listening",
            Self::VideoWatching => "VideoWatching",
            Self::Shadowing => "Shadowing",
            Self::Translation => "Translation",
            Self::Cloze => "Cloze",
            Self::Writing => "Writing",
            Self::VocabularyGame => "VocabularyGame",
        }
    }

    /// Lenient lookup: ignores case, spaces, dashes and underscores.
    /// Returns None for names that are not activity types.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().to_lowercase() == normalized)
    }

    pub fn category(&self) -> ActivityCategory {
        match self {
            Self::VocabularyReview => ActivityCategory::Review,
            Self::Reading | Self::Listening | Self::VideoWatching => ActivityCategory::Input,
            Self::Shadowing | Self::Translation | Self::Cloze | Self::Writing => {
                ActivityCategory::Output
            }
            Self::VocabularyGame => ActivityCategory::Closer,
        }
    }

    /// Route name the UI layer uses to open the activity.
    pub fn route(&self) -> &'static str {
        match self {
            Self::VocabularyReview => "vocabulary-quiz",
            Self::Reading => "reading",
            Self::Listening => "listening",
            Self::VideoWatching => "video-watching",
            Self::Shadowing => "shadowing",
            Self::Translation => "translation",
            Self::Cloze => "cloze",
            Self::Writing => "writing",
            Self::VocabularyGame => "vocabulary-matching",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::VocabularyReview => "Vocabulary review",
            Self::Reading => "Reading",
            Self::Listening => "Listening",
            Self::VideoWatching => "Watch a video",
            Self::Shadowing => "Shadowing",
            Self::Translation => "Translation",
            Self::Cloze => "Fill in the blanks",
            Self::Writing => "Writing",
            Self::VocabularyGame => "Vocabulary game",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Text,
    Audio,
    Video,
    #[serde(other)]
    Other,
}

/// One entry of the learning resource catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub has_transcript: bool,
    #[serde(default)]
    pub has_audio_or_video: bool,
    #[serde(default)]
    pub external_video_ref: Option<String>,
}

impl Resource {
    /// Input activities this resource can back, in a fixed order.
    pub fn supported_input_activities(&self) -> Vec<ActivityType> {
        let mut supported = Vec::new();
        if self.has_transcript {
            supported.push(ActivityType::Reading);
        }
        if self.has_audio_or_video {
            supported.push(ActivityType::Listening);
            if self.video_id().is_some() {
                supported.push(ActivityType::VideoWatching);
            }
        }
        supported
    }

    /// Output activities this resource can back. Shadowing needs audio.
    pub fn supported_output_activities(&self) -> Vec<ActivityType> {
        let mut supported = vec![
            ActivityType::Translation,
            ActivityType::Cloze,
            ActivityType::Writing,
        ];
        if self.has_audio_or_video {
            supported.push(ActivityType::Shadowing);
        }
        supported
    }

    pub fn video_id(&self) -> Option<String> {
        self.external_video_ref.as_deref().and_then(resolve_video_id)
    }
}

const VIDEO_ID_LEN: usize = 11;

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract a video id from a YouTube URL (`watch?v=`, `youtu.be/`, `/embed/`,
/// `/shorts/`) or accept a bare 11-character id.
pub fn resolve_video_id(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if is_video_id(reference) {
        return Some(reference.to_string());
    }

    let without_scheme = reference
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(reference);
    let (host, path) = without_scheme
        .split_once('/')
        .unwrap_or((without_scheme, ""));
    let host = host.trim_start_matches("www.").trim_start_matches("m.");

    let candidate = match host {
        "youtu.be" => path.split(['?', '&', '#', '/']).next(),
        "youtube.com" | "youtube-nocookie.com" => {
            if let Some(query) = path.strip_prefix("watch?") {
                query
                    .split(['&', '#'])
                    .find_map(|pair| pair.strip_prefix("v="))
            } else {
                path.strip_prefix("embed/")
                    .or_else(|| path.strip_prefix("shorts/"))
                    .or_else(|| path.strip_prefix("v/"))
                    .and_then(|rest| rest.split(['?', '&', '#', '/']).next())
            }
        }
        _ => None,
    }?;

    is_video_id(candidate).then(|| candidate.to_string())
}

/// A finished activity as reported by the activity history collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub completed_at: DateTime<Utc>,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub minutes_spent: u32,
}

impl CompletionRecord {
    pub fn date(&self) -> NaiveDate {
        self.completed_at.date_naive()
    }
}
