use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resources::ActivityType;
use super::{PlanSkeleton, PlannedActivity};

/// Which generator produced a plan. Both must emit the same item shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanSource {
    Deterministic,
    Generated,
}

/// UI-routable plan entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    /// Derived from date, activity type and ids; identical inputs give identical ids
    pub id: String,
    pub activity_type: ActivityType,
    pub route: String,
    pub title: String,
    pub estimated_minutes: u32,
    pub priority: u32,
    pub resource_id: Option<String>,
    pub resource_title: Option<String>,
    pub skill_id: Option<String>,
    /// Review items only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub due_count: Option<usize>,
    /// Review items only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_contextual: Option<bool>,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub items: Vec<PlanItem>,
    pub total_minutes: u32,
    pub selection_reason: String,
    pub source: PlanSource,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl DailyPlan {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Stable item id: first 16 hex digits of SHA-256 over `date|activity|resource|skill`.
pub fn plan_item_id(
    date: NaiveDate,
    activity_type: ActivityType,
    resource_id: Option<&str>,
    skill_id: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(activity_type.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(resource_id.unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(skill_id.unwrap_or("").as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

fn convert_activity(skeleton: &PlanSkeleton, date: NaiveDate, activity: &PlannedActivity) -> PlanItem {
    let resource_title = skeleton
        .primary_resource
        .as_ref()
        .filter(|s| activity.resource_id.as_deref() == Some(s.resource.id.as_str()))
        .map(|s| s.resource.title.clone());

    let review = skeleton
        .review
        .as_ref()
        .filter(|_| activity.activity_type == ActivityType::VocabularyReview);

    PlanItem {
        id: plan_item_id(
            date,
            activity.activity_type,
            activity.resource_id.as_deref(),
            activity.skill_id.as_deref(),
        ),
        activity_type: activity.activity_type,
        route: activity.activity_type.route().to_string(),
        title: activity.activity_type.title().to_string(),
        estimated_minutes: activity.estimated_minutes,
        priority: activity.priority,
        resource_id: activity.resource_id.clone(),
        resource_title,
        skill_id: activity.skill_id.clone(),
        due_count: review.map(|r| r.count),
        is_contextual: review.map(|r| r.is_contextual),
        rationale: activity.rationale.clone(),
    }
}

/// Map a skeleton to plan items ordered by priority.
pub fn convert(skeleton: &PlanSkeleton, date: NaiveDate) -> Vec<PlanItem> {
    let mut items: Vec<PlanItem> = skeleton
        .activities
        .iter()
        .map(|a| convert_activity(skeleton, date, a))
        .collect();
    items.sort_by_key(|item| item.priority);
    items
}

pub fn to_daily_plan(
    skeleton: &PlanSkeleton,
    date: NaiveDate,
    generated_at: DateTime<Utc>,
    ttl_hours: i64,
) -> DailyPlan {
    let items = convert(skeleton, date);
    DailyPlan {
        date,
        total_minutes: items.iter().map(|i| i.estimated_minutes).sum(),
        items,
        selection_reason: skeleton.selection_reason.clone(),
        source: PlanSource::Deterministic,
        generated_at,
        expires_at: generated_at + Duration::hours(ttl_hours),
    }
}
