pub mod builder;
pub mod converter;
pub mod sequencer;
pub mod store;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::PlanError;
use crate::resources::selector::SelectedResource;
use crate::resources::ActivityType;
use crate::skills::Skill;
use crate::sources::StudyDataSource;
use crate::state::app::AppState;
use crate::vocab::review::ReviewBlock;

pub use converter::{DailyPlan, PlanItem, PlanSource};

/// One scheduled activity. Lower priority runs earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedActivity {
    pub activity_type: ActivityType,
    pub resource_id: Option<String>,
    pub skill_id: Option<String>,
    pub estimated_minutes: u32,
    pub priority: u32,
    pub rationale: String,
}

/// Output of the plan builder and sole input of the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSkeleton {
    pub activities: Vec<PlannedActivity>,
    pub primary_resource: Option<SelectedResource>,
    pub skill: Option<Skill>,
    pub review: Option<ReviewBlock>,
    pub total_minutes: u32,
    pub selection_reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoPlanReason {
    /// No user preferences exist; defaults are never guessed
    MissingPreferences,
    /// Neither a primary resource nor a review block could be scheduled
    NothingToSchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanOutcome {
    Full(PlanSkeleton),
    VocabOnly(PlanSkeleton),
    NoPlan(NoPlanReason),
}

impl PlanOutcome {
    pub fn skeleton(&self) -> Option<&PlanSkeleton> {
        match self {
            Self::Full(skeleton) | Self::VocabOnly(skeleton) => Some(skeleton),
            Self::NoPlan(_) => None,
        }
    }

    pub fn into_skeleton(self) -> Option<PlanSkeleton> {
        match self {
            Self::Full(skeleton) | Self::VocabOnly(skeleton) => Some(skeleton),
            Self::NoPlan(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Full(_) => "full",
            Self::VocabOnly(_) => "vocab_only",
            Self::NoPlan(_) => "no_plan",
        }
    }
}

/// Calendar day a plan generated at `now` is for.
/// Completion and review dates are UTC days, so plan days are too.
pub fn plan_date(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Today's plan for the UI: served from the cache when still fresh,
/// otherwise generated from `source` and cached.
///
/// `Ok(None)` means no deterministic plan exists; the caller decides on a fallback.
pub async fn daily_plan<S, R>(
    state: &AppState,
    source: &S,
    today: NaiveDate,
    config: &SchedulerConfig,
    rng: &mut R,
) -> Result<Option<DailyPlan>, PlanError>
where
    S: StudyDataSource,
    R: Rng + ?Sized,
{
    let now = Utc::now();
    if let Some(plan) = state.cached_plan(today) {
        if !plan.is_expired_at(now) {
            state.metrics.record_cache_hit();
            return Ok(Some(plan));
        }
        state.invalidate_plan(today);
    }

    let outcome = match builder::generate_plan(source, today, config, rng).await {
        Ok(outcome) => outcome,
        Err(e) => {
            state.metrics.record_generation_failure();
            tracing::error!(error = %e, date = %today, "Plan generation failed");
            return Err(e);
        }
    };
    state.metrics.record_outcome(&outcome);

    let Some(skeleton) = outcome.into_skeleton() else {
        return Ok(None);
    };

    let plan = converter::to_daily_plan(&skeleton, today, now, config.generation.plan_ttl_hours);
    state.store_plan(plan.clone());
    Ok(Some(plan))
}
