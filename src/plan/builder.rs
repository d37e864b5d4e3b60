use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::analytics;
use crate::config::SchedulerConfig;
use crate::error::PlanError;
use crate::resources::selector::select_primary_resource;
use crate::resources::{CompletionRecord, Resource};
use crate::skills::resolver::resolve_skill;
use crate::skills::Skill;
use crate::sources::{StudyDataSource, UserPreferences};
use crate::vocab::review::get_due_review;
use crate::vocab::VocabularyProgress;
use super::sequencer::{build_sequence, SequenceRequest};
use super::{NoPlanReason, PlanOutcome, PlanSkeleton};

/// Data fetched from collaborators before any planning happens.
#[derive(Debug, Clone, Default)]
pub struct PlanInputs {
    pub preferences: Option<UserPreferences>,
    pub due_vocabulary: Vec<VocabularyProgress>,
    pub vocabulary_counts: HashMap<String, usize>,
    pub resource_vocabulary: HashMap<String, Vec<String>>,
    pub recent_completions: Vec<CompletionRecord>,
    pub catalog: Vec<Resource>,
    pub skills: Vec<Skill>,
}

/// Fetch every input concurrently. Any failure or a timeout aborts the whole attempt.
pub async fn gather_inputs<S: StudyDataSource>(
    source: &S,
    today: NaiveDate,
    config: &SchedulerConfig,
) -> Result<PlanInputs, PlanError> {
    let since = today - Duration::days(config.sequencing.history_window_days);
    let timeout = std::time::Duration::from_secs(config.generation.gather_timeout_secs);

    let gather = async {
        tokio::try_join!(
            source.user_preferences(),
            source.due_vocabulary(today),
            source.vocabulary_counts_by_resource(),
            source.resource_vocabulary(),
            source.recent_completions(since),
            source.resource_catalog(),
            source.skills(),
        )
    };

    let (
        preferences,
        due_vocabulary,
        vocabulary_counts,
        resource_vocabulary,
        recent_completions,
        catalog,
        skills,
    ) = tokio::time::timeout(timeout, gather)
        .await
        .map_err(|e| PlanError::from(e).with_context(format!("date: {}", today)))?
        .map_err(|e| e.with_context(format!("gathering plan inputs for {}", today)))?;

    Ok(PlanInputs {
        preferences,
        due_vocabulary,
        vocabulary_counts,
        resource_vocabulary,
        recent_completions,
        catalog,
        skills,
    })
}

/// Compose review, resource, skill and sequence into a plan. Pure apart from `rng`.
pub fn build_plan<R: Rng + ?Sized>(
    today: NaiveDate,
    inputs: &PlanInputs,
    config: &SchedulerConfig,
    rng: &mut R,
) -> PlanOutcome {
    let Some(preferences) = inputs.preferences.as_ref() else {
        tracing::info!(date = %today, "No user preferences, not generating a plan");
        return PlanOutcome::NoPlan(NoPlanReason::MissingPreferences);
    };

    let review = get_due_review(
        today,
        &inputs.due_vocabulary,
        &inputs.resource_vocabulary,
        &config.review,
    );

    let selected = select_primary_resource(
        today,
        &inputs.recent_completions,
        &inputs.catalog,
        &inputs.vocabulary_counts,
        review.as_ref().and_then(|r| r.resource_id.as_deref()),
        &config.selection,
        rng,
    );

    if selected.is_none() && review.is_none() {
        tracing::info!(date = %today, "Nothing to schedule: no eligible resource and no review due");
        return PlanOutcome::NoPlan(NoPlanReason::NothingToSchedule);
    }

    let skill = resolve_skill(
        selected.as_ref().map(|s| &s.resource),
        &inputs.recent_completions,
        &inputs.skills,
    );

    let yesterday_types = analytics::yesterday_activity_types(&inputs.recent_completions, today);
    let recent_type_counts = analytics::activity_type_counts(
        &inputs.recent_completions,
        today,
        config.sequencing.history_window_days,
    );

    let request = SequenceRequest {
        resource: selected.as_ref().map(|s| &s.resource),
        skill: skill.as_ref(),
        review: review.as_ref(),
        session_minutes: preferences.preferred_session_minutes,
        yesterday_types: &yesterday_types,
        recent_type_counts: &recent_type_counts,
    };
    let activities = build_sequence(&request, &config.sequencing, rng);

    if activities.is_empty() {
        tracing::info!(
            date = %today,
            session_minutes = preferences.preferred_session_minutes,
            "Session too short for any activity"
        );
        return PlanOutcome::NoPlan(NoPlanReason::NothingToSchedule);
    }

    let total_minutes = activities.iter().map(|a| a.estimated_minutes).sum();
    let selection_reason = match &selected {
        Some(s) => s.rationale.clone(),
        None => "No eligible resource today; vocabulary review only".to_string(),
    };
    let vocab_only = selected.is_none();

    let skeleton = PlanSkeleton {
        activities,
        primary_resource: selected,
        skill,
        review,
        total_minutes,
        selection_reason,
    };

    tracing::info!(
        date = %today,
        activities = skeleton.activities.len(),
        total_minutes = skeleton.total_minutes,
        vocab_only,
        "Built study plan"
    );

    if vocab_only {
        PlanOutcome::VocabOnly(skeleton)
    } else {
        PlanOutcome::Full(skeleton)
    }
}

/// Gather inputs from `source`, then build the plan.
pub async fn generate_plan<S, R>(
    source: &S,
    today: NaiveDate,
    config: &SchedulerConfig,
    rng: &mut R,
) -> Result<PlanOutcome, PlanError>
where
    S: StudyDataSource,
    R: Rng + ?Sized,
{
    let inputs = gather_inputs(source, today, config).await?;
    Ok(build_plan(today, &inputs, config, rng))
}
