use std::collections::HashMap;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use studyplan_lib::config::SchedulerConfig;
use studyplan_lib::error::{ErrorKind, PlanError};
use studyplan_lib::plan::builder::{build_plan, generate_plan, PlanInputs};
use studyplan_lib::plan::{daily_plan, plan_date, NoPlanReason, PlanOutcome};
use studyplan_lib::resources::{ActivityCategory, ActivityType, CompletionRecord, MediaType, Resource};
use studyplan_lib::skills::Skill;
use studyplan_lib::sources::{InMemorySource, StudyDataSource, UserPreferences};
use studyplan_lib::state::app::AppState;
use studyplan_lib::vocab::VocabularyProgress;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn resource(id: &str, transcript: bool, audio: bool) -> Resource {
    Resource {
        id: id.to_string(),
        title: format!("Resource {}", id),
        media_type: if audio { MediaType::Audio } else { MediaType::Text },
        language: "es".to_string(),
        has_transcript: transcript,
        has_audio_or_video: audio,
        external_video_ref: None,
    }
}

fn skills() -> Vec<Skill> {
    vec![Skill {
        id: "food".to_string(),
        title: "Ordering food".to_string(),
        description: String::new(),
    }]
}

fn due_words(n: usize) -> Vec<VocabularyProgress> {
    (0..n)
        .map(|i| {
            let mut p = VocabularyProgress::new(format!("w{:02}", i), "u1".to_string());
            p.mastery_score = 0.4;
            p.next_review_at = Some(Utc.with_ymd_and_hms(2024, 6, 8, 9, 0, 0).unwrap());
            p
        })
        .collect()
}

fn used(id: &str, days_ago: i64, activity_type: ActivityType) -> CompletionRecord {
    let date = today() - Duration::days(days_ago);
    CompletionRecord {
        completed_at: Utc.from_utc_datetime(&date.and_hms_opt(19, 0, 0).unwrap()),
        activity_type,
        resource_id: Some(id.to_string()),
        skill_id: Some("food".to_string()),
        minutes_spent: 10,
    }
}

fn full_source() -> InMemorySource {
    let mut links = HashMap::new();
    links.insert("B".to_string(), (0..6).map(|i| format!("w{:02}", i)).collect());

    InMemorySource::new()
        .with_preferences(30)
        .with_catalog(vec![resource("A", true, true), resource("B", true, false)])
        .with_skills(skills())
        .with_progress(due_words(8))
        .with_resource_vocabulary(links)
        .with_completions(vec![used("A", 1, ActivityType::Listening)])
}

#[tokio::test]
async fn test_full_plan_from_source() {
    let source = full_source();
    let config = SchedulerConfig::default();
    let mut rng = StdRng::seed_from_u64(5);

    let outcome = generate_plan(&source, today(), &config, &mut rng).await.unwrap();
    let PlanOutcome::Full(skeleton) = outcome else {
        panic!("expected a full plan");
    };

    let primary = skeleton.primary_resource.as_ref().unwrap();
    assert_eq!(primary.resource.id, "B");
    let review = skeleton.review.as_ref().unwrap();
    assert!(review.is_contextual);
    assert_eq!(review.resource_id.as_deref(), Some("B"));
    assert_eq!(skeleton.skill.as_ref().map(|s| s.id.as_str()), Some("food"));

    assert_eq!(skeleton.activities[0].activity_type, ActivityType::VocabularyReview);
    assert_eq!(skeleton.activities[1].activity_type, ActivityType::Reading);
    assert!(skeleton.total_minutes <= 30);
    assert_eq!(
        skeleton.total_minutes,
        skeleton.activities.iter().map(|a| a.estimated_minutes).sum::<u32>()
    );
}

#[tokio::test]
async fn test_missing_preferences_gives_no_plan() {
    let source = InMemorySource::new()
        .with_catalog(vec![resource("A", true, false)])
        .with_skills(skills());
    let state = AppState::new(4);
    let mut rng = StdRng::seed_from_u64(1);

    let plan = daily_plan(&state, &source, today(), &SchedulerConfig::default(), &mut rng)
        .await
        .unwrap();
    assert!(plan.is_none());
    assert_eq!(state.metrics.no_plan_count(), 1);
    assert_eq!(state.cached_plan_count(), 0);
}

#[tokio::test]
async fn test_unavailable_source_is_generation_failure() {
    let source = full_source();
    source.set_unavailable(true);
    let state = AppState::new(4);
    let mut rng = StdRng::seed_from_u64(1);

    let err = daily_plan(&state, &source, today(), &SchedulerConfig::default(), &mut rng)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DataSource);
    assert_eq!(state.metrics.generation_failure_count(), 1);
    assert!(state.cached_plan(today()).is_none());
}

#[tokio::test]
async fn test_vocab_only_when_every_resource_was_used_yesterday() {
    let source = InMemorySource::new()
        .with_preferences(20)
        .with_catalog(vec![resource("A", true, false)])
        .with_skills(skills())
        .with_progress(due_words(10))
        .with_completions(vec![used("A", 1, ActivityType::Reading)]);
    let mut rng = StdRng::seed_from_u64(9);

    let outcome = generate_plan(&source, today(), &SchedulerConfig::default(), &mut rng)
        .await
        .unwrap();
    let PlanOutcome::VocabOnly(skeleton) = outcome else {
        panic!("expected a vocab-only plan");
    };
    let types: Vec<ActivityType> = skeleton.activities.iter().map(|a| a.activity_type).collect();
    assert_eq!(types, vec![ActivityType::VocabularyReview, ActivityType::VocabularyGame]);
    assert!(skeleton.primary_resource.is_none());
}

#[tokio::test]
async fn test_nothing_to_schedule() {
    let source = InMemorySource::new()
        .with_preferences(20)
        .with_skills(skills())
        .with_progress(due_words(2));
    let mut rng = StdRng::seed_from_u64(9);

    let outcome = generate_plan(&source, today(), &SchedulerConfig::default(), &mut rng)
        .await
        .unwrap();
    assert_eq!(outcome, PlanOutcome::NoPlan(NoPlanReason::NothingToSchedule));
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let source = full_source();
    let state = AppState::new(4);
    let config = SchedulerConfig::default();
    let mut rng = StdRng::seed_from_u64(2);

    let first = daily_plan(&state, &source, today(), &config, &mut rng)
        .await
        .unwrap()
        .unwrap();
    // A source failure no longer matters once the plan is cached
    source.set_unavailable(true);
    let second = daily_plan(&state, &source, today(), &config, &mut rng)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(state.metrics.cache_hit_count(), 1);
    assert_eq!(state.metrics.full_plan_count(), 1);
}

#[test]
fn test_build_plan_is_pure_for_a_seed() {
    let inputs = PlanInputs {
        preferences: Some(UserPreferences {
            preferred_session_minutes: 40,
        }),
        due_vocabulary: due_words(6),
        catalog: vec![
            resource("A", true, true),
            resource("B", true, true),
            resource("C", false, true),
        ],
        skills: skills(),
        ..PlanInputs::default()
    };
    let config = SchedulerConfig::default();

    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        build_plan(today(), &inputs, &config, &mut rng)
    };
    assert_eq!(run(17), run(17));
}

#[test]
fn test_yesterday_types_are_avoided() {
    let inputs = PlanInputs {
        preferences: Some(UserPreferences {
            preferred_session_minutes: 30,
        }),
        catalog: vec![resource("A", true, true)],
        recent_completions: vec![
            used("Z", 1, ActivityType::Reading),
            used("Z", 1, ActivityType::Translation),
            used("Z", 1, ActivityType::Cloze),
        ],
        ..PlanInputs::default()
    };
    let config = SchedulerConfig::default();

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = build_plan(today(), &inputs, &config, &mut rng);
        let skeleton = outcome.skeleton().unwrap();
        for activity in &skeleton.activities {
            assert!(!matches!(
                activity.activity_type,
                ActivityType::Reading | ActivityType::Translation | ActivityType::Cloze
            ));
        }
        assert!(skeleton
            .activities
            .iter()
            .any(|a| a.activity_type.category() == ActivityCategory::Input));
    }
}

/// A source whose calls never complete.
struct StalledSource;

impl StudyDataSource for StalledSource {
    async fn user_preferences(&self) -> Result<Option<UserPreferences>, PlanError> {
        std::future::pending().await
    }

    async fn due_vocabulary(&self, _as_of: NaiveDate) -> Result<Vec<VocabularyProgress>, PlanError> {
        std::future::pending().await
    }

    async fn vocabulary_counts_by_resource(&self) -> Result<HashMap<String, usize>, PlanError> {
        std::future::pending().await
    }

    async fn resource_vocabulary(&self) -> Result<HashMap<String, Vec<String>>, PlanError> {
        std::future::pending().await
    }

    async fn recent_completions(&self, _since: NaiveDate) -> Result<Vec<CompletionRecord>, PlanError> {
        std::future::pending().await
    }

    async fn resource_catalog(&self) -> Result<Vec<Resource>, PlanError> {
        std::future::pending().await
    }

    async fn skills(&self) -> Result<Vec<Skill>, PlanError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_stalled_source_times_out_without_a_plan() {
    let mut config = SchedulerConfig::default();
    config.generation.gather_timeout_secs = 0;
    let state = AppState::new(4);
    let mut rng = StdRng::seed_from_u64(4);

    let err = daily_plan(&state, &StalledSource, today(), &config, &mut rng)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Timeout);
    assert_eq!(state.metrics.generation_failure_count(), 1);
    assert_eq!(state.metrics.full_plan_count(), 0);
    assert!(state.cached_plan(today()).is_none());
}

#[test]
fn test_evening_completion_west_of_utc_counts_as_yesterday() {
    // 20:30 on June 9 at UTC-8 is stored as 04:30 UTC on June 10;
    // the plan made the following evening is for June 11 on the same clock.
    let completed_at = Utc.with_ymd_and_hms(2024, 6, 10, 4, 30, 0).unwrap();
    let next_evening = completed_at + Duration::hours(24);
    let day = plan_date(next_evening);

    let history = vec![CompletionRecord {
        completed_at,
        activity_type: ActivityType::Reading,
        resource_id: Some("A".to_string()),
        skill_id: None,
        minutes_spent: 10,
    }];
    assert_eq!(day - history[0].date(), Duration::days(1));

    let inputs = PlanInputs {
        preferences: Some(UserPreferences {
            preferred_session_minutes: 30,
        }),
        catalog: vec![resource("A", true, false)],
        recent_completions: history,
        ..PlanInputs::default()
    };
    let mut rng = StdRng::seed_from_u64(8);
    let outcome = build_plan(day, &inputs, &SchedulerConfig::default(), &mut rng);
    assert_eq!(outcome, PlanOutcome::NoPlan(NoPlanReason::NothingToSchedule));
}
