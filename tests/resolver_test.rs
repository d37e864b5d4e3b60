use chrono::{TimeZone, Utc};
use studyplan_lib::resources::{ActivityType, CompletionRecord, MediaType, Resource};
use studyplan_lib::skills::resolver::resolve_skill;
use studyplan_lib::skills::Skill;

fn skill(id: &str) -> Skill {
    Skill {
        id: id.to_string(),
        title: format!("Skill {}", id),
        description: String::new(),
    }
}

fn resource(id: &str) -> Resource {
    Resource {
        id: id.to_string(),
        title: id.to_string(),
        media_type: MediaType::Text,
        language: "fr".to_string(),
        has_transcript: true,
        has_audio_or_video: false,
        external_video_ref: None,
    }
}

fn completion(day: u32, resource_id: &str, skill_id: &str) -> CompletionRecord {
    CompletionRecord {
        completed_at: Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap(),
        activity_type: ActivityType::Reading,
        resource_id: Some(resource_id.to_string()),
        skill_id: Some(skill_id.to_string()),
        minutes_spent: 10,
    }
}

#[test]
fn test_prefers_skill_used_with_same_resource() {
    let skills = vec![skill("food"), skill("travel"), skill("past")];
    let history = vec![
        completion(1, "r1", "travel"),
        completion(5, "r2", "past"),
    ];
    let resolved = resolve_skill(Some(&resource("r1")), &history, &skills).unwrap();
    assert_eq!(resolved.id, "travel");
}

#[test]
fn test_falls_back_to_most_recent_skill() {
    let skills = vec![skill("food"), skill("travel"), skill("past")];
    let history = vec![
        completion(1, "r2", "travel"),
        completion(5, "r3", "past"),
    ];
    let resolved = resolve_skill(Some(&resource("r1")), &history, &skills).unwrap();
    assert_eq!(resolved.id, "past");
}

#[test]
fn test_falls_back_to_first_skill() {
    let skills = vec![skill("food"), skill("travel")];
    assert_eq!(resolve_skill(None, &[], &skills).unwrap().id, "food");
}

#[test]
fn test_unknown_skill_ids_are_skipped() {
    let skills = vec![skill("food"), skill("travel")];
    let history = vec![
        completion(1, "r1", "travel"),
        completion(5, "r1", "deleted"),
    ];
    let resolved = resolve_skill(Some(&resource("r1")), &history, &skills).unwrap();
    assert_eq!(resolved.id, "travel");
}

#[test]
fn test_no_skills_gives_none() {
    let history = vec![completion(1, "r1", "travel")];
    assert!(resolve_skill(Some(&resource("r1")), &history, &[]).is_none());
}
