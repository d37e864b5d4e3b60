use crate::resources::{CompletionRecord, Resource};
use super::Skill;

/// Infer the skill context for a session.
///
/// Preference order: the skill most recently practiced with `resource`,
/// then the most recently practiced skill overall, then the first known skill.
/// Completions naming skills that no longer exist are ignored.
/// Returns None only when `skills` is empty.
pub fn resolve_skill(
    resource: Option<&Resource>,
    completion_history: &[CompletionRecord],
    skills: &[Skill],
) -> Option<Skill> {
    if skills.is_empty() {
        return None;
    }

    let find_skill = |id: &str| skills.iter().find(|s| s.id == id);

    // Newest first; the later entry wins among equal timestamps
    let mut history: Vec<&CompletionRecord> = completion_history.iter().collect();
    history.reverse();
    history.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    let most_recent = |same_resource: bool| {
        history
            .iter()
            .filter(|c| {
                !same_resource
                    || match (resource, c.resource_id.as_deref()) {
                        (Some(r), Some(id)) => r.id == id,
                        _ => false,
                    }
            })
            .filter_map(|c| c.skill_id.as_deref())
            .find_map(find_skill)
    };

    if let Some(skill) = most_recent(true) {
        tracing::debug!(skill_id = %skill.id, "Resolved skill from same-resource history");
        return Some(skill.clone());
    }
    if let Some(skill) = most_recent(false) {
        tracing::debug!(skill_id = %skill.id, "Resolved skill from overall history");
        return Some(skill.clone());
    }

    tracing::debug!(skill_id = %skills[0].id, "No skill history, using first available skill");
    skills.first().cloned()
}
