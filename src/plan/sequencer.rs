use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SequencingSettings;
use crate::resources::{ActivityType, Resource};
use crate::skills::Skill;
use crate::vocab::review::ReviewBlock;
use super::PlannedActivity;

/// Everything the sequencer needs, already gathered.
#[derive(Debug, Clone, Copy)]
pub struct SequenceRequest<'a> {
    pub resource: Option<&'a Resource>,
    pub skill: Option<&'a Skill>,
    pub review: Option<&'a ReviewBlock>,
    pub session_minutes: u32,
    pub yesterday_types: &'a HashSet<ActivityType>,
    /// Completions per activity type over the trailing history window
    pub recent_type_counts: &'a HashMap<ActivityType, usize>,
}

/// Pick one type from `candidates`: skip yesterday's types when something else
/// is left, prefer the least used, break ties with `rng`.
pub fn choose_activity<R: Rng + ?Sized>(
    candidates: &[ActivityType],
    yesterday_types: &HashSet<ActivityType>,
    recent_type_counts: &HashMap<ActivityType, usize>,
    rng: &mut R,
) -> Option<ActivityType> {
    let fresh: Vec<ActivityType> = candidates
        .iter()
        .copied()
        .filter(|t| !yesterday_types.contains(t))
        .collect();
    let pool = if fresh.is_empty() { candidates.to_vec() } else { fresh };

    let usage = |t: &ActivityType| recent_type_counts.get(t).copied().unwrap_or(0);
    let least = pool.iter().map(usage).min()?;
    let least_used: Vec<ActivityType> = pool.into_iter().filter(|t| usage(t) == least).collect();

    least_used.choose(rng).copied()
}

struct Timeline {
    activities: Vec<PlannedActivity>,
    remaining: u32,
}

impl Timeline {
    fn push(
        &mut self,
        activity_type: ActivityType,
        resource_id: Option<String>,
        skill_id: Option<String>,
        minutes: u32,
        rationale: String,
    ) {
        let minutes = minutes.min(self.remaining);
        if minutes == 0 {
            return;
        }
        self.remaining -= minutes;
        self.activities.push(PlannedActivity {
            activity_type,
            resource_id,
            skill_id,
            estimated_minutes: minutes,
            priority: self.activities.len() as u32 + 1,
            rationale,
        });
    }
}

/// Lay out the session: review, one input activity, one output activity, optional closer.
/// Total minutes never exceed `request.session_minutes`.
pub fn build_sequence<R: Rng + ?Sized>(
    request: &SequenceRequest,
    settings: &SequencingSettings,
    rng: &mut R,
) -> Vec<PlannedActivity> {
    let mut timeline = Timeline {
        activities: Vec::new(),
        remaining: request.session_minutes,
    };
    let skill_id = request.skill.map(|s| s.id.clone());

    // 1. Consolidate before new exposure
    if let Some(block) = request.review.filter(|b| b.count > 0) {
        if timeline.remaining >= settings.review_min_minutes {
            let rationale = match (&block.resource_id, block.is_contextual) {
                (Some(resource_id), true) => format!(
                    "Review {} due words in the context of resource {}",
                    block.count, resource_id
                ),
                _ => format!("Review {} due words", block.count),
            };
            timeline.push(
                ActivityType::VocabularyReview,
                block.resource_id.clone(),
                None,
                block.estimated_minutes,
                rationale,
            );
        }
    }

    if let Some(resource) = request.resource {
        // 2. Receptive input, only in a form the resource supports
        let inputs = resource.supported_input_activities();
        if timeline.remaining >= settings.input_min_minutes && !inputs.is_empty() {
            if let Some(input) =
                choose_activity(&inputs, request.yesterday_types, request.recent_type_counts, rng)
            {
                let minutes = input_allotment(
                    settings.activity_minutes.for_activity(input).unwrap_or(0),
                    timeline.remaining,
                    settings,
                );
                timeline.push(
                    input,
                    Some(resource.id.clone()),
                    skill_id.clone(),
                    minutes,
                    format!("Input first: {} with {}", input.title().to_lowercase(), resource.title),
                );
            }
        } else if inputs.is_empty() {
            tracing::debug!(resource_id = %resource.id, "Resource supports no input activity, skipping");
        }

        // 3. Productive output on the same material
        if timeline.remaining >= settings.output_min_minutes {
            let outputs = resource.supported_output_activities();
            if let Some(output) =
                choose_activity(&outputs, request.yesterday_types, request.recent_type_counts, rng)
            {
                timeline.push(
                    output,
                    Some(resource.id.clone()),
                    skill_id.clone(),
                    settings.activity_minutes.for_activity(output).unwrap_or(0),
                    format!("Then output: {} based on {}", output.title().to_lowercase(), resource.title),
                );
            }
        }
    }

    // 4. Light closer
    if let Some(skill) = request.skill {
        if timeline.remaining >= settings.closer_min_minutes {
            timeline.push(
                ActivityType::VocabularyGame,
                request.resource.map(|r| r.id.clone()),
                Some(skill.id.clone()),
                settings.activity_minutes.vocabulary_game,
                format!("Wrap up with a quick game on {}", skill.title),
            );
        }
    }

    tracing::debug!(
        activities = timeline.activities.len(),
        session_minutes = request.session_minutes,
        unused_minutes = timeline.remaining,
        "Built activity sequence"
    );

    timeline.activities
}

/// Input gets its default length, trimmed so the output step keeps its minimum
/// as long as the input itself keeps `min_reserved_input_minutes`.
fn input_allotment(default_minutes: u32, remaining: u32, settings: &SequencingSettings) -> u32 {
    let minutes = default_minutes.min(remaining);
    let room_for_input = remaining.saturating_sub(settings.output_min_minutes);
    if remaining - minutes < settings.output_min_minutes
        && room_for_input >= settings.min_reserved_input_minutes
    {
        minutes.min(room_for_input)
    } else {
        minutes
    }
}
