use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::resources::{ActivityType, CompletionRecord};
use crate::vocab::LearningContext;

/// Activity types completed on `date`.
pub fn activity_types_on(completions: &[CompletionRecord], date: NaiveDate) -> HashSet<ActivityType> {
    completions
        .iter()
        .filter(|c| c.date() == date)
        .map(|c| c.activity_type)
        .collect()
}

pub fn yesterday_activity_types(
    completions: &[CompletionRecord],
    today: NaiveDate,
) -> HashSet<ActivityType> {
    activity_types_on(completions, today - Duration::days(1))
}

/// Completions per activity type with a date in `(today - window_days, today]`.
pub fn activity_type_counts(
    completions: &[CompletionRecord],
    today: NaiveDate,
    window_days: i64,
) -> HashMap<ActivityType, usize> {
    let start = today - Duration::days(window_days);
    let mut counts: HashMap<ActivityType, usize> = HashMap::new();

    for completion in completions {
        let date = completion.date();
        if date > start && date <= today {
            *counts.entry(completion.activity_type).or_insert(0) += 1;
        }
    }

    counts
}

/// Distinct words per resource, combining the resource's own word list with
/// words the user met there in recorded learning contexts.
pub fn vocabulary_counts(
    resource_vocabulary: &HashMap<String, Vec<String>>,
    contexts: &[LearningContext],
) -> HashMap<String, usize> {
    let mut words: HashMap<&str, BTreeSet<&str>> = HashMap::new();

    for (resource_id, word_ids) in resource_vocabulary {
        words
            .entry(resource_id.as_str())
            .or_default()
            .extend(word_ids.iter().map(String::as_str));
    }

    for context in contexts {
        if let Some(resource_id) = context.resource_id.as_deref() {
            words
                .entry(resource_id)
                .or_default()
                .insert(context.word_id.as_str());
        }
    }

    words
        .into_iter()
        .map(|(resource_id, set)| (resource_id.to_string(), set.len()))
        .collect()
}
