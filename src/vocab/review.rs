use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ReviewSettings;
use super::VocabularyProgress;

/// Vocabulary review slot of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBlock {
    /// Words to review, in presentation order
    pub word_ids: Vec<String>,
    /// All due words, before capping
    pub due_count: usize,
    pub count: usize,
    /// Resource whose vocabulary dominates the due set, if any
    pub resource_id: Option<String>,
    pub is_contextual: bool,
    /// Due words shared with `resource_id`
    pub shared_count: usize,
    pub estimated_minutes: u32,
}

/// Decide whether a review block is warranted today and build it.
///
/// `resource_vocabulary` maps resource ids to the word ids they contain.
/// Returns None when fewer than `settings.min_due_items` words are due.
pub fn get_due_review(
    today: NaiveDate,
    all_progress: &[VocabularyProgress],
    resource_vocabulary: &HashMap<String, Vec<String>>,
    settings: &ReviewSettings,
) -> Option<ReviewBlock> {
    let mut seen = HashSet::new();
    let mut due: Vec<&VocabularyProgress> = all_progress
        .iter()
        .filter(|p| p.is_due(today))
        .filter(|p| seen.insert(p.word_id.as_str()))
        .collect();

    if due.len() < settings.min_due_items {
        tracing::debug!(
            due_count = due.len(),
            min_due_items = settings.min_due_items,
            "Not enough due words for a review block"
        );
        return None;
    }

    // Most overdue first, weakest first among equals
    due.sort_by(|a, b| {
        a.next_review_at
            .cmp(&b.next_review_at)
            .then(
                a.mastery_score
                    .partial_cmp(&b.mastery_score)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then_with(|| a.word_id.cmp(&b.word_id))
    });

    let due_ids: HashSet<&str> = due.iter().map(|p| p.word_id.as_str()).collect();
    let best_match = best_matching_resource(&due_ids, resource_vocabulary);

    let (resource_id, shared_ids, is_contextual) = match best_match {
        Some((id, shared)) if shared.len() >= settings.min_contextual_shared => {
            (Some(id), shared, true)
        }
        _ => (None, HashSet::new(), false),
    };

    // Shared words lead a contextual block, the rest keep overdue order
    let (mut ordered, rest): (Vec<&VocabularyProgress>, Vec<&VocabularyProgress>) = due
        .iter()
        .copied()
        .partition(|p| shared_ids.contains(p.word_id.as_str()));
    ordered.extend(rest);

    let count = ordered.len().min(settings.max_items);
    let word_ids: Vec<String> = ordered
        .iter()
        .take(count)
        .map(|p| p.word_id.clone())
        .collect();

    let block = ReviewBlock {
        word_ids,
        due_count: due.len(),
        count,
        resource_id,
        is_contextual,
        shared_count: shared_ids.len(),
        estimated_minutes: estimate_minutes(count, settings.items_per_minute),
    };

    tracing::debug!(
        due_count = block.due_count,
        count = block.count,
        contextual = block.is_contextual,
        resource_id = ?block.resource_id,
        "Built review block"
    );

    Some(block)
}

fn best_matching_resource<'a>(
    due_ids: &HashSet<&'a str>,
    resource_vocabulary: &'a HashMap<String, Vec<String>>,
) -> Option<(String, HashSet<&'a str>)> {
    let mut matches: Vec<(&String, HashSet<&'a str>)> = resource_vocabulary
        .iter()
        .map(|(resource_id, words)| {
            let shared: HashSet<&'a str> = words
                .iter()
                .map(String::as_str)
                .filter(|w| due_ids.contains(w))
                .collect();
            (resource_id, shared)
        })
        .filter(|(_, shared)| !shared.is_empty())
        .collect();

    // Largest overlap wins, lowest id breaks ties
    matches.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
    matches
        .into_iter()
        .next()
        .map(|(id, shared)| (id.clone(), shared))
}

/// Minutes needed for `count` items at the given throughput, rounded up.
pub fn estimate_minutes(count: usize, items_per_minute: f64) -> u32 {
    if count == 0 || items_per_minute <= 0.0 {
        return 0;
    }
    (count as f64 / items_per_minute).ceil() as u32
}
