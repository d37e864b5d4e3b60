use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SelectionSettings;
use crate::resources::{CompletionRecord, Resource};

/// Which rule contributed most to the winning score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionReason {
    Freshness,
    ContextualMatch,
    BestAvailable,
}

impl SelectionReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Freshness => "Not used recently, good for variety",
            Self::ContextualMatch => "Contains many of today's review words",
            Self::BestAvailable => "Best available resource",
        }
    }
}

/// Scheduler-internal scoring view of a catalog resource. Never persisted.
#[derive(Debug, Clone)]
pub struct ResourceCandidate<'a> {
    pub resource: &'a Resource,
    /// None when the resource has never been used
    pub days_since_last_use: Option<i64>,
    pub vocabulary_count: usize,
    pub is_vocab_match: bool,
    pub freshness_bonus: f64,
    pub contextual_bonus: f64,
    /// None when the resource is disqualified
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedResource {
    pub resource: Resource,
    pub score: f64,
    pub days_since_last_use: Option<i64>,
    pub vocabulary_count: usize,
    pub reason: SelectionReason,
    pub rationale: String,
}

/// Most recent usage date per resource.
pub fn last_used_dates(history: &[CompletionRecord]) -> HashMap<&str, NaiveDate> {
    let mut last_used: HashMap<&str, NaiveDate> = HashMap::new();
    for record in history {
        if let Some(resource_id) = record.resource_id.as_deref() {
            let date = record.date();
            last_used
                .entry(resource_id)
                .and_modify(|d| {
                    if date > *d {
                        *d = date;
                    }
                })
                .or_insert(date);
        }
    }
    last_used
}

/// Resources with any completion dated the day before `today`.
pub fn used_yesterday(today: NaiveDate, history: &[CompletionRecord]) -> HashSet<&str> {
    let yesterday = today - Duration::days(1);
    history
        .iter()
        .filter(|record| record.date() == yesterday)
        .filter_map(|record| record.resource_id.as_deref())
        .collect()
}

/// Score every catalog entry. Disqualified entries carry `score: None`.
pub fn score_candidates<'a>(
    today: NaiveDate,
    history: &[CompletionRecord],
    catalog: &'a [Resource],
    vocabulary_counts: &HashMap<String, usize>,
    vocab_match_resource_id: Option<&str>,
    settings: &SelectionSettings,
) -> Vec<ResourceCandidate<'a>> {
    let last_used = last_used_dates(history);
    let disqualified = used_yesterday(today, history);

    catalog
        .iter()
        .map(|resource| {
            let days_since_last_use = last_used
                .get(resource.id.as_str())
                .map(|date| (today - *date).num_days());
            let vocabulary_count = vocabulary_counts.get(&resource.id).copied().unwrap_or(0);
            let is_vocab_match = vocab_match_resource_id == Some(resource.id.as_str());

            // Used yesterday: never eligible today, even if used again since
            if disqualified.contains(resource.id.as_str()) {
                return ResourceCandidate {
                    resource,
                    days_since_last_use,
                    vocabulary_count,
                    is_vocab_match,
                    freshness_bonus: 0.0,
                    contextual_bonus: 0.0,
                    score: None,
                };
            }

            let freshness_bonus = match days_since_last_use {
                None => settings.long_unused_bonus,
                Some(days) if days >= settings.long_unused_days => settings.long_unused_bonus,
                Some(days) if days >= 2 => settings.recent_unused_bonus,
                Some(days) => days.max(0) as f64 * settings.per_day_bonus,
            };
            let contextual_bonus = if is_vocab_match { settings.contextual_bonus } else { 0.0 };
            let vocabulary_bonus =
                settings.vocabulary_log_weight * (1.0 + vocabulary_count as f64).ln();
            let media_bonus = if resource.has_audio_or_video { settings.media_bonus } else { 0.0 };

            ResourceCandidate {
                resource,
                days_since_last_use,
                vocabulary_count,
                is_vocab_match,
                freshness_bonus,
                contextual_bonus,
                score: Some(freshness_bonus + contextual_bonus + vocabulary_bonus + media_bonus),
            }
        })
        .collect()
}

/// Pick the primary resource for today. Ties are broken uniformly with `rng`.
/// Returns None when the catalog is empty or every entry is disqualified.
pub fn select_primary_resource<R: Rng + ?Sized>(
    today: NaiveDate,
    history: &[CompletionRecord],
    catalog: &[Resource],
    vocabulary_counts: &HashMap<String, usize>,
    vocab_match_resource_id: Option<&str>,
    settings: &SelectionSettings,
    rng: &mut R,
) -> Option<SelectedResource> {
    let candidates = score_candidates(
        today,
        history,
        catalog,
        vocabulary_counts,
        vocab_match_resource_id,
        settings,
    );

    let eligible: Vec<(&ResourceCandidate, f64)> = candidates
        .iter()
        .filter_map(|c| c.score.map(|s| (c, s)))
        .collect();

    if eligible.is_empty() {
        tracing::debug!(
            catalog_size = catalog.len(),
            "No eligible resource: catalog empty or all used yesterday"
        );
        return None;
    }

    let best_score = eligible
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);

    let tied: Vec<&ResourceCandidate> = eligible
        .iter()
        .filter(|(_, s)| (s - best_score).abs() < 1e-9)
        .map(|(c, _)| *c)
        .collect();

    let winner = tied.choose(rng).copied()?;
    let reason = dominant_reason(winner);

    tracing::debug!(
        resource_id = %winner.resource.id,
        score = best_score,
        tied = tied.len(),
        reason = ?reason,
        "Selected primary resource"
    );

    Some(SelectedResource {
        resource: winner.resource.clone(),
        score: best_score,
        days_since_last_use: winner.days_since_last_use,
        vocabulary_count: winner.vocabulary_count,
        reason,
        rationale: rationale_for(winner, reason),
    })
}

fn dominant_reason(candidate: &ResourceCandidate) -> SelectionReason {
    if candidate.contextual_bonus > 0.0 && candidate.contextual_bonus >= candidate.freshness_bonus {
        SelectionReason::ContextualMatch
    } else if candidate.freshness_bonus > candidate.contextual_bonus
        && candidate.days_since_last_use.map_or(true, |days| days >= 2)
    {
        SelectionReason::Freshness
    } else {
        SelectionReason::BestAvailable
    }
}

fn rationale_for(candidate: &ResourceCandidate, reason: SelectionReason) -> String {
    let title = &candidate.resource.title;
    match reason {
        SelectionReason::ContextualMatch => format!(
            "{}: {} shares the vocabulary you are reviewing today",
            reason.describe(),
            title
        ),
        SelectionReason::Freshness => match candidate.days_since_last_use {
            Some(days) => format!("{}: {} was last used {} days ago", reason.describe(), title, days),
            None => format!("{}: {} has not been used yet", reason.describe(), title),
        },
        SelectionReason::BestAvailable => format!("{}: {}", reason.describe(), title),
    }
}
