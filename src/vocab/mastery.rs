use chrono::Duration;

use crate::error::AttemptError;
use crate::resources::ActivityType;
use super::{VocabularyAttempt, VocabularyProgress};

/// Fraction of the remaining headroom gained per unit of difficulty weight on success
pub const SUCCESS_GAIN: f64 = 0.15;
/// Score lost per unit of difficulty weight on failure
pub const FAILURE_PENALTY: f64 = 0.1;
/// Consecutive successes within a phase that promote to the next phase
pub const PROMOTION_STREAK: u32 = 3;
/// Consecutive failures that demote one phase
pub const DEMOTION_STREAK: u32 = 3;

pub const FIRST_INTERVAL_DAYS: f64 = 1.0;
pub const FAILURE_INTERVAL_DAYS: f64 = 1.0;
pub const MAX_INTERVAL_DAYS: f64 = 180.0;
const BASE_GROWTH: f64 = 1.3;
const MASTERY_GROWTH: f64 = 2.2;

/// Check an attempt against the record it is meant to update.
pub fn validate_attempt(
    prior: &VocabularyProgress,
    attempt: &VocabularyAttempt,
) -> Result<ActivityType, AttemptError> {
    let weight = attempt.difficulty_weight;
    if !weight.is_finite() || weight <= 0.0 {
        return Err(AttemptError::NonPositiveWeight(weight));
    }

    let activity = ActivityType::parse(&attempt.activity)
        .ok_or_else(|| AttemptError::UnknownActivity(attempt.activity.clone()))?;

    if prior.word_id != attempt.word_id {
        return Err(AttemptError::WordMismatch {
            attempt: attempt.word_id.clone(),
            progress: prior.word_id.clone(),
        });
    }
    if !prior.user_id.is_empty() && prior.user_id != attempt.user_id {
        return Err(AttemptError::UserMismatch {
            attempt: attempt.user_id.clone(),
            progress: prior.user_id.clone(),
        });
    }

    Ok(activity)
}

/// Apply one practice attempt and return the updated record.
/// `prior` is left untouched; an invalid attempt yields an error and no new record.
pub fn record_attempt(
    prior: &VocabularyProgress,
    attempt: &VocabularyAttempt,
) -> Result<VocabularyProgress, AttemptError> {
    let activity = validate_attempt(prior, attempt)?;
    let weight = attempt.difficulty_weight;

    let mut next = prior.clone();
    if next.user_id.is_empty() {
        next.user_id = attempt.user_id.clone();
    }
    let score = prior.mastery_score.clamp(0.0, 1.0);

    next.total_attempts = prior.total_attempts.saturating_add(1);

    if attempt.was_correct {
        next.correct_attempts = prior.correct_attempts.saturating_add(1);
        // Diminishing returns: the closer to 1.0, the smaller the step
        let mut gain = (SUCCESS_GAIN * weight).min(1.0) * (1.0 - score);
        if score < 1.0 {
            // Any success below the ceiling must move the score
            gain = gain.max(f64::EPSILON);
        }
        next.mastery_score = (score + gain).clamp(0.0, 1.0);

        next.failure_streak = 0;
        next.correct_streak = prior.correct_streak.saturating_add(1);
        if next.correct_streak >= PROMOTION_STREAK && next.phase != next.phase.promoted() {
            next.phase = next.phase.promoted();
            next.correct_streak = 0;
        }

        next.interval_days = grown_interval(prior.interval_days, next.mastery_score);
    } else {
        next.mastery_score = (score - FAILURE_PENALTY * weight).clamp(0.0, 1.0);

        next.correct_streak = 0;
        next.failure_streak = prior.failure_streak.saturating_add(1);
        if next.failure_streak >= DEMOTION_STREAK && next.phase != next.phase.demoted() {
            next.phase = next.phase.demoted();
            next.failure_streak = 0;
        }

        next.interval_days = FAILURE_INTERVAL_DAYS;
    }

    next.last_attempt_at = Some(attempt.attempted_at);
    next.next_review_at = Some(attempt.attempted_at + interval_duration(next.interval_days));

    if next.phase != prior.phase {
        tracing::debug!(
            word_id = %next.word_id,
            from = ?prior.phase,
            to = ?next.phase,
            "Learning phase changed"
        );
    }
    tracing::debug!(
        word_id = %next.word_id,
        activity = %activity,
        correct = attempt.was_correct,
        score_before = score,
        score_after = next.mastery_score,
        interval_days = next.interval_days,
        "Recorded vocabulary attempt"
    );

    Ok(next)
}

/// Interval after a success. Grows faster at higher mastery, always by at least a day.
pub fn grown_interval(previous_days: f64, mastery_score: f64) -> f64 {
    if previous_days <= 0.0 {
        return FIRST_INTERVAL_DAYS;
    }
    let growth = BASE_GROWTH + MASTERY_GROWTH * mastery_score.clamp(0.0, 1.0);
    (previous_days * growth)
        .max(previous_days + 1.0)
        .min(MAX_INTERVAL_DAYS)
}

fn interval_duration(interval_days: f64) -> Duration {
    Duration::minutes((interval_days * 24.0 * 60.0).round() as i64)
}
