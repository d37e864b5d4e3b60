use crate::error::PlanError;
use crate::metrics::Metrics;
use crate::sources::ProgressSink;
use crate::vocab::mastery::record_attempt;
use crate::vocab::{LearningContext, VocabularyAttempt, VocabularyProgress};

/// Apply a practice attempt to the stored progress record and persist the result.
///
/// The first attempt for a word starts from a zero-state record. A rejected
/// attempt leaves storage untouched. The learning context is written after the
/// progress record, and only when the attempt names a resource or skill.
pub async fn record_practice<S: ProgressSink>(
    sink: &S,
    attempt: &VocabularyAttempt,
    metrics: &Metrics,
) -> Result<VocabularyProgress, PlanError> {
    let prior = sink
        .load_progress(&attempt.user_id, &attempt.word_id)
        .await?
        .unwrap_or_else(|| VocabularyProgress::new(&attempt.word_id, &attempt.user_id));

    let updated = match record_attempt(&prior, attempt) {
        Ok(updated) => updated,
        Err(e) => {
            metrics.record_rejected_attempt();
            tracing::warn!(
                word_id = %attempt.word_id,
                user_id = %attempt.user_id,
                error = %e,
                "Rejected practice attempt"
            );
            return Err(PlanError::from(e).with_context(format!("word: {}", attempt.word_id)));
        }
    };

    sink.save_vocabulary_progress(&updated).await?;

    if let Some(context) = LearningContext::from_attempt(attempt) {
        if let Err(e) = sink.save_learning_context(&context).await {
            // Progress is already saved; a lost context only affects analytics
            tracing::warn!(word_id = %attempt.word_id, error = %e, "Failed to save learning context");
        }
    }

    metrics.record_attempt();
    tracing::info!(
        word_id = %updated.word_id,
        correct = attempt.was_correct,
        mastery = updated.mastery_score,
        phase = ?updated.phase,
        "Recorded practice"
    );

    Ok(updated)
}
