use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::plan::PlanOutcome;

/// Counters for plan generation and practice recording.
/// All metrics are atomic counters; clones share the same values.
#[derive(Clone, Default, Debug)]
pub struct Metrics {
    /// Plans built with a primary resource
    pub full_plans: Arc<AtomicU64>,
    /// Plans built from vocabulary review alone
    pub vocab_only_plans: Arc<AtomicU64>,
    /// Generations that ended without a plan
    pub no_plans: Arc<AtomicU64>,
    /// Generations aborted by a collaborator error or timeout
    pub generation_failures: Arc<AtomicU64>,
    /// Plans served from the cache
    pub cache_hits: Arc<AtomicU64>,
    pub attempts_recorded: Arc<AtomicU64>,
    pub attempts_rejected: Arc<AtomicU64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how a generation ended
    pub fn record_outcome(&self, outcome: &PlanOutcome) {
        let counter = match outcome {
            PlanOutcome::Full(_) => &self.full_plans,
            PlanOutcome::VocabOnly(_) => &self.vocab_only_plans,
            PlanOutcome::NoPlan(_) => &self.no_plans,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_failure(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self) {
        self.attempts_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_attempt(&self) {
        self.attempts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn full_plan_count(&self) -> u64 {
        self.full_plans.load(Ordering::Relaxed)
    }

    pub fn vocab_only_plan_count(&self) -> u64 {
        self.vocab_only_plans.load(Ordering::Relaxed)
    }

    pub fn no_plan_count(&self) -> u64 {
        self.no_plans.load(Ordering::Relaxed)
    }

    pub fn generation_failure_count(&self) -> u64 {
        self.generation_failures.load(Ordering::Relaxed)
    }

    pub fn cache_hit_count(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn attempts_recorded_count(&self) -> u64 {
        self.attempts_recorded.load(Ordering::Relaxed)
    }

    pub fn attempts_rejected_count(&self) -> u64 {
        self.attempts_rejected.load(Ordering::Relaxed)
    }
}
