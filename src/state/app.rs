use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::NaiveDate;
use lru::LruCache;
use parking_lot::RwLock;

use crate::metrics::Metrics;
use crate::plan::DailyPlan;

/// Application-wide state container.
/// All mutable state is centralized here and passed explicitly to functions.
#[derive(Clone)]
pub struct AppState {
    /// Generated plans by date (LRU with bounded size)
    pub plan_cache: Arc<RwLock<LruCache<NaiveDate, DailyPlan>>>,
    pub metrics: Metrics,
}

impl AppState {
    /// A zero capacity is bumped to one.
    pub fn new(plan_cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(plan_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        AppState {
            plan_cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            metrics: Metrics::new(),
        }
    }

    /// Cached plan for `date`, expired or not
    pub fn cached_plan(&self, date: NaiveDate) -> Option<DailyPlan> {
        // LRU lookup updates recency, so it needs the write lock
        self.plan_cache.write().get(&date).cloned()
    }

    pub fn store_plan(&self, plan: DailyPlan) {
        self.plan_cache.write().put(plan.date, plan);
    }

    pub fn invalidate_plan(&self, date: NaiveDate) -> Option<DailyPlan> {
        self.plan_cache.write().pop(&date)
    }

    pub fn cached_plan_count(&self) -> usize {
        self.plan_cache.read().len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(crate::config::GenerationSettings::default().plan_cache_capacity)
    }
}
