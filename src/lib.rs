pub mod analytics;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod plan;
pub mod resources;
pub mod sessions;
pub mod skills;
pub mod sources;
pub mod state;
pub mod vocab;

#[cfg(test)]
#[path = "../tests/unit"]
mod tests {
    // Crate-internal test modules
    #[path = "error_handling_test.rs"]
    mod error_handling_test;
    #[path = "analytics_test.rs"]
    mod analytics_test;
    #[path = "config_test.rs"]
    mod config_test;
}

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::PlanError;
use crate::plan::DailyPlan;
use crate::sources::JsonStore;
use crate::state::app::AppState;

/// Entry point of the `studyplan` binary: print today's plan as JSON.
///
/// A persisted plan for today is reused until it expires; otherwise a new one
/// is generated from the JSON store in the data directory and persisted.
pub fn run() -> Result<(), PlanError> {
    // Initialize structured logging first
    logging::init_logging();
    tracing::info!("studyplan starting");

    let config = config::get_scheduler_config();
    let data_dir = config.data_dir();
    let app_state = AppState::new(config.generation.plan_cache_capacity);

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        PlanError::from(e).with_context("Failed to create async runtime")
    })?;

    let plan = rt.block_on(async {
        let today = plan::plan_date(Utc::now());

        match plan::store::load(&data_dir).await {
            Ok(Some(plan)) if plan.date == today && !plan.is_expired() => {
                tracing::info!(date = %today, "Reusing persisted daily plan");
                return Ok::<Option<DailyPlan>, PlanError>(Some(plan));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load daily plan");
            }
        }

        let store = JsonStore::new(&data_dir);
        let mut rng = StdRng::from_entropy();
        let plan = plan::daily_plan(&app_state, &store, today, config, &mut rng).await?;

        if let Some(ref plan) = plan {
            if let Err(e) = plan::store::save(&data_dir, plan).await {
                tracing::warn!(error = %e, "Failed to save daily plan");
            }
        }
        Ok(plan)
    })?;

    match plan {
        Some(plan) => {
            let json = serde_json::to_string_pretty(&plan)?;
            println!("{}", json);
        }
        None => {
            tracing::info!(
                no_plan = app_state.metrics.no_plan_count(),
                "No plan could be built for today"
            );
            println!("null");
        }
    }

    Ok(())
}
