use std::path::{Path, PathBuf};

use crate::error::PlanError;
use super::DailyPlan;

const PLAN_FILE: &str = "daily_plan.json";

pub fn plan_path(dir: &Path) -> PathBuf {
    dir.join(PLAN_FILE)
}

/// Save the day's plan asynchronously
pub async fn save(dir: &Path, plan: &DailyPlan) -> Result<(), PlanError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", dir)))?;

    let json = serde_json::to_string_pretty(plan)?;

    let path = plan_path(dir);
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", path)))?;

    tracing::debug!(path = ?path, date = %plan.date, "Saved daily plan");
    Ok(())
}

/// Load the last saved plan. A missing file is not an error.
pub async fn load(dir: &Path) -> Result<Option<DailyPlan>, PlanError> {
    let path = plan_path(dir);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| PlanError::from(e).with_context(format!("path: {:?}", path))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlanError::from(e).with_context(format!("path: {:?}", path))),
    }
}
