pub mod resolver;

use serde::{Deserialize, Serialize};

/// A skill or topic profile (e.g. "Ordering food", "Past tense").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}
