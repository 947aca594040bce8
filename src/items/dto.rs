use serde::Deserialize;

/// Body for both create and update.
#[derive(Debug, Deserialize)]
pub struct ItemPayload {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
