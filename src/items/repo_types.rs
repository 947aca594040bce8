use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalogue item as persisted in `items.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    pub fn find_mut(all: &mut [Item], id: Uuid) -> Option<&mut Item> {
        all.iter_mut().find(|i| i.id == id)
    }
}
