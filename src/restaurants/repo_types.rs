use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price_cents: u32,
    pub available: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn next_item_id(&self) -> u64 {
        self.items.iter().map(|i| i.id).max().unwrap_or(0) + 1
    }

    pub fn item_mut(&mut self, id: u64) -> Option<&mut MenuItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}

/// Restaurant record as persisted in `restaurants.json`; the menu is embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: u64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub manager_ids: Vec<Uuid>,
    #[serde(default)]
    pub menu: Menu,
}

impl Restaurant {
    pub fn next_id(all: &[Restaurant]) -> u64 {
        all.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    pub fn find_mut(all: &mut [Restaurant], id: u64) -> Option<&mut Restaurant> {
        all.iter_mut().find(|r| r.id == id)
    }
}
