use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub city: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRestaurantRequest {
    pub id: u64,
    pub name: String,
    pub city: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateManagersRequest {
    pub id: u64,
    pub manager_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMenuItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: u32,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMenuItemRequest {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: u32,
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateMenuItems {
    pub items: Vec<CreateMenuItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateMenuItems {
    pub items: Vec<UpdateMenuItemRequest>,
}
