use tracing::info;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    guard,
    repo_types::{Role, User},
};
use crate::error::{AppError, AppResult};
use crate::items::{dto::ItemPayload, repo_types::Item};
use crate::state::AppState;

pub const CATALOGUE_EDITORS: &[Role] = &[Role::Manager, Role::Admin];

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Item '{id}' not found"))
}

fn check(p: &ItemPayload) -> AppResult<()> {
    if p.title.trim().is_empty() || p.category.trim().is_empty() {
        return Err(AppError::Validation(
            "title and category must not be blank".into(),
        ));
    }
    Ok(())
}

fn from_payload(id: Uuid, p: ItemPayload) -> Item {
    Item {
        id,
        title: p.title.trim().to_string(),
        category: p.category.trim().to_string(),
        tags: p.tags,
    }
}

pub async fn list_items(st: &AppState) -> AppResult<Vec<Item>> {
    Ok(st.items.read().await?)
}

pub async fn get_item(st: &AppState, id: Uuid) -> AppResult<Item> {
    st.items
        .read()
        .await?
        .into_iter()
        .find(|i| i.id == id)
        .ok_or_else(|| not_found(id))
}

pub async fn create_item(st: &AppState, caller: &User, payload: ItemPayload) -> AppResult<Item> {
    guard::require_role(caller, CATALOGUE_EDITORS)?;
    check(&payload)?;
    let id = Uuid::new_v4();

    let item = st
        .items
        .update(|all| {
            if all.iter().any(|i| i.id == id) {
                return Err(AppError::from(AuthError::IdCollision));
            }
            let item = from_payload(id, payload);
            all.push(item.clone());
            Ok(item)
        })
        .await?;

    info!(item_id = %item.id, by = %caller.id, "item created");
    Ok(item)
}

pub async fn update_item(
    st: &AppState,
    caller: &User,
    id: Uuid,
    payload: ItemPayload,
) -> AppResult<Item> {
    guard::require_role(caller, CATALOGUE_EDITORS)?;
    check(&payload)?;

    st.items
        .update(|all| {
            let slot = Item::find_mut(all, id).ok_or_else(|| not_found(id))?;
            *slot = from_payload(id, payload);
            Ok(slot.clone())
        })
        .await
}

pub async fn delete_item(st: &AppState, caller: &User, id: Uuid) -> AppResult<()> {
    guard::require_role(caller, CATALOGUE_EDITORS)?;

    st.items
        .update(|all| {
            let before = all.len();
            all.retain(|i| i.id != id);
            if all.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
        .await?;

    info!(item_id = %id, by = %caller.id, "item deleted");
    Ok(())
}
