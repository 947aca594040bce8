use tracing::info;

use crate::auth::{
    guard,
    repo_types::{Role, User},
};
use crate::error::{AppError, AppResult};
use crate::restaurants::{
    dto::{
        CreateMenuItemRequest, CreateRestaurantRequest, UpdateManagersRequest,
        UpdateMenuItemRequest, UpdateRestaurantRequest,
    },
    repo_types::{Menu, MenuItem, Restaurant},
};
use crate::state::AppState;

/// May create restaurants and change their details or managers.
pub const RESTAURANT_ADMINS: &[Role] = &[Role::RestaurantManager, Role::Admin];
/// May add and edit menu items.
pub const MENU_EDITORS: &[Role] = &[Role::Manager, Role::RestaurantManager, Role::Admin];

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Restaurant '{id}' not found"))
}

/// Looks up a restaurant and applies the ownership policy (its managers, or admin).
fn owned<'a>(all: &'a mut [Restaurant], caller: &User, id: u64) -> AppResult<&'a mut Restaurant> {
    let restaurant = Restaurant::find_mut(all, id).ok_or_else(|| not_found(id))?;
    guard::authorize(caller, None, Some(restaurant.manager_ids.as_slice()))?;
    Ok(restaurant)
}

fn check_details(name: &str, city: &str, address: &str) -> AppResult<()> {
    if name.trim().is_empty() || city.trim().is_empty() || address.trim().is_empty() {
        return Err(AppError::Validation(
            "name, city and address must not be blank".into(),
        ));
    }
    Ok(())
}

fn check_item_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name: must not be blank".into()));
    }
    Ok(())
}

fn apply_update(item: &mut MenuItem, req: UpdateMenuItemRequest) {
    item.name = req.name.trim().to_string();
    item.description = req.description.trim().to_string();
    item.price_cents = req.price_cents;
    item.available = req.available;
}

fn push_item(menu: &mut Menu, req: CreateMenuItemRequest) -> MenuItem {
    let item = MenuItem {
        id: menu.next_item_id(),
        name: req.name.trim().to_string(),
        description: req.description.trim().to_string(),
        price_cents: req.price_cents,
        available: req.available,
    };
    menu.items.push(item.clone());
    item
}

/// The caller becomes the initial manager; the menu starts empty.
pub async fn create_restaurant(
    st: &AppState,
    caller: &User,
    req: CreateRestaurantRequest,
) -> AppResult<Restaurant> {
    guard::require_role(caller, RESTAURANT_ADMINS)?;
    check_details(&req.name, &req.city, &req.address)?;

    let restaurant = st
        .restaurants
        .update(|all| {
            let restaurant = Restaurant {
                id: Restaurant::next_id(all),
                name: req.name.trim().to_string(),
                city: req.city.trim().to_string(),
                address: req.address.trim().to_string(),
                manager_ids: vec![caller.id],
                menu: Menu::default(),
            };
            all.push(restaurant.clone());
            Ok::<_, AppError>(restaurant)
        })
        .await?;

    info!(restaurant_id = restaurant.id, manager = %caller.id, "restaurant created");
    Ok(restaurant)
}

pub async fn list_restaurants(st: &AppState) -> AppResult<Vec<Restaurant>> {
    Ok(st.restaurants.read().await?)
}

pub async fn get_restaurant(st: &AppState, id: u64) -> AppResult<Restaurant> {
    st.restaurants
        .read()
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| not_found(id))
}

pub async fn update_details(
    st: &AppState,
    caller: &User,
    req: UpdateRestaurantRequest,
) -> AppResult<Restaurant> {
    guard::require_role(caller, RESTAURANT_ADMINS)?;
    check_details(&req.name, &req.city, &req.address)?;

    st.restaurants
        .update(|all| {
            let r = owned(all, caller, req.id)?;
            r.name = req.name.trim().to_string();
            r.city = req.city.trim().to_string();
            r.address = req.address.trim().to_string();
            Ok(r.clone())
        })
        .await
}

pub async fn update_managers(
    st: &AppState,
    caller: &User,
    req: UpdateManagersRequest,
) -> AppResult<Restaurant> {
    guard::require_role(caller, RESTAURANT_ADMINS)?;
    if req.manager_ids.is_empty() {
        return Err(AppError::Validation(
            "manager_ids: a restaurant needs at least one manager".into(),
        ));
    }

    let mut manager_ids = req.manager_ids;
    let mut seen = std::collections::HashSet::new();
    manager_ids.retain(|id| seen.insert(*id));

    let restaurant = st
        .restaurants
        .update(|all| {
            let r = owned(all, caller, req.id)?;
            r.manager_ids = manager_ids;
            Ok::<_, AppError>(r.clone())
        })
        .await?;

    info!(
        restaurant_id = restaurant.id,
        managers = restaurant.manager_ids.len(),
        "managers replaced"
    );
    Ok(restaurant)
}

pub async fn create_menu_item(
    st: &AppState,
    caller: &User,
    restaurant_id: u64,
    req: CreateMenuItemRequest,
) -> AppResult<MenuItem> {
    let mut created = bulk_create_menu_items(st, caller, restaurant_id, vec![req]).await?;
    created
        .pop()
        .ok_or_else(|| AppError::BadRequest("no menu item created".into()))
}

pub async fn update_menu_item(
    st: &AppState,
    caller: &User,
    restaurant_id: u64,
    req: UpdateMenuItemRequest,
) -> AppResult<MenuItem> {
    let mut updated = bulk_update_menu_items(st, caller, restaurant_id, vec![req]).await?;
    updated
        .pop()
        .ok_or_else(|| AppError::BadRequest("no menu item updated".into()))
}

pub async fn bulk_create_menu_items(
    st: &AppState,
    caller: &User,
    restaurant_id: u64,
    reqs: Vec<CreateMenuItemRequest>,
) -> AppResult<Vec<MenuItem>> {
    guard::require_role(caller, MENU_EDITORS)?;
    for req in &reqs {
        check_item_name(&req.name)?;
    }

    let created = st
        .restaurants
        .update(|all| {
            let r = owned(all, caller, restaurant_id)?;
            Ok::<_, AppError>(
                reqs.into_iter()
                    .map(|req| push_item(&mut r.menu, req))
                    .collect::<Vec<_>>(),
            )
        })
        .await?;

    info!(restaurant_id, count = created.len(), "menu items created");
    Ok(created)
}

/// All-or-nothing: one unknown item id fails the batch and nothing is written.
pub async fn bulk_update_menu_items(
    st: &AppState,
    caller: &User,
    restaurant_id: u64,
    reqs: Vec<UpdateMenuItemRequest>,
) -> AppResult<Vec<MenuItem>> {
    guard::require_role(caller, MENU_EDITORS)?;
    for req in &reqs {
        check_item_name(&req.name)?;
    }

    st.restaurants
        .update(|all| {
            let r = owned(all, caller, restaurant_id)?;
            let mut updated = Vec::with_capacity(reqs.len());
            for req in reqs {
                let id = req.id;
                let item = r.menu.item_mut(id).ok_or_else(|| {
                    AppError::NotFound(format!("Menu item '{id}' not found"))
                })?;
                apply_update(item, req);
                updated.push(item.clone());
            }
            Ok(updated)
        })
        .await
}
