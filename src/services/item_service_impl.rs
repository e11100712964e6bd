//! `SeaORM` implementation of the `ItemService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{MenuItemChanges, NewMenuItem, Store};
use crate::entities::{menu_items, menus};
use crate::models::ordering::{Direction, OrderEntry, Positioned, plan_move};
use crate::models::pricing::parse_number;
use crate::services::item_service::{ItemError, ItemInput, ItemService, ItemUpdate, MenuItemView};

pub struct SeaOrmItemService {
    store: Store,
}

impl SeaOrmItemService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn menu_of(&self, account_id: i32) -> Result<menus::Model, ItemError> {
        self.store
            .get_menu_for_account(account_id)
            .await?
            .ok_or(ItemError::MenuNotFound)
    }

    /// Loads an item and checks it belongs to the caller's menu.
    async fn owned_item(
        &self,
        account_id: i32,
        item_id: i32,
    ) -> Result<menu_items::Model, ItemError> {
        let item = self
            .store
            .get_menu_item(item_id)
            .await?
            .ok_or(ItemError::NotFound)?;

        let owner = self.store.get_menu_for_account(account_id).await?;
        match owner {
            Some(menu) if menu.id == item.menu_id => Ok(item),
            _ => Err(ItemError::Forbidden),
        }
    }

    async fn sorted_views(&self, menu_id: i32) -> Result<Vec<MenuItemView>, ItemError> {
        let items = self.store.list_menu_items(menu_id).await?;
        Ok(items.into_iter().map(MenuItemView::from).collect())
    }
}

fn required_text(value: &str, field: &str) -> Result<String, ItemError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ItemError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn valid_price(value: &serde_json::Value) -> Result<f64, ItemError> {
    parse_number(value)
        .filter(|p| *p >= 0.0)
        .ok_or_else(|| ItemError::Validation("Price must be a number greater than or equal to 0".to_string()))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl ItemService for SeaOrmItemService {
    async fn create_item(
        &self,
        account_id: i32,
        input: ItemInput,
    ) -> Result<MenuItemView, ItemError> {
        let menu = self.menu_of(account_id).await?;

        let item = NewMenuItem {
            menu_id: menu.id,
            name: required_text(&input.name, "Name")?,
            description: optional_text(input.description),
            price: valid_price(&input.price)?,
            category: required_text(&input.category, "Category")?,
            image: optional_text(input.image),
            tags: input.tags.unwrap_or_default(),
            available: input.available.unwrap_or(true),
        };

        let created = self.store.create_menu_item(item).await?;
        info!(menu_id = menu.id, item_id = created.id, "Menu item created");

        Ok(created.into())
    }

    async fn list_items(&self, account_id: i32) -> Result<Vec<MenuItemView>, ItemError> {
        let menu = self.menu_of(account_id).await?;
        self.sorted_views(menu.id).await
    }

    async fn get_item(&self, account_id: i32, item_id: i32) -> Result<MenuItemView, ItemError> {
        Ok(self.owned_item(account_id, item_id).await?.into())
    }

    async fn update_item(
        &self,
        account_id: i32,
        item_id: i32,
        update: ItemUpdate,
    ) -> Result<MenuItemView, ItemError> {
        let item = self.owned_item(account_id, item_id).await?;

        let changes = MenuItemChanges {
            name: update
                .name
                .as_deref()
                .map(|n| required_text(n, "Name"))
                .transpose()?,
            description: update.description,
            price: update.price.as_ref().map(valid_price).transpose()?,
            category: update
                .category
                .as_deref()
                .map(|c| required_text(c, "Category"))
                .transpose()?,
            image: update.image,
            tags: update.tags,
            available: update.available,
        };

        let updated = self.store.update_menu_item(item, changes).await?;
        debug!(item_id, "Menu item updated");

        Ok(updated.into())
    }

    async fn delete_item(&self, account_id: i32, item_id: i32) -> Result<(), ItemError> {
        let item = self.owned_item(account_id, item_id).await?;

        if !self.store.delete_menu_item(item.id).await? {
            return Err(ItemError::NotFound);
        }

        info!(item_id, "Menu item deleted");
        Ok(())
    }

    async fn reorder(&self, account_id: i32, entries: Vec<OrderEntry>) -> Result<u64, ItemError> {
        let menu = self.menu_of(account_id).await?;
        let updated = self.store.apply_item_order(menu.id, &entries).await?;

        info!(
            menu_id = menu.id,
            requested = entries.len(),
            updated,
            "Menu items reordered"
        );
        Ok(updated)
    }

    async fn move_item(
        &self,
        account_id: i32,
        item_id: i32,
        direction: Direction,
    ) -> Result<Vec<MenuItemView>, ItemError> {
        let item = self.owned_item(account_id, item_id).await?;
        let items = self.store.list_menu_items(item.menu_id).await?;

        let positions: Vec<Positioned> = items.iter().map(Positioned::from).collect();
        let plan = plan_move(&positions, item_id, direction)?;

        if !plan.is_empty() {
            self.store.apply_item_order(item.menu_id, &plan).await?;
        }

        self.sorted_views(item.menu_id).await
    }
}
