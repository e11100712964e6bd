//! Domain service for menu items: CRUD scoped to the caller's menu, batch
//! reorder and single-step moves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::db::decode_tags;
use crate::entities::menu_items;
use crate::models::ordering::{Direction, OrderEntry, OrderingError};

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Menu not found")]
    MenuNotFound,

    #[error("Menu item not found")]
    NotFound,

    #[error("This item does not belong to your menu")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ItemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<OrderingError> for ItemError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::UnknownItem(_) => Self::NotFound,
            other => Self::Validation(other.to_string()),
        }
    }
}

/// New item as submitted by the admin. `price` accepts a number or a
/// numeric string.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub category: String,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItemView {
    pub id: i32,
    pub menu_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub available: bool,
    pub order: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<menu_items::Model> for MenuItemView {
    fn from(item: menu_items::Model) -> Self {
        Self {
            tags: decode_tags(&item.tags),
            id: item.id,
            menu_id: item.menu_id,
            name: item.name,
            description: item.description,
            price: item.price,
            category: item.category,
            image: item.image,
            available: item.available,
            order: item.sort_order,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[async_trait::async_trait]
pub trait ItemService: Send + Sync {
    /// Appends an item after the current last one.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::MenuNotFound`] when the account has no menu yet.
    async fn create_item(&self, account_id: i32, input: ItemInput)
    -> Result<MenuItemView, ItemError>;

    async fn list_items(&self, account_id: i32) -> Result<Vec<MenuItemView>, ItemError>;

    /// # Errors
    ///
    /// [`ItemError::NotFound`] for unknown ids, [`ItemError::Forbidden`] for
    /// items of another menu.
    async fn get_item(&self, account_id: i32, item_id: i32) -> Result<MenuItemView, ItemError>;

    async fn update_item(
        &self,
        account_id: i32,
        item_id: i32,
        update: ItemUpdate,
    ) -> Result<MenuItemView, ItemError>;

    async fn delete_item(&self, account_id: i32, item_id: i32) -> Result<(), ItemError>;

    /// Applies `(id, order)` pairs atomically. Entries naming items outside
    /// the caller's menu are skipped. Returns the number of rows updated.
    async fn reorder(&self, account_id: i32, entries: Vec<OrderEntry>) -> Result<u64, ItemError>;

    /// Swaps an item with its neighbour and returns the re-sorted list.
    async fn move_item(
        &self,
        account_id: i32,
        item_id: i32,
        direction: Direction,
    ) -> Result<Vec<MenuItemView>, ItemError>;
}
