//! Domain service for menus: the admin's own menu, its theme and public
//! link, plus the public read side (menu page, quote, QR code).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::db::theme_of;
use crate::entities::menus;
use crate::models::order::QuoteLine;
use crate::models::pricing::PriceBreakdown;
use crate::models::theme::{Theme, ThemeError, ThemeUpdate};
use crate::services::item_service::MenuItemView;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("You already have a menu")]
    AlreadyExists,

    #[error("Menu not found")]
    NotFound,

    #[error("Account not found")]
    AccountNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for MenuError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for MenuError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ThemeError> for MenuError {
    fn from(err: ThemeError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMenu {
    pub restaurant_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub id: i32,
    pub slug: String,
    pub restaurant_name: String,
    pub theme: Theme,
    pub created_at: String,
    pub updated_at: String,
}

impl From<menus::Model> for MenuView {
    fn from(menu: menus::Model) -> Self {
        Self {
            theme: theme_of(&menu),
            id: menu.id,
            slug: menu.slug,
            restaurant_name: menu.restaurant_name,
            created_at: menu.created_at,
            updated_at: menu.updated_at,
        }
    }
}

/// What customers see at `/menu/<slug>`.
#[derive(Debug, Clone, Serialize)]
pub struct PublicMenu {
    pub restaurant_name: String,
    pub slug: String,
    pub theme: Theme,
    pub items: Vec<MenuItemView>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub payment_methods: Vec<String>,
    pub payment_method_percents: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteItem {
    #[serde(default, alias = "id")]
    pub item_id: Value,
    #[serde(default)]
    pub qty: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    pub payment_method: Option<String>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    /// Requested ids that are unknown, unavailable or ordered with no quantity.
    pub skipped: Vec<Value>,
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    pub payment_method: Option<String>,
    pub payment_label: Option<String>,
    pub message: String,
    pub whatsapp_url: Option<String>,
}

#[async_trait::async_trait]
pub trait MenuService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`MenuError::AlreadyExists`] if the account already owns a menu.
    async fn create_menu(&self, account_id: i32, request: CreateMenu)
    -> Result<MenuView, MenuError>;

    async fn get_menu(&self, account_id: i32) -> Result<MenuView, MenuError>;

    /// Validates the whole update before writing anything.
    async fn update_theme(&self, account_id: i32, update: ThemeUpdate)
    -> Result<Theme, MenuError>;

    /// Replaces the slug. The old public URL stops resolving immediately.
    async fn regenerate_link(&self, account_id: i32) -> Result<MenuView, MenuError>;

    async fn public_menu(&self, slug: &str) -> Result<PublicMenu, MenuError>;

    /// Prices a cart against the stored items of `slug`.
    async fn quote(&self, slug: &str, request: QuoteRequest) -> Result<Quote, MenuError>;

    /// PNG data URL for the public page of `slug`, built on `base_url`.
    async fn qr_code(&self, slug: &str, base_url: &str) -> Result<String, MenuError>;
}
