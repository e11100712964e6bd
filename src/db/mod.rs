use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{accounts, menu_items, menus};
use crate::models::ordering::OrderEntry;
use crate::models::theme::Theme;

pub mod migrator;
pub mod repositories;

pub use repositories::account::{AccountChanges, NewAccount};
pub use repositories::menu::theme_of;
pub use repositories::menu_item::{MenuItemChanges, NewMenuItem, decode_tags};

/// Whether a store error was caused by a UNIQUE constraint, e.g. two
/// concurrent inserts that both passed an existence check.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<DbErr>())
        .any(|db_err| {
            matches!(
                db_err.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(_))
            )
        })
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url
            .trim_start_matches("sqlite:")
            .trim_start_matches("//")
            .split('?')
            .next()
            .unwrap_or_default();
        let in_memory = path_str.is_empty() || path_str.starts_with(":memory:");

        if !in_memory {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` would be a separate database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn menu_repo(&self) -> repositories::menu::MenuRepository {
        repositories::menu::MenuRepository::new(self.conn.clone())
    }

    fn menu_item_repo(&self) -> repositories::menu_item::MenuItemRepository {
        repositories::menu_item::MenuItemRepository::new(self.conn.clone())
    }

    // Accounts

    pub async fn create_account(&self, account: NewAccount) -> Result<accounts::Model> {
        self.account_repo().create(account).await
    }

    pub async fn get_account(&self, id: i32) -> Result<Option<accounts::Model>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<accounts::Model>> {
        self.account_repo().get_by_email(email).await
    }

    pub async fn update_account(
        &self,
        id: i32,
        changes: AccountChanges,
    ) -> Result<accounts::Model> {
        self.account_repo().update(id, changes).await
    }

    pub async fn set_reset_token(&self, id: i32, token_hash: &str, expires_at: &str) -> Result<()> {
        self.account_repo()
            .set_reset_token(id, token_hash, expires_at)
            .await
    }

    pub async fn find_account_by_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<accounts::Model>> {
        self.account_repo()
            .find_by_valid_reset_token(token_hash, chrono::Utc::now())
            .await
    }

    pub async fn reset_password(&self, id: i32, password_hash: String) -> Result<()> {
        self.account_repo().reset_password(id, password_hash).await
    }

    // Menus

    pub async fn create_menu(
        &self,
        account_id: i32,
        slug: &str,
        restaurant_name: &str,
    ) -> Result<menus::Model> {
        self.menu_repo()
            .create(account_id, slug, restaurant_name)
            .await
    }

    pub async fn get_menu_for_account(&self, account_id: i32) -> Result<Option<menus::Model>> {
        self.menu_repo().get_by_account(account_id).await
    }

    pub async fn get_menu_by_slug(&self, slug: &str) -> Result<Option<menus::Model>> {
        self.menu_repo().get_by_slug(slug).await
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        self.menu_repo().slug_exists(slug).await
    }

    pub async fn update_menu_slug(&self, menu: menus::Model, slug: &str) -> Result<menus::Model> {
        self.menu_repo().update_slug(menu, slug).await
    }

    pub async fn update_menu_theme(
        &self,
        menu: menus::Model,
        theme: &Theme,
    ) -> Result<menus::Model> {
        self.menu_repo().update_theme(menu, theme).await
    }

    // Menu items

    pub async fn list_menu_items(&self, menu_id: i32) -> Result<Vec<menu_items::Model>> {
        self.menu_item_repo().list_for_menu(menu_id).await
    }

    pub async fn get_menu_item(&self, id: i32) -> Result<Option<menu_items::Model>> {
        self.menu_item_repo().get(id).await
    }

    pub async fn create_menu_item(&self, item: NewMenuItem) -> Result<menu_items::Model> {
        self.menu_item_repo().create(item).await
    }

    pub async fn update_menu_item(
        &self,
        item: menu_items::Model,
        changes: MenuItemChanges,
    ) -> Result<menu_items::Model> {
        self.menu_item_repo().update(item, changes).await
    }

    pub async fn delete_menu_item(&self, id: i32) -> Result<bool> {
        self.menu_item_repo().delete(id).await
    }

    pub async fn apply_item_order(&self, menu_id: i32, entries: &[OrderEntry]) -> Result<u64> {
        self.menu_item_repo().apply_order(menu_id, entries).await
    }
}
