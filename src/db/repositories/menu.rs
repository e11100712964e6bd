use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::entities::menus;
use crate::models::theme::Theme;

pub struct MenuRepository {
    conn: DatabaseConnection,
}

impl MenuRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        account_id: i32,
        slug: &str,
        restaurant_name: &str,
    ) -> Result<menus::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let theme = Theme::default();

        let active = menus::ActiveModel {
            account_id: Set(account_id),
            slug: Set(slug.to_string()),
            restaurant_name: Set(restaurant_name.to_string()),
            primary_color: Set(theme.primary_color),
            background_type: Set(theme.background_type.as_str().to_string()),
            background_value: Set(theme.background_value),
            logo_url: Set(theme.logo_url),
            cover_url: Set(theme.cover_url),
            layout: Set(theme.layout.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert menu")
    }

    pub async fn get_by_account(&self, account_id: i32) -> Result<Option<menus::Model>> {
        menus::Entity::find()
            .filter(menus::Column::AccountId.eq(account_id))
            .one(&self.conn)
            .await
            .context("Failed to query menu by account")
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<menus::Model>> {
        menus::Entity::find()
            .filter(menus::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query menu by slug")
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count = menus::Entity::find()
            .filter(menus::Column::Slug.eq(slug))
            .count(&self.conn)
            .await
            .context("Failed to check slug")?;

        Ok(count > 0)
    }

    pub async fn update_slug(&self, menu: menus::Model, slug: &str) -> Result<menus::Model> {
        let mut active: menus::ActiveModel = menu.into();
        active.slug = Set(slug.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update menu slug")
    }

    pub async fn update_theme(&self, menu: menus::Model, theme: &Theme) -> Result<menus::Model> {
        let mut active: menus::ActiveModel = menu.into();
        active.primary_color = Set(theme.primary_color.clone());
        active.background_type = Set(theme.background_type.as_str().to_string());
        active.background_value = Set(theme.background_value.clone());
        active.logo_url = Set(theme.logo_url.clone());
        active.cover_url = Set(theme.cover_url.clone());
        active.layout = Set(theme.layout.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update menu theme")
    }
}

/// Reads the stored theme columns. Values that no longer parse fall back to
/// their defaults.
#[must_use]
pub fn theme_of(menu: &menus::Model) -> Theme {
    Theme {
        primary_color: menu.primary_color.clone(),
        background_type: menu.background_type.parse().unwrap_or_default(),
        background_value: menu.background_value.clone(),
        logo_url: menu.logo_url.clone(),
        cover_url: menu.cover_url.clone(),
        layout: menu.layout.parse().unwrap_or_default(),
    }
}
