use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

use crate::entities::menu_items;
use crate::models::ordering::{OrderEntry, Positioned};

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub menu_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub available: bool,
}

/// Partial item update. `None` keeps the stored value; an empty
/// description or image clears it.
#[derive(Debug, Clone, Default)]
pub struct MenuItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub available: Option<bool>,
}

pub struct MenuItemRepository {
    conn: DatabaseConnection,
}

impl MenuItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Items of a menu in display order.
    pub async fn list_for_menu(&self, menu_id: i32) -> Result<Vec<menu_items::Model>> {
        menu_items::Entity::find()
            .filter(menu_items::Column::MenuId.eq(menu_id))
            .order_by_asc(menu_items::Column::SortOrder)
            .order_by_asc(menu_items::Column::CreatedAt)
            .order_by_asc(menu_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list menu items")
    }

    pub async fn get(&self, id: i32) -> Result<Option<menu_items::Model>> {
        menu_items::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query menu item")
    }

    /// `max(order) + 1` within the menu, `0` for an empty menu.
    pub async fn next_order(&self, menu_id: i32) -> Result<i32> {
        let max: Option<Option<i32>> = menu_items::Entity::find()
            .select_only()
            .column_as(menu_items::Column::SortOrder.max(), "max_order")
            .filter(menu_items::Column::MenuId.eq(menu_id))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to compute next item order")?;

        Ok(max.flatten().map_or(0, |m| m.saturating_add(1)))
    }

    pub async fn create(&self, item: NewMenuItem) -> Result<menu_items::Model> {
        let order = self.next_order(item.menu_id).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let active = menu_items::ActiveModel {
            menu_id: Set(item.menu_id),
            name: Set(item.name),
            description: Set(item.description),
            price: Set(item.price),
            category: Set(item.category),
            image: Set(item.image),
            tags: Set(encode_tags(&item.tags)),
            available: Set(item.available),
            sort_order: Set(order),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert menu item")
    }

    pub async fn update(
        &self,
        item: menu_items::Model,
        changes: MenuItemChanges,
    ) -> Result<menu_items::Model> {
        let mut active: menu_items::ActiveModel = item.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image).filter(|i| !i.trim().is_empty()));
        }
        if let Some(tags) = changes.tags {
            active.tags = Set(encode_tags(&tags));
        }
        if let Some(available) = changes.available {
            active.available = Set(available);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update menu item")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = menu_items::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete menu item")?;

        Ok(result.rows_affected > 0)
    }

    /// Writes every `(id, order)` pair in one transaction. Each update is
    /// scoped to `menu_id`, so entries naming another menu's items match
    /// nothing. Returns the number of rows changed.
    pub async fn apply_order(&self, menu_id: i32, entries: &[OrderEntry]) -> Result<u64> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to start reorder transaction")?;
        let now = chrono::Utc::now().to_rfc3339();
        let mut updated = 0;

        for entry in entries {
            let result = menu_items::Entity::update_many()
                .col_expr(menu_items::Column::SortOrder, Expr::value(entry.order))
                .col_expr(menu_items::Column::UpdatedAt, Expr::value(now.clone()))
                .filter(menu_items::Column::Id.eq(entry.id))
                .filter(menu_items::Column::MenuId.eq(menu_id))
                .exec(&txn)
                .await
                .with_context(|| format!("Failed to reorder menu item {}", entry.id))?;
            updated += result.rows_affected;
        }

        txn.commit()
            .await
            .context("Failed to commit reorder transaction")?;

        Ok(updated)
    }
}

#[must_use]
pub fn encode_tags(tags: &[String]) -> String {
    let cleaned: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    serde_json::to_string(&cleaned).unwrap_or_else(|_| "[]".to_string())
}

#[must_use]
pub fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

impl From<&menu_items::Model> for Positioned {
    fn from(item: &menu_items::Model) -> Self {
        Self {
            id: item.id,
            order: item.sort_order,
            created_at: item.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_encoding_drops_blanks() {
        let tags = vec![" vegan ".to_string(), String::new(), "spicy".to_string()];
        let raw = encode_tags(&tags);
        assert_eq!(raw, r#"["vegan","spicy"]"#);
        assert_eq!(decode_tags(&raw), vec!["vegan", "spicy"]);
        assert!(decode_tags("oops").is_empty());
    }
}
