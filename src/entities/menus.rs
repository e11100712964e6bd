use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub account_id: i32,

    /// Public identifier used in `/menu/<slug>` and the QR code
    #[sea_orm(unique)]
    pub slug: String,

    pub restaurant_name: String,

    pub primary_color: String,

    /// `color` or `image`
    pub background_type: String,

    pub background_value: String,

    pub logo_url: Option<String>,

    pub cover_url: Option<String>,

    pub layout: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_delete = "Cascade"
    )]
    Accounts,

    #[sea_orm(has_many = "super::menu_items::Entity")]
    MenuItems,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::menu_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
