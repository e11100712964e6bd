use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Lowercased, trimmed.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub restaurant_name: String,

    pub phone: String,

    pub whatsapp: Option<String>,

    pub address: Option<String>,

    pub instagram: Option<String>,

    /// JSON array of normalized method keys
    pub payment_methods: String,

    /// JSON object of method key -> surcharge percent
    pub payment_method_percents: String,

    /// SHA-256 hex of the emailed reset token
    pub reset_token_hash: Option<String>,

    pub reset_token_expires_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::menus::Entity")]
    Menus,
}

impl Related<super::menus::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
