use sea_orm_migration::prelude::*;

mod m20250101_initial;
mod m20250220_add_menu_item_order_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_initial::Migration),
            Box::new(m20250220_add_menu_item_order_index::Migration),
        ]
    }
}
