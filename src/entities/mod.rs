pub mod prelude;

pub mod accounts;
pub mod menu_items;
pub mod menus;
