pub use super::accounts::Entity as Accounts;
pub use super::menu_items::Entity as MenuItems;
pub use super::menus::Entity as Menus;
