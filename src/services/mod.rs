pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AccountProfile, AuthError, AuthService, AuthSession, ProfileUpdate, Registration,
};
pub use auth_service_impl::SeaOrmAuthService;

pub mod menu_service;
pub mod menu_service_impl;
pub use menu_service::{
    CreateMenu, MenuError, MenuService, MenuView, PublicMenu, Quote, QuoteRequest,
};
pub use menu_service_impl::SeaOrmMenuService;

pub mod item_service;
pub mod item_service_impl;
pub use item_service::{ItemError, ItemInput, ItemService, ItemUpdate, MenuItemView};
pub use item_service_impl::SeaOrmItemService;

pub mod order_service;
pub mod order_service_impl;
pub use order_service::{OrderError, OrderReceipt, OrderRequest, OrderService};
pub use order_service_impl::SeaOrmOrderService;

pub mod mailer;
pub use mailer::{LogMailer, Mailer, RecordingMailer, ResendMailer};

pub mod pdf;
pub mod qr;
pub mod token;
pub use token::TokenService;

pub mod upload;
pub use upload::{UploadError, UploadService};
