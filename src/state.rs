use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ItemService, LogMailer, Mailer, MenuService, OrderService, ResendMailer,
    SeaOrmAuthService, SeaOrmItemService, SeaOrmMenuService, SeaOrmOrderService, TokenService,
    UploadService,
};

/// Resend when email is enabled, otherwise messages are only logged.
fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn Mailer>> {
    if config.email.enabled {
        info!(provider = %config.email.api_url, "Email delivery enabled");
        Ok(Arc::new(ResendMailer::new(&config.email)?))
    } else {
        info!("Email delivery disabled; reset links will be logged");
        Ok(Arc::new(LogMailer))
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub mailer: Arc<dyn Mailer>,

    pub auth_service: Arc<dyn AuthService>,

    pub menu_service: Arc<dyn MenuService>,

    pub item_service: Arc<dyn ItemService>,

    pub order_service: Arc<dyn OrderService>,

    pub upload_service: Arc<UploadService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = build_mailer(&config)?;
        Self::with_mailer(config, mailer).await
    }

    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            mailer.clone(),
            config.security.clone(),
            config.server.frontend_url.clone(),
            config.auth.reset_token_ttl_minutes,
        ));

        let menu_service: Arc<dyn MenuService> = Arc::new(SeaOrmMenuService::new(store.clone()));

        let item_service: Arc<dyn ItemService> = Arc::new(SeaOrmItemService::new(store.clone()));

        let order_service: Arc<dyn OrderService> = Arc::new(SeaOrmOrderService::new(
            store.clone(),
            PathBuf::from(&config.storage.orders_path),
        ));

        let upload_service = Arc::new(UploadService::new(&config));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            mailer,
            auth_service,
            menu_service,
            item_service,
            order_service,
            upload_service,
        })
    }
}
