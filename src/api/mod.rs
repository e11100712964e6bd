use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{
    AuthService, ItemService, Mailer, MenuService, OrderService, UploadService,
};
use crate::state::SharedState;

pub mod admin;
pub mod auth;
mod error;
mod json;
mod items;
mod menu;
mod observability;
mod orders;
mod public;
mod system;
mod types;
mod uploads;
mod validation;

pub use auth::AuthAccount;
pub use error::ApiError;
pub use json::ApiJson;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

/// Multipart framing on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn menu_service(&self) -> &Arc<dyn MenuService> {
        &self.shared.menu_service
    }

    #[must_use]
    pub fn item_service(&self) -> &Arc<dyn ItemService> {
        &self.shared.item_service
    }

    #[must_use]
    pub fn order_service(&self) -> &Arc<dyn OrderService> {
        &self.shared.order_service
    }

    #[must_use]
    pub fn upload_service(&self) -> &Arc<UploadService> {
        &self.shared.upload_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Same as [`create_app_state_from_config`] with a caller-supplied mailer.
pub async fn create_app_state_with_mailer(
    config: Config,
    mailer: Arc<dyn Mailer>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_mailer(config, mailer).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (uploads_path, orders_path, cors_origins, max_upload_bytes) = {
        let config = state.config().read().await;
        (
            config.storage.uploads_path.clone(),
            config.storage.orders_path.clone(),
            config.server.cors_allowed_origins.clone(),
            config.server.max_upload_bytes,
        )
    };

    let protected_routes = create_protected_router(state.clone(), max_upload_bytes);

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/admin/register", post(admin::register))
        .route("/admin/login", post(admin::login))
        .route("/admin/forgot-password", post(admin::forgot_password))
        .route(
            "/admin/reset-password/{token}",
            post(admin::reset_password),
        )
        .route("/menu/qr/{slug}", get(public::get_qr_code))
        .route("/menu/{slug}", get(public::get_public_menu))
        .route("/menu/{slug}/quote", post(public::quote))
        .route("/orders", post(orders::create_order))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
        .route("/system/metrics", get(observability::get_metrics))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/uploads", ServeDir::new(uploads_path))
        .nest_service("/orders", ServeDir::new(orders_path))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/profile",
            get(admin::get_profile).put(admin::update_profile),
        )
        .route("/menu", get(menu::get_menu).post(menu::create_menu))
        .route("/menu/theme", put(menu::update_theme))
        .route("/menu/regenerate-link", post(menu::regenerate_link))
        .route(
            "/menu/items",
            get(items::list_items).post(items::create_item),
        )
        .route("/menu/items/reorder", put(items::reorder_items))
        .route(
            "/menu/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/menu/items/{id}/move", post(items::move_item))
        .route(
            "/upload",
            post(uploads::upload_image)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(
                    max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
                )),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
