//! `SeaORM` implementation of the `MenuService` trait.

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::constants::slug::{ALPHABET, LENGTH, MAX_ATTEMPTS};
use crate::db::{Store, is_unique_violation, theme_of};
use crate::entities::{accounts, menus};
use crate::models::order::{OrderMessage, QuoteLine, whatsapp_url};
use crate::models::payment::{PaymentSettings, method_label, normalize_method};
use crate::models::pricing::{CartLine, coerce_number, compute};
use crate::models::theme::{Theme, ThemeUpdate};
use crate::services::item_service::MenuItemView;
use crate::services::menu_service::{
    CreateMenu, MenuError, MenuService, MenuView, PublicMenu, Quote, QuoteRequest,
};
use crate::services::qr::{public_menu_url, qr_data_url_blocking};

pub struct SeaOrmMenuService {
    store: Store,
}

impl SeaOrmMenuService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn menu_of(&self, account_id: i32) -> Result<menus::Model, MenuError> {
        self.store
            .get_menu_for_account(account_id)
            .await?
            .ok_or(MenuError::NotFound)
    }

    async fn menu_by_slug(&self, slug: &str) -> Result<menus::Model, MenuError> {
        self.store
            .get_menu_by_slug(slug.trim())
            .await?
            .ok_or(MenuError::NotFound)
    }

    async fn owner_of(&self, menu: &menus::Model) -> Result<accounts::Model, MenuError> {
        self.store
            .get_account(menu.account_id)
            .await?
            .ok_or(MenuError::AccountNotFound)
    }

    async fn unique_slug(&self) -> Result<String, MenuError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let candidate = random_slug();
            if !self.store.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
            warn!(attempt, "Generated menu slug collided, retrying");
        }

        Err(MenuError::Internal(
            "Could not generate a unique menu link".to_string(),
        ))
    }
}

fn random_slug() -> String {
    let mut rng = rand::rng();
    (0..LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Item ids may arrive as numbers or numeric strings.
fn item_id_of(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .and_then(|id| i32::try_from(id).ok())
}

/// WhatsApp contact falls back to the account phone.
fn contact_number(account: &accounts::Model) -> Option<String> {
    account
        .whatsapp
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .or_else(|| Some(account.phone.trim()).filter(|p| !p.is_empty()))
        .map(str::to_string)
}

#[async_trait]
impl MenuService for SeaOrmMenuService {
    async fn create_menu(
        &self,
        account_id: i32,
        request: CreateMenu,
    ) -> Result<MenuView, MenuError> {
        if self.store.get_menu_for_account(account_id).await?.is_some() {
            return Err(MenuError::AlreadyExists);
        }

        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or(MenuError::AccountNotFound)?;

        let restaurant_name = request
            .restaurant_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or(account.restaurant_name);

        let slug = self.unique_slug().await?;
        let menu = match self
            .store
            .create_menu(account_id, &slug, &restaurant_name)
            .await
        {
            Ok(menu) => menu,
            Err(err) if is_unique_violation(&err) => {
                // A concurrent request for the same account inserted first.
                if self.store.get_menu_for_account(account_id).await?.is_some() {
                    return Err(MenuError::AlreadyExists);
                }
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        info!(account_id, menu_id = menu.id, slug = %menu.slug, "Menu created");
        metrics::counter!("menus_created_total").increment(1);

        Ok(menu.into())
    }

    async fn get_menu(&self, account_id: i32) -> Result<MenuView, MenuError> {
        Ok(self.menu_of(account_id).await?.into())
    }

    async fn update_theme(
        &self,
        account_id: i32,
        update: ThemeUpdate,
    ) -> Result<Theme, MenuError> {
        let menu = self.menu_of(account_id).await?;
        let next = theme_of(&menu).apply(&update)?;

        let updated = self.store.update_menu_theme(menu, &next).await?;
        info!(menu_id = updated.id, layout = %next.layout, "Menu theme updated");

        Ok(theme_of(&updated))
    }

    async fn regenerate_link(&self, account_id: i32) -> Result<MenuView, MenuError> {
        let menu = self.menu_of(account_id).await?;
        let old_slug = menu.slug.clone();
        let slug = self.unique_slug().await?;

        let updated = self.store.update_menu_slug(menu, &slug).await?;
        info!(menu_id = updated.id, old_slug = %old_slug, new_slug = %updated.slug, "Menu link regenerated");

        Ok(updated.into())
    }

    async fn public_menu(&self, slug: &str) -> Result<PublicMenu, MenuError> {
        let menu = self.menu_by_slug(slug).await?;
        let account = self.owner_of(&menu).await?;
        let items = self.store.list_menu_items(menu.id).await?;
        let payment =
            PaymentSettings::from_stored(&account.payment_methods, &account.payment_method_percents);

        Ok(PublicMenu {
            theme: theme_of(&menu),
            restaurant_name: menu.restaurant_name,
            slug: menu.slug,
            items: items.into_iter().map(MenuItemView::from).collect(),
            whatsapp: contact_number(&account),
            address: account.address,
            instagram: account
                .instagram
                .map(|i| i.trim().trim_start_matches('@').to_string())
                .filter(|i| !i.is_empty()),
            payment_methods: payment.methods,
            payment_method_percents: payment.percents,
        })
    }

    async fn quote(&self, slug: &str, request: QuoteRequest) -> Result<Quote, MenuError> {
        let menu = self.menu_by_slug(slug).await?;
        let account = self.owner_of(&menu).await?;
        let stored: HashMap<i32, _> = self
            .store
            .list_menu_items(menu.id)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let mut lines = Vec::new();
        let mut cart = Vec::new();
        let mut skipped = Vec::new();

        for requested in &request.items {
            let item = item_id_of(&requested.item_id)
                .and_then(|id| stored.get(&id))
                .filter(|item| item.available);
            let line = CartLine::new(item.map_or(0.0, |i| i.price), coerce_number(&requested.qty));

            match item {
                Some(item) if line.qty > 0.0 => {
                    lines.push(QuoteLine {
                        item_id: Some(item.id),
                        name: item.name.clone(),
                        qty: line.qty,
                        unit_price: line.price,
                        line_total: line.total(),
                    });
                    cart.push(line);
                }
                _ => skipped.push(requested.item_id.clone()),
            }
        }

        let payment =
            PaymentSettings::from_stored(&account.payment_methods, &account.payment_method_percents);
        let method = request.payment_method.as_deref().and_then(normalize_method);
        let breakdown = compute(&cart, payment.percent_for(method.as_deref()));

        let message = OrderMessage {
            customer_name: request.customer_name.as_deref(),
            restaurant_name: &menu.restaurant_name,
            lines: &lines,
            breakdown,
            payment_method: method.as_deref(),
        }
        .render();

        let whatsapp_url = contact_number(&account).and_then(|n| whatsapp_url(&n, &message));

        Ok(Quote {
            lines,
            skipped,
            breakdown,
            payment_label: method.as_deref().map(method_label),
            payment_method: method,
            message,
            whatsapp_url,
        })
    }

    async fn qr_code(&self, slug: &str, base_url: &str) -> Result<String, MenuError> {
        let menu = self.menu_by_slug(slug).await?;
        let url = public_menu_url(base_url, &menu.slug);

        Ok(qr_data_url_blocking(url).await?)
    }
}
