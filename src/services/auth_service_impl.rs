//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::account::{hash_password_blocking, verify_password_blocking};
use crate::db::{AccountChanges, NewAccount, Store, is_unique_violation};
use crate::entities::accounts;
use crate::models::payment::PaymentSettings;
use crate::services::auth_service::{
    AccountProfile, AuthError, AuthService, AuthSession, ProfileUpdate, Registration,
};
use crate::services::mailer::{Mailer, password_reset_email};
use crate::services::token::{TokenService, generate_reset_token, hash_reset_token};

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenService,
    mailer: Arc<dyn Mailer>,
    security: SecurityConfig,
    frontend_url: String,
    reset_ttl_minutes: i64,
    /// Hash verified against when the email is unknown, so both login
    /// failures cost one argon2 run.
    decoy_hash: OnceCell<String>,
}

const DECOY_PASSWORD: &str = "qrmenu-decoy-password";

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        tokens: TokenService,
        mailer: Arc<dyn Mailer>,
        security: SecurityConfig,
        frontend_url: String,
        reset_ttl_minutes: i64,
    ) -> Self {
        Self {
            store,
            tokens,
            mailer,
            security,
            frontend_url,
            reset_ttl_minutes,
            decoy_hash: OnceCell::new(),
        }
    }

    fn session(&self, account: accounts::Model) -> Result<AuthSession, AuthError> {
        let token = self
            .tokens
            .issue(account.id)
            .map_err(|e| AuthError::Internal(format!("Failed to issue token: {e}")))?;

        Ok(AuthSession {
            account: account.into(),
            token,
        })
    }

    fn check_password(&self, password: &str) -> Result<(), AuthError> {
        let min = self.security.min_password_length;
        if password.chars().count() < min {
            return Err(AuthError::Validation(format!(
                "Password must be at least {min} characters"
            )));
        }
        Ok(())
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(hash_password_blocking(password.to_string(), self.security.clone()).await?)
    }

    async fn verify_decoy(&self, password: &str) -> Result<(), AuthError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await?;
        verify_password_blocking(password.to_string(), decoy.clone()).await?;
        Ok(())
    }

    /// Merges whichever payment fields were sent with the stored ones and
    /// validates the result as a whole.
    fn merge_payment(
        account: &accounts::Model,
        methods: Option<Vec<String>>,
        percents: Option<BTreeMap<String, Value>>,
    ) -> Result<Option<PaymentSettings>, AuthError> {
        if methods.is_none() && percents.is_none() {
            return Ok(None);
        }

        let current =
            PaymentSettings::from_stored(&account.payment_methods, &account.payment_method_percents);
        let methods = methods.unwrap_or(current.methods);
        let percents = percents.unwrap_or_else(|| {
            current
                .percents
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect()
        });

        Ok(Some(PaymentSettings::from_input(&methods, &percents)?))
    }
}

/// Emails are compared case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn required(value: &str, field: &str) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        let name = required(&registration.name, "Name")?;
        let restaurant_name = required(&registration.restaurant_name, "Restaurant name")?;
        let email = normalize_email(&registration.email);
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        self.check_password(&registration.password)?;

        if self.store.get_account_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash(&registration.password).await?;
        let account = self
            .store
            .create_account(NewAccount {
                name,
                email,
                password_hash,
                restaurant_name,
                phone: registration.phone.trim().to_string(),
            })
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AuthError::EmailTaken
                } else {
                    err.into()
                }
            })?;

        info!(account_id = account.id, "Account registered");
        metrics::counter!("accounts_registered_total").increment(1);

        self.session(account)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(account) = self
            .store
            .get_account_by_email(&normalize_email(email))
            .await?
        else {
            self.verify_decoy(password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let valid =
            verify_password_blocking(password.to_string(), account.password_hash.clone()).await?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.session(account)
    }

    async fn profile(&self, account_id: i32) -> Result<AccountProfile, AuthError> {
        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        Ok(account.into())
    }

    async fn update_profile(
        &self,
        account_id: i32,
        update: ProfileUpdate,
    ) -> Result<AuthSession, AuthError> {
        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        let email = match update.email.as_deref().map(normalize_email) {
            Some(email) if email.is_empty() => {
                return Err(AuthError::Validation("Email cannot be empty".to_string()));
            }
            Some(email) if email != account.email => {
                if self.store.get_account_by_email(&email).await?.is_some() {
                    return Err(AuthError::EmailTaken);
                }
                Some(email)
            }
            _ => None,
        };

        let name = update.name.as_deref().map(|n| required(n, "Name")).transpose()?;
        let restaurant_name = update
            .restaurant_name
            .as_deref()
            .map(|n| required(n, "Restaurant name"))
            .transpose()?;

        let password_hash = match update.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                self.check_password(password)?;
                Some(self.hash(password).await?)
            }
            None => None,
        };

        let payment = Self::merge_payment(
            &account,
            update.payment_methods,
            update.payment_method_percents,
        )?;

        let updated = self
            .store
            .update_account(
                account_id,
                AccountChanges {
                    name,
                    email,
                    restaurant_name,
                    phone: update.phone.map(|p| p.trim().to_string()),
                    whatsapp: update.whatsapp,
                    address: update.address,
                    instagram: update.instagram,
                    payment,
                    password_hash,
                },
            )
            .await?;

        info!(account_id, "Profile updated");
        self.session(updated)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Some(account) = self
            .store
            .get_account_by_email(&normalize_email(email))
            .await?
        else {
            return Ok(());
        };

        let (token, digest) = generate_reset_token();
        let expires_at =
            (chrono::Utc::now() + chrono::Duration::minutes(self.reset_ttl_minutes)).to_rfc3339();
        self.store
            .set_reset_token(account.id, &digest, &expires_at)
            .await?;

        let link = format!(
            "{}/reset-password/{token}",
            self.frontend_url.trim_end_matches('/')
        );
        let email = password_reset_email(&account.email, &link, self.reset_ttl_minutes);

        if let Err(e) = self.mailer.send(email).await {
            warn!(account_id = account.id, error = %e, "Failed to send password reset email");
        } else {
            info!(account_id = account.id, "Password reset email sent");
        }

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidResetToken);
        }

        let account = self
            .store
            .find_account_by_reset_token(&hash_reset_token(token))
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        self.check_password(new_password)?;
        let password_hash = self.hash(new_password).await?;
        self.store.reset_password(account.id, password_hash).await?;

        info!(account_id = account.id, "Password reset");
        Ok(())
    }

    async fn verify_token(&self, token: &str) -> Result<i32, AuthError> {
        let account_id = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::Unauthorized)?;

        // Tokens outlive deleted accounts.
        if self.store.get_account(account_id).await?.is_none() {
            return Err(AuthError::Unauthorized);
        }

        Ok(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::RecordingMailer;

    async fn service() -> SeaOrmAuthService {
        SeaOrmAuthService::new(
            Store::new("sqlite::memory:").await.unwrap(),
            TokenService::new("unit-test-secret", 1),
            Arc::new(RecordingMailer::new()),
            SecurityConfig {
                argon2_memory_cost_kib: 1024,
                argon2_time_cost: 1,
                argon2_parallelism: 1,
                ..SecurityConfig::default()
            },
            "https://app.example.com".to_string(),
            30,
        )
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_password_check() {
        let svc = service().await;
        assert!(svc.decoy_hash.get().is_none());

        let err = svc.login("nobody@example.com", "whatever1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        let decoy = svc.decoy_hash.get().unwrap();
        assert!(decoy.starts_with("$argon2id$"));

        let err = svc.login("nobody@example.com", DECOY_PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_alike() {
        let svc = service().await;
        svc.register(Registration {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "correct-horse".to_string(),
            restaurant_name: "Cantina".to_string(),
            phone: String::new(),
        })
        .await
        .unwrap();

        let wrong = svc.login("ana@example.com", "wrong-horse").await.unwrap_err();
        let unknown = svc.login("bob@example.com", "wrong-horse").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
    }
}
