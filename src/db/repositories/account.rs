use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::accounts;
use crate::models::payment::PaymentSettings;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub restaurant_name: String,
    pub phone: String,
}

/// Field-level profile changes. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub restaurant_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub payment: Option<PaymentSettings>,
    pub password_hash: Option<String>,
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, account: NewAccount) -> Result<accounts::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let (methods, percents) = PaymentSettings::default().to_stored();

        let active = accounts::ActiveModel {
            name: Set(account.name),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            restaurant_name: Set(account.restaurant_name),
            phone: Set(account.phone),
            whatsapp: Set(None),
            address: Set(None),
            instagram: Set(None),
            payment_methods: Set(methods),
            payment_method_percents: Set(percents),
            reset_token_hash: Set(None),
            reset_token_expires_at: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert account")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<accounts::Model>> {
        accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<accounts::Model>> {
        accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query account by email")
    }

    pub async fn update(&self, id: i32, changes: AccountChanges) -> Result<accounts::Model> {
        let account = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(restaurant_name) = changes.restaurant_name {
            active.restaurant_name = Set(restaurant_name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(whatsapp) = changes.whatsapp {
            active.whatsapp = Set(blank_to_none(whatsapp));
        }
        if let Some(address) = changes.address {
            active.address = Set(blank_to_none(address));
        }
        if let Some(instagram) = changes.instagram {
            active.instagram = Set(blank_to_none(instagram));
        }
        if let Some(payment) = changes.payment {
            let (methods, percents) = payment.to_stored();
            active.payment_methods = Set(methods);
            active.payment_method_percents = Set(percents);
        }
        if let Some(hash) = changes.password_hash {
            active.password_hash = Set(hash);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to update account")
    }

    pub async fn set_reset_token(&self, id: i32, token_hash: &str, expires_at: &str) -> Result<()> {
        let account = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let mut active: accounts::ActiveModel = account.into();
        active.reset_token_hash = Set(Some(token_hash.to_string()));
        active.reset_token_expires_at = Set(Some(expires_at.to_string()));
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Looks up the account holding `token_hash` whose token has not expired.
    pub async fn find_by_valid_reset_token(
        &self,
        token_hash: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<accounts::Model>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::ResetTokenHash.eq(token_hash))
            .one(&self.conn)
            .await
            .context("Failed to query account by reset token")?;

        Ok(account.filter(|a| {
            a.reset_token_expires_at
                .as_deref()
                .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
                .is_some_and(|expires| expires > now)
        }))
    }

    /// Sets a new password hash and consumes any pending reset token.
    pub async fn reset_password(&self, id: i32, password_hash: String) -> Result<()> {
        let account = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let mut active: accounts::ActiveModel = account.into();
        active.password_hash = Set(password_hash);
        active.reset_token_hash = Set(None);
        active.reset_token_expires_at = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string. Parameters are read from
/// the hash itself, so hashes made with older cost settings still verify.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Argon2 is CPU-bound; run it off the async workers.
pub async fn hash_password_blocking(password: String, config: SecurityConfig) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password_blocking(password: String, password_hash: String) -> Result<bool> {
    task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22", &cheap()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none("  ".to_string()), None);
        assert_eq!(blank_to_none(" @bar ".to_string()).as_deref(), Some("@bar"));
    }
}
