//! Domain service for accounts and authentication.
//!
//! Handles registration, login, profile edits, bearer token verification
//! and the password reset flow.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::entities::accounts;
use crate::models::payment::{PaymentError, PaymentSettings};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Account not found")]
    NotFound,

    #[error("Invalid or expired token")]
    InvalidResetToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<PaymentError> for AuthError {
    fn from(err: PaymentError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub restaurant_name: String,
    pub phone: String,
}

/// Partial profile edit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub restaurant_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub payment_methods: Option<Vec<String>>,
    pub payment_method_percents: Option<BTreeMap<String, Value>>,
    pub password: Option<String>,
}

/// Account as shown to its owner. Never carries hashes or reset tokens.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub restaurant_name: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub instagram: Option<String>,
    pub payment_methods: Vec<String>,
    pub payment_method_percents: BTreeMap<String, f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<accounts::Model> for AccountProfile {
    fn from(account: accounts::Model) -> Self {
        let payment =
            PaymentSettings::from_stored(&account.payment_methods, &account.payment_method_percents);

        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            restaurant_name: account.restaurant_name,
            phone: account.phone,
            whatsapp: account.whatsapp,
            address: account.address,
            instagram: account.instagram,
            payment_methods: payment.methods,
            payment_method_percents: payment.percents,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Profile plus a freshly issued bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub account: AccountProfile,
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] when the email is already registered.
    async fn register(&self, registration: Registration) -> Result<AuthSession, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the email is unknown or
    /// the password does not match.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn profile(&self, account_id: i32) -> Result<AccountProfile, AuthError>;

    /// Applies a partial update and re-issues the token.
    async fn update_profile(
        &self,
        account_id: i32,
        update: ProfileUpdate,
    ) -> Result<AuthSession, AuthError>;

    /// Starts a reset for `email` if it belongs to an account. Succeeds
    /// either way so callers cannot probe for registered addresses.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::InvalidResetToken`] for unknown, used or expired tokens.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// Resolves a bearer token to the account id it was issued for.
    async fn verify_token(&self, token: &str) -> Result<i32, AuthError>;
}
