use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::EmailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// Delivers through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("qrmenu/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build mail HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from_address.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let payload = ResendPayload {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            text: &email.text,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Mail request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail provider returned {status}: {body}");
        }

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Used when email is disabled: the message is only logged.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "Email delivery disabled, logging message instead"
        );
        Ok(())
    }
}

/// Keeps every message in memory. Lets tests read back reset links.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        self.sent.lock().await.push(email);
        Ok(())
    }
}

#[must_use]
pub fn password_reset_email(to: &str, link: &str, ttl_minutes: i64) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Restablecer contraseña".to_string(),
        text: format!(
            "Recibimos un pedido para restablecer tu contraseña.\n\n\
             Abrí este link para elegir una nueva (vence en {ttl_minutes} minutos):\n{link}\n\n\
             Si no fuiste vos, ignorá este mensaje."
        ),
        html: format!(
            "<p>Recibimos un pedido para restablecer tu contraseña.</p>\
             <p><a href=\"{link}\">Elegir una nueva contraseña</a> (vence en {ttl_minutes} minutos).</p>\
             <p>Si no fuiste vos, ignorá este mensaje.</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::new();
        mailer
            .send(password_reset_email("a@b.c", "http://x/reset-password/t", 15))
            .await
            .unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.c");
        assert!(sent[0].text.contains("http://x/reset-password/t"));
        assert!(sent[0].html.contains("15 minutos"));
    }
}
