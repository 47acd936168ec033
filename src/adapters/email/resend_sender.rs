//! Resend email delivery adapter.
//!
//! Thin client for the Resend HTTP API. Composition lives in the
//! domain and idempotency in the send store; this adapter only turns a
//! composed `EmailMessage` into one `POST /emails` call.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ResendConfig::new(api_key)
//!     .with_from("Candor", "coach@candor.app");
//!
//! let sender = ResendEmailSender::new(config);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::notification::{EmailMessage, NotificationError};
use crate::ports::EmailSender;

const RESEND_API_URL: &str = "https://api.resend.com";

/// Configuration for the Resend client.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_email: String,
    /// Base URL of the Resend API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ResendConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            from_name: "Candor".to_string(),
            from_email: "coach@candor.app".to_string(),
            base_url: RESEND_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the sender name and address.
    pub fn with_from(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.from_name = name.into();
        self.from_email = email.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Formatted "From" header value.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Resend-backed implementation of the email sender port.
pub struct ResendEmailSender {
    config: ResendConfig,
    client: Client,
}

impl ResendEmailSender {
    pub fn new(config: ResendConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn send_url(&self) -> String {
        format!("{}/emails", self.config.base_url)
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let body = SendWireRequest {
            from: self.config.from_header(),
            to: vec![message.to.clone()],
            subject: message.subject.clone(),
            html: message.html_body.clone(),
            text: message.text_body.clone(),
        };

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotificationError::delivery(format!(
                "Resend returned {}: {}",
                status, detail
            )));
        }

        if let Ok(reply) = response.json::<SendWireReply>().await {
            debug!(to = %message.to, provider_id = %reply.id, "Email dispatched");
        } else {
            debug!(to = %message.to, "Email dispatched");
        }

        Ok(())
    }
}

// ----- Resend API Types -----

#[derive(Debug, Serialize)]
struct SendWireRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct SendWireReply {
    id: String,
}
