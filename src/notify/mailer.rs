use crate::core::config::MailConfig;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outbound mail collaborator: confirmation codes are POSTed as JSON to a
/// configured gateway endpoint.
pub struct Mailer {
    client: reqwest::Client,
    endpoint: String,
    from_address: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            from_address: config.from_address.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn confirmation_message(&self, to: &str, code: &str) -> MailMessage {
        MailMessage {
            from: self.from_address.clone(),
            to: to.to_string(),
            subject: "Confirmation code".to_string(),
            body: format!("Your code: {}", code),
        }
    }

    pub async fn send(&self, message: MailMessage) -> Result<()> {
        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to mail gateway")?;

        if !response.status().is_success() {
            bail!("Mail gateway returned error status: {}", response.status());
        }

        Ok(())
    }

    /// Fire-and-forget dispatch of a confirmation code. Delivery failure
    /// is logged and never rolls back the registration that triggered it.
    pub fn dispatch_confirmation_code(self: &Arc<Self>, to: &str, code: &str) {
        let mailer = Arc::clone(self);
        let message = self.confirmation_message(to, code);
        let recipient = to.to_string();

        tokio::spawn(async move {
            match mailer.send(message).await {
                Ok(()) => {
                    debug!(to = %recipient, "Confirmation code dispatched");
                }
                Err(e) => {
                    warn!(to = %recipient, error = %e, "Failed to dispatch confirmation code");
                }
            }
        });
    }
}
