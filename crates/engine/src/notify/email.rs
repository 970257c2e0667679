use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use common::errors::NotifyError;

use crate::notify::AlertSink;

/// Email sink that posts JSON to an HTTP mail gateway. The gateway owns SMTP;
/// the engine only ever speaks HTTP.
pub struct EmailSink {
    client: Client,
    endpoint: String,
    from: String,
    to: String,
}

impl EmailSink {
    pub fn new(
        endpoint: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError {
                sink: "email",
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            from: from.into(),
            to: to.into(),
        })
    }
}

#[async_trait]
impl AlertSink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "from": self.from,
            "to": self.to,
            "subject": subject,
            "text": body,
        });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError {
                sink: "email",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(NotifyError {
                sink: "email",
                message: format!("gateway returned HTTP {}", response.status().as_u16()),
            });
        }
        Ok(())
    }
}
