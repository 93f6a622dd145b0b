//! Report delivery over the Resend HTTP API.
//!
//! The delivery collaborator is deliberately thin: it accepts a fully
//! assembled `OutboundEmail` and reports success or failure. Failures
//! never affect a committed price change; the workflow layer owns
//! that rule.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{info, warn};
use voicequote_core::config::EmailConfig;
use voicequote_core::workflows::{MailError, OutboundEmail, ReportMailer};

pub struct ResendMailer {
    client: Client,
    api_base_url: String,
    api_key: SecretString,
    from_address: String,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            from_address: config.from_address.clone(),
        })
    }
}

fn email_request_body(from_address: &str, email: &OutboundEmail) -> Value {
    let attachments: Vec<Value> = email
        .attachments
        .iter()
        .map(|attachment| {
            json!({
                "content": BASE64.encode(&attachment.bytes),
                "filename": attachment.filename,
            })
        })
        .collect();

    json!({
        "from": from_address,
        "to": email.to,
        "subject": email.subject,
        "html": email.html_body,
        "attachments": attachments,
    })
}

#[async_trait]
impl ReportMailer for ResendMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let body = email_request_body(&self.from_address, &email);

        let response = self
            .client
            .post(format!("{}/emails", self.api_base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| MailError(format!("email API request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail: Value = response.json().await.unwrap_or_default();
            let message = detail
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no error detail provided");
            warn!(
                event_name = "delivery.email_rejected",
                status = %status,
                error = %message,
                "email API rejected the message"
            );
            return Err(MailError(format!("email API returned {status}: {message}")));
        }

        info!(
            event_name = "delivery.email_sent",
            recipients = email.to.len(),
            attachments = email.attachments.len(),
            "report email dispatched"
        );
        Ok(())
    }
}

/// Stand-in mailer for deployments without email configured. Reports
/// success so local submissions and reprices complete; the skipped
/// dispatch is visible in logs.
pub struct NoopMailer;

#[async_trait]
impl ReportMailer for NoopMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        info!(
            event_name = "delivery.email_skipped",
            recipients = email.to.len(),
            subject = %email.subject,
            "email delivery disabled; message not sent"
        );
        Ok(())
    }
}

pub fn build_mailer(config: &EmailConfig) -> Arc<dyn ReportMailer> {
    if config.enabled {
        if let Some(mailer) = ResendMailer::new(config) {
            return Arc::new(mailer);
        }
        // Config validation requires a key when enabled, so this only
        // happens for hand-built configs.
        warn!("email enabled but no api key present; falling back to noop mailer");
    }
    Arc::new(NoopMailer)
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use voicequote_core::workflows::{EmailAttachment, OutboundEmail};

    use super::email_request_body;

    #[test]
    fn request_body_matches_the_delivery_contract() {
        let email = OutboundEmail {
            to: vec!["grace@flowmatic.example".to_string()],
            subject: "Updated Voice AI cost analysis for Flowmatic".to_string(),
            html_body: "<p>report attached</p>".to_string(),
            attachments: vec![EmailAttachment {
                filename: "voice-ai-cost-analysis.pdf".to_string(),
                content_type: "application/pdf",
                bytes: b"%PDF-1.4 fake".to_vec(),
            }],
        };

        let body = email_request_body("Voice AI <onboarding@resend.dev>", &email);

        assert_eq!(body["from"], "Voice AI <onboarding@resend.dev>");
        assert_eq!(body["to"][0], "grace@flowmatic.example");
        assert_eq!(body["attachments"][0]["filename"], "voice-ai-cost-analysis.pdf");

        let encoded = body["attachments"][0]["content"].as_str().expect("base64 string");
        assert_eq!(BASE64.decode(encoded).expect("valid base64"), b"%PDF-1.4 fake");
    }

    #[test]
    fn request_body_handles_no_attachments() {
        let email = OutboundEmail {
            to: vec!["a@b.example".to_string(), "c@d.example".to_string()],
            subject: "subject".to_string(),
            html_body: "<p>body</p>".to_string(),
            attachments: Vec::new(),
        };

        let body = email_request_body("from@example.com", &email);
        assert_eq!(body["to"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["attachments"].as_array().map(Vec::len), Some(0));
    }
}
