//! Notifier — composes the disclosure summary and hands it to a mail service.
//!
//! Mail failures are recovered here: `notify` logs them and reports a
//! `NotifyOutcome::Failed` value instead of returning an error, so a broken
//! mail service never fails the run.

use crate::config::{MailConfig, RunContext};
use crate::domain::TradeRecord;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// A plain-text message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail service unreachable: {0}")]
    Transport(String),

    #[error("mail service rejected message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Transactional mail service.
pub trait Mailer {
    /// Submit one message; returns the service's HTTP status on acceptance.
    fn send(&self, message: &EmailMessage) -> Result<u16, MailError>;
}

/// What `notify` did with the trade list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Nothing to report; the mailer was not called.
    Skipped,
    Sent { status: u16 },
    /// Send failed; already logged.
    Failed { reason: String },
}

pub fn subject_for(trader: &str) -> String {
    format!("New trade disclosures for {trader}")
}

/// One block per trade, in the order given.
pub fn compose_body(trades: &[TradeRecord], pdf_base_url: &str) -> String {
    let mut body = String::new();
    for (i, trade) in trades.iter().enumerate() {
        if i > 0 {
            body.push('\n');
        }
        body.push_str(&format!(
            "Date: {}\nDocument ID: {}\nPDF: {}\n",
            trade.disclosure_date,
            trade.document_id,
            trade.pdf_url(pdf_base_url)
        ));
    }
    body
}

pub fn compose_message(trades: &[TradeRecord], ctx: &RunContext) -> EmailMessage {
    EmailMessage {
        from: ctx.from_email.clone(),
        to: ctx.to_email.clone(),
        subject: subject_for(&ctx.trader_name),
        body: compose_body(trades, &ctx.pdf_base_url),
    }
}

/// Email the whole trade list. An empty list sends nothing.
pub fn notify(trades: &[TradeRecord], ctx: &RunContext, mailer: &dyn Mailer) -> NotifyOutcome {
    if trades.is_empty() {
        return NotifyOutcome::Skipped;
    }

    let message = compose_message(trades, ctx);
    match mailer.send(&message) {
        Ok(status) => {
            info!(status, to = %message.to, trades = trades.len(), "notification sent");
            NotifyOutcome::Sent { status }
        }
        Err(e) => {
            warn!(error = %e, "notification failed, continuing");
            NotifyOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

// ── SendGrid v3 ──

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl<'a> SendRequest<'a> {
    fn plain_text(message: &'a EmailMessage) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address { email: &message.to }],
            }],
            from: Address {
                email: &message.from,
            },
            subject: &message.subject,
            content: vec![Content {
                content_type: "text/plain",
                value: &message.body,
            }],
        }
    }
}

/// SendGrid mail-send endpoint authenticated with a bearer API key.
pub struct SendGridMailer {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
}

impl SendGridMailer {
    pub fn new(config: &MailConfig, api_key: impl Into<String>) -> Result<Self, MailError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MailError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
        })
    }
}

impl Mailer for SendGridMailer {
    fn send(&self, message: &EmailMessage) -> Result<u16, MailError> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest::plain_text(message))
            .send()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(status.as_u16())
    }
}
