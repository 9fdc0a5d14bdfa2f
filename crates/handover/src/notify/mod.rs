//! Submission notifications.
//!
//! Every new handover record triggers one best-effort mail to IT staff.
//! A [`Notifier`] never fails the request that triggered it: it reports a
//! [`Delivery`] and the caller logs it and moves on.

mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::MailConfig;
use crate::error::Result;
use crate::record::{Field, HandoverRecord};

pub use smtp::SmtpNotifier;

/// The outcome of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The relay accepted the message.
    Sent,
    /// Nothing was sent because notifications are switched off.
    Skipped {
        /// Why nothing was sent.
        reason: String,
    },
    /// The attempt failed. The record is stored regardless.
    Failed {
        /// What went wrong.
        reason: String,
    },
}

impl Delivery {
    /// Create a skipped outcome.
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Create a failed outcome.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Sends a summary of a new handover record to staff.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Notify about a newly stored record.
    ///
    /// Implementations must not panic and must report every failure through
    /// [`Delivery::Failed`].
    async fn notify(&self, record: &HandoverRecord) -> Delivery;
}

/// A notifier that never sends anything.
#[derive(Debug, Clone)]
pub struct DisabledNotifier {
    reason: String,
}

impl DisabledNotifier {
    /// Create a disabled notifier that reports `reason` for every record.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, _record: &HandoverRecord) -> Delivery {
        Delivery::skipped(self.reason.clone())
    }
}

/// Build the notifier described by the mail configuration.
///
/// # Errors
///
/// Returns an error if mail is active but the sender or a recipient is not a
/// valid mailbox, or the relay settings are unusable.
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Notifier>> {
    if !config.enabled {
        info!("Mail notifications disabled by configuration");
        return Ok(Arc::new(DisabledNotifier::new("mail disabled")));
    }
    if config.recipients.is_empty() {
        info!("No mail recipients configured; notifications will be skipped");
        return Ok(Arc::new(DisabledNotifier::new("no recipients configured")));
    }

    let notifier = SmtpNotifier::new(config)?;
    info!(
        relay = %config.server,
        port = config.port,
        recipients = config.recipients.len(),
        "Mail notifications enabled"
    );
    Ok(Arc::new(notifier))
}

/// Plain-text body of a notification mail.
#[must_use]
pub fn message_body(record: &HandoverRecord) -> String {
    let value = |field: Field| record.text(field);

    [
        "New IT Asset Handover Submission".to_string(),
        String::new(),
        format!("Record ID: {}", record.id),
        format!("Date: {}", value(Field::Date)),
        format!("Employee Name: {}", value(Field::EmployeeName)),
        format!("ID / Iqama Number: {}", value(Field::NationalId)),
        format!("Job Title: {}", value(Field::JobTitle)),
        format!("Department / Location: {}", value(Field::Department)),
        format!("Asset Receipt Date: {}", value(Field::AssetReceiptDate)),
        format!("Return Date: {}", value(Field::ReturnDate)),
        String::new(),
        "Asset Details:".to_string(),
        format!("- Item Name: {}", value(Field::ItemName)),
        format!("- Model: {}", value(Field::Model)),
        format!("- Serial: {}", value(Field::Serial)),
        format!("- Color: {}", value(Field::Color)),
        format!("- Condition: {}", value(Field::Condition)),
        format!("- Accessories: {}", value(Field::Accessories)),
        String::new(),
        format!("Notes: {}", value(Field::Notes)),
    ]
    .join("\n")
}
