//! SMTP delivery through lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::MailConfig;
use crate::error::{Error, Result};
use crate::record::HandoverRecord;

use super::{message_body, Delivery, Notifier};

/// Sends notifications through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
    subject: String,
    relay: String,
}

fn parse_mailbox(role: &str, address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| Error::mail(format!("invalid {role} address {address:?}: {e}")))
}

impl SmtpNotifier {
    /// Build a notifier from mail configuration.
    ///
    /// No connection is made here; the relay is contacted per message.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender or any recipient is not a valid
    /// mailbox, or TLS parameters for the relay cannot be built.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let sender = config
            .sender()
            .ok_or_else(|| Error::mail("no sender address configured"))
            .and_then(|address| parse_mailbox("sender", address))?;

        let recipients = config
            .recipients
            .iter()
            .map(|address| parse_mailbox("recipient", address))
            .collect::<Result<Vec<_>>>()?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                .map_err(|e| Error::mail(format!("relay {}: {e}", config.server)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            sender,
            recipients,
            subject: config.subject.clone(),
            relay: format!("{}:{}", config.server, config.port),
        })
    }

    /// Build the mail for one record.
    ///
    /// # Errors
    ///
    /// Returns an error if lettre rejects the message.
    pub fn message(&self, record: &HandoverRecord) -> Result<Message> {
        let builder = self
            .recipients
            .iter()
            .cloned()
            .fold(Message::builder().from(self.sender.clone()), |b, to| {
                b.to(to)
            });

        builder
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message_body(record))
            .map_err(|e| Error::mail(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, record: &HandoverRecord) -> Delivery {
        let message = match self.message(record) {
            Ok(message) => message,
            Err(e) => return Delivery::failed(e.to_string()),
        };

        debug!(id = record.id, relay = %self.relay, "Sending handover notification");
        match self.transport.send(message).await {
            Ok(_) => Delivery::Sent,
            Err(e) => Delivery::failed(format!("{}: {e}", self.relay)),
        }
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("relay", &self.relay)
            .field("sender", &self.sender.to_string())
            .field("recipients", &self.recipients.len())
            .finish_non_exhaustive()
    }
}
