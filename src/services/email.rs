//! Outgoing email for contact form notifications

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;
use crate::models::ContactMessage;

/// Receives a notification for every stored contact message
#[async_trait]
pub trait ContactNotifier: Send + Sync {
    async fn contact_received(&self, message: &ContactMessage) -> Result<()>;
}

/// Notifier used when mail is not configured
pub struct DisabledNotifier;

#[async_trait]
impl ContactNotifier for DisabledNotifier {
    async fn contact_received(&self, message: &ContactMessage) -> Result<()> {
        tracing::debug!(id = message.id, "Mail disabled, skipping contact notification");
        Ok(())
    }
}

/// SMTP notifier backed by lettre
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    notify_to: Mailbox,
}

impl EmailService {
    /// Build the SMTP transport from configuration.
    ///
    /// Fails when `smtp_host` is unset or an address does not parse.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| anyhow!("SMTP host not configured"))?;

        let from: Mailbox = config
            .from
            .as_deref()
            .ok_or_else(|| anyhow!("mail.from not configured"))?
            .parse()
            .context("Invalid mail.from address")?;
        let notify_to: Mailbox = config
            .notify_to
            .as_deref()
            .ok_or_else(|| anyhow!("mail.notify_to not configured"))?
            .parse()
            .context("Invalid mail.notify_to address")?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("Failed to create SMTP transport for {}", host))?
            .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            notify_to,
        })
    }

    fn build_notification(&self, message: &ContactMessage) -> Result<Message> {
        let subject = match &message.subject {
            Some(subject) => format!("[Zuree contact] {}", subject),
            None => format!("[Zuree contact] Message from {}", message.name),
        };

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.notify_to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        if let Ok(reply_to) = message.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        builder
            .body(notification_body(message))
            .map_err(|e| anyhow!("Failed to build email: {}", e))
    }
}

#[async_trait]
impl ContactNotifier for EmailService {
    async fn contact_received(&self, message: &ContactMessage) -> Result<()> {
        let email = self.build_notification(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;
        tracing::info!(id = message.id, "Contact notification sent");
        Ok(())
    }
}

fn notification_body(message: &ContactMessage) -> String {
    let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    format!(
        "New contact message #{id}\n\nName: {name}\nEmail: {email}\nPhone: {phone}\nCompany: {company}\nSubject: {subject}\n\n{body}\n",
        id = message.id,
        name = message.name,
        email = message.email,
        phone = optional(&message.phone),
        company = optional(&message.company),
        subject = optional(&message.subject),
        body = message.message,
    )
}
