//! Email service for outbound notification mail.
//!
//! Delivery is best-effort: callers log and swallow failures so a broken SMTP
//! relay never blocks the request that triggered the notification.

use lendlocal_common::config::EmailConfig;
use lendlocal_common::{AppError, AppResult};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::str::FromStr;

/// Async SMTP email sender.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailService {
    /// Build the SMTP transport from configuration.
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let builder = if config.smtp_use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| AppError::Email(format!("Failed to create SMTP transport: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        }
        .port(config.smtp_port);

        let builder = if let (Some(username), Some(password)) =
            (&config.smtp_username, &config.smtp_password)
        {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            builder
        };

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }

    /// Send a notification email with plain-text and HTML parts.
    pub async fn send_notification(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        link: &str,
    ) -> AppResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_address
        ))
        .map_err(|e| AppError::Email(format!("Invalid from address: {e}")))?;

        let to_mailbox =
            Mailbox::from_str(to).map_err(|e| AppError::Email(format!("Invalid to address: {e}")))?;

        let text_body = format!("{body}\n\n{link}");
        let html_body = format!(
            r#"<html><body><p>{}</p><p><a href="{link}">View on LendLocal</a></p></body></html>"#,
            body.replace('\n', "<br>")
        );

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::Email(format!("Failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::Email(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}
