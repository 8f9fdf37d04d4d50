//! Email service and the order-notification queue.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Handlers
//! never await SMTP: they enqueue an [`OrderNotification`] and a background
//! worker delivers it with retries. A failed notification never fails the
//! order that triggered it.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::EmailConfig;

/// Delivery attempts per notification before giving up.
const MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Initial backoff between attempts; doubles each retry.
const RETRY_BACKOFF: std::time::Duration = std::time::Duration::from_millis(500);

/// Queue depth before enqueues start getting dropped.
const QUEUE_CAPACITY: usize = 64;

/// HTML template for the new-order notification.
#[derive(Template)]
#[template(path = "email/order_notification.html")]
struct OrderNotificationHtml<'a> {
    name: &'a str,
    order_ref: &'a str,
    order_items: &'a str,
    total_amount: &'a str,
    address: &'a str,
    payment_mode: &'a str,
}

/// Plain text template for the new-order notification.
#[derive(Template)]
#[template(path = "email/order_notification.txt")]
struct OrderNotificationText<'a> {
    name: &'a str,
    order_ref: &'a str,
    order_items: &'a str,
    total_amount: &'a str,
    address: &'a str,
    payment_mode: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A placed order, summarized for the store-owner notification mail.
#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub customer_name: String,
    pub order_ref: String,
    /// Comma-joined product names.
    pub items_summary: String,
    pub total_amount: Decimal,
    pub address_line: String,
    pub payment_mode: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    notification_recipient: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay host is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            notification_recipient: config.notification_recipient.clone(),
        })
    }

    /// Send the new-order notification to the store owner.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_order_notification(
        &self,
        notification: &OrderNotification,
    ) -> Result<(), EmailError> {
        let total = notification.total_amount.to_string();
        let html = OrderNotificationHtml {
            name: &notification.customer_name,
            order_ref: &notification.order_ref,
            order_items: &notification.items_summary,
            total_amount: &total,
            address: &notification.address_line,
            payment_mode: &notification.payment_mode,
        }
        .render()?;
        let text = OrderNotificationText {
            name: &notification.customer_name,
            order_ref: &notification.order_ref,
            order_items: &notification.items_summary,
            total_amount: &total,
            address: &notification.address_line,
            payment_mode: &notification.payment_mode,
        }
        .render()?;

        self.send_multipart_email(
            &self.notification_recipient,
            "New order received",
            &text,
            &html,
        )
        .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Handle for enqueueing order notifications from request handlers.
///
/// Cloneable; the background worker owns the receiving end. When email is not
/// configured the worker still drains the queue so enqueues stay cheap.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<OrderNotification>,
}

impl NotificationQueue {
    /// Spawn the delivery worker and return the enqueue handle.
    #[must_use]
    pub fn spawn(service: Option<EmailService>) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);

        tokio::spawn(delivery_worker(receiver, service));

        Self { sender }
    }

    /// Enqueue a notification. Best-effort: a full or closed queue drops the
    /// notification with a warning.
    pub fn enqueue(&self, notification: OrderNotification) {
        if let Err(e) = self.sender.try_send(notification) {
            tracing::warn!(error = %e, "Dropping order notification, queue unavailable");
        }
    }
}

/// Drain the queue, delivering each notification with bounded retries.
async fn delivery_worker(
    mut receiver: mpsc::Receiver<OrderNotification>,
    service: Option<EmailService>,
) {
    while let Some(notification) = receiver.recv().await {
        let Some(service) = &service else {
            tracing::debug!(order = %notification.order_ref, "Email not configured, skipping notification");
            continue;
        };

        let mut backoff = RETRY_BACKOFF;
        for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
            match service.send_order_notification(&notification).await {
                Ok(()) => break,
                Err(e) if attempt < MAX_DELIVERY_ATTEMPTS => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        order = %notification.order_ref,
                        "Order notification failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        order = %notification.order_ref,
                        "Order notification failed after {MAX_DELIVERY_ATTEMPTS} attempts"
                    );
                }
            }
        }
    }
}

/// Flatten an address snapshot into a single display line for the email.
#[must_use]
pub fn format_address_line(address: Option<&serde_json::Value>) -> String {
    let Some(serde_json::Value::Object(map)) = address else {
        return "-".to_owned();
    };

    let parts: Vec<&str> = map.values().filter_map(serde_json::Value::as_str).collect();
    if parts.is_empty() {
        "-".to_owned()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_address_line() {
        let address = json!({"name": "Jane", "street": "12 Main St", "city": "Pune"});
        let line = format_address_line(Some(&address));
        assert!(line.contains("Jane"));
        assert!(line.contains("Pune"));
    }

    #[test]
    fn test_format_address_line_missing() {
        assert_eq!(format_address_line(None), "-");
        assert_eq!(format_address_line(Some(&json!({}))), "-");
    }

    #[test]
    fn test_notification_templates_render() {
        let html = OrderNotificationHtml {
            name: "Jane",
            order_ref: "42",
            order_items: "Ceiling Fan, LED Bulb Pack",
            total_amount: "169.98",
            address: "12 Main St, Pune",
            payment_mode: "Cash on Delivery",
        }
        .render()
        .unwrap();
        assert!(html.contains("Ceiling Fan"));
        assert!(html.contains("169.98"));

        let text = OrderNotificationText {
            name: "Jane",
            order_ref: "42",
            order_items: "Ceiling Fan",
            total_amount: "149.99",
            address: "-",
            payment_mode: "Online Payment",
        }
        .render()
        .unwrap();
        assert!(text.contains("Online Payment"));
    }
}
