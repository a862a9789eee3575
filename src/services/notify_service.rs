//! New-order alerts over WhatsApp. Always best effort: callers go through
//! [`notify_best_effort`], which logs failures and never propagates them.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use thiserror::Error;
use uuid::Uuid;

use crate::{cart::pricing::format_fcfa, checkout::payload::OrderLineSnapshot, config::TwilioConfig};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderNotice {
    pub order_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub total: i64,
    pub lines: Vec<OrderLineSnapshot>,
}

#[automock]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn notify_new_order(&self, notice: NewOrderNotice) -> Result<(), NotifyError>;
}

/// Result of a fire-and-forget notification. Nothing downstream depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    Failed,
}

pub async fn notify_best_effort(
    notifier: &dyn OrderNotifier,
    notice: NewOrderNotice,
) -> NotificationOutcome {
    let order_id = notice.order_id;
    match notifier.notify_new_order(notice).await {
        Ok(()) => NotificationOutcome::Sent,
        Err(err) => {
            tracing::warn!(error = %err, %order_id, "new order notification failed");
            NotificationOutcome::Failed
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn notify_new_order(&self, notice: NewOrderNotice) -> Result<(), NotifyError> {
        tracing::info!(
            order_id = %notice.order_id,
            customer = %notice.customer_name,
            total = notice.total,
            lines = notice.lines.len(),
            "new order"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TwilioWhatsAppNotifier {
    config: TwilioConfig,
    http: Client,
}

impl TwilioWhatsAppNotifier {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    async fn send(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("From", self.config.whatsapp_from.as_str()),
                ("To", to),
                ("Body", body),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl OrderNotifier for TwilioWhatsAppNotifier {
    async fn notify_new_order(&self, notice: NewOrderNotice) -> Result<(), NotifyError> {
        self.send(&self.config.admin_to, &admin_message(&notice))
            .await?;

        if let Some(to) = whatsapp_address(&notice.customer_phone) {
            if let Err(err) = self.send(&to, &customer_message(&notice)).await {
                tracing::warn!(error = %err, order_id = %notice.order_id, "customer whatsapp not sent");
            }
        }

        Ok(())
    }
}

pub fn admin_message(notice: &NewOrderNotice) -> String {
    let lines: Vec<String> = notice
        .lines
        .iter()
        .map(|line| {
            let qty = line.quantity.max(1);
            let variant = format!(" ({} - {}\")", line.color, line.length);
            let price = if line.unit_price > 0 {
                format!(" — {} x{qty}", format_fcfa(line.unit_price))
            } else {
                format!(" x{qty}")
            };
            format!("• Produit #{}{variant}{price}", line.product_id)
        })
        .collect();

    let details = if lines.is_empty() {
        "— Aucun item trouvé".to_string()
    } else {
        lines.join("\n")
    };

    format!(
        "🛒 Nouvelle commande #{}\nNom: {}\nTéléphone client: {}\nTotal: {}\n\n📦 Détails:\n{}",
        notice.order_id,
        non_blank(&notice.customer_name, "-"),
        non_blank(&notice.customer_phone, "-"),
        format_fcfa(notice.total),
        details
    )
}

pub fn customer_message(notice: &NewOrderNotice) -> String {
    format!(
        "Bonjour {} 👋\n\nVotre commande *#{}* a bien été reçue ✅\n💰 Total : *{}*\n\nNous vous contacterons très bientôt.\nMerci pour votre confiance 💖\n\n— BelléaWigs",
        non_blank(&notice.customer_name, "Bonjour"),
        notice.order_id,
        format_fcfa(notice.total)
    )
}

/// `whatsapp:+<digits>` for a phone number; `None` when there is nothing to send to.
pub fn whatsapp_address(phone: &str) -> Option<String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return None;
    }
    if phone.to_ascii_lowercase().starts_with("whatsapp:") {
        return Some(phone.to_string());
    }
    Some(format!("whatsapp:+{}", phone.trim_start_matches('+')))
}

fn non_blank<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() { fallback } else { value }
}
