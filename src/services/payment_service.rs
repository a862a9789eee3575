//! Hosted payment gateway (Moneroo): session initialisation, server-side
//! verification and webhook signatures.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::MonerooConfig;

pub const PROVIDER_MONEROO: &str = "moneroo";
pub const CURRENCY_XOF: &str = "XOF";

const SUCCESS_STATUSES: &[&str] = &["success", "paid", "completed"];

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway is not configured")]
    NotConfigured,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentInit {
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub return_url: String,
    pub customer: PaymentCustomer,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    pub checkout_url: String,
    pub payment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentVerification {
    pub status: String,
}

impl PaymentVerification {
    pub fn is_success(&self) -> bool {
        let status = self.status.trim().to_ascii_lowercase();
        SUCCESS_STATUSES.contains(&status.as_str())
    }
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Provider name stamped on orders paid through this gateway.
    fn provider(&self) -> &'static str;

    /// Opens a hosted checkout session and returns where to send the shopper.
    async fn initialize(&self, init: PaymentInit) -> Result<PaymentSession, GatewayError>;

    /// Asks the provider for the authoritative status of a payment.
    async fn verify(&self, payment_id: String) -> Result<PaymentVerification, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct MonerooGateway {
    config: MonerooConfig,
    http: Client,
}

impl MonerooGateway {
    pub fn new(config: MonerooConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitData {
    id: Option<String>,
    checkout_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: Option<String>,
}

#[async_trait]
impl PaymentGateway for MonerooGateway {
    fn provider(&self) -> &'static str {
        PROVIDER_MONEROO
    }

    async fn initialize(&self, init: PaymentInit) -> Result<PaymentSession, GatewayError> {
        let url = format!("{}/v1/payments/initialize", self.config.api_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .header("Accept", "application/json")
            .json(&init)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::UnexpectedResponse(format!(
                "initialize failed with status {status}: {text}"
            )));
        }

        let parsed: Envelope<InitData> = response.json().await?;
        let data = parsed.data.ok_or_else(|| {
            GatewayError::UnexpectedResponse("initialize response has no data".into())
        })?;
        let checkout_url = data.checkout_url.filter(|u| !u.is_empty()).ok_or_else(|| {
            GatewayError::UnexpectedResponse("initialize response has no checkout_url".into())
        })?;

        Ok(PaymentSession {
            checkout_url,
            payment_id: data.id,
        })
    }

    async fn verify(&self, payment_id: String) -> Result<PaymentVerification, GatewayError> {
        let url = format!("{}/v1/payments/{}/verify", self.config.api_url, payment_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::UnexpectedResponse(format!(
                "verify failed with status {status}: {text}"
            )));
        }

        let parsed: Envelope<VerifyData> = response.json().await?;
        let status = parsed
            .data
            .and_then(|d| d.status)
            .ok_or_else(|| GatewayError::UnexpectedResponse("verify response has no status".into()))?;

        Ok(PaymentVerification { status })
    }
}

/// Stand-in used when no gateway credentials are configured; every call fails.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredGateway {
    fn provider(&self) -> &'static str {
        PROVIDER_MONEROO
    }

    async fn initialize(&self, _init: PaymentInit) -> Result<PaymentSession, GatewayError> {
        Err(GatewayError::NotConfigured)
    }

    async fn verify(&self, _payment_id: String) -> Result<PaymentVerification, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

/// Hex HMAC-SHA256 of a webhook body, as sent in `X-Moneroo-Signature`.
pub fn sign_webhook(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: Option<String>,
    pub data: Option<WebhookData>,
    pub payment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub id: Option<String>,
    pub payment_id: Option<String>,
}

impl WebhookEvent {
    pub fn is_payment_success(&self) -> bool {
        self.event.as_deref() == Some("payment.success")
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.id.as_deref().or(d.payment_id.as_deref()))
            .or(self.payment_id.as_deref())
    }
}
