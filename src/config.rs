use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct MonerooConfig {
    pub api_url: String,
    pub secret_key: String,
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub whatsapp_from: String,
    pub admin_to: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub public_base_url: String,
    pub storage_dir: Option<PathBuf>,
    pub checkout_payload_ttl: Duration,
    pub moneroo: Option<MonerooConfig>,
    pub twilio: Option<TwilioConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .trim_end_matches('/')
            .to_string();
        let checkout_payload_ttl = env::var("CHECKOUT_PAYLOAD_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(3600));

        let moneroo = non_empty("MONEROO_SECRET_KEY").map(|secret_key| MonerooConfig {
            api_url: non_empty("MONEROO_API_URL")
                .unwrap_or_else(|| "https://api.moneroo.io".to_string()),
            secret_key,
            webhook_secret: non_empty("MONEROO_WEBHOOK_SECRET"),
        });

        let twilio = match (
            non_empty("TWILIO_ACCOUNT_SID"),
            non_empty("TWILIO_AUTH_TOKEN"),
            non_empty("ADMIN_WHATSAPP_TO"),
        ) {
            (Some(account_sid), Some(auth_token), Some(admin_to)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                whatsapp_from: non_empty("TWILIO_WHATSAPP_FROM")
                    .unwrap_or_else(|| "whatsapp:+14155238886".to_string()),
                admin_to,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret: non_empty("JWT_SECRET"),
            public_base_url,
            storage_dir: non_empty("STORAGE_DIR").map(PathBuf::from),
            checkout_payload_ttl,
            moneroo,
            twilio,
        })
    }

    /// Where the hosted checkout sends the shopper back to.
    pub fn payment_return_url(&self) -> String {
        format!("{}/payment/return", self.public_base_url)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
