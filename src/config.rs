//! Configuration loaded from environment variables.
//!
//! Everything the bot needs comes from the environment (a `.env` file is
//! honored in `main`). `BOT_TOKEN` is the only required variable; the rest
//! fall back to the production defaults of the original deployment.

use anyhow::{bail, Result};
use std::env;
use std::time::Duration;

const DEFAULT_WEBHOOK_PATH: &str = "/tg/webhook";
const DEFAULT_API_URL: &str = "https://foodyback-production.up.railway.app";
const DEFAULT_MERCHANT_URL: &str = "https://foody-reg.vercel.app";
const DEFAULT_BUYER_URL: &str = "https://foody-buyer.vercel.app";
const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PORT: u16 = 8000;

/// Which contact detail completes the registration dialogue.
///
/// The deployed variants disagreed on this, so it is a configurable
/// strategy instead of a hardcoded flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactMode {
    Email,
    Address,
    Location,
}

impl ContactMode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "address" => Ok(Self::Address),
            "location" => Ok(Self::Location),
            other => bail!("CONTACT_MODE must be email, address or location (got {other:?})"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bot_token: String,
    /// Public base URL of this service. Unset means long-polling mode.
    pub public_url: Option<String>,
    pub webhook_path: String,
    /// Shared secret echoed back by Telegram in a request header.
    pub webhook_secret: Option<String>,
    /// Marketplace backend base URL.
    pub api_url: String,
    pub merchant_app_url: String,
    pub buyer_app_url: String,
    /// Mini-app buttons when true, plain URL buttons otherwise.
    pub use_webapp: bool,
    pub contact_mode: ContactMode,
    pub backend_timeout: Duration,
    pub database_url: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = match lookup("BOT_TOKEN") {
            Some(token) if !token.trim().is_empty() => token,
            _ => bail!("BOT_TOKEN env is required"),
        };

        let public_url = lookup("BACKEND_PUBLIC")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let webhook_secret = lookup("WEBHOOK_SECRET").filter(|secret| !secret.is_empty());

        let use_webapp = lookup("USE_WEBAPP")
            .map(|raw| !matches!(raw.as_str(), "0" | "false" | "False"))
            .unwrap_or(true);

        let contact_mode = match lookup("CONTACT_MODE") {
            Some(raw) => ContactMode::parse(&raw)?,
            None => ContactMode::Email,
        };

        let backend_timeout = match lookup("BACKEND_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .map_err(|_| anyhow::anyhow!("BACKEND_TIMEOUT_SECS must be a number"))?,
            ),
            None => Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a number"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            bot_token,
            public_url,
            webhook_path: lookup("WEBHOOK_PATH")
                .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string()),
            webhook_secret,
            api_url: trimmed_or(lookup("API_URL"), DEFAULT_API_URL),
            merchant_app_url: trimmed_or(lookup("WEBAPP_MERCHANT_URL"), DEFAULT_MERCHANT_URL),
            buyer_app_url: trimmed_or(lookup("WEBAPP_BUYER_URL"), DEFAULT_BUYER_URL),
            use_webapp,
            contact_mode,
            backend_timeout,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port,
        })
    }

    /// Full public webhook URL, or `None` when no public base is configured.
    pub fn webhook_url(&self) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{}{}", base, self.webhook_path))
    }
}

fn trimmed_or(value: Option<String>, default: &str) -> String {
    value
        .map(|url| url.trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| default.to_string())
}
