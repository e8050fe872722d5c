//! Backend Client module wrapping outbound calls to the Foody marketplace API.
//!
//! Every call is a single attempt with a bounded timeout: no retries, no
//! backoff. Failures come back as a typed [`BackendError`] and the caller is
//! responsible for turning it into a user-facing message.

use anyhow::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::dialogue::ContactInfo;

const ERROR_BODY_LIMIT: usize = 200;

/// Failure of one backend call.
#[derive(Debug, Clone)]
pub enum BackendError {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The backend answered with a non-success status.
    Status(u16, String),
    /// Connection, DNS or response-decoding failure.
    Network(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Timeout => write!(f, "backend request timed out"),
            BackendError::Status(code, body) => {
                write!(f, "backend answered with status {code}: {body}")
            }
            BackendError::Network(msg) => write!(f, "backend request failed: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    /// Short Russian message shown to the end user.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Timeout => {
                "Сервис не ответил вовремя. Попробуйте ещё раз позже.".to_string()
            }
            BackendError::Status(code, _) => {
                format!("Сервис ответил ошибкой ({code}). Попробуйте позже.")
            }
            BackendError::Network(_) => {
                "Не удалось связаться с сервисом. Попробуйте позже.".to_string()
            }
        }
    }
}

/// Answer to a new registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub restaurant_id: i64,
    pub verification_link: String,
}

/// Answer to a chat→restaurant linking request.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkedRestaurant {
    pub restaurant_id: i64,
    pub restaurant_name: String,
}

/// One discounted offer published by a restaurant.
#[derive(Debug, Clone, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub restaurant: String,
}

/// Confirmed reservation of an offer.
#[derive(Debug, Clone, Deserialize)]
pub struct Reservation {
    pub code: String,
    pub expires_at: String,
    pub title: String,
    pub price: String,
    pub restaurant: String,
}

/// HTTP client for the marketplace backend.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a registration; the backend answers with an id and a
    /// verification link the user must open to activate it.
    pub async fn register_restaurant(
        &self,
        name: &str,
        contact: &ContactInfo,
    ) -> Result<Registration, BackendError> {
        let mut body = json!({ "name": name });
        match contact {
            ContactInfo::Email(email) => body["email"] = json!(email),
            ContactInfo::Address(address) => body["address"] = json!(address),
            ContactInfo::Geo {
                latitude,
                longitude,
            } => {
                body["lat"] = json!(latitude);
                body["lon"] = json!(longitude);
            }
        }
        self.post_json("/register_restaurant", &body).await
    }

    /// Attach an existing restaurant to a Telegram chat.
    pub async fn link_telegram(
        &self,
        chat_id: i64,
        restaurant_id: i64,
    ) -> Result<LinkedRestaurant, BackendError> {
        self.post_json(
            "/link_telegram",
            &json!({ "chat_id": chat_id, "restaurant_id": restaurant_id }),
        )
        .await
    }

    pub async fn subscribe(&self, chat_id: i64) -> Result<(), BackendError> {
        self.post_no_content("/subscribe", &json!({ "chat_id": chat_id }))
            .await
    }

    pub async fn unsubscribe(&self, chat_id: i64) -> Result<(), BackendError> {
        self.post_no_content("/unsubscribe", &json!({ "chat_id": chat_id }))
            .await
    }

    pub async fn list_offers(&self) -> Result<Vec<Offer>, BackendError> {
        let response = self
            .http
            .get(format!("{}/offers", self.base_url))
            .send()
            .await
            .map_err(map_send_error)?;
        decode(response).await
    }

    pub async fn reserve(&self, chat_id: i64, offer_id: i64) -> Result<Reservation, BackendError> {
        self.post_json(
            "/reserve",
            &json!({ "chat_id": chat_id, "offer_id": offer_id }),
        )
        .await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, BackendError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;
        decode(response).await
    }

    async fn post_no_content(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<(), BackendError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status(status.as_u16(), truncate(&body)));
        }
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await.map_err(map_send_error)?;
    if !status.is_success() {
        return Err(BackendError::Status(status.as_u16(), truncate(&body)));
    }
    serde_json::from_str(&body).map_err(|e| BackendError::Network(format!("bad response body: {e}")))
}

fn map_send_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Network(error.to_string())
    }
}

fn truncate(body: &str) -> String {
    let mut out: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    if out.len() < body.len() {
        out.push('…');
    }
    out
}
