//! Webhook Relay: HTTP endpoints that accept provider pushes and feed the
//! dispatcher.
//!
//! The relay always answers `200 OK` fast so Telegram never suspends
//! delivery: updates are processed on spawned tasks and processing errors
//! are logged, never surfaced to the provider. The only non-success answer
//! is `403` on a shared-secret mismatch.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::bot;
use crate::context::AppContext;

/// Header Telegram echoes the configured shared secret in.
const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

pub fn router(ctx: Arc<AppContext>) -> Router {
    let webhook_path = ctx.config.webhook_path.clone();

    Router::new()
        .route("/", get(ping))
        .route("/health", get(health))
        .route("/debug/webhookinfo", get(webhook_info))
        .route(&webhook_path, post(webhook_post).get(ping))
        .with_state(ctx)
}

/// Register/refresh the webhook with Telegram and drop any queued updates.
pub async fn register_webhook(ctx: &AppContext) -> Result<()> {
    let Some(url) = ctx.config.webhook_url() else {
        warn!("BACKEND_PUBLIC not set, webhook not configured");
        return Ok(());
    };
    let url = reqwest::Url::parse(&url).context("invalid webhook URL")?;

    ctx.bot
        .delete_webhook()
        .drop_pending_updates(true)
        .await
        .context("failed to clear previous webhook")?;

    let mut request = ctx.bot.set_webhook(url.clone());
    if let Some(secret) = &ctx.config.webhook_secret {
        request = request.secret_token(secret.clone());
    }
    request.await.context("failed to register webhook")?;

    info!(
        webhook = %url,
        secret = ctx.config.webhook_secret.is_some(),
        "webhook registered"
    );
    Ok(())
}

/// Run the relay until the process is stopped.
pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    register_webhook(&ctx).await?;
    bot::publish_command_menu(&ctx.bot).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.config.port));
    info!(%addr, "webhook relay listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

async fn ping() -> &'static str {
    "OK"
}

async fn health(State(ctx): State<Arc<AppContext>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true, "webhook": ctx.config.webhook_url() }))
}

/// Pass-through of Telegram's view of the current webhook configuration.
async fn webhook_info(State(ctx): State<Arc<AppContext>>) -> Response {
    match ctx.bot.get_webhook_info().await {
        Ok(info) => Json(serde_json::to_value(&info).unwrap_or_default()).into_response(),
        Err(e) => {
            error!(error = %e, "getWebhookInfo failed");
            (StatusCode::BAD_GATEWAY, "webhook info unavailable").into_response()
        }
    }
}

async fn webhook_post(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Some(secret) = &ctx.config.webhook_secret {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(secret.as_str()) {
            warn!("webhook secret token mismatch");
            return (StatusCode::FORBIDDEN, "forbidden").into_response();
        }
    }

    // Always 200 OK so Telegram does not suspend delivery; a malformed
    // payload is a logged no-op.
    match serde_json::from_str::<Update>(&body) {
        Ok(update) => {
            let update_id = update.id;
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                if let Err(e) = bot::dispatch_update(update, ctx).await {
                    error!(update_id = ?update_id, error = %e, "update processing failed");
                }
            });
        }
        Err(e) => {
            warn!(error = %e, "ignoring malformed update payload");
        }
    }

    "OK".into_response()
}
