use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use foody_bot::backend::BackendClient;
use foody_bot::bot;
use foody_bot::config::AppConfig;
use foody_bot::context::AppContext;
use foody_bot::{db, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Foody Telegram Bot");

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::init_schema(&pool).await?;

    let bot = Bot::new(config.bot_token.clone());
    let backend = BackendClient::new(&config.api_url, config.backend_timeout)?;
    let ctx = AppContext::new(bot.clone(), config, backend, pool);

    if ctx.config.webhook_url().is_some() {
        return server::run(ctx).await;
    }

    // No public URL configured: fall back to long polling.
    info!("BACKEND_PUBLIC not set, starting long polling");
    bot.delete_webhook().drop_pending_updates(true).await?;
    bot::publish_command_menu(&bot).await?;

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let ctx = Arc::clone(&ctx);
            move |msg: Message| {
                let ctx = Arc::clone(&ctx);
                async move { bot::message_handler(msg, ctx).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let ctx = Arc::clone(&ctx);
            move |q: CallbackQuery| {
                let ctx = Arc::clone(&ctx);
                async move { bot::callback_handler(q, ctx).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
