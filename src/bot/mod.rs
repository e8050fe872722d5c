//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Handles incoming text and location messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `dialogue_manager`: Manages registration dialogue state transitions

pub mod callback_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs and the webhook relay
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, UpdateKind};
use tracing::debug;

use crate::context::AppContext;

/// Route one decoded update to its handler. Errors are returned to the
/// caller; the webhook relay logs and swallows them.
pub async fn dispatch_update(update: Update, ctx: Arc<AppContext>) -> Result<()> {
    match update.kind {
        UpdateKind::Message(msg) => message_handler(msg, ctx).await,
        UpdateKind::CallbackQuery(q) => callback_handler(q, ctx).await,
        other => {
            debug!(kind = ?other, "ignoring unsupported update kind");
            Ok(())
        }
    }
}

/// Publish the Telegram command menu.
pub async fn publish_command_menu(bot: &Bot) -> Result<()> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "Старт"),
        BotCommand::new("offer", "Материалы (PDF/XLSX)"),
        BotCommand::new("rules", "Правила для ресторанов"),
        BotCommand::new("link", "Привязать ресторан"),
    ])
    .await?;
    Ok(())
}
