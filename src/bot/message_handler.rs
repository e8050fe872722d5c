//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, info};

use crate::context::AppContext;
use crate::db;
use crate::dialogue::{validate_restaurant_id, RegistrationState};

use super::dialogue_manager::{handle_dialogue_text, handle_location_input, reprompt_current};
use super::ui_builder::{
    main_menu_keyboard, materials_keyboard, rules_keyboard, MAIN_MENU_TEXT, MATERIALS_TEXT,
    RULES_TEXT,
};

const LINK_USAGE: &str = "Укажите номер ресторана цифрами: /link 123";
const FALLBACK_TEXT: &str = "Не понимаю эту команду. Доступно: /start /offer /rules /link";

pub async fn message_handler(msg: Message, ctx: Arc<AppContext>) -> Result<()> {
    let dialogue = ctx.dialogue(msg.chat.id);
    let state = dialogue.get().await?.unwrap_or_default();

    if !matches!(state, RegistrationState::Idle) {
        // `/start` breaks out of a stale dialogue and shows the menu again.
        if let Some(text) = msg.text() {
            if text.trim() == "/start" || text.trim().starts_with("/start ") {
                dialogue.exit().await?;
                return handle_start(&msg, start_argument(text), ctx).await;
            }
            return handle_dialogue_text(&msg, dialogue, state, text, ctx).await;
        }
        if let Some(location) = msg.location() {
            return handle_location_input(&msg, dialogue, state, location, ctx).await;
        }
        // Any other input mid-dialogue re-prompts the current step.
        return reprompt_current(&msg, &state, ctx).await;
    }

    let Some(text) = msg.text() else {
        return handle_unsupported_message(&msg, ctx).await;
    };
    let text = text.trim();

    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    if text == "/start" || text == "start" || text.starts_with("/start ") {
        handle_start(&msg, start_argument(text), ctx).await
    } else if text == "/offer" {
        info!(user_id = %msg.chat.id, "offer command");
        ctx.bot
            .send_message(msg.chat.id, MATERIALS_TEXT)
            .reply_markup(materials_keyboard(&ctx.config)?)
            .await?;
        Ok(())
    } else if text == "/rules" {
        info!(user_id = %msg.chat.id, "rules command");
        ctx.bot
            .send_message(msg.chat.id, RULES_TEXT)
            .reply_markup(rules_keyboard(&ctx.config)?)
            .await?;
        Ok(())
    } else if let Some(arg) = text.strip_prefix("/link") {
        handle_link(&msg, arg, ctx).await
    } else {
        ctx.bot.send_message(msg.chat.id, FALLBACK_TEXT).await?;
        Ok(())
    }
}

/// Deep-link argument of a `/start` command, if any.
fn start_argument(text: &str) -> Option<&str> {
    text.trim()
        .strip_prefix("/start ")
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
}

async fn handle_start(msg: &Message, deep_link: Option<&str>, ctx: Arc<AppContext>) -> Result<()> {
    info!(user_id = %msg.chat.id, deep_link = ?deep_link, "start command");

    let link = match db::get_link(&ctx.db, msg.chat.id.0).await {
        Ok(link) => link,
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "failed to read chat link");
            None
        }
    };

    let greeting = match link {
        Some(link) => format!(
            "{MAIN_MENU_TEXT}\n\nВаш ресторан: {}",
            link.restaurant_name
        ),
        None => MAIN_MENU_TEXT.to_string(),
    };

    let keyboard = main_menu_keyboard(&ctx.config, deep_link)?;
    ctx.bot
        .send_message(msg.chat.id, greeting)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

/// `/link <id>` attaches an existing restaurant to this chat.
async fn handle_link(msg: &Message, arg: &str, ctx: Arc<AppContext>) -> Result<()> {
    let restaurant_id = match validate_restaurant_id(arg) {
        Ok(id) => id,
        Err(_) => {
            ctx.bot.send_message(msg.chat.id, LINK_USAGE).await?;
            return Ok(());
        }
    };

    match ctx.backend.link_telegram(msg.chat.id.0, restaurant_id).await {
        Ok(linked) => {
            if let Err(e) = db::save_link(
                &ctx.db,
                msg.chat.id.0,
                linked.restaurant_id,
                &linked.restaurant_name,
            )
            .await
            {
                error!(user_id = %msg.chat.id, error = %e, "failed to save chat link");
            }

            ctx.bot
                .send_message(
                    msg.chat.id,
                    format!(
                        "Готово! Ресторан «{}» привязан к этому чату.",
                        linked.restaurant_name
                    ),
                )
                .await?;
        }
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "link call failed");
            ctx.bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }

    Ok(())
}

async fn handle_unsupported_message(msg: &Message, ctx: Arc<AppContext>) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");

    ctx.bot.send_message(msg.chat.id, FALLBACK_TEXT).await?;
    Ok(())
}
