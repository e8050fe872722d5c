//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::dialogue::{RegistrationState, PROMPT_NAME, REGISTRATION_CANCELLED};

use super::ui_builder::{format_offers_list, format_reservation, offers_keyboard};

/// Handle callback queries from inline keyboards
pub async fn callback_handler(q: CallbackQuery, ctx: Arc<AppContext>) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // In a private chat the chat id equals the user id; fall back to it when
    // the originating message is no longer accessible.
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    let data = q.data.as_deref().unwrap_or("");

    match data {
        "register" => {
            info!(user_id = %q.from.id, "registration dialogue started");
            // Replaces any stale dialogue state for this chat.
            ctx.dialogue(chat_id)
                .update(RegistrationState::AwaitingName)
                .await?;
            ctx.bot.send_message(chat_id, PROMPT_NAME).await?;
        }
        "cancel_registration" => {
            let dialogue = ctx.dialogue(chat_id);
            if dialogue.get().await?.is_some() {
                dialogue.exit().await?;
            }
            ctx.bot.send_message(chat_id, REGISTRATION_CANCELLED).await?;
        }
        "offers" => match ctx.backend.list_offers().await {
            Ok(offers) if offers.is_empty() => {
                ctx.bot
                    .send_message(chat_id, "Пока нет активных офферов.")
                    .await?;
            }
            Ok(offers) => {
                ctx.bot
                    .send_message(chat_id, format_offers_list(&offers))
                    .reply_markup(offers_keyboard(&offers))
                    .await?;
            }
            Err(e) => {
                warn!(user_id = %q.from.id, error = %e, "offers call failed");
                ctx.bot.send_message(chat_id, e.user_message()).await?;
            }
        },
        "subscribe" => match ctx.backend.subscribe(chat_id.0).await {
            Ok(()) => {
                ctx.bot
                    .send_message(chat_id, "Подписка оформлена. Будем присылать новые офферы!")
                    .await?;
            }
            Err(e) => {
                warn!(user_id = %q.from.id, error = %e, "subscribe call failed");
                ctx.bot.send_message(chat_id, e.user_message()).await?;
            }
        },
        "unsubscribe" => match ctx.backend.unsubscribe(chat_id.0).await {
            Ok(()) => {
                ctx.bot
                    .send_message(chat_id, "Подписка отключена.")
                    .await?;
            }
            Err(e) => {
                warn!(user_id = %q.from.id, error = %e, "unsubscribe call failed");
                ctx.bot.send_message(chat_id, e.user_message()).await?;
            }
        },
        reserve if reserve.starts_with("reserve:") => {
            match reserve
                .strip_prefix("reserve:")
                .and_then(|id| id.parse::<i64>().ok())
            {
                Some(offer_id) => match ctx.backend.reserve(chat_id.0, offer_id).await {
                    Ok(reservation) => {
                        info!(user_id = %q.from.id, offer_id, code = %reservation.code, "offer reserved");
                        ctx.bot
                            .send_message(chat_id, format_reservation(&reservation))
                            .await?;
                    }
                    Err(e) => {
                        error!(user_id = %q.from.id, offer_id, error = %e, "reserve call failed");
                        ctx.bot.send_message(chat_id, e.user_message()).await?;
                    }
                },
                None => debug!(user_id = %q.from.id, data = %reserve, "malformed reserve callback"),
            }
        }
        other => {
            debug!(user_id = %q.from.id, data = %other, "unknown callback ignored");
        }
    }

    // Answer the callback query to remove the loading state
    ctx.bot.answer_callback_query(q.id).await?;

    Ok(())
}
