//! Dialogue Manager module for handling dialogue state transitions

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::Location;
use tracing::{error, info};

use crate::context::AppContext;
use crate::db;
use crate::dialogue::{
    advance_text, prompt_for, ContactInfo, RegistrationDialogue, RegistrationState, StepOutcome,
    PROMPT_ADDRESS, PROMPT_EMAIL, PROMPT_LOCATION, REGISTRATION_CANCELLED,
};
use crate::config::ContactMode;

/// Handle one text reply inside an open registration dialogue.
pub async fn handle_dialogue_text(
    msg: &Message,
    dialogue: RegistrationDialogue,
    state: RegistrationState,
    text: &str,
    ctx: Arc<AppContext>,
) -> Result<()> {
    // Explicit cancellation ends the dialogue without registering.
    let lowered = text.trim().to_lowercase();
    if matches!(lowered.as_str(), "/cancel" | "cancel" | "отмена") {
        ctx.bot
            .send_message(msg.chat.id, REGISTRATION_CANCELLED)
            .await?;
        dialogue.exit().await?;
        return Ok(());
    }

    match advance_text(&state, text, ctx.config.contact_mode) {
        StepOutcome::Reprompt(prompt) => {
            // State unchanged, user can try again.
            ctx.bot.send_message(msg.chat.id, prompt).await?;
        }
        StepOutcome::AskContact { restaurant_name } => {
            let prompt = match ctx.config.contact_mode {
                ContactMode::Email => PROMPT_EMAIL,
                ContactMode::Address => PROMPT_ADDRESS,
                ContactMode::Location => PROMPT_LOCATION,
            };
            ctx.bot.send_message(msg.chat.id, prompt).await?;
            dialogue
                .update(RegistrationState::AwaitingContact { restaurant_name })
                .await?;
        }
        StepOutcome::AskLocation { restaurant_name } => {
            ctx.bot.send_message(msg.chat.id, PROMPT_LOCATION).await?;
            dialogue
                .update(RegistrationState::AwaitingLocation { restaurant_name })
                .await?;
        }
        StepOutcome::Complete {
            restaurant_name,
            contact,
        } => {
            complete_registration(msg.chat.id, dialogue, restaurant_name, contact, ctx).await?;
        }
        StepOutcome::NotInDialogue => {
            // message_handler only routes here for open dialogues.
        }
    }

    Ok(())
}

/// Handle a shared geolocation: completes the location step, otherwise
/// re-prompts the current one.
pub async fn handle_location_input(
    msg: &Message,
    dialogue: RegistrationDialogue,
    state: RegistrationState,
    location: &Location,
    ctx: Arc<AppContext>,
) -> Result<()> {
    match state {
        RegistrationState::AwaitingLocation { restaurant_name } => {
            let contact = ContactInfo::Geo {
                latitude: location.latitude,
                longitude: location.longitude,
            };
            complete_registration(msg.chat.id, dialogue, restaurant_name, contact, ctx).await
        }
        other => reprompt_current(msg, &other, ctx).await,
    }
}

/// Re-send the prompt of the current step, without advancing.
pub async fn reprompt_current(
    msg: &Message,
    state: &RegistrationState,
    ctx: Arc<AppContext>,
) -> Result<()> {
    if let Some(prompt) = prompt_for(state, ctx.config.contact_mode) {
        ctx.bot.send_message(msg.chat.id, prompt).await?;
    }
    Ok(())
}

/// Call the backend with the collected form and clear the dialogue.
async fn complete_registration(
    chat_id: ChatId,
    dialogue: RegistrationDialogue,
    restaurant_name: String,
    contact: ContactInfo,
    ctx: Arc<AppContext>,
) -> Result<()> {
    match ctx
        .backend
        .register_restaurant(&restaurant_name, &contact)
        .await
    {
        Ok(registration) => {
            info!(
                user_id = %chat_id,
                restaurant_id = registration.restaurant_id,
                "restaurant registered"
            );

            if let Err(e) = db::save_link(
                &ctx.db,
                chat_id.0,
                registration.restaurant_id,
                &restaurant_name,
            )
            .await
            {
                error!(user_id = %chat_id, error = %e, "failed to save chat link");
            }

            let reply = format!(
                "Заявка принята! Номер ресторана: {}.\nПодтвердите регистрацию по ссылке: {}",
                registration.restaurant_id, registration.verification_link
            );
            ctx.bot.send_message(chat_id, reply).await?;
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "registration call failed");
            ctx.bot.send_message(chat_id, e.user_message()).await?;
        }
    }

    // Cleared on completion either way; the user can restart the form.
    dialogue.exit().await?;

    Ok(())
}
