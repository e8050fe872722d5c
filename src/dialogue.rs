//! Registration dialogue module for handling conversation state with users.
//!
//! The conversation is a short linear form: restaurant name, then one contact
//! detail (email, address or shared geolocation depending on the configured
//! [`ContactMode`]). State transitions are computed by the pure
//! [`advance_text`] function; handlers only perform the Telegram IO.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::config::ContactMode;

/// Per-chat conversation state. At most one open dialogue per chat;
/// `/start` and the `register` button clear any stale state first.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum RegistrationState {
    #[default]
    Idle,
    AwaitingName,
    AwaitingContact {
        restaurant_name: String,
    },
    AwaitingLocation {
        restaurant_name: String,
    },
}

/// Type alias for the registration dialogue.
pub type RegistrationDialogue = Dialogue<RegistrationState, InMemStorage<RegistrationState>>;

/// Contact detail that completes a registration.
#[derive(Clone, Debug, PartialEq)]
pub enum ContactInfo {
    Email(String),
    Address(String),
    Geo { latitude: f64, longitude: f64 },
}

/// Outcome of feeding one text reply into the dialogue.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Input rejected; re-prompt with the given text, state unchanged.
    Reprompt(&'static str),
    /// Name accepted; ask for an email/address reply next.
    AskContact { restaurant_name: String },
    /// Name accepted; ask for a shared geolocation next.
    AskLocation { restaurant_name: String },
    /// Contact accepted; the registration data is complete.
    Complete {
        restaurant_name: String,
        contact: ContactInfo,
    },
    /// No dialogue is open for this chat.
    NotInDialogue,
}

pub const PROMPT_NAME: &str = "Как называется ваш ресторан?";
pub const PROMPT_NAME_INVALID: &str =
    "Название не должно быть пустым. Как называется ваш ресторан?";
pub const PROMPT_EMAIL: &str = "Укажите e-mail для связи (например, info@cafe.ru):";
pub const PROMPT_EMAIL_INVALID: &str =
    "Это не похоже на e-mail. Укажите адрес вида info@cafe.ru:";
pub const PROMPT_ADDRESS: &str = "Укажите адрес ресторана (улица, дом, город):";
pub const PROMPT_ADDRESS_INVALID: &str = "Адрес слишком короткий. Укажите улицу, дом и город:";
pub const PROMPT_LOCATION: &str =
    "Отправьте геолокацию ресторана: скрепка → «Геопозиция».";
pub const REGISTRATION_CANCELLED: &str = "Регистрация отменена.";

/// Advance the dialogue with one text reply. Location shares are handled
/// separately because they do not arrive as text.
pub fn advance_text(state: &RegistrationState, text: &str, mode: ContactMode) -> StepOutcome {
    match state {
        RegistrationState::Idle => StepOutcome::NotInDialogue,
        RegistrationState::AwaitingName => match validate_restaurant_name(text) {
            Ok(restaurant_name) => match mode {
                ContactMode::Location => StepOutcome::AskLocation { restaurant_name },
                ContactMode::Email | ContactMode::Address => {
                    StepOutcome::AskContact { restaurant_name }
                }
            },
            Err(_) => StepOutcome::Reprompt(PROMPT_NAME_INVALID),
        },
        RegistrationState::AwaitingContact { restaurant_name } => match mode {
            ContactMode::Email => match validate_email(text) {
                Ok(email) => StepOutcome::Complete {
                    restaurant_name: restaurant_name.clone(),
                    contact: ContactInfo::Email(email),
                },
                Err(_) => StepOutcome::Reprompt(PROMPT_EMAIL_INVALID),
            },
            ContactMode::Address => match validate_address(text) {
                Ok(address) => StepOutcome::Complete {
                    restaurant_name: restaurant_name.clone(),
                    contact: ContactInfo::Address(address),
                },
                Err(_) => StepOutcome::Reprompt(PROMPT_ADDRESS_INVALID),
            },
            // Contact step cannot be completed by text in location mode.
            ContactMode::Location => StepOutcome::Reprompt(PROMPT_LOCATION),
        },
        RegistrationState::AwaitingLocation { .. } => StepOutcome::Reprompt(PROMPT_LOCATION),
    }
}

/// The re-prompt matching the current step, for non-text input mid-dialogue.
pub fn prompt_for(state: &RegistrationState, mode: ContactMode) -> Option<&'static str> {
    match state {
        RegistrationState::Idle => None,
        RegistrationState::AwaitingName => Some(PROMPT_NAME),
        RegistrationState::AwaitingContact { .. } => Some(match mode {
            ContactMode::Email => PROMPT_EMAIL,
            ContactMode::Address => PROMPT_ADDRESS,
            ContactMode::Location => PROMPT_LOCATION,
        }),
        RegistrationState::AwaitingLocation { .. } => Some(PROMPT_LOCATION),
    }
}

/// Validates a restaurant name input
pub fn validate_restaurant_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.len() > 128 {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

/// Validates a free-text email reply: must contain "@" and "." and no spaces.
pub fn validate_email(input: &str) -> Result<String, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.len() > 254 {
        return Err("too_long");
    }

    if trimmed.contains(char::is_whitespace) {
        return Err("whitespace");
    }

    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Err("not_an_email");
    }

    Ok(trimmed.to_string())
}

/// Validates a street-address reply.
pub fn validate_address(input: &str) -> Result<String, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() < 5 {
        return Err("too_short");
    }

    if trimmed.len() > 255 {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

/// Validates a `/link` argument: digits only.
pub fn validate_restaurant_id(input: &str) -> Result<i64, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err("not_a_number");
    }

    trimmed.parse().map_err(|_| "too_large")
}
