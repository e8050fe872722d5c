//! UI Builder module for creating keyboards and formatting messages

use anyhow::Result;
use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};

use crate::backend::{Offer, Reservation};
use crate::config::AppConfig;

pub const MAIN_MENU_TEXT: &str = "Foody: спасаем еду вместе.\nКоманды: /offer /rules";
pub const MATERIALS_TEXT: &str = "Материалы:";
pub const RULES_TEXT: &str = "Правила для ресторанов:";

/// Mini-app button when `USE_WEBAPP` is set, plain URL button otherwise.
fn app_button(config: &AppConfig, text: &str, url: Url) -> InlineKeyboardButton {
    if config.use_webapp {
        InlineKeyboardButton::web_app(text, WebAppInfo { url })
    } else {
        InlineKeyboardButton::url(text, url)
    }
}

/// Merchant mini-app URL with the backend address and an optional deep-link
/// referral argument threaded through unchanged.
pub fn merchant_menu_url(config: &AppConfig, deep_link: Option<&str>) -> Result<Url> {
    let mut raw = format!("{}/?api={}", config.merchant_app_url, config.api_url);
    if let Some(arg) = deep_link {
        raw.push_str("&ref=");
        raw.push_str(arg);
    }
    Ok(Url::parse(&raw)?)
}

fn buyer_menu_url(config: &AppConfig) -> Result<Url> {
    Ok(Url::parse(&format!(
        "{}/?api={}",
        config.buyer_app_url, config.api_url
    ))?)
}

fn docs_url(config: &AppConfig, page: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}/docs/{}", config.merchant_app_url, page))?)
}

/// Top-level menu sent on `/start`.
pub fn main_menu_keyboard(
    config: &AppConfig,
    deep_link: Option<&str>,
) -> Result<InlineKeyboardMarkup> {
    let rows = vec![
        vec![app_button(
            config,
            "👨‍🍳 ЛК партнёра",
            merchant_menu_url(config, deep_link)?,
        )],
        vec![app_button(config, "🍽 Для покупателя", buyer_menu_url(config)?)],
        vec![app_button(config, "📄 Материалы", docs_url(config, "index.html")?)],
        vec![
            InlineKeyboardButton::callback("🏪 Зарегистрировать ресторан", "register"),
            InlineKeyboardButton::callback("🍱 Офферы", "offers"),
        ],
        vec![
            InlineKeyboardButton::callback("🔔 Подписаться", "subscribe"),
            InlineKeyboardButton::callback("🔕 Отписаться", "unsubscribe"),
        ],
    ];

    Ok(InlineKeyboardMarkup::new(rows))
}

/// `/offer` menu. Documents open in the external browser, so these are
/// always plain URL buttons.
pub fn materials_keyboard(config: &AppConfig) -> Result<InlineKeyboardMarkup> {
    let rows = vec![
        vec![InlineKeyboardButton::url(
            "📄 Оффер (SMB)",
            docs_url(config, "Foody_Offer_Brand_ru.pdf")?,
        )],
        vec![InlineKeyboardButton::url(
            "🏬 Оффер для сетей",
            docs_url(config, "Foody_Offer_Chain_ru.pdf")?,
        )],
        vec![InlineKeyboardButton::url(
            "📊 ROI-калькулятор",
            docs_url(
                config,
                "ROI_%D0%A1%D0%BF%D0%B0%D1%81%D0%B5%D0%BD%D0%B8%D0%B5%D0%95%D0%B4%D1%8B_%D0%BA%D0%B0%D0%BB%D1%8C%D0%BA%D1%83%D0%BB%D1%8F%D1%82%D0%BE%D1%80.xlsx",
            )?,
        )],
    ];

    Ok(InlineKeyboardMarkup::new(rows))
}

/// `/rules` keyboard: stays inside Telegram as a mini-app when enabled.
pub fn rules_keyboard(config: &AppConfig) -> Result<InlineKeyboardMarkup> {
    let button = app_button(config, "📘 Открыть правила", docs_url(config, "rules.html")?);
    Ok(InlineKeyboardMarkup::new(vec![vec![button]]))
}

/// One reserve button per offer.
pub fn offers_keyboard(offers: &[Offer]) -> InlineKeyboardMarkup {
    let rows = offers
        .iter()
        .map(|offer| {
            vec![InlineKeyboardButton::callback(
                format!("🛒 {} — {}", offer.title, offer.price),
                format!("reserve:{}", offer.id),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(rows)
}

/// Format offers as a numbered list.
pub fn format_offers_list(offers: &[Offer]) -> String {
    let mut result = String::from("🍱 Активные офферы:\n");

    for (i, offer) in offers.iter().enumerate() {
        result.push_str(&format!(
            "{}. {} — {} ({})\n",
            i + 1,
            offer.title,
            offer.price,
            offer.restaurant
        ));
    }

    result
}

pub fn format_reservation(reservation: &Reservation) -> String {
    format!(
        "✅ Бронь подтверждена!\n\n{} — {}\n{}\n\nКод брони: {}\nДействует до: {}",
        reservation.title,
        reservation.price,
        reservation.restaurant,
        reservation.code,
        reservation.expires_at
    )
}
