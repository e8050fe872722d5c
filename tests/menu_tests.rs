use anyhow::Result;
use teloxide::types::InlineKeyboardButtonKind;

use foody_bot::backend::{Offer, Reservation};
use foody_bot::bot::ui_builder::{
    format_offers_list, format_reservation, main_menu_keyboard, materials_keyboard,
    merchant_menu_url, offers_keyboard, rules_keyboard,
};
use foody_bot::config::AppConfig;

fn config(use_webapp: bool) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "BOT_TOKEN" => Some("123456:TEST".to_string()),
        "USE_WEBAPP" => Some(if use_webapp { "1" } else { "0" }.to_string()),
        _ => None,
    })
    .expect("test config")
}

fn offers() -> Vec<Offer> {
    serde_json::from_value(serde_json::json!([
        { "id": 7, "title": "Сет роллов", "price": "390 ₽", "restaurant": "Суши Маркет" },
        { "id": 9, "title": "Пицца дня", "price": "250 ₽", "restaurant": "Пиццерия №1" }
    ]))
    .expect("offers fixture")
}

/// The deep-link argument threads into the merchant URL unchanged; with no
/// argument the URL carries no extra parameter.
#[test]
fn test_deep_link_threads_into_menu_url() -> Result<()> {
    let config = config(true);

    let url = merchant_menu_url(&config, Some("promo42"))?;
    assert!(url.as_str().ends_with("&ref=promo42"));

    let url = merchant_menu_url(&config, None)?;
    assert!(!url.as_str().contains("ref="));
    assert!(url.as_str().contains("?api="));

    Ok(())
}

#[test]
fn test_main_menu_uses_webapp_buttons_when_enabled() -> Result<()> {
    let keyboard = main_menu_keyboard(&config(true), None)?;
    let first = &keyboard.inline_keyboard[0][0];
    assert!(matches!(first.kind, InlineKeyboardButtonKind::WebApp(_)));

    let keyboard = main_menu_keyboard(&config(false), None)?;
    let first = &keyboard.inline_keyboard[0][0];
    assert!(matches!(first.kind, InlineKeyboardButtonKind::Url(_)));

    Ok(())
}

#[test]
fn test_main_menu_carries_action_callbacks() -> Result<()> {
    let keyboard = main_menu_keyboard(&config(true), None)?;

    let callbacks: Vec<&str> = keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data.as_str()),
            _ => None,
        })
        .collect();

    assert!(callbacks.contains(&"register"));
    assert!(callbacks.contains(&"offers"));
    assert!(callbacks.contains(&"subscribe"));
    assert!(callbacks.contains(&"unsubscribe"));

    Ok(())
}

/// Documents always open in the external browser.
#[test]
fn test_materials_are_plain_url_buttons_even_in_webapp_mode() -> Result<()> {
    let keyboard = materials_keyboard(&config(true))?;

    assert_eq!(keyboard.inline_keyboard.len(), 3);
    for row in &keyboard.inline_keyboard {
        assert!(matches!(row[0].kind, InlineKeyboardButtonKind::Url(_)));
    }

    Ok(())
}

#[test]
fn test_rules_keyboard_follows_webapp_flag() -> Result<()> {
    let keyboard = rules_keyboard(&config(true))?;
    assert!(matches!(
        keyboard.inline_keyboard[0][0].kind,
        InlineKeyboardButtonKind::WebApp(_)
    ));

    let keyboard = rules_keyboard(&config(false))?;
    assert!(matches!(
        keyboard.inline_keyboard[0][0].kind,
        InlineKeyboardButtonKind::Url(_)
    ));

    Ok(())
}

#[test]
fn test_offers_keyboard_reserve_callbacks() {
    let keyboard = offers_keyboard(&offers());

    assert_eq!(keyboard.inline_keyboard.len(), 2);
    match &keyboard.inline_keyboard[0][0].kind {
        InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "reserve:7"),
        other => panic!("expected callback button, got {other:?}"),
    }
}

#[test]
fn test_offer_and_reservation_formatting() {
    let listing = format_offers_list(&offers());
    assert!(listing.contains("1. Сет роллов — 390 ₽ (Суши Маркет)"));
    assert!(listing.contains("2. Пицца дня"));

    let reservation: Reservation = serde_json::from_value(serde_json::json!({
        "code": "FD-1234",
        "expires_at": "2026-08-29T21:00:00Z",
        "title": "Сет роллов",
        "price": "390 ₽",
        "restaurant": "Суши Маркет"
    }))
    .expect("reservation fixture");

    let text = format_reservation(&reservation);
    assert!(text.contains("FD-1234"));
    assert!(text.contains("2026-08-29T21:00:00Z"));
}
