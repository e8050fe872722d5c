//! # Foody Telegram Bot
//!
//! Telegram front-end for the Foody food-discount marketplace: inline-keyboard
//! menus, a short restaurant registration dialogue and a webhook relay in
//! front of the marketplace backend API.

pub mod backend;
pub mod bot;
pub mod config;
pub mod context;
pub mod db;
pub mod dialogue;
pub mod server;
