//! Shared application context.
//!
//! Built once in `main` and passed to every handler, replacing the global
//! bot/dispatcher singletons of the original entry points.

use std::sync::Arc;

use sqlx::SqlitePool;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;

use crate::backend::BackendClient;
use crate::config::AppConfig;
use crate::dialogue::{RegistrationDialogue, RegistrationState};

pub struct AppContext {
    pub bot: Bot,
    pub config: AppConfig,
    pub backend: BackendClient,
    pub dialogues: Arc<InMemStorage<RegistrationState>>,
    pub db: SqlitePool,
}

impl AppContext {
    pub fn new(bot: Bot, config: AppConfig, backend: BackendClient, db: SqlitePool) -> Arc<Self> {
        Arc::new(Self {
            bot,
            config,
            backend,
            dialogues: InMemStorage::new(),
            db,
        })
    }

    /// Handle to the registration dialogue of one chat.
    pub fn dialogue(&self, chat_id: ChatId) -> RegistrationDialogue {
        RegistrationDialogue::new(Arc::clone(&self.dialogues), chat_id)
    }
}
