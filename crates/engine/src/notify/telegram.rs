use async_trait::async_trait;
use teloxide::prelude::*;

use common::errors::NotifyError;

use crate::notify::AlertSink;

/// Chat sink backed by the Telegram bot API. Subject and body go out as one
/// message; Telegram has no subject concept.
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSink {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let text = format!("{}\n\n{}", subject, body);
        self.bot
            .send_message(self.chat_id, text)
            .await
            .map_err(|e| NotifyError {
                sink: "telegram",
                message: e.to_string(),
            })?;
        Ok(())
    }
}
