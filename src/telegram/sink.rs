//! `ReplySink` over the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ReplyParameters};

use crate::core::error::AppError;
use crate::download::pipeline::{ReplySink, SentMessage};
use crate::download::stager::StagedArtifact;

/// Replies into the chat an inbound message came from, threaded under that message.
pub struct TelegramReplySink {
    bot: Bot,
    chat_id: ChatId,
    reply_to: Option<MessageId>,
}

impl TelegramReplySink {
    pub fn new(bot: Bot, chat_id: ChatId, reply_to: Option<MessageId>) -> Self {
        Self { bot, chat_id, reply_to }
    }

    /// Sink replying to `msg`
    pub fn for_message(bot: Bot, msg: &Message) -> Self {
        Self::new(bot, msg.chat.id, Some(msg.id))
    }

    fn reply_parameters(&self) -> Option<ReplyParameters> {
        self.reply_to
            .map(|id| ReplyParameters::new(id).allow_sending_without_reply())
    }
}

#[async_trait]
impl ReplySink for TelegramReplySink {
    async fn send_text(&self, text: &str) -> Result<SentMessage, AppError> {
        let mut req = self.bot.send_message(self.chat_id, text);
        if let Some(params) = self.reply_parameters() {
            req = req.reply_parameters(params);
        }
        let sent = req.await?;
        Ok(SentMessage(sent.id.0))
    }

    async fn send_media(&self, artifact: &StagedArtifact, caption: &str) -> Result<SentMessage, AppError> {
        log::info!(
            "Uploading {} ({} bytes) to chat {}",
            artifact.file_path.display(),
            artifact.size_bytes,
            self.chat_id
        );
        let mut req = self
            .bot
            .send_video(self.chat_id, InputFile::file(artifact.file_path.clone()))
            .caption(caption)
            .supports_streaming(true);
        if let Some(params) = self.reply_parameters() {
            req = req.reply_parameters(params);
        }
        let sent = req.await?;
        Ok(SentMessage(sent.id.0))
    }

    async fn delete_message(&self, message: SentMessage) -> Result<(), AppError> {
        self.bot.delete_message(self.chat_id, MessageId(message.0)).await?;
        Ok(())
    }
}
