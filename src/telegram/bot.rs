//! Bot initialization and message routing utilities
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Message addressing logic (private chats, mentions, replies)

use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::types::{ChatKind, Message, UserId};
use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::core::error::AppError;
use crate::download::intent::Resolution;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Send me a link and I'll send the video back:")]
pub enum Command {
    #[command(description = "how to use the bot")]
    Start,
    #[command(description = "supported qualities and examples")]
    Help,
}

/// Creates a Bot instance with custom or default API URL
///
/// The token comes in explicitly; nothing here reads the environment.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(AppError)` - Invalid API URL or HTTP client construction failure
pub fn create_bot(token: &SecretString, bot_api_url: Option<&str>) -> Result<Bot, AppError> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    match bot_api_url {
        Some(raw) => {
            log::info!("Using custom Bot API URL: {}", raw);
            let url = url::Url::parse(raw)?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Greeting and usage text for /start and /help
pub fn usage_text() -> String {
    format!(
        "👋 Hi! Send me an Instagram or YouTube link and I'll send the video back.\n\
         \n\
         Example:\n\
         https://youtu.be/abcd1234\n\
         \n\
         Or with a specific quality:\n\
         https://youtu.be/abcd1234 720\n\
         \n\
         Supported qualities: {} (default {}).",
        Resolution::supported_list(),
        Resolution::default().height()
    )
}

/// Checks if a message is addressed to the bot
///
/// # Returns
/// * `true` if message is addressed to bot (private chat, bot mention, reply to bot message)
/// * `false` if message is not addressed to bot
pub fn is_message_addressed_to_bot(msg: &Message, bot_username: Option<&str>, bot_id: UserId) -> bool {
    // In private chats, all messages are addressed to the bot
    if matches!(msg.chat.kind, ChatKind::Private(_)) {
        return true;
    }

    if let Some(reply_to) = msg.reply_to_message() {
        if let Some(from) = &reply_to.from {
            if from.id == bot_id {
                return true;
            }
        }
    }

    match (msg.text(), bot_username) {
        (Some(text), Some(username)) => mentions(text, username),
        _ => false,
    }
}

fn mentions(text: &str, username: &str) -> bool {
    text.split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .any(|mention| mention.eq_ignore_ascii_case(username))
}

/// Drops `@username` tokens so `@bot https://… 720` parses like a private message.
pub fn strip_bot_mention(text: &str, bot_username: Option<&str>) -> String {
    match bot_username {
        Some(username) => text
            .split_whitespace()
            .filter(|token| {
                !token
                    .strip_prefix('@')
                    .is_some_and(|mention| mention.eq_ignore_ascii_case(username))
            })
            .collect::<Vec<_>>()
            .join(" "),
        None => text.to_string(),
    }
}
