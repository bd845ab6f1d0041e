//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::{is_message_addressed_to_bot, strip_bot_mention, usage_text, Command};
use crate::telegram::sink::TelegramReplySink;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first; every other text message addressed to the bot starts
/// a relay run.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_messages = deps.clone();

    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps_messages))
}

/// Handler for /start and /help
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command)
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> Result<(), HandlerError> {
    log::info!("Command {:?} from chat {}", cmd, msg.chat.id);
    match cmd {
        Command::Start | Command::Help => {
            bot.send_message(msg.chat.id, usage_text()).await?;
        }
    }
    Ok(())
}

/// Handler for plain text messages: each one becomes an independent relay run
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let bot_username = deps.bot_username.clone();
    let bot_id = deps.bot_id;

    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .filter(move |msg: Message| is_message_addressed_to_bot(&msg, bot_username.as_deref(), bot_id))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = strip_bot_mention(msg.text().unwrap_or_default(), deps.bot_username.as_deref());
                let sink = TelegramReplySink::for_message(bot, &msg);
                let pipeline = deps.pipeline.clone();
                let chat_id = msg.chat.id;

                // Detach the run so a slow download never holds up the dispatcher
                deps.runs.spawn(async move {
                    let outcome = pipeline.run(&text, &sink).await;
                    log::info!(
                        "Run for chat {} finished: {}",
                        chat_id,
                        if outcome.is_delivered() { "delivered" } else { "failed" }
                    );
                });
                Ok::<(), HandlerError>(())
            }
        })
}
