use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;
use tokio_util::task::TaskTracker;

use mediarelay::cli::{Cli, Commands, ConsoleSink};
use mediarelay::core::{init_logger, log_configuration, Config};
use mediarelay::download::format;
use mediarelay::download::{RelayPipeline, RelaySettings, Resolution, YtDlpEngine};
use mediarelay::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();
    let config = Config::from_env()?;

    // Log panics instead of letting them vanish with a detached task
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger(&config.log_file_path)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot(config).await,
        Some(Commands::Fetch { url, quality, output }) => run_cli_fetch(config, url, quality, output).await,
        Some(Commands::Formats) => {
            for resolution in Resolution::iter() {
                println!("{:>6}  {}", resolution, format::select(resolution));
            }
            Ok(())
        }
    }
}

fn build_pipeline(config: &Config) -> RelayPipeline {
    RelayPipeline::new(
        Arc::new(YtDlpEngine::new(config.ytdl_bin.clone())),
        RelaySettings::from(config),
    )
}

/// Run one relay against the console sink
async fn run_cli_fetch(config: Config, url: String, quality: Option<String>, output: std::path::PathBuf) -> Result<()> {
    let pipeline = build_pipeline(&config);
    let sink = ConsoleSink::new(output);
    let text = Commands::fetch_text(&url, quality.as_deref());

    let outcome = pipeline.run(&text, &sink).await;
    match outcome.error() {
        None => Ok(()),
        Some(e) => Err(anyhow::anyhow!("Relay failed ({}): {}", e.subcategory(), e)),
    }
}

/// Run the bot with long polling until Ctrl-C
async fn run_bot(config: Config) -> Result<()> {
    log::info!("Starting bot...");
    log_configuration(&config);

    let token = config.require_bot_token()?;
    let bot = create_bot(token, config.bot_api_url.as_deref())?;

    // Retry if Bot API is still initializing
    let bot_info = {
        let startup_max_retries = 12; // Up to 1 minute (12 * 5s)
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    let err_str = e.to_string();
                    let is_retryable = err_str.contains("restart")
                        || err_str.contains("network")
                        || err_str.contains("connection")
                        || err_str.contains("timed out");

                    startup_retry += 1;
                    if startup_retry >= startup_max_retries || !is_retryable {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} attempts: {}",
                            startup_retry,
                            e
                        ));
                    }

                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                        startup_retry,
                        startup_max_retries,
                        err_str
                    );
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    let bot_username = bot_info.username.clone();
    log::info!("Bot username: {:?}, Bot ID: {}", bot_username, bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let runs = TaskTracker::new();
    let deps = HandlerDeps::new(build_pipeline(&config), runs.clone(), bot_username, bot_info.id);

    // Create polling listener that drops pending updates on start
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    runs.close();
    if !runs.is_empty() {
        log::info!("Dispatcher stopped, waiting for {} in-flight run(s) to finish", runs.len());
    }
    runs.wait().await;
    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
