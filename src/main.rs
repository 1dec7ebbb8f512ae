use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use solar_lead_bot::bot::{command_handler, message_handler, BotState, Command, DialogueManager};
use solar_lead_bot::config::BotConfig;
use solar_lead_bot::lead_store::open_lead_store;
use solar_lead_bot::llm::LlmClient;
use solar_lead_bot::session::SessionStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting Solar Lead Telegram Bot");

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        leads_file = %config.leads_file.display(),
        leads_format = ?config.leads_format,
        "Configuration loaded"
    );

    let system_prompt = config.llm.system_prompt.clone();
    let llm = Arc::new(LlmClient::new(config.llm.clone())?);
    let leads = open_lead_store(config.leads_format, config.leads_file.clone());
    let sessions = SessionStore::new(config.session_ttl);
    let dialogue = Arc::new(DialogueManager::new(sessions, llm, leads, system_prompt));

    // Periodically drop idle sessions
    {
        let dialogue = Arc::clone(&dialogue);
        let mut interval = tokio::time::interval(config.session_sweep_interval);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                let evicted = dialogue.sessions().evict_expired().await;
                if evicted > 0 {
                    let remaining = dialogue.sessions().count().await;
                    info!(evicted, remaining, "Idle sessions evicted");
                }
            }
        });
    }

    let bot = Bot::new(config.bot_token.clone());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register command menu");
    }

    let state = BotState {
        dialogue,
        manager_chat_id: config.manager_chat_id.map(ChatId),
    };

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_message().endpoint(message_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
