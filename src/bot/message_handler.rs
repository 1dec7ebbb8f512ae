//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

// Import localization
use crate::localization::{detect_language, t_lang};

use crate::dialogue::ConversationStage;

// Import dialogue manager types
use super::dialogue_manager::{DialogueManager, Turn};

// Import UI builder functions
use super::ui_builder::{build_reply_markup, format_lead_notification};

/// Telegram bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать расчёт заново")]
    Start,
    #[command(description = "показать справку")]
    Help,
    #[command(description = "прервать расчёт")]
    Cancel,
}

/// Shared handler dependencies
#[derive(Clone)]
pub struct BotState {
    pub dialogue: Arc<DialogueManager>,
    /// Chat that receives completed leads
    pub manager_chat_id: Option<ChatId>,
}

fn message_language(msg: &Message) -> &'static str {
    detect_language(
        msg.from
            .as_ref()
            .and_then(|user| user.language_code.as_deref()),
    )
}

fn message_user_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .map(|user| user.id.0 as i64)
        .unwrap_or(msg.chat.id.0)
}

/// Telegram reports shared contacts without the leading plus
fn normalize_contact_phone(phone: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("+{phone}")
    }
}

async fn send_typing(bot: &Bot, chat_id: ChatId) {
    if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        debug!(chat_id = %chat_id, error = %e, "Failed to send typing action");
    }
}

/// Send every reply of a turn and forward a completed lead to the manager chat
async fn send_turn(
    bot: &Bot,
    chat_id: ChatId,
    language: &str,
    turn: Turn,
    state: &BotState,
) -> Result<()> {
    for reply in turn.replies {
        let mut request = bot.send_message(chat_id, reply.text);
        if let Some(keyboard) = reply.keyboard {
            request = request.reply_markup(build_reply_markup(keyboard, language));
        }
        request.await?;
    }

    if let (Some(lead), Some(manager_chat)) = (turn.completed_lead, state.manager_chat_id) {
        let notification = format_lead_notification(&lead, language);
        match bot.send_message(manager_chat, notification).await {
            Ok(_) => info!(manager_chat = %manager_chat, "Lead forwarded to manager chat"),
            Err(e) => error!(manager_chat = %manager_chat, error = %e, "Failed to forward lead"),
        }
    }

    Ok(())
}

pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, state: BotState) -> Result<()> {
    let user_id = message_user_id(&msg);
    let language = message_language(&msg);
    debug!(user_id, command = ?cmd, "Received command");

    let turn = match cmd {
        Command::Start => state.dialogue.start(user_id, language).await,
        Command::Help => state.dialogue.help(language),
        Command::Cancel => state.dialogue.cancel(user_id, language).await,
    };

    send_turn(&bot, msg.chat.id, language, turn, &state).await
}

pub async fn message_handler(bot: Bot, msg: Message, state: BotState) -> Result<()> {
    let user_id = message_user_id(&msg);
    let language = message_language(&msg);

    if let Some(text) = msg.text() {
        debug!(user_id, message_length = text.len(), "Received text message from user");
        send_typing(&bot, msg.chat.id).await;
        let turn = state.dialogue.handle_text(user_id, language, text).await;
        return send_turn(&bot, msg.chat.id, language, turn, &state).await;
    }

    if let Some(contact) = msg.contact() {
        if state.dialogue.stage(user_id).await == ConversationStage::WaitingForPhone {
            debug!(user_id, "Received shared contact from user");
            let phone = normalize_contact_phone(&contact.phone_number);
            let turn = state.dialogue.handle_text(user_id, language, &phone).await;
            return send_turn(&bot, msg.chat.id, language, turn, &state).await;
        }
    }

    warn!(user_id, "Received unsupported message type from user");
    bot.send_message(msg.chat.id, t_lang("unsupported-message", language))
        .await?;
    Ok(())
}
