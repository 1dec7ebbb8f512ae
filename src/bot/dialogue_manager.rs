//! Dialogue Manager module for handling dialogue state transitions
//!
//! Transport independent: takes user text, returns the replies to send.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::dialogue::{ConversationStage, Lead, Session};
use crate::errors::LlmError;
use crate::estimator::estimate;
use crate::lead_store::LeadStore;
use crate::llm::{ChatCompletion, ChatMessage};
use crate::session::SessionStore;
use crate::text_processing::{
    extract_name, extract_phone, mentions_lead_intent, mentions_money, mentions_object,
    parse_bill_amount,
};

// Import UI builder functions
use super::ui_builder::{format_commentary_request, format_estimate, ReplyKeyboard};

/// One outgoing message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<ReplyKeyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: ReplyKeyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Result of handling one inbound message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    pub replies: Vec<Reply>,
    /// Set on the turn that completed and persisted a lead
    pub completed_lead: Option<Lead>,
}

impl Turn {
    fn reply(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            completed_lead: None,
        }
    }
}

/// Map an LLM failure onto the apology shown to the user
fn fallback_key(err: &LlmError) -> &'static str {
    match err {
        LlmError::Timeout => "llm-timeout",
        LlmError::Network(_) => "llm-network",
        LlmError::Status { .. } | LlmError::Payload(_) => "llm-error",
    }
}

/// Drives the lead collection dialogue for every user
pub struct DialogueManager {
    sessions: SessionStore,
    llm: Arc<dyn ChatCompletion>,
    leads: Arc<dyn LeadStore>,
    system_prompt: String,
}

impl DialogueManager {
    pub fn new(
        sessions: SessionStore,
        llm: Arc<dyn ChatCompletion>,
        leads: Arc<dyn LeadStore>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            llm,
            leads,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Current stage of the user's conversation
    pub async fn stage(&self, user_id: i64) -> ConversationStage {
        self.sessions.session(user_id).await.lock().await.stage
    }

    /// In-progress or completed lead of the user
    pub async fn lead(&self, user_id: i64) -> Lead {
        self.sessions.session(user_id).await.lock().await.lead.clone()
    }

    /// Handle `/start`: reset the session and ask for the object type
    pub async fn start(&self, user_id: i64, language: &str) -> Turn {
        let handle = self.sessions.session(user_id).await;
        let mut session = handle.lock().await;
        session.language = language.to_string();
        session.reset(ConversationStage::WaitingForObject);

        let welcome = t_lang("welcome", language);
        session.remember(ChatMessage::assistant(welcome.clone()));
        info!(user_id, "Lead collection started");

        Turn::reply(Reply::with_keyboard(welcome, ReplyKeyboard::ObjectChoices))
    }

    /// Handle `/cancel`: abort data collection. A finished lead stays finished.
    pub async fn cancel(&self, user_id: i64, language: &str) -> Turn {
        let handle = self.sessions.session(user_id).await;
        let mut session = handle.lock().await;
        session.language = language.to_string();

        if session.stage.is_collecting() {
            info!(user_id, stage = %session.stage, "Lead collection cancelled");
            session.reset(ConversationStage::Chat);
        }

        Turn::reply(Reply::with_keyboard(
            t_lang("cancel-done", language),
            ReplyKeyboard::Remove,
        ))
    }

    /// Handle `/help`; the session is left untouched
    pub fn help(&self, language: &str) -> Turn {
        Turn::reply(Reply::text(t_lang("help", language)))
    }

    /// Handle a plain text message according to the user's current stage
    pub async fn handle_text(&self, user_id: i64, language: &str, text: &str) -> Turn {
        let handle = self.sessions.session(user_id).await;
        let mut session = handle.lock().await;
        session.touch();
        session.language = language.to_string();

        let text = text.trim();
        let stage_before = session.stage;
        debug!(user_id, stage = %stage_before, message_length = text.len(), "Handling text message");

        let turn = match session.stage {
            ConversationStage::Chat => self.handle_chat(&mut session, text).await,
            ConversationStage::WaitingForObject => self.handle_object(&mut session, text).await,
            ConversationStage::WaitingForRegion => handle_region(&mut session, text),
            ConversationStage::WaitingForBill => self.handle_bill(&mut session, text).await,
            ConversationStage::WaitingForName => handle_name(&mut session, text),
            ConversationStage::WaitingForPhone => {
                self.handle_phone(user_id, &mut session, text).await
            }
            ConversationStage::Done => self.relay(&mut session, text).await,
        };

        if session.stage != stage_before {
            info!(user_id, from = %stage_before, to = %session.stage, "Dialogue stage changed");
        }

        turn
    }

    async fn handle_chat(&self, session: &mut Session, text: &str) -> Turn {
        // "дом, 5000 платеж" carries everything needed for an estimate
        if mentions_object(text) {
            if let Some(amount) = parse_bill_amount(text) {
                session.lead.object_type = Some(text.to_string());
                record_bill(session, text, amount);
                return self.estimate_turn(session, amount).await;
            }
        }

        if mentions_lead_intent(text) {
            session.stage = ConversationStage::WaitingForObject;
            return Turn::reply(Reply::with_keyboard(
                t_lang("ask-object", &session.language),
                ReplyKeyboard::ObjectChoices,
            ));
        }

        self.relay(session, text).await
    }

    async fn handle_object(&self, session: &mut Session, text: &str) -> Turn {
        if text.is_empty() {
            return Turn::reply(Reply::with_keyboard(
                t_lang("ask-object-retry", &session.language),
                ReplyKeyboard::ObjectChoices,
            ));
        }

        session.lead.object_type = Some(text.to_string());

        // A bare number here is more often a year or an area than a bill
        if mentions_money(text) {
            if let Some(amount) = parse_bill_amount(text) {
                record_bill(session, text, amount);
                return self.estimate_turn(session, amount).await;
            }
        }

        session.stage = ConversationStage::WaitingForRegion;
        Turn::reply(Reply::with_keyboard(
            t_lang("ask-region", &session.language),
            ReplyKeyboard::Remove,
        ))
    }

    async fn handle_bill(&self, session: &mut Session, text: &str) -> Turn {
        match parse_bill_amount(text) {
            Some(amount) => {
                record_bill(session, text, amount);
                self.estimate_turn(session, amount).await
            }
            None => Turn::reply(Reply::text(t_lang("ask-bill-retry", &session.language))),
        }
    }

    async fn handle_phone(&self, user_id: i64, session: &mut Session, text: &str) -> Turn {
        let Some(phone) = extract_phone(text) else {
            return Turn::reply(Reply::with_keyboard(
                t_lang("ask-phone-retry", &session.language),
                ReplyKeyboard::SharePhone,
            ));
        };

        session.lead.phone = Some(phone.clone());
        session.lead.timestamp = Some(Utc::now());
        session.stage = ConversationStage::Done;

        let lead = session.lead.clone();
        if let Err(e) = self.leads.save(user_id, &lead).await {
            error!(user_id, error = %e, "Failed to persist lead");
            warn!(user_id, lead = ?lead, "Unsaved lead");
        }

        let name = lead.name.clone().unwrap_or_default();
        Turn {
            replies: vec![Reply::with_keyboard(
                t_args_lang(
                    "lead-saved",
                    &[("name", name.as_str()), ("phone", phone.as_str())],
                    &session.language,
                ),
                ReplyKeyboard::Remove,
            )],
            completed_lead: Some(lead),
        }
    }

    /// Send the estimate, the model's commentary on it, and ask for a name
    async fn estimate_turn(&self, session: &mut Session, amount: u32) -> Turn {
        let result = estimate(amount, &session.lead.context_text());
        let language = session.language.clone();
        debug!(
            bill = amount,
            power_kw = result.power_kw,
            station = ?result.station_type,
            "Estimate computed"
        );

        let summary = format_estimate(&result, &language);
        let request = format_commentary_request(&session.lead, &result, &language);
        let commentary = self.ask_model(session, ChatMessage::user(request)).await;

        session.remember(ChatMessage::assistant(summary.clone()));
        if let Ok(commentary) = &commentary {
            session.remember(ChatMessage::assistant(commentary.clone()));
        }
        session.stage = ConversationStage::WaitingForName;

        Turn {
            replies: vec![
                Reply::text(summary),
                Reply::text(commentary.unwrap_or_else(|key| t_lang(key, &language))),
                Reply::with_keyboard(t_lang("ask-name", &language), ReplyKeyboard::Remove),
            ],
            completed_lead: None,
        }
    }

    /// Pass the user's text through to the model
    async fn relay(&self, session: &mut Session, text: &str) -> Turn {
        let user_message = ChatMessage::user(text);
        let reply = match self.ask_model(session, user_message.clone()).await {
            Ok(answer) => {
                session.remember(user_message);
                session.remember(ChatMessage::assistant(answer.clone()));
                answer
            }
            Err(key) => t_lang(key, &session.language),
        };
        Turn::reply(Reply::text(reply))
    }

    /// Query the model with the system prompt, history and one new message.
    /// Errors come back as the localization key of the apology.
    async fn ask_model(
        &self,
        session: &Session,
        message: ChatMessage,
    ) -> Result<String, &'static str> {
        let mut messages = Vec::with_capacity(session.history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend(session.history.iter().cloned());
        messages.push(message);

        self.llm.complete(&messages).await.map_err(|e| {
            error!(error = %e, "LLM request failed");
            fallback_key(&e)
        })
    }
}

fn record_bill(session: &mut Session, text: &str, amount: u32) {
    session.lead.monthly_bill = Some(text.to_string());
    session.lead.bill_amount = Some(amount);
}

fn handle_region(session: &mut Session, text: &str) -> Turn {
    if text.is_empty() {
        return Turn::reply(Reply::text(t_lang("ask-region-retry", &session.language)));
    }

    session.lead.region = Some(text.to_string());
    session.stage = ConversationStage::WaitingForBill;
    Turn::reply(Reply::text(t_lang("ask-bill", &session.language)))
}

fn handle_name(session: &mut Session, text: &str) -> Turn {
    match extract_name(text) {
        Ok(name) => {
            let prompt = t_args_lang("ask-phone", &[("name", name.as_str())], &session.language);
            session.lead.name = Some(name);
            session.stage = ConversationStage::WaitingForPhone;
            Turn::reply(Reply::with_keyboard(prompt, ReplyKeyboard::SharePhone))
        }
        Err(reason) => {
            debug!(reason, "Rejected name input");
            Turn::reply(Reply::text(t_lang("ask-name-retry", &session.language)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_keys() {
        assert_eq!(fallback_key(&LlmError::Timeout), "llm-timeout");
        assert_eq!(fallback_key(&LlmError::Network("reset".into())), "llm-network");
        assert_eq!(
            fallback_key(&LlmError::Status {
                status: 500,
                body: String::new()
            }),
            "llm-error"
        );
        assert_eq!(fallback_key(&LlmError::Payload("{}".into())), "llm-error");
    }
}
