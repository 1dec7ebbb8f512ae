//! Lead collection dialogue module for handling conversation state with users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::llm::ChatMessage;
use crate::localization::DEFAULT_LANGUAGE;

/// Number of most recent messages kept as LLM context
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// Represents the stage of the lead collection dialogue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationStage {
    /// Free conversation relayed to the LLM
    #[default]
    Chat,
    WaitingForObject,
    WaitingForRegion,
    WaitingForBill,
    WaitingForName,
    WaitingForPhone,
    /// Lead saved; further text is relayed to the LLM
    Done,
}

impl ConversationStage {
    /// Whether the stage belongs to the guided data collection
    pub fn is_collecting(self) -> bool {
        !matches!(self, ConversationStage::Chat | ConversationStage::Done)
    }
}

impl std::fmt::Display for ConversationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConversationStage::Chat => "chat",
            ConversationStage::WaitingForObject => "waiting_for_object",
            ConversationStage::WaitingForRegion => "waiting_for_region",
            ConversationStage::WaitingForBill => "waiting_for_bill",
            ConversationStage::WaitingForName => "waiting_for_name",
            ConversationStage::WaitingForPhone => "waiting_for_phone",
            ConversationStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A prospective customer's collected data, built up stage by stage
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub object_type: Option<String>,
    pub region: Option<String>,
    /// Bill as the user wrote it
    pub monthly_bill: Option<String>,
    /// Bill amount parsed out of `monthly_bill`, rubles per month
    pub bill_amount: Option<u32>,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Set when the lead is completed
    pub timestamp: Option<DateTime<Utc>>,
}

impl Lead {
    /// A lead can be persisted once it has contact data
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.phone.is_some() && self.timestamp.is_some()
    }

    /// Object and region text used to classify the station
    pub fn context_text(&self) -> String {
        [self.object_type.as_deref(), self.region.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Per-user conversation state
#[derive(Clone, Debug)]
pub struct Session {
    pub stage: ConversationStage,
    pub lead: Lead,
    pub language: String,
    pub history: Vec<ChatMessage>,
    pub last_activity: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            stage: ConversationStage::default(),
            lead: Lead::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            history: Vec::new(),
            last_activity: Instant::now(),
        }
    }
}

impl Session {
    /// Drop collected data and history, keeping the language
    pub fn reset(&mut self, stage: ConversationStage) {
        self.stage = stage;
        self.lead = Lead::default();
        self.history.clear();
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Append a message to the LLM context, keeping only the most recent ones
    pub fn remember(&mut self, message: ChatMessage) {
        self.history.push(message);
        if self.history.len() > MAX_HISTORY_MESSAGES {
            let excess = self.history.len() - MAX_HISTORY_MESSAGES;
            self.history.drain(..excess);
        }
    }
}
