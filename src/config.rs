//! # Configuration Module
//!
//! Bot, LLM provider and storage settings, loaded from the process environment.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::BotError;

// Defaults for the chat-completion call
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

// Defaults for sessions and storage
pub const DEFAULT_LEADS_FILE: &str = "leads.json";
pub const DEFAULT_TEXT_LEADS_FILE: &str = "leads.txt";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60; // one day
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 600;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Ты — Домовой Дом Солнца, строгий, но доброжелательный эксперт-энергетик. \
Ты консультируешь по солнечным электростанциям для компании \"Дом Солнца\".

Как ты говоришь:
- коротко и по делу, без воды;
- уважительно, иногда с лёгкой иронией;
- уверенно в вопросах мощности, тарифов и окупаемости.

Что ты делаешь:
1. Уточняешь тип объекта, регион, средний платёж за свет и наличие отключений.
2. Предлагаешь тип станции: сетевая, гибридная, автономная или резервная.
3. Называешь ориентировочные мощность, стоимость и окупаемость.
4. Никогда не называешь точных цен, только вилки и ориентиры.
5. Ведёшь разговор к тому, чтобы человек оставил контакт для инженера.

Ориентиры:
- сетевая станция от 950 000 ₽, окупаемость 5-7 лет;
- гибридная станция от 300-350 тыс. ₽, окупаемость 5-7 лет;
- автономная станция от 1,4 млн ₽;
- резервная мини-станция от 90-100 тыс. ₽;
- дом около 100 м² это 5-7 кВт и 400-600 тыс. ₽;
- окупаемость для частных домов 5-7 лет, для бизнеса 2,5-4 года.";

/// Chat-completion provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    DeepSeek,
    Groq,
}

impl LlmProvider {
    pub fn default_api_url(self) -> &'static str {
        match self {
            LlmProvider::DeepSeek => "https://api.deepseek.com/chat/completions",
            LlmProvider::Groq => "https://api.groq.com/openai/v1/chat/completions",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::DeepSeek => "deepseek-chat",
            LlmProvider::Groq => "llama-3.3-70b-versatile",
        }
    }

    /// Provider-specific key variable, consulted when `LLM_API_KEY` is absent
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::DeepSeek => "DEEPSEEK_API_KEY",
            LlmProvider::Groq => "GROQ_API_KEY",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deepseek" => Ok(LlmProvider::DeepSeek),
            "groq" => Ok(LlmProvider::Groq),
            other => Err(BotError::Config(format!(
                "LLM_PROVIDER must be 'deepseek' or 'groq', got '{other}'"
            ))),
        }
    }
}

/// Settings for the chat-completion client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub system_prompt: String,
}

impl LlmConfig {
    /// Provider defaults with the given key and the built-in persona
    pub fn for_provider(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_url: provider.default_api_url().to_string(),
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// On-disk layout of the lead store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadsFormat {
    Json,
    Text,
}

impl LeadsFormat {
    /// File used when `LEADS_FILE` is not set
    pub fn default_file(self) -> &'static str {
        match self {
            LeadsFormat::Json => DEFAULT_LEADS_FILE,
            LeadsFormat::Text => DEFAULT_TEXT_LEADS_FILE,
        }
    }
}

impl FromStr for LeadsFormat {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LeadsFormat::Json),
            "text" | "txt" => Ok(LeadsFormat::Text),
            other => Err(BotError::Config(format!(
                "LEADS_FORMAT must be 'json' or 'text', got '{other}'"
            ))),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub llm: LlmConfig,
    pub leads_file: PathBuf,
    pub leads_format: LeadsFormat,
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
    /// Chat that receives a summary of every completed lead
    pub manager_chat_id: Option<i64>,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `TELEGRAM_BOT_TOKEN`
    /// - `LLM_API_KEY`, or the provider-specific `DEEPSEEK_API_KEY` / `GROQ_API_KEY`
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = var("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            BotError::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required. \
                 Get your token from @BotFather on Telegram."
                    .to_string(),
            )
        })?;

        let provider = match var("LLM_PROVIDER") {
            Some(name) => name.parse()?,
            None => LlmProvider::DeepSeek,
        };

        let api_key = var("LLM_API_KEY")
            .or_else(|| var(provider.api_key_var()))
            .ok_or_else(|| {
                BotError::Config(format!(
                    "LLM_API_KEY (or {}) environment variable is required",
                    provider.api_key_var()
                ))
            })?;

        let mut llm = LlmConfig::for_provider(provider, api_key);
        if let Some(url) = var("LLM_API_URL") {
            llm.api_url = url;
        }
        if let Some(model) = var("LLM_MODEL") {
            llm.model = model;
        }
        llm.temperature = parse_or("LLM_TEMPERATURE", var("LLM_TEMPERATURE"), DEFAULT_TEMPERATURE)?;
        llm.max_tokens = parse_or("LLM_MAX_TOKENS", var("LLM_MAX_TOKENS"), DEFAULT_MAX_TOKENS)?;
        llm.timeout = Duration::from_secs(parse_or(
            "LLM_TIMEOUT_SECS",
            var("LLM_TIMEOUT_SECS"),
            DEFAULT_LLM_TIMEOUT_SECS,
        )?);
        if let Some(path) = var("SYSTEM_PROMPT_FILE") {
            llm.system_prompt = fs::read_to_string(&path).map_err(|e| {
                BotError::Config(format!("Cannot read SYSTEM_PROMPT_FILE '{path}': {e}"))
            })?;
        }

        let leads_format = match var("LEADS_FORMAT") {
            Some(format) => format.parse()?,
            None => LeadsFormat::Json,
        };

        let leads_file = var("LEADS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(leads_format.default_file()));

        let session_ttl = Duration::from_secs(parse_or(
            "SESSION_TTL_SECS",
            var("SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?);
        let sweep_secs: u64 = parse_or(
            "SESSION_SWEEP_SECS",
            var("SESSION_SWEEP_SECS"),
            DEFAULT_SESSION_SWEEP_SECS,
        )?;
        if sweep_secs == 0 {
            return Err(BotError::Config(
                "SESSION_SWEEP_SECS must be greater than 0".to_string(),
            ));
        }

        let manager_chat_id = var("MANAGER_CHAT_ID")
            .map(|id| {
                id.trim().parse::<i64>().map_err(|_| {
                    BotError::Config(format!("MANAGER_CHAT_ID must be an integer, got '{id}'"))
                })
            })
            .transpose()?;

        Ok(BotConfig {
            bot_token,
            llm,
            leads_file,
            leads_format,
            session_ttl,
            session_sweep_interval: Duration::from_secs(sweep_secs),
            manager_chat_id,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, BotError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BotError::Config(format!("{key} has an invalid value: '{raw}'"))),
        None => Ok(default),
    }
}
