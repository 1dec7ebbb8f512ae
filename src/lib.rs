//! # Solar Lead Telegram Bot
//!
//! A Telegram bot that consults about solar power stations, estimates a
//! station from the customer's electricity bill, collects a sales lead and
//! relays free-form questions to a chat-completion model.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod estimator;
pub mod lead_store;
pub mod llm;
pub mod localization;
pub mod session;
pub mod text_processing;
