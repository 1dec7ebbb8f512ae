//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles commands, text and shared contacts
//! - `dialogue_manager`: Drives the lead collection stages
//! - `ui_builder`: Creates keyboards and formats messages

pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use message_handler::{command_handler, message_handler, BotState, Command};

pub use dialogue_manager::{DialogueManager, Reply, Turn};
pub use ui_builder::ReplyKeyboard;
