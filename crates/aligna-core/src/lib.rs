//! Core domain types for the Aligna chat widget.
//!
//! # Module Structure
//!
//! - `message`: chat messages and their senders
//! - `bot_id`: the opaque routing key forwarded to the chat backend
//! - `widget`: the widget's state holder and its transitions
//! - `embed`: the embed loader (iframe construction and loader script)
//! - `config`: file-based configuration
//! - `error`: shared error type

pub mod bot_id;
pub mod config;
pub mod embed;
pub mod error;
pub mod message;
pub mod widget;

pub use bot_id::BotId;
pub use error::{AlignaError, Result};
pub use message::{Message, Sender};
