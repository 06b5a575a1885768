//! Remote side of the Aligna widget.
//!
//! - `backend`: the `ChatBackend` seam and its reply/error types
//! - `http_backend`: `HttpChatBackend`, the JSON-over-HTTP implementation
//! - `widget`: `ChatWidget`, which runs a send cycle against a backend

pub mod backend;
pub mod http_backend;
pub mod widget;

pub use backend::{BackendError, ChatBackend, ChatReply};
pub use http_backend::HttpChatBackend;
pub use widget::{ChatWidget, SendOutcome, SendReport};
