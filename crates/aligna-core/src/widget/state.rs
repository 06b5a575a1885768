//! The widget state holder.

use super::effect::{Transition, ViewEffect};
use super::texts::WidgetTexts;
use crate::message::Message;
use serde::Serialize;
use tracing::debug;

/// A send accepted by [`WidgetState::begin_send`], waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    /// The exact text the user submitted.
    pub text: String,
}

/// How a send cycle ended, as seen by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The backend answered. `None` means the answer had no usable text.
    Reply(Option<String>),
    /// The backend could not be reached or its answer could not be read.
    Failed,
}

/// In-memory state of one widget session.
///
/// Owned by a single widget instance and dropped with it. The message list
/// is append-only during a session and never empty: it starts with the
/// greeting and `clear` resets it to exactly that greeting.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetState {
    messages: Vec<Message>,
    draft_input: String,
    is_open: bool,
    is_minimized: bool,
    is_typing: bool,
    #[serde(skip)]
    texts: WidgetTexts,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new(WidgetTexts::default())
    }
}

impl WidgetState {
    /// Creates a closed, idle widget holding only the greeting.
    pub fn new(texts: WidgetTexts) -> Self {
        Self {
            messages: vec![Message::greeting(texts.greeting.clone())],
            draft_input: String::new(),
            is_open: false,
            is_minimized: false,
            is_typing: false,
            texts,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn latest(&self) -> &Message {
        // Never empty: constructed with the greeting, clear restores it.
        &self.messages[self.messages.len() - 1]
    }

    pub fn draft(&self) -> &str {
        &self.draft_input
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_minimized(&self) -> bool {
        self.is_minimized
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// Whether the input area is shown (open and expanded).
    pub fn is_expanded(&self) -> bool {
        self.is_open && !self.is_minimized
    }

    /// Whether the send control is enabled.
    pub fn can_send(&self) -> bool {
        !self.is_typing && !self.draft_input.trim().is_empty()
    }

    // ============================================================================
    // Display transitions
    // ============================================================================

    pub fn open(&mut self) -> Transition {
        if self.is_open {
            return Transition::none();
        }
        self.is_open = true;
        debug!(minimized = self.is_minimized, "widget opened");
        self.focus_if_expanded(Transition::none())
    }

    pub fn close(&mut self) -> Transition {
        if self.is_open {
            self.is_open = false;
            debug!("widget closed");
        }
        Transition::none()
    }

    /// Flips the minimized flag. Has no effect while the widget is closed.
    pub fn toggle_minimize(&mut self) -> Transition {
        if !self.is_open {
            return Transition::none();
        }
        self.is_minimized = !self.is_minimized;
        debug!(minimized = self.is_minimized, "widget minimize toggled");
        self.focus_if_expanded(Transition::none())
    }

    /// Replaces the draft. Ignored while a reply is pending (input disabled).
    pub fn set_draft(&mut self, input: impl Into<String>) {
        if !self.is_typing {
            self.draft_input = input.into();
        }
    }

    // ============================================================================
    // Message transitions
    // ============================================================================

    /// Starts a send cycle from the current draft.
    ///
    /// Returns `None` without touching any state when the draft is blank or a
    /// reply is already pending. Otherwise appends the user message, clears
    /// the draft and marks the widget as waiting for a reply.
    pub fn begin_send(&mut self) -> Option<(PendingSend, Transition)> {
        if !self.can_send() {
            return None;
        }

        let text = std::mem::take(&mut self.draft_input);
        self.messages.push(Message::user(text.clone()));
        self.is_typing = true;
        debug!(count = self.messages.len(), "user message appended");

        Some((
            PendingSend { text },
            Transition::none().with(ViewEffect::ScrollToLatest),
        ))
    }

    /// Finishes the pending send cycle with exactly one bot message.
    ///
    /// Ignored when no send is pending.
    pub fn complete_send(&mut self, outcome: ReplyOutcome) -> Transition {
        if !self.is_typing {
            return Transition::none();
        }

        let text = match outcome {
            ReplyOutcome::Reply(Some(text)) if !text.is_empty() => text,
            ReplyOutcome::Reply(_) => self.texts.fallback_reply.clone(),
            ReplyOutcome::Failed => self.texts.connectivity_error.clone(),
        };
        self.messages.push(Message::bot(text));
        self.is_typing = false;
        debug!(count = self.messages.len(), "bot message appended");

        Transition::none().with(ViewEffect::ScrollToLatest)
    }

    /// Resets the conversation to a single fresh greeting.
    ///
    /// Display flags and a pending reply are left alone.
    pub fn clear(&mut self) -> Transition {
        self.messages = vec![Message::greeting(self.texts.greeting.clone())];
        debug!("conversation cleared");
        Transition::none().with(ViewEffect::ScrollToLatest)
    }

    fn focus_if_expanded(&self, mut transition: Transition) -> Transition {
        if self.is_expanded() {
            transition.push(ViewEffect::FocusInput);
        }
        transition
    }
}
