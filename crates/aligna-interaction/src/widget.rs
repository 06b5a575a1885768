//! ChatWidget - runs the widget's send cycle against a chat backend.
//!
//! A send cycle appends the user message, calls the backend with the state
//! lock released, waits the reply delay and appends exactly one bot message.
//! At most one cycle is in flight: a second send while waiting is skipped.

use crate::backend::ChatBackend;
use aligna_core::BotId;
use aligna_core::config::{DEFAULT_REPLY_DELAY_MS, WidgetConfig};
use aligna_core::widget::{PendingSend, ReplyOutcome, Transition, WidgetState, WidgetTexts};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How a send cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank draft or a reply already pending; nothing changed.
    Skipped,
    /// The backend answered (possibly without usable text).
    Replied,
    /// The backend failed; the connectivity message was shown.
    Failed,
}

/// What a send cycle did, with the view effects its appends produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub outcome: SendOutcome,
    pub transition: Transition,
}

impl SendReport {
    fn skipped() -> Self {
        Self {
            outcome: SendOutcome::Skipped,
            transition: Transition::none(),
        }
    }
}

/// One widget session bound to a bot and a backend.
pub struct ChatWidget<B: ChatBackend + ?Sized> {
    state: Arc<Mutex<WidgetState>>,
    backend: Arc<B>,
    bot_id: BotId,
    reply_delay: Duration,
}

impl<B: ChatBackend + ?Sized> Clone for ChatWidget<B> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            backend: self.backend.clone(),
            bot_id: self.bot_id.clone(),
            reply_delay: self.reply_delay,
        }
    }
}

impl<B: ChatBackend + ?Sized> ChatWidget<B> {
    /// Creates a closed widget holding only the greeting.
    pub fn new(bot_id: BotId, backend: Arc<B>, texts: WidgetTexts) -> Self {
        Self {
            state: Arc::new(Mutex::new(WidgetState::new(texts))),
            backend,
            bot_id,
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
        }
    }

    pub fn from_config(bot_id: BotId, backend: Arc<B>, config: &WidgetConfig) -> Self {
        Self::new(bot_id, backend, config.texts.clone()).with_reply_delay(config.reply_delay())
    }

    /// Sets the pause before a reply is shown. Zero disables it.
    pub fn with_reply_delay(mut self, reply_delay: Duration) -> Self {
        self.reply_delay = reply_delay;
        self
    }

    pub fn bot_id(&self) -> &BotId {
        &self.bot_id
    }

    pub fn reply_delay(&self) -> Duration {
        self.reply_delay
    }

    /// A copy of the current state for rendering.
    pub async fn snapshot(&self) -> WidgetState {
        self.state.lock().await.clone()
    }

    pub async fn open(&self) -> Transition {
        self.state.lock().await.open()
    }

    pub async fn close(&self) -> Transition {
        self.state.lock().await.close()
    }

    pub async fn toggle_minimize(&self) -> Transition {
        self.state.lock().await.toggle_minimize()
    }

    pub async fn set_draft(&self, input: impl Into<String>) {
        self.state.lock().await.set_draft(input);
    }

    pub async fn clear(&self) -> Transition {
        self.state.lock().await.clear()
    }

    /// Runs one full send cycle for the current draft.
    ///
    /// The report's transition covers both the user and the bot append.
    pub async fn send(&self) -> SendReport {
        match self.begin().await {
            Some((pending, sent)) => {
                let report = self.deliver(pending).await;
                SendReport {
                    outcome: report.outcome,
                    transition: sent.merge(report.transition),
                }
            }
            None => SendReport::skipped(),
        }
    }

    /// Appends the user message now and finishes the cycle on a background task.
    ///
    /// Returns the user append's transition with the task handle, or `None`
    /// when the send was skipped.
    pub async fn spawn_send(&self) -> Option<(Transition, JoinHandle<SendReport>)>
    where
        B: 'static,
    {
        let (pending, sent) = self.begin().await?;
        let widget = self.clone();
        let handle = tokio::spawn(async move { widget.deliver(pending).await });
        Some((sent, handle))
    }

    async fn begin(&self) -> Option<(PendingSend, Transition)> {
        let mut state = self.state.lock().await;
        let (pending, transition) = state.begin_send()?;
        info!(bot_id = %self.bot_id, len = pending.text.len(), "sending message");
        Some((pending, transition))
    }

    async fn deliver(&self, pending: PendingSend) -> SendReport {
        let (outcome, reply) = match self.backend.send(&self.bot_id, &pending.text).await {
            Ok(reply) => (SendOutcome::Replied, ReplyOutcome::Reply(reply.reply_text())),
            Err(e) => {
                warn!(bot_id = %self.bot_id, kind = e.kind(), error = %e, "chat backend failed");
                (SendOutcome::Failed, ReplyOutcome::Failed)
            }
        };

        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        let transition = self.state.lock().await.complete_send(reply);
        info!(bot_id = %self.bot_id, ?outcome, "send cycle complete");
        SendReport {
            outcome,
            transition,
        }
    }
}
