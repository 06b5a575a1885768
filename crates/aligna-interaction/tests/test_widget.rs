use aligna_core::widget::{
    DEFAULT_CONNECTIVITY_ERROR, DEFAULT_FALLBACK_REPLY, DEFAULT_GREETING, ViewEffect, WidgetTexts,
};
use aligna_core::{BotId, Sender};
use aligna_interaction::{BackendError, ChatBackend, ChatReply, ChatWidget, SendOutcome};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// Backend that replays scripted results and records what it was sent
struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    received: Mutex<Vec<(String, String)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    fn new(replies: Vec<Result<ChatReply, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            received: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    fn gated(replies: Vec<Result<ChatReply, BackendError>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    fn received(&self) -> Vec<(String, String)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(&self, bot_id: &BotId, message: &str) -> Result<ChatReply, BackendError> {
        self.received
            .lock()
            .unwrap()
            .push((bot_id.to_string(), message.to_string()));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Transport("no scripted reply".to_string())))
    }
}

fn new_widget(backend: Arc<ScriptedBackend>) -> ChatWidget<ScriptedBackend> {
    ChatWidget::new(BotId::new("abc123"), backend, WidgetTexts::default())
        .with_reply_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_send_cycle_appends_user_then_bot() {
    let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatReply::text("hello"))]));
    let widget = new_widget(backend.clone());
    widget.open().await;

    widget.set_draft("hi there").await;
    let outcome = widget.send().await.outcome;

    assert_eq!(outcome, SendOutcome::Replied);
    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 3);
    assert_eq!(state.messages()[1].sender, Sender::User);
    assert_eq!(state.messages()[1].text, "hi there");
    assert_eq!(state.messages()[2].sender, Sender::Bot);
    assert_eq!(state.messages()[2].text, "hello");
    assert!(!state.is_typing());
    assert_eq!(state.draft(), "");

    assert_eq!(
        backend.received(),
        vec![("abc123".to_string(), "hi there".to_string())]
    );
}

#[tokio::test]
async fn test_both_appends_scroll_to_latest() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(ScriptedBackend::gated(
        vec![Ok(ChatReply::text("hello")), Ok(ChatReply::text("again"))],
        gate.clone(),
    ));
    let widget = new_widget(backend);

    widget.set_draft("hi").await;
    let (sent, handle) = widget.spawn_send().await.unwrap();
    assert_eq!(sent.effects(), &[ViewEffect::ScrollToLatest]);

    gate.notify_one();
    let report = handle.await.unwrap();
    assert_eq!(report.outcome, SendOutcome::Replied);
    assert_eq!(report.transition.effects(), &[ViewEffect::ScrollToLatest]);

    // Inline send reports the same effect for the whole cycle
    widget.set_draft("hi again").await;
    gate.notify_one();
    let report = widget.send().await;
    assert!(report.transition.contains(ViewEffect::ScrollToLatest));
    assert!(!report.transition.contains(ViewEffect::FocusInput));

    widget.set_draft("   ").await;
    assert!(widget.send().await.transition.is_empty());
}

#[tokio::test]
async fn test_each_completed_cycle_adds_two_messages() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Ok(ChatReply::text("one")),
        Ok(ChatReply::empty()),
        Err(BackendError::Timeout),
    ]));
    let widget = new_widget(backend);

    for (i, text) in ["a", "b", "c"].into_iter().enumerate() {
        widget.set_draft(text).await;
        widget.send().await;
        assert_eq!(widget.snapshot().await.messages().len(), 1 + 2 * (i + 1));
    }
}

#[tokio::test]
async fn test_missing_response_field_uses_fallback() {
    let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatReply::empty())]));
    let widget = new_widget(backend);

    widget.set_draft("hi").await;
    assert_eq!(widget.send().await.outcome, SendOutcome::Replied);

    let state = widget.snapshot().await;
    assert_eq!(state.latest().text, DEFAULT_FALLBACK_REPLY);
}

#[tokio::test]
async fn test_backend_failure_uses_connectivity_error() {
    for error in [
        BackendError::Transport("connection refused".to_string()),
        BackendError::Timeout,
        BackendError::Decode("expected value".to_string()),
    ] {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(error)]));
        let widget = new_widget(backend);

        widget.set_draft("hi").await;
        assert_eq!(widget.send().await.outcome, SendOutcome::Failed);

        let state = widget.snapshot().await;
        assert_eq!(state.latest().text, DEFAULT_CONNECTIVITY_ERROR);
        assert_eq!(state.latest().sender, Sender::Bot);
        assert!(!state.is_typing());
    }
}

#[tokio::test]
async fn test_blank_input_is_skipped_without_calling_backend() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let widget = new_widget(backend.clone());

    for draft in ["", "   ", "\n"] {
        widget.set_draft(draft).await;
        assert_eq!(widget.send().await.outcome, SendOutcome::Skipped);
    }

    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 1);
    assert!(!state.is_typing());
    assert!(backend.received().is_empty());
}

#[tokio::test]
async fn test_send_while_typing_is_noop() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(ScriptedBackend::gated(
        vec![Ok(ChatReply::text("first reply"))],
        gate.clone(),
    ));
    let widget = new_widget(backend.clone());

    widget.set_draft("first").await;
    let (_, handle) = widget.spawn_send().await.expect("first send starts");

    // User message is visible while the backend is still working
    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 2);
    assert!(state.is_typing());

    widget.set_draft("second").await;
    assert_eq!(widget.send().await.outcome, SendOutcome::Skipped);
    assert!(widget.spawn_send().await.is_none());

    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 2);
    assert!(state.is_typing());

    gate.notify_one();
    assert_eq!(handle.await.unwrap().outcome, SendOutcome::Replied);

    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 3);
    assert_eq!(state.latest().text, "first reply");
    assert_eq!(backend.received().len(), 1);
}

#[tokio::test]
async fn test_display_controls_work_while_reply_pending() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(ScriptedBackend::gated(
        vec![Ok(ChatReply::text("late"))],
        gate.clone(),
    ));
    let widget = new_widget(backend);
    widget.open().await;

    widget.set_draft("hi").await;
    let (_, handle) = widget.spawn_send().await.unwrap();

    // None of these wait on the pending reply
    assert!(widget.toggle_minimize().await.is_empty());
    assert!(widget.snapshot().await.is_minimized());
    assert!(widget.toggle_minimize().await.contains(ViewEffect::FocusInput));
    assert!(widget.clear().await.contains(ViewEffect::ScrollToLatest));
    widget.close().await;

    let state = widget.snapshot().await;
    assert!(!state.is_open());
    assert!(state.is_typing());
    assert_eq!(state.messages().len(), 1);

    gate.notify_one();
    let report = handle.await.unwrap();
    assert_eq!(report.outcome, SendOutcome::Replied);
    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.latest().text, "late");
}

#[tokio::test]
async fn test_clear_resets_to_greeting() {
    let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatReply::text("hello"))]));
    let widget = new_widget(backend);
    widget.open().await;

    widget.set_draft("hi").await;
    widget.send().await;
    widget.clear().await;

    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 1);
    assert_eq!(state.latest().text, DEFAULT_GREETING);
    assert!(state.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_reply_waits_for_reply_delay() {
    let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatReply::text("hello"))]));
    let widget = ChatWidget::new(BotId::new("abc123"), backend, WidgetTexts::default())
        .with_reply_delay(Duration::from_secs(1));

    let started = tokio::time::Instant::now();
    widget.set_draft("hi").await;
    let (_, handle) = widget.spawn_send().await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = widget.snapshot().await;
    assert_eq!(state.messages().len(), 2, "reply must not show before the delay");
    assert!(state.is_typing());

    assert_eq!(handle.await.unwrap().outcome, SendOutcome::Replied);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(widget.snapshot().await.latest().text, "hello");
}

#[tokio::test]
async fn test_trait_object_backend() {
    let backend: Arc<dyn ChatBackend> =
        Arc::new(ScriptedBackend::new(vec![Ok(ChatReply::text("dyn"))]));
    let widget = ChatWidget::new(BotId::new("abc123"), backend, WidgetTexts::default())
        .with_reply_delay(Duration::ZERO);

    widget.set_draft("hi").await;
    let (_, handle) = widget.spawn_send().await.unwrap();
    assert_eq!(handle.await.unwrap().outcome, SendOutcome::Replied);
    assert_eq!(widget.snapshot().await.latest().text, "dyn");
}
