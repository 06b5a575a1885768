use aligna_core::BotId;
use aligna_core::widget::{DEFAULT_CONNECTIVITY_ERROR, DEFAULT_FALLBACK_REPLY, WidgetTexts};
use aligna_interaction::{BackendError, ChatBackend, ChatWidget, HttpChatBackend, SendOutcome};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_posts_message_with_bot_id_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_query(Matcher::UrlEncoded("botId".into(), "abc123".into()))
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"message": "hi there"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "hello"}"#)
        .create_async()
        .await;

    let backend = HttpChatBackend::new(server.url());
    let reply = backend
        .send(&BotId::new("abc123"), "hi there")
        .await
        .expect("request should succeed");

    assert_eq!(reply.reply_text().as_deref(), Some("hello"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_response_field_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let backend = HttpChatBackend::new(server.url());
    let reply = backend.send(&BotId::new("abc123"), "hi").await.unwrap();
    assert_eq!(reply.reply_text(), None);
}

#[tokio::test]
async fn test_error_status_with_json_body_is_read() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"error": "boom"}"#)
        .create_async()
        .await;

    let backend = HttpChatBackend::new(server.url());
    let reply = backend.send(&BotId::new("abc123"), "hi").await.unwrap();
    assert_eq!(reply.reply_text(), None);
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let backend = HttpChatBackend::new(server.url());
    let err = backend.send(&BotId::new("abc123"), "hi").await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Nothing listens on port 1
    let backend = HttpChatBackend::new("http://127.0.0.1:1");
    let err = backend.send(&BotId::new("abc123"), "hi").await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn test_silent_backend_is_timeout_error() {
    // Accepts connections but never writes a response
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let backend =
        HttpChatBackend::new(format!("http://{}", addr)).with_timeout(Duration::from_millis(50));
    let err = backend.send(&BotId::new("abc123"), "hi").await.unwrap_err();
    assert!(matches!(err, BackendError::Timeout));
    assert_eq!(err.kind(), "timeout");
}

#[tokio::test]
async fn test_widget_over_http_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("POST", "/api/chat")
        .match_query(Matcher::UrlEncoded("botId".into(), "abc123".into()))
        .match_body(Matcher::Json(json!({"message": "first"})))
        .with_body(r#"{"response": "hello"}"#)
        .create_async()
        .await;
    let _empty = server
        .mock("POST", "/api/chat")
        .match_query(Matcher::UrlEncoded("botId".into(), "abc123".into()))
        .match_body(Matcher::Json(json!({"message": "second"})))
        .with_body("{}")
        .create_async()
        .await;
    let _broken = server
        .mock("POST", "/api/chat")
        .match_query(Matcher::UrlEncoded("botId".into(), "abc123".into()))
        .match_body(Matcher::Json(json!({"message": "third"})))
        .with_body("not json")
        .create_async()
        .await;

    let backend = Arc::new(HttpChatBackend::new(server.url()).with_timeout(Duration::from_secs(5)));
    let widget = ChatWidget::new(BotId::new("abc123"), backend, WidgetTexts::default())
        .with_reply_delay(Duration::ZERO);

    widget.set_draft("first").await;
    assert_eq!(widget.send().await.outcome, SendOutcome::Replied);
    assert_eq!(widget.snapshot().await.latest().text, "hello");

    widget.set_draft("second").await;
    assert_eq!(widget.send().await.outcome, SendOutcome::Replied);
    assert_eq!(widget.snapshot().await.latest().text, DEFAULT_FALLBACK_REPLY);

    widget.set_draft("third").await;
    assert_eq!(widget.send().await.outcome, SendOutcome::Failed);
    let state = widget.snapshot().await;
    assert_eq!(state.latest().text, DEFAULT_CONNECTIVITY_ERROR);
    assert_eq!(state.messages().len(), 7);
    assert!(!state.is_typing());
}
