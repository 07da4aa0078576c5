use std::sync::{Arc, Mutex};
use std::time::Duration;

use takahashi::core::engine::{EngineError, EngineSession, EngineState};
use takahashi::core::outline::{IndentMode, parse_with};
use takahashi::core::tags;
use takahashi::inference::{
    CompletionProvider, CompletionRequest, Context, Effort, LmStudioProvider, OpenRouterProvider,
    ProviderError, StreamChunk, TransformError, TransformSettings, Transformer,
};
use tokio::sync::mpsc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Creates a context holding a directive and one piece of prose
fn create_test_context() -> Context {
    let mut context = Context::with_directive("Make slides.");
    context.add_user_message("The Takahashi method uses huge text.".to_string());
    context
}

fn request<'a>(context: &'a Context, effort: Effort) -> CompletionRequest<'a> {
    CompletionRequest {
        context,
        model: "test-model",
        effort,
        max_output_tokens: Some(512),
        temperature: Some(0.5),
    }
}

/// Collects all chunks from a stream into vectors
async fn collect_chunks(mut receiver: mpsc::Receiver<StreamChunk>) -> (Vec<String>, Vec<String>) {
    let mut content_chunks = Vec::new();
    let mut thinking_chunks = Vec::new();

    while let Some(chunk) = receiver.recv().await {
        match chunk {
            StreamChunk::Content(s) => content_chunks.push(s),
            StreamChunk::Thinking(s) => thinking_chunks.push(s),
        }
    }

    (content_chunks, thinking_chunks)
}

/// SSE body of text deltas followed by `response.completed`
fn sse_body(reasoning: &[&str], content: &[&str], reasoning_event: &str) -> String {
    let mut body = String::from(
        "event: response.created\ndata: {\"type\":\"response.created\"}\n\n",
    );
    for delta in reasoning {
        body.push_str(&format!(
            "event: {reasoning_event}\ndata: {}\n\n",
            serde_json::json!({ "type": reasoning_event, "delta": delta })
        ));
    }
    for delta in content {
        body.push_str(&format!(
            "event: response.output_text.delta\ndata: {}\n\n",
            serde_json::json!({ "type": "response.output_text.delta", "delta": delta })
        ));
    }
    body.push_str("event: response.completed\ndata: {\"type\":\"response.completed\"}\n");
    body
}

// ============================================================================
// OpenRouter Provider Tests
// ============================================================================

#[tokio::test]
async fn test_openrouter_streams_reasoning_and_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "stream": true,
            "max_output_tokens": 512
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(
            &["Short lines."],
            &["<answer>\n- 高橋", "\n- Big text\n</answer>"],
            "response.reasoning_summary_text.delta",
        )))
        .mount(&mock_server)
        .await;

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    let result = provider
        .stream_completion(request(&context, Effort::High), tx)
        .await;

    assert!(result.is_ok());
    let (content, thinking) = collect_chunks(rx).await;
    assert_eq!(content, vec!["<answer>\n- 高橋", "\n- Big text\n</answer>"]);
    assert_eq!(thinking, vec!["Short lines."]);
}

#[tokio::test]
async fn test_openrouter_api_error_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let provider = OpenRouterProvider::new("bad-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, _rx) = mpsc::channel(100);
    let result = provider
        .stream_completion(request(&context, Effort::Auto), tx)
        .await;

    assert!(matches!(result, Err(ProviderError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_openrouter_channel_closed_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(
            &[],
            &["- A", "\n- B"],
            "response.reasoning_text.delta",
        )))
        .mount(&mock_server)
        .await;

    let provider = OpenRouterProvider::new("test-key".to_string(), Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    drop(rx);
    let result = provider
        .stream_completion(request(&context, Effort::Auto), tx)
        .await;

    assert!(matches!(result, Err(ProviderError::ChannelClosed)));
}

// ============================================================================
// LM Studio Provider Tests
// ============================================================================

#[tokio::test]
async fn test_lmstudio_streams_reasoning_and_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(
            &["Let me think..."],
            &["- Response"],
            "response.reasoning_text.delta",
        )))
        .mount(&mock_server)
        .await;

    let provider = LmStudioProvider::new(Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    let result = provider
        .stream_completion(request(&context, Effort::Medium), tx)
        .await;

    assert!(result.is_ok());
    let (content, thinking) = collect_chunks(rx).await;
    assert_eq!(content, vec!["- Response"]);
    assert_eq!(thinking, vec!["Let me think..."]);
}

#[tokio::test]
async fn test_lmstudio_handles_unknown_event_types() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
event: response.created
data: {\"type\":\"response.created\"}

event: response.in_progress
data: {\"type\":\"response.in_progress\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Text\"}

event: response.completed
data: {\"type\":\"response.completed\"}
";

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let provider = LmStudioProvider::new(Some(mock_server.uri()));
    let context = create_test_context();

    let (tx, rx) = mpsc::channel(100);
    let result = provider
        .stream_completion(request(&context, Effort::Auto), tx)
        .await;

    assert!(result.is_ok());
    let (content, thinking) = collect_chunks(rx).await;
    assert_eq!(content, vec!["Text"]);
    assert!(thinking.is_empty());
}

#[tokio::test]
async fn test_lmstudio_prepare_finds_listed_model() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "id": "other-model" }, { "id": "test-model" }]
        })))
        .mount(&mock_server)
        .await;

    let provider = LmStudioProvider::new(Some(mock_server.uri()));
    let seen = Mutex::new(Vec::new());
    let progress = |fraction: f32, _label: &str| seen.lock().unwrap().push(fraction);

    let result = provider.prepare("test-model", &progress).await;

    assert!(result.is_ok());
    assert_eq!(seen.lock().unwrap().last(), Some(&1.0));
}

#[tokio::test]
async fn test_lmstudio_prepare_tolerates_unlisted_model() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let provider = LmStudioProvider::new(Some(mock_server.uri()));
    let result = provider.prepare("loads-on-demand", &|_, _| {}).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_lmstudio_prepare_unreachable_is_network_error() {
    // Nothing listens on port 9 locally
    let provider = LmStudioProvider::new(Some("http://127.0.0.1:9/v1".to_string()));
    let result = provider.prepare("test-model", &|_, _| {}).await;

    assert!(matches!(result, Err(ProviderError::Network(_))));
}

// ============================================================================
// Engine + Transformer against a mock server
// ============================================================================

#[tokio::test]
async fn test_transform_end_to_end_with_lmstudio() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "id": "test-model" }]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(
            &["One idea per slide."],
            &["<answer>\n- 高橋メソッド\n- Huge\n  - speaker memo\n</answer>"],
            "response.reasoning_text.delta",
        )))
        .mount(&mock_server)
        .await;

    let provider: Arc<dyn CompletionProvider> =
        Arc::new(LmStudioProvider::new(Some(mock_server.uri())));
    let session = Arc::new(EngineSession::new());
    session
        .initialize(provider.as_ref(), "test-model")
        .await
        .unwrap();
    assert_eq!(session.state(), EngineState::Ready);

    let transformer = Transformer::new(
        provider,
        session,
        TransformSettings {
            model: "test-model".to_string(),
            ..Default::default()
        },
    );
    let snapshots = Mutex::new(Vec::new());
    let response = transformer
        .transform("The Takahashi method uses huge text.", |s| {
            snapshots.lock().unwrap().push(s.to_string())
        })
        .await
        .unwrap();

    let extracted = tags::extract(&response);
    let deck = parse_with(&extracted.answer, IndentMode::Memo);
    assert_eq!(deck.len(), 2);
    assert_eq!(deck.slides()[0].text, "高橋メソッド");
    assert_eq!(deck.slides()[1].memos, vec!["speaker memo".to_string()]);

    let last = snapshots.lock().unwrap().last().cloned().unwrap();
    assert!(last.starts_with("<reasoning>One idea per slide.</reasoning>"));
}

#[tokio::test]
async fn test_transform_fails_when_engine_never_ready() {
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(OpenRouterProvider::new(String::new(), None));
    let session = Arc::new(EngineSession::new());
    let init = session.initialize(provider.as_ref(), "test-model").await;
    assert!(matches!(init, Err(EngineError::Failed(_))));

    let transformer = Transformer::new(
        provider,
        session,
        TransformSettings {
            ready_timeout: Duration::from_millis(50),
            ..Default::default()
        },
    );
    let result = transformer.transform("text", |_| {}).await;

    assert!(matches!(result, Err(TransformError::NotReady(_))));
}
