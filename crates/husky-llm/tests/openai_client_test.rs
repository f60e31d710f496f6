use husky_llm::streaming::collect_text;
use husky_llm::{ChatClient, ChatOptions, ChatRequest, EmbeddingClient, EmbeddingRequest, Message, OpenAIClient, ResponseFormat};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_chat_completion_parses_content_and_usage() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "stream": false,
            "temperature": 0.5,
            "messages": [{"role": "user", "content": "Hi"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello!"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("test-key", server.url()).unwrap();
    let request = ChatRequest::new("gpt-4o", vec![Message::human("Hi")])
        .with_options(ChatOptions::new().temperature(0.5));
    let response = client.chat(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.text(), "Hello!");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 7);
}

#[tokio::test]
async fn test_chat_sends_response_format() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "response_format": {"type": "json_schema", "json_schema": {"name": "answer", "strict": true}}
        })))
        .with_status(200)
        .with_body(
            json!({
                "id": "x",
                "model": "gpt-4o",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}, "finish_reason": "stop"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("k", server.url()).unwrap();
    let options = ChatOptions::new().response_format(ResponseFormat::json_schema(
        "answer",
        json!({"type": "object"}),
    ));
    client
        .chat(ChatRequest::new("gpt-4o", vec![Message::human("q")]).with_options(options))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_is_reported_with_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("k", server.url()).unwrap();
    let err = client
        .chat(ChatRequest::new("gpt-4o", vec![Message::human("q")]))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("429"));
    assert!(message.contains("rate limited"));
}

#[tokio::test]
async fn test_chat_stream_over_http() {
    let mut server = mockito::Server::new_async().await;
    let body = [
        r#"data: {"id":"c","object":"chat.completion.chunk","created":1,"model":"m","choices":[{"index":0,"delta":{"role":"assistant","content":"Hus"},"finish_reason":null}]}"#,
        r#"data: {"id":"c","object":"chat.completion.chunk","created":1,"model":"m","choices":[{"index":0,"delta":{"content":"ky"},"finish_reason":"stop"}]}"#,
        "data: [DONE]",
    ]
    .join("\n\n");

    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("k", server.url()).unwrap();
    let stream = client
        .chat_stream(ChatRequest::new("m", vec![Message::human("q")]))
        .await
        .unwrap();

    assert_eq!(collect_text(stream).await.unwrap(), "Husky");
}

#[tokio::test]
async fn test_embeddings_are_returned_in_index_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(json!({
            "model": "text-embedding-ada-002",
            "input": ["a", "b"]
        })))
        .with_status(200)
        .with_body(
            json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ],
                "usage": {"prompt_tokens": 2, "total_tokens": 2}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("k", server.url()).unwrap();
    let response = client
        .embed(EmbeddingRequest::batch(
            "text-embedding-ada-002",
            vec!["a".to_string(), "b".to_string()],
        ))
        .await
        .unwrap();

    assert_eq!(response.embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}
