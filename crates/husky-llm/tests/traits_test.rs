use husky_llm::{ChatOptions, ChatRequest, EmbeddingRequest, EmbeddingResponse, Message, ResponseFormat};
use serde_json::json;

#[test]
fn test_chat_request_creation() {
    let messages = vec![Message::human("Hello")];
    let request = ChatRequest::new("gpt-4o", messages);

    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.messages.len(), 1);
    assert!(request.options.response_format.is_none());
}

#[test]
fn test_chat_request_with_options() {
    let options = ChatOptions::new()
        .temperature(0.7)
        .max_tokens(100)
        .response_format(ResponseFormat::json_schema("answer", json!({"type": "object"})));

    let request = ChatRequest::new("gpt-4o", vec![Message::human("Hello")]).with_options(options);

    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.options.max_tokens, Some(100));
    assert!(request.options.response_format.is_some());
}

#[test]
fn test_chat_options_default() {
    let options = ChatOptions::default();

    assert_eq!(options.temperature, None);
    assert_eq!(options.max_tokens, None);
    assert!(options.response_format.is_none());
}

#[test]
fn test_json_schema_format_serialization() {
    let format = ResponseFormat::json_schema("husky_answer", json!({"type": "object"}));
    let value = serde_json::to_value(&format).unwrap();

    assert_eq!(value["type"], "json_schema");
    assert_eq!(value["json_schema"]["name"], "husky_answer");
    assert_eq!(value["json_schema"]["strict"], true);
}

#[test]
fn test_message_roles_serialize_as_openai_roles() {
    let system = serde_json::to_value(Message::system("rules")).unwrap();
    let human = serde_json::to_value(Message::human("hi")).unwrap();
    let ai = serde_json::to_value(Message::ai("hello")).unwrap();

    assert_eq!(system["role"], "system");
    assert_eq!(human["role"], "user");
    assert_eq!(ai["role"], "assistant");
    assert_eq!(human["content"], "hi");
}

#[test]
fn test_message_text_accessor() {
    let msg = Message::human("What is IPFS?");
    assert_eq!(msg.text(), "What is IPFS?");
    assert_eq!(msg.role(), "user");
}

#[test]
fn test_embedding_request_single_input() {
    let request = EmbeddingRequest::new("text-embedding-ada-002", "filecoin");
    assert_eq!(request.input, vec!["filecoin".to_string()]);
}

#[test]
fn test_embedding_response_into_first() {
    let response = EmbeddingResponse {
        embeddings: vec![vec![0.1, 0.2], vec![0.3]],
        usage: None,
    };
    assert_eq!(response.into_first().unwrap(), vec![0.1, 0.2]);

    let empty = EmbeddingResponse {
        embeddings: vec![],
        usage: None,
    };
    assert!(empty.into_first().is_err());
}
