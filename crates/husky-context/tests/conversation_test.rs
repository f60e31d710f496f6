use std::sync::Arc;

use husky_context::{ConversationManager, QuestionRephraser, SummaryManager};
use husky_llm::MockLLMClient;
use husky_persist::{CacheStore, InMemoryCacheStore, InMemoryDocumentStore, ThreadRepository};
use husky_types::{AnswerAction, ChatExchange, ConversationConfig, HuskyAnswer};

struct Fixture {
    llm: Arc<MockLLMClient>,
    cache: Arc<InMemoryCacheStore>,
    documents: Arc<InMemoryDocumentStore>,
    manager: ConversationManager,
}

fn fixture(llm: MockLLMClient, config: ConversationConfig) -> Fixture {
    let llm = Arc::new(llm);
    let cache = Arc::new(InMemoryCacheStore::new());
    let documents = Arc::new(InMemoryDocumentStore::new());

    let summaries = Arc::new(SummaryManager::new(
        llm.clone(),
        cache.clone(),
        "gpt-4o-mini",
        config.clone(),
    ));
    let rephraser = QuestionRephraser::new(llm.clone(), summaries.clone(), "gpt-4o-mini");
    let manager = ConversationManager::new(
        ThreadRepository::new(documents.clone(), "threads"),
        summaries,
        rephraser,
        llm.clone(),
        "gpt-4o-mini",
        config,
    );

    Fixture {
        llm,
        cache,
        documents,
        manager,
    }
}

fn last_prompt(llm: &MockLLMClient) -> String {
    llm.chat_requests()
        .last()
        .and_then(|r| r.messages.last().map(|m| m.text().to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_rephrase_without_summary_returns_question_unchanged() {
    let f = fixture(MockLLMClient::new(), ConversationConfig::default());

    let rephrased = f
        .manager
        .rephrase("T1", "What is Focus Area X?")
        .await
        .unwrap();

    assert_eq!(rephrased, "What is Focus Area X?");
    assert!(f.llm.chat_requests().is_empty());
}

#[tokio::test]
async fn test_rephrase_uses_summary() {
    let f = fixture(
        MockLLMClient::new().with_chat_responses(["Who leads the Lotus team?"]),
        ConversationConfig::default(),
    );
    f.cache
        .set("T1:summary", "User asked about the Lotus team.", std::time::Duration::from_secs(60))
        .await
        .unwrap();

    let rephrased = f.manager.rephrase("T1", "Who leads them?").await.unwrap();

    assert_eq!(rephrased, "Who leads the Lotus team?");
    let prompt = last_prompt(&f.llm);
    assert!(prompt.contains("User asked about the Lotus team."));
    assert!(prompt.contains("Who leads them?"));
}

#[tokio::test]
async fn test_blank_rephrase_falls_back_to_question() {
    let f = fixture(
        MockLLMClient::new().with_chat_responses(["   "]),
        ConversationConfig::default(),
    );
    f.cache
        .set("T1:summary", "Some context.", std::time::Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(f.manager.rephrase("T1", "And then?").await.unwrap(), "And then?");
}

#[tokio::test]
async fn test_summary_is_bounded_and_cached() {
    let config = ConversationConfig {
        summary_max_chars: 50,
        ..ConversationConfig::default()
    };
    let f = fixture(
        MockLLMClient::new().with_chat_responses(["x".repeat(400)]),
        config,
    );

    let summary = f
        .manager
        .update_summary("T1", &ChatExchange::new("hi", "hello"))
        .await
        .unwrap();

    assert_eq!(summary.chars().count(), 50);
    assert_eq!(f.cache.get("T1:summary").await.unwrap(), Some(summary));
    assert!(last_prompt(&f.llm).contains("50 characters"));
}

#[tokio::test]
async fn test_consecutive_summaries_fold_the_previous_one() {
    let f = fixture(
        MockLLMClient::new().with_chat_responses(["first summary", "second summary"]),
        ConversationConfig::default(),
    );

    f.manager
        .update_summary("T1", &ChatExchange::new("What is IPFS?", "A protocol."))
        .await
        .unwrap();
    let second = f
        .manager
        .update_summary("T1", &ChatExchange::new("Who builds it?", "Protocol Labs."))
        .await
        .unwrap();

    assert_eq!(second, "second summary");
    let requests = f.llm.chat_requests();
    let second_prompt = requests[1].messages[0].text();
    assert!(second_prompt.contains("first summary"));
    assert!(second_prompt.contains("user: Who builds it?\nsystem: Protocol Labs."));
    assert_eq!(f.manager.summary("T1").await.unwrap().as_deref(), Some("second summary"));
}

#[tokio::test]
async fn test_persist_turn_for_unknown_thread_is_silent_noop() {
    let f = fixture(MockLLMClient::new(), ConversationConfig::default());

    let written = f
        .manager
        .persist_turn("missing", "c1", "q", &HuskyAnswer::default())
        .await
        .unwrap();

    assert!(!written);
    assert_eq!(f.documents.write_count(), 0);
}

#[tokio::test]
async fn test_persist_turn_records_answer_fields() {
    let f = fixture(MockLLMClient::new(), ConversationConfig::default());
    f.manager.create_thread("T1", "alice@example.com").await.unwrap();

    let answer = HuskyAnswer {
        content: "Lotus is a Filecoin implementation.".to_string(),
        follow_up_questions: vec!["Who maintains Lotus?".to_string()],
        sources: vec!["https://lotus.filecoin.io".to_string()],
        actions: vec![AnswerAction {
            name: "Lotus".to_string(),
            directory_link: "https://directory/projects/p1".to_string(),
            action_type: "Project".to_string(),
        }],
    };
    assert!(f
        .manager
        .persist_turn("T1", "c1", "What is Lotus?", &answer)
        .await
        .unwrap());

    let turns = f.manager.turns_by_thread("T1").await.unwrap().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].id, "c1");
    assert_eq!(turns[0].answer.as_deref(), Some("Lotus is a Filecoin implementation."));
    assert_eq!(turns[0].follow_ups, answer.follow_up_questions);
    assert_eq!(turns[0].actions, answer.actions);

    let listed = f.manager.threads_by_owner("alice@example.com").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].thread_id, "T1");
}

#[tokio::test]
async fn test_duplicate_thread_creation_fails() {
    let f = fixture(MockLLMClient::new(), ConversationConfig::default());
    f.manager.create_thread("T1", "a").await.unwrap();
    assert!(f.manager.create_thread("T1", "a").await.is_err());
}

#[tokio::test]
async fn test_title_is_generated_once() {
    let f = fixture(
        MockLLMClient::new().with_chat_responses(["\"Lotus overview\"", "Something else"]),
        ConversationConfig::default(),
    );
    f.manager.create_thread("T1", "a").await.unwrap();
    f.manager
        .persist_turn("T1", "c1", "What is Lotus?", &HuskyAnswer::default())
        .await
        .unwrap();

    let first = f.manager.create_thread_title("T1").await.unwrap();
    let second = f.manager.create_thread_title("T1").await.unwrap();

    assert_eq!(first.as_deref(), Some("Lotus overview"));
    assert_eq!(second, first);
    assert_eq!(f.llm.chat_requests().len(), 1);
}

#[tokio::test]
async fn test_title_for_unknown_or_empty_thread() {
    let f = fixture(MockLLMClient::new(), ConversationConfig::default());
    assert!(f.manager.create_thread_title("nope").await.unwrap().is_none());

    f.manager.create_thread("T1", "a").await.unwrap();
    let placeholder = f.manager.create_thread_title("T1").await.unwrap();
    assert_eq!(placeholder.as_deref(), Some("New conversation"));
    assert!(f.manager.get_thread("T1").await.unwrap().unwrap().title.is_none());
    assert!(f.llm.chat_requests().is_empty());
}
