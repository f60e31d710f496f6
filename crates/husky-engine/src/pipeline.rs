//! The answer state machine:
//! received, summary update, rephrase, embed, retrieve, merge, prompt build,
//! generate, persist, done.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use futures::StreamExt;
use husky_context::ConversationManager;
use husky_llm::{
    ChatOptions, ChatRequest, EmbeddingRequest, EmbeddingResponse, LLMClient, Message,
    ResponseFormat, StreamEvent,
};
use husky_persist::FeedbackRecord;
use husky_types::{
    answer_schema, AnswerEvent, ChatExchange, ChatQuestion, FeedbackRequest, HuskyAnswer,
    HuskyConfig, Stage,
};
use tokio::sync::mpsc;

use crate::feedback::FeedbackService;
use crate::identity::IdentityLookup;
use crate::merge::{context_lines, select};
use crate::prompt::PromptBuilder;
use crate::retrieval::Retriever;
use crate::structured::{parse_final_answer, parse_partial_answer};
use crate::tasks::BackgroundTasks;
use crate::tools::ToolRegistry;

const EVENT_BUFFER: usize = 1000;

/// A failure and the stage it happened in
struct StageFailure {
    stage: Stage,
    error: anyhow::Error,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageFailure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageFailure> {
        self.map_err(|error| StageFailure { stage, error })
    }
}

/// Event channel to the caller. Once the caller is gone, events are dropped
/// and the pipeline carries on.
struct EventSink {
    tx: mpsc::Sender<AnswerEvent>,
    connected: bool,
}

impl EventSink {
    fn new(tx: mpsc::Sender<AnswerEvent>) -> Self {
        Self {
            tx,
            connected: true,
        }
    }

    async fn emit(&mut self, event: AnswerEvent) {
        if !self.connected {
            return;
        }
        if self.tx.send(event).await.is_err() {
            self.connected = false;
            tracing::info!("Client disconnected, finishing the answer without it");
        }
    }

    async fn stage(&mut self, stage: Stage) {
        self.emit(AnswerEvent::Stage { stage }).await;
    }
}

pub(crate) struct AnswerPipeline {
    pub(crate) llm_client: Arc<dyn LLMClient>,
    pub(crate) conversation: Arc<ConversationManager>,
    pub(crate) retriever: Retriever,
    pub(crate) prompts: PromptBuilder,
    pub(crate) config: Arc<HuskyConfig>,
    pub(crate) background: BackgroundTasks,
}

impl AnswerPipeline {
    async fn run(&self, question: ChatQuestion, tx: mpsc::Sender<AnswerEvent>) {
        let start = Instant::now();
        let mut sink = EventSink::new(tx);

        sink.emit(AnswerEvent::InitStream {
            thread_id: question.thread_uid.clone(),
            chat_id: question.chat_uid.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
        .await;
        sink.stage(Stage::Received).await;

        tracing::info!(
            thread_id = %question.thread_uid,
            chat_id = %question.chat_uid,
            source = %question.source,
            "Answering question"
        );

        let status = match self.answer(&question, &mut sink).await {
            Ok(answer) => {
                sink.emit(AnswerEvent::Answer {
                    answer: answer.clone(),
                })
                .await;

                sink.stage(Stage::Persist).await;
                self.persist_in_background(&question, answer);

                sink.stage(Stage::Done).await;
                "success"
            }
            Err(failure) => {
                tracing::error!(
                    thread_id = %question.thread_uid,
                    chat_id = %question.chat_uid,
                    stage = ?failure.stage,
                    error = %failure.error,
                    "Answer failed"
                );
                sink.emit(AnswerEvent::Error {
                    message: format!("{:#}", failure.error),
                    stage: Some(failure.stage),
                })
                .await;
                "error"
            }
        };

        let total_duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            thread_id = %question.thread_uid,
            status,
            total_duration_ms,
            "Answer finished"
        );
        sink.emit(AnswerEvent::EndStream {
            status: status.to_string(),
            total_duration_ms,
        })
        .await;
    }

    async fn answer(
        &self,
        question: &ChatQuestion,
        sink: &mut EventSink,
    ) -> std::result::Result<HuskyAnswer, StageFailure> {
        let thread_id = question.thread_uid.as_str();
        if question.question.trim().is_empty() {
            return Err(StageFailure {
                stage: Stage::Received,
                error: anyhow!("Question must not be empty"),
            });
        }

        // 1. Fold the client's view of the last exchange into the summary
        if let Some(exchange) = &question.chat_summary {
            sink.stage(Stage::SummaryUpdate).await;
            self.conversation
                .update_summary(thread_id, exchange)
                .await
                .at(Stage::SummaryUpdate)?;
        }

        // 2. Resolve referents against the summary
        sink.stage(Stage::Rephrase).await;
        let rephrased = self
            .conversation
            .rephrase(thread_id, &question.question)
            .await
            .at(Stage::Rephrase)?;

        // 3. One embedding for every branch
        sink.stage(Stage::Embed).await;
        let vector = self
            .llm_client
            .embed(EmbeddingRequest::new(
                self.config.models.embedding_model.as_str(),
                rephrased.as_str(),
            ))
            .await
            .and_then(EmbeddingResponse::into_first)
            .at(Stage::Embed)?;

        // 4. Fan out
        sink.stage(Stage::Retrieve).await;
        let outcome = self.retriever.retrieve(&vector).await.at(Stage::Retrieve)?;
        if !outcome.failed_sources.is_empty() {
            tracing::warn!(
                thread_id,
                failed = ?outcome.failed_sources,
                "Answering with partial retrieval"
            );
        }

        // 5. Filter, rank and cap each pool
        sink.stage(Stage::Merge).await;
        let retrieval = &self.config.retrieval;
        let directory = select(outcome.directory, &retrieval.directory);
        let non_directory = select(outcome.non_directory, &retrieval.non_directory);
        let lines = context_lines(&directory, &non_directory);
        tracing::debug!(
            thread_id,
            directory = directory.len(),
            non_directory = non_directory.len(),
            "Context merged"
        );

        // 6. Prompt
        sink.stage(Stage::PromptBuild).await;
        let summary = self
            .conversation
            .summary(thread_id)
            .await
            .at(Stage::PromptBuild)?;
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let prompt = self
            .prompts
            .build(&question.question, &lines, summary.as_deref(), &date);

        // 7. Stream the structured answer
        sink.stage(Stage::Generate).await;
        self.generate(prompt.messages, sink).await.at(Stage::Generate)
    }

    async fn generate(&self, messages: Vec<Message>, sink: &mut EventSink) -> Result<HuskyAnswer> {
        let models = &self.config.models;
        let mut options = ChatOptions::new()
            .response_format(ResponseFormat::json_schema("husky_answer", answer_schema()));
        if let Some(temperature) = models.temperature {
            options = options.temperature(temperature);
        }
        if let Some(max_tokens) = models.max_answer_tokens {
            options = options.max_tokens(max_tokens);
        }
        let request = ChatRequest::new(models.chat_model.as_str(), messages).with_options(options);

        let mut stream = self.llm_client.chat_stream(request).await?;
        let mut raw = String::new();
        let mut last_partial: Option<HuskyAnswer> = None;

        // Drained to the end even without a listener, so the turn completes
        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Message { content } => {
                    raw.push_str(&content);
                    if !sink.connected {
                        continue;
                    }
                    sink.emit(AnswerEvent::Delta { content }).await;

                    if let Some(partial) = parse_partial_answer(&raw) {
                        if last_partial.as_ref() != Some(&partial) {
                            sink.emit(AnswerEvent::Partial {
                                answer: partial.clone(),
                            })
                            .await;
                            last_partial = Some(partial);
                        }
                    }
                }
                StreamEvent::Done { finish_reason } => {
                    tracing::debug!(finish_reason = ?finish_reason, "Generation finished");
                }
            }
        }

        parse_final_answer(&raw)
    }

    /// Record the turn, fold it into the summary and make sure the thread
    /// has a title. Runs after the answer is out; failures are logged.
    fn persist_in_background(&self, question: &ChatQuestion, answer: HuskyAnswer) {
        let conversation = self.conversation.clone();
        let thread_id = question.thread_uid.clone();
        let chat_id = question.chat_uid.clone();
        let question = question.question.clone();

        self.background.spawn(async move {
            let written = match conversation
                .persist_turn(&thread_id, &chat_id, &question, &answer)
                .await
            {
                Ok(written) => written,
                Err(e) => {
                    tracing::error!(thread_id = %thread_id, chat_id = %chat_id, error = %e, "Failed to persist turn");
                    false
                }
            };

            let exchange = ChatExchange::new(question, answer.content);
            if let Err(e) = conversation.update_summary(&thread_id, &exchange).await {
                tracing::error!(thread_id = %thread_id, error = %e, "Failed to update summary");
            }

            if written {
                if let Err(e) = conversation.create_thread_title(&thread_id).await {
                    tracing::error!(thread_id = %thread_id, error = %e, "Failed to create thread title");
                }
            }
        });
    }
}

/// Contextual answers over the directory and the document collections
pub struct HuskyEngine {
    pub(crate) pipeline: Arc<AnswerPipeline>,
    pub(crate) tools: ToolRegistry,
    pub(crate) feedback: FeedbackService,
    pub(crate) identity: Arc<dyn IdentityLookup>,
}

impl HuskyEngine {
    pub fn builder() -> crate::builder::HuskyEngineBuilder {
        crate::builder::HuskyEngineBuilder::new()
    }

    /// Spawn the answer in the background, return its event receiver.
    ///
    /// The stream always ends with `EndStream`. Dropping the receiver does
    /// not cancel the answer: generation runs to completion and the turn is
    /// still persisted.
    pub fn spawn_answer(&self, question: ChatQuestion) -> mpsc::Receiver<AnswerEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let pipeline = Arc::clone(&self.pipeline);

        tokio::spawn(async move {
            pipeline.run(question, tx).await;
        });

        rx
    }

    pub fn conversation(&self) -> &ConversationManager {
        &self.pipeline.conversation
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &HuskyConfig {
        &self.pipeline.config
    }

    pub fn identity(&self) -> &dyn IdentityLookup {
        self.identity.as_ref()
    }

    pub async fn submit_feedback(&self, request: FeedbackRequest) -> Result<FeedbackRecord> {
        self.feedback.submit(request).await
    }

    /// Persistence work still running
    pub fn pending_background_tasks(&self) -> usize {
        self.pipeline.background.pending()
    }

    /// Wait until every spawned persistence task has finished
    pub async fn drain_background_tasks(&self) {
        self.pipeline.background.drain().await;
    }
}
