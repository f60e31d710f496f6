//! System prompts of the answer step.

use std::sync::Arc;

use husky_context::TokenCounter;
use husky_llm::Message;
use husky_types::PromptConfig;

/// Used as-is whenever retrieval produced no usable context
pub const NO_INFORMATION_PROMPT: &str = r#"You are Husky, the assistant of the Protocol Labs network directory.

No information relevant to the user's question was found in the directory or in the indexed documents.

Tell the user briefly and politely that you could not find information about their question. Do not guess and do not answer from general knowledge. Suggest that they rephrase the question, or ask about members, teams, projects, focus areas or events of the network.

Respond in the requested JSON format:
- content: your reply in markdown
- followUpQuestions: three short questions about the directory the user could ask instead
- sources: an empty list
- actions: an empty list"#;

pub const CONTEXTUAL_ANSWER_PROMPT: &str = r#"You are Husky, the assistant of the Protocol Labs network directory. Answer the user's question using only the context below.

Today's date: <date>

About the directory:
<directory_docs>

Summary of the conversation so far:
<summary>

Context (one item per line, with its source when known):
<context>

Rules:
- Answer only from the context. If the context does not contain the answer, say so.
- Cite sources inline as markdown links using the (Source:...) links of the items you use.
- Prefer directory items over other documents when they conflict.
- Keep the answer concise and well structured.

Respond in the requested JSON format:
- content: the answer in markdown
- followUpQuestions: three short follow-up questions the user might ask next
- sources: the links of the sources you used
- actions: directory profiles worth visiting, each with name, directoryLink and type (Member, Team, Project, Focus Area or IRL Event)"#;

const NO_SUMMARY: &str = "No previous conversation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    NoInformation,
    Contextual,
}

#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub kind: PromptKind,
    pub messages: Vec<Message>,
    /// Context lines that made it into the prompt
    pub context_lines: usize,
    /// Context lines dropped to respect the token budget
    pub dropped_lines: usize,
}

pub struct PromptBuilder {
    counter: Arc<TokenCounter>,
    max_context_tokens: usize,
    directory_docs: String,
}

impl PromptBuilder {
    pub fn new(counter: Arc<TokenCounter>, config: &PromptConfig) -> Self {
        Self {
            counter,
            max_context_tokens: config.max_context_tokens,
            directory_docs: config.directory_docs_metadata.clone(),
        }
    }

    fn render(&self, lines: &[String], summary: Option<&str>, date: &str) -> String {
        let summary = summary.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(NO_SUMMARY);
        CONTEXTUAL_ANSWER_PROMPT
            .replace("<date>", date)
            .replace("<directory_docs>", &self.directory_docs)
            .replace("<summary>", summary)
            .replace("<context>", &lines.join("\n"))
    }

    /// System and user messages for the answer.
    ///
    /// Empty context selects the no-information prompt. Otherwise context
    /// lines are dropped from the end until the system prompt fits the
    /// token budget, always keeping the first one.
    pub fn build(
        &self,
        question: &str,
        lines: &[String],
        summary: Option<&str>,
        date: &str,
    ) -> AssembledPrompt {
        if lines.is_empty() {
            return AssembledPrompt {
                kind: PromptKind::NoInformation,
                messages: vec![
                    Message::system(NO_INFORMATION_PROMPT),
                    Message::human(question),
                ],
                context_lines: 0,
                dropped_lines: 0,
            };
        }

        let mut kept = lines.len();
        let mut system = self.render(lines, summary, date);
        while kept > 1 && !self.counter.fits(&system, self.max_context_tokens) {
            kept -= 1;
            system = self.render(&lines[..kept], summary, date);
        }

        let dropped = lines.len() - kept;
        if dropped > 0 {
            tracing::warn!(
                kept,
                dropped,
                budget = self.max_context_tokens,
                "Context trimmed to fit the prompt budget"
            );
        }

        AssembledPrompt {
            kind: PromptKind::Contextual,
            messages: vec![Message::system(system), Message::human(question)],
            context_lines: kept,
            dropped_lines: dropped,
        }
    }
}
