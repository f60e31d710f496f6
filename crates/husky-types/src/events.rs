use serde::{Deserialize, Serialize};

use crate::answer::HuskyAnswer;

/// Steps of the answer pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    SummaryUpdate,
    Rephrase,
    Embed,
    Retrieve,
    Merge,
    PromptBuild,
    Generate,
    Persist,
    Done,
}

/// Events streamed to the caller while an answer is produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerEvent {
    /// Pipeline accepted the question
    InitStream {
        thread_id: String,
        chat_id: String,
        timestamp: i64,
    },

    /// Pipeline entered a new stage
    Stage { stage: Stage },

    /// Raw model output (streamed token-by-token)
    Delta { content: String },

    /// Best-effort parse of the output generated so far
    Partial { answer: HuskyAnswer },

    /// Final structured answer
    Answer { answer: HuskyAnswer },

    /// Fatal error, nothing more follows except `EndStream`
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<Stage>,
    },

    EndStream {
        status: String,
        total_duration_ms: u64,
    },
}

impl AnswerEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            AnswerEvent::InitStream { .. } => "init",
            AnswerEvent::Stage { .. } => "stage",
            AnswerEvent::Delta { .. } => "delta",
            AnswerEvent::Partial { .. } => "partial",
            AnswerEvent::Answer { .. } => "answer",
            AnswerEvent::Error { .. } => "error",
            AnswerEvent::EndStream { .. } => "end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnswerEvent::EndStream { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = AnswerEvent::Stage {
            stage: Stage::PromptBuild,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"stage","stage":"prompt_build"}"#);
    }

    #[test]
    fn test_error_event_omits_missing_stage() {
        let event = AnswerEvent::Error {
            message: "boom".to_string(),
            stage: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("stage"));
        assert_eq!(event.name(), "error");
    }
}
