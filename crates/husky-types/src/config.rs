use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration, built once at startup and shared by every component.
///
/// Every section defaults, so a partial TOML table is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HuskyConfig {
    pub models: ModelConfig,
    pub collections: CollectionConfig,
    pub retrieval: RetrievalConfig,
    pub conversation: ConversationConfig,
    pub tools: ToolConfig,
    pub links: LinkConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: Option<f32>,
    pub max_answer_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            temperature: Some(0.2),
            max_answer_tokens: None,
        }
    }
}

/// Names of every vector and document collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub non_directory: String,
    pub websearch: String,
    pub members: String,
    pub teams: String,
    pub projects: String,
    pub focus_areas: String,
    pub irl_events: String,
    pub threads: String,
    pub feedback: String,
    pub cache: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            non_directory: "non_directory_docs".to_string(),
            websearch: "websearch_teams".to_string(),
            members: "members".to_string(),
            teams: "teams".to_string(),
            projects: "projects".to_string(),
            focus_areas: "focus_areas".to_string(),
            irl_events: "irl_events".to_string(),
            threads: "threads".to_string(),
            feedback: "feedback".to_string(),
            cache: "cache".to_string(),
        }
    }
}

/// Filter/sort/cap rule applied to one pool of retrieval results.
///
/// A result is kept only when `score > threshold` and its text is longer
/// than `min_text_len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergePolicy {
    pub threshold: f32,
    pub cap: usize,
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
}

fn default_min_text_len() -> usize {
    5
}

impl MergePolicy {
    pub fn new(threshold: f32, cap: usize) -> Self {
        Self {
            threshold,
            cap,
            min_text_len: default_min_text_len(),
        }
    }

    pub fn with_min_text_len(mut self, min_text_len: usize) -> Self {
        self.min_text_len = min_text_len;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Points requested from each vector collection
    pub search_limit: usize,
    /// Contextual answer, directory pool
    pub directory: MergePolicy,
    /// Contextual answer, non-directory pool
    pub non_directory: MergePolicy,
    /// Non-directory docs tool, general collection
    pub docs_general: MergePolicy,
    /// Non-directory docs tool, websearch collection
    pub docs_websearch: MergePolicy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_limit: 15,
            directory: MergePolicy::new(0.35, 6),
            non_directory: MergePolicy::new(0.35, 5),
            docs_general: MergePolicy::new(0.45, 15),
            docs_websearch: MergePolicy::new(0.37, 15),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub summary_max_chars: usize,
    pub summary_ttl_secs: u64,
    pub title_max_chars: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            summary_max_chars: 1500,
            summary_ttl_secs: 7 * 24 * 60 * 60,
            title_max_chars: 80,
        }
    }
}

impl ConversationConfig {
    pub fn summary_ttl(&self) -> Duration {
        Duration::from_secs(self.summary_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub page_size: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub directory_base_url: String,
    pub forum_base_url: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            directory_base_url: "https://directory.plnetwork.io".to_string(),
            forum_base_url: "https://forum.plnetwork.io".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Token budget of the assembled system prompt
    pub max_context_tokens: usize,
    /// Description of the directory pages, appended to the answer prompt
    pub directory_docs_metadata: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: 6000,
            directory_docs_metadata: "The directory lists members, teams, projects, focus areas \
                and IRL events of the network. Member pages live under /members, team pages \
                under /teams, project pages under /projects and event pages under /events/irl."
                .to_string(),
        }
    }
}
