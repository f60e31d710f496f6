use serde::{Deserialize, Serialize};

/// Kind of record a retrieval result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Member,
    Team,
    Project,
    FocusArea,
    IrlEvent,
    NonDirectory,
}

impl EntityType {
    pub const DIRECTORY: [EntityType; 5] = [
        EntityType::Member,
        EntityType::Team,
        EntityType::Project,
        EntityType::FocusArea,
        EntityType::IrlEvent,
    ];

    pub fn is_directory(&self) -> bool {
        !matches!(self, EntityType::NonDirectory)
    }

    /// Path segment of the entity's page under the directory base URL
    pub fn path_segment(&self) -> Option<&'static str> {
        match self {
            EntityType::Member => Some("members"),
            EntityType::Team => Some("teams"),
            EntityType::Project => Some("projects"),
            EntityType::FocusArea => Some("focus-areas"),
            EntityType::IrlEvent => Some("events/irl"),
            EntityType::NonDirectory => None,
        }
    }

    /// Human label, also used as the answer action type
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Member => "Member",
            EntityType::Team => "Team",
            EntityType::Project => "Project",
            EntityType::FocusArea => "Focus Area",
            EntityType::IrlEvent => "IRL Event",
            EntityType::NonDirectory => "Document",
        }
    }

    /// Link to an entity page, `None` for non-directory content
    pub fn directory_link(&self, base_url: &str, uid: &str) -> Option<String> {
        self.path_segment()
            .map(|segment| format!("{}/{}/{}", base_url.trim_end_matches('/'), segment, uid))
    }
}

/// Normalized hit from any retrieval branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub id: String,
    /// Similarity in [0, 1]
    pub score: f32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub entity: EntityType,
}

impl RetrievalResult {
    pub fn new(id: impl Into<String>, score: f32, text: impl Into<String>, entity: EntityType) -> Self {
        Self {
            id: id.into(),
            score,
            text: text.into(),
            source: None,
            entity,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// One line of prompt context, with an inline citation when sourced
    pub fn context_line(&self) -> String {
        match &self.source {
            Some(source) if !source.is_empty() => format!("{} (Source:{})", self.text, source),
            _ => self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_wire_names() {
        assert_eq!(serde_json::to_string(&EntityType::FocusArea).unwrap(), r#""focus-area""#);
        assert_eq!(serde_json::to_string(&EntityType::IrlEvent).unwrap(), r#""irl-event""#);
        assert_eq!(serde_json::to_string(&EntityType::NonDirectory).unwrap(), r#""non-directory""#);
    }

    #[test]
    fn test_directory_link() {
        assert_eq!(
            EntityType::Team.directory_link("https://dir.example/", "t1").as_deref(),
            Some("https://dir.example/teams/t1")
        );
        assert!(EntityType::NonDirectory.directory_link("https://dir.example", "x").is_none());
    }

    #[test]
    fn test_context_line_citation() {
        let plain = RetrievalResult::new("1", 0.9, "IPFS is a protocol", EntityType::NonDirectory);
        assert_eq!(plain.context_line(), "IPFS is a protocol");

        let cited = plain.with_source("https://ipfs.tech");
        assert_eq!(cited.context_line(), "IPFS is a protocol (Source:https://ipfs.tech)");
    }
}
