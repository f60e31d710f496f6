use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use serde_json::{json, Value};

/// Structured answer produced by the model
///
/// Every field defaults so that partially generated objects deserialize too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HuskyAnswer {
    pub content: String,
    pub follow_up_questions: Vec<String>,
    pub sources: Vec<String>,
    pub actions: Vec<AnswerAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerAction {
    pub name: String,
    pub directory_link: String,
    #[serde(rename = "type")]
    pub action_type: String,
}

/// JSON schema the model output is constrained to
pub fn answer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": "Answer to the question in markdown, citing sources inline"
            },
            "followUpQuestions": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Three short follow-up questions the user might ask next"
            },
            "sources": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Links of the sources used in the answer"
            },
            "actions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "directoryLink": { "type": "string" },
                        "type": {
                            "type": "string",
                            "enum": ["Member", "Team", "Project", "Focus Area", "IRL Event"]
                        }
                    },
                    "required": ["name", "directoryLink", "type"],
                    "additionalProperties": false
                },
                "description": "Directory profiles worth visiting"
            }
        },
        "required": ["content", "followUpQuestions", "sources", "actions"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_wire_format() {
        let answer = HuskyAnswer {
            content: "Alice leads the team.".to_string(),
            follow_up_questions: vec!["Who else?".to_string()],
            sources: vec!["https://example.org".to_string()],
            actions: vec![AnswerAction {
                name: "Alice".to_string(),
                directory_link: "https://directory/members/a".to_string(),
                action_type: "Member".to_string(),
            }],
        };

        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value["followUpQuestions"][0], "Who else?");
        assert_eq!(value["actions"][0]["directoryLink"], "https://directory/members/a");
        assert_eq!(value["actions"][0]["type"], "Member");
    }

    #[test]
    fn test_partial_answer_deserializes() {
        let answer: HuskyAnswer = serde_json::from_str(r#"{"content":"Par"}"#).unwrap();
        assert_eq!(answer.content, "Par");
        assert!(answer.actions.is_empty());
    }

    #[test]
    fn test_schema_requires_every_property() {
        let schema = answer_schema();
        let required = schema["required"].as_array().unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(required.len(), properties.len());
        assert_eq!(schema["additionalProperties"], false);
    }
}
