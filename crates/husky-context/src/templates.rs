/// Folds the latest exchange into the running summary.
///
/// Placeholders: `<previous_summary>`, `<exchange>`, `<max_chars>`.
pub const DEFAULT_SUMMARY_FOLD_PROMPT: &str = r#"You maintain a running summary of a conversation between a user and an assistant that answers questions about a network of teams, members, projects and events.

Previous summary:
<previous_summary>

Latest exchange:
<exchange>

Write an updated summary that keeps the people, teams, projects and topics the user is interested in, and what has already been answered. Drop greetings and filler. The summary must not exceed <max_chars> characters. Reply with the summary only."#;

/// Rewrites a follow-up question so it stands on its own.
///
/// Placeholders: `<summary>`, `<question>`.
pub const DEFAULT_REPHRASE_PROMPT: &str = r#"Given the conversation summary below and a follow-up question, rewrite the question so that it can be understood without the conversation. Resolve pronouns and references ("them", "that project") to the names they refer to. If the question is already standalone, return it unchanged.

Conversation summary:
<summary>

Follow-up question:
<question>

Reply with the rewritten question only."#;

/// Short thread title from the first question.
///
/// Placeholders: `<question>`, `<max_chars>`.
pub const DEFAULT_THREAD_TITLE_PROMPT: &str = r#"Write a short title (at most <max_chars> characters) for a conversation that starts with the question below. No quotes, no trailing punctuation.

Question:
<question>"#;
