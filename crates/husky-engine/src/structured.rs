//! Parsing of an answer object while it is still being generated.

use anyhow::{bail, Result};
use husky_types::HuskyAnswer;

/// Scan state of a JSON prefix
struct Scan {
    /// Unclosed `{` and `[`, innermost last
    open: Vec<char>,
    in_string: bool,
    /// Byte offsets of commas outside strings
    commas: Vec<usize>,
}

fn scan(prefix: &str) -> Scan {
    let mut state = Scan {
        open: Vec::new(),
        in_string: false,
        commas: Vec::new(),
    };
    let mut escaped = false;

    for (i, c) in prefix.char_indices() {
        if state.in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => state.in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => state.in_string = true,
            '{' | '[' => state.open.push(c),
            '}' | ']' => {
                state.open.pop();
            }
            ',' => state.commas.push(i),
            _ => {}
        }
    }
    state
}

/// Close every open string, array and object of `prefix`
fn close(prefix: &str) -> String {
    let state = scan(prefix);
    let mut completed = prefix.to_string();

    if state.in_string {
        // a dangling escape would swallow the closing quote
        let trailing = completed.len() - completed.trim_end_matches('\\').len();
        if trailing % 2 == 1 {
            completed.pop();
        }
        completed.push('"');
    }
    for open in state.open.iter().rev() {
        completed.push(if *open == '{' { '}' } else { ']' });
    }
    completed
}

/// Best valid JSON document that `prefix` is the beginning of.
///
/// Open strings and containers are closed. When that does not parse (a
/// dangling key, colon or partial literal) the prefix is cut back to the
/// previous comma and tried again.
pub fn complete_partial_json(prefix: &str) -> Option<serde_json::Value> {
    let trimmed = prefix.trim();
    if !trimmed.starts_with('{') {
        return None;
    }

    let commas = scan(trimmed).commas;
    let candidates = std::iter::once(trimmed.len()).chain(commas.into_iter().rev());

    for end in candidates {
        let completed = close(&trimmed[..end]);
        if let Ok(value) = serde_json::from_str(&completed) {
            return Some(value);
        }
    }
    None
}

/// Partial answer carried by a generation prefix, if any
pub fn parse_partial_answer(prefix: &str) -> Option<HuskyAnswer> {
    complete_partial_json(prefix).and_then(|value| serde_json::from_value(value).ok())
}

/// Answer carried by the complete model output.
///
/// Output that is not a valid answer document is salvaged: first as a
/// truncated document, then as plain text content.
pub fn parse_final_answer(raw: &str) -> Result<HuskyAnswer> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("Model returned an empty answer");
    }

    if let Ok(answer) = serde_json::from_str::<HuskyAnswer>(raw) {
        return Ok(answer);
    }
    if let Some(answer) = parse_partial_answer(raw) {
        tracing::warn!(chars = raw.len(), "Answer was not a complete document, using its valid prefix");
        return Ok(answer);
    }

    tracing::warn!(chars = raw.len(), "Answer was not JSON, using it as plain content");
    Ok(HuskyAnswer {
        content: raw.to_string(),
        ..HuskyAnswer::default()
    })
}
