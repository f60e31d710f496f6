use husky_persist::filter::resolve_path;
use serde_json::Value;

pub(crate) const NOT_PROVIDED: &str = "Not provided";
pub(crate) const NONE: &str = "None";

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        _ => None,
    }
}

/// First populated value at `path`
pub(crate) fn field(row: &Value, path: &str) -> Option<String> {
    resolve_path(row, path).into_iter().find_map(scalar)
}

/// Value at `path`, or `Not provided`
pub(crate) fn text(row: &Value, path: &str) -> String {
    field(row, path).unwrap_or_else(|| NOT_PROVIDED.to_string())
}

/// Every value at `path` joined with commas, or `None`
pub(crate) fn list(row: &Value, path: &str) -> String {
    let values: Vec<String> = resolve_path(row, path)
        .into_iter()
        .filter_map(scalar)
        .collect();
    if values.is_empty() {
        NONE.to_string()
    } else {
        values.join(", ")
    }
}

/// `name (uid)` pairs of a relation, or `None`
pub(crate) fn relations(row: &Value, path: &str, label_field: &str) -> String {
    let items: Vec<String> = resolve_path(row, path)
        .into_iter()
        .filter_map(|item| {
            let label = item.get(label_field).and_then(scalar)?;
            Some(match item.get("uid").and_then(scalar) {
                Some(uid) => format!("{} ({})", label, uid),
                None => label,
            })
        })
        .collect();
    if items.is_empty() {
        NONE.to_string()
    } else {
        items.join(", ")
    }
}

pub(crate) fn link(base: &str, segment: &str, uid: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), segment, uid)
}

/// `Label: value` lines with a heading, one block per row
pub(crate) struct Block {
    lines: Vec<String>,
}

impl Block {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            lines: vec![heading.into()],
        }
    }

    pub fn line(mut self, label: &str, value: impl AsRef<str>) -> Self {
        self.lines.push(format!("{}: {}", label, value.as_ref()));
        self
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

pub(crate) fn join_blocks(blocks: Vec<String>) -> String {
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_use_placeholders() {
        let row = json!({"name": "Alice", "bio": "  ", "skills": []});
        assert_eq!(text(&row, "name"), "Alice");
        assert_eq!(text(&row, "bio"), NOT_PROVIDED);
        assert_eq!(list(&row, "skills.title"), NONE);
    }

    #[test]
    fn test_relations_include_uids() {
        let row = json!({"teams": [{"uid": "t1", "name": "Lotus"}, {"name": "Boost"}]});
        assert_eq!(relations(&row, "teams", "name"), "Lotus (t1), Boost");
    }

    #[test]
    fn test_block_layout() {
        let block = Block::new("Member: Alice").line("ID", "m1").finish();
        assert_eq!(block, "Member: Alice\nID: m1");
    }
}
