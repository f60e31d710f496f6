//! Typed filters over directory rows.
//!
//! A [`Filter`] is evaluated directly over JSON rows by the in-memory store
//! and translated into a BSON query by the MongoDB store; both give the same
//! answers. Field paths are dotted (`teams.name`), and a path that crosses
//! an array matches when any element matches.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Directory tables the retrieval tools query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryEntity {
    Members,
    Teams,
    Projects,
    FocusAreas,
    Asks,
    IrlEvents,
    ForumPosts,
}

impl DirectoryEntity {
    pub fn collection_name(&self) -> &'static str {
        match self {
            DirectoryEntity::Members => "members",
            DirectoryEntity::Teams => "teams",
            DirectoryEntity::Projects => "projects",
            DirectoryEntity::FocusAreas => "focus_areas",
            DirectoryEntity::Asks => "asks",
            DirectoryEntity::IrlEvents => "irl_events",
            DirectoryEntity::ForumPosts => "forum_posts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// No constraint
    All,
    /// Case-insensitive substring
    Contains { field: String, value: String },
    Equals { field: String, value: Value },
    /// Whole-value text match, ignoring case
    EqualsIgnoreCase { field: String, value: String },
    Gte { field: String, value: Value },
    Lte { field: String, value: Value },
    /// Field present and non-null (`set = true`) or absent/null
    IsSet { field: String, set: bool },
    And { filters: Vec<Filter> },
    Or { filters: Vec<Filter> },
}

impl Filter {
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn equals_ignore_case(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::EqualsIgnoreCase {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_set(field: impl Into<String>, set: bool) -> Self {
        Filter::IsSet {
            field: field.into(),
            set,
        }
    }

    /// AND of the given filters. Empty input means no constraint.
    pub fn and(filters: Vec<Filter>) -> Self {
        let mut filters: Vec<Filter> = filters
            .into_iter()
            .filter(|f| !matches!(f, Filter::All))
            .collect();
        match filters.len() {
            0 => Filter::All,
            1 => filters.remove(0),
            _ => Filter::And { filters },
        }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        if filters.len() == 1 {
            return filters.into_iter().next().unwrap_or(Filter::All);
        }
        Filter::Or { filters }
    }

    /// `value` contained in any of `fields`
    pub fn any_contains(fields: &[&str], value: &str) -> Self {
        Filter::or(
            fields
                .iter()
                .map(|field| Filter::contains(*field, value))
                .collect(),
        )
    }

    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Contains { field, value } => {
                let needle = value.to_lowercase();
                resolve_path(row, field)
                    .into_iter()
                    .filter_map(scalar_text)
                    .any(|text| text.to_lowercase().contains(&needle))
            }
            Filter::Equals { field, value } => {
                resolve_path(row, field).into_iter().any(|v| v == value)
            }
            Filter::EqualsIgnoreCase { field, value } => resolve_path(row, field)
                .into_iter()
                .filter_map(Value::as_str)
                .any(|text| text.to_lowercase() == value.to_lowercase()),
            Filter::Gte { field, value } => resolve_path(row, field)
                .into_iter()
                .any(|v| compare_scalars(v, value).is_some_and(|o| o != Ordering::Less)),
            Filter::Lte { field, value } => resolve_path(row, field)
                .into_iter()
                .any(|v| compare_scalars(v, value).is_some_and(|o| o != Ordering::Greater)),
            Filter::IsSet { field, set } => {
                let present = resolve_path(row, field).into_iter().any(|v| !v.is_null());
                present == *set
            }
            Filter::And { filters } => filters.iter().all(|f| f.matches(row)),
            Filter::Or { filters } => filters.iter().any(|f| f.matches(row)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Value at a dotted path
    Field(String),
    /// Number of elements of the array at a path
    Count(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            key: SortKey::Field(field.into()),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            key: SortKey::Field(field.into()),
            direction: SortDirection::Desc,
        }
    }

    pub fn count_desc(field: impl Into<String>) -> Self {
        Self {
            key: SortKey::Count(field.into()),
            direction: SortDirection::Desc,
        }
    }

    /// Compare two rows; ties are broken by `uid` so ordering is total
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let primary = match &self.key {
            SortKey::Field(path) => compare_sort_values(
                resolve_path(a, path).first().copied(),
                resolve_path(b, path).first().copied(),
            ),
            SortKey::Count(path) => array_len(a, path).cmp(&array_len(b, path)),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| {
            compare_sort_values(a.get("uid"), b.get("uid"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryQuery {
    pub entity: DirectoryEntity,
    pub filter: Filter,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl DirectoryQuery {
    pub fn new(entity: DirectoryEntity) -> Self {
        Self {
            entity,
            filter: Filter::All,
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Run the query over an in-memory table
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        let mut matched: Vec<Value> = rows
            .iter()
            .filter(|row| self.filter.matches(row))
            .cloned()
            .collect();

        if let Some(order_by) = &self.order_by {
            matched.sort_by(|a, b| order_by.compare(a, b));
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// Values at a dotted path, flattening arrays on the way
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![value];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for v in current {
            match v {
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Some(child) = item.get(segment) {
                            next.push(child);
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    current
        .into_iter()
        .flat_map(|v| match v {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_sort_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => compare_scalars(x, y)
            .unwrap_or_else(|| type_rank(a).cmp(&type_rank(b))),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn array_len(row: &Value, path: &str) -> usize {
    let mut current = row;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(child) => current = child,
            None => return 0,
        }
    }
    current.as_array().map(Vec::len).unwrap_or(0)
}

#[cfg(feature = "mongodb")]
mod bson_query {
    use bson::{doc, Bson, Document};

    use super::{Filter, OrderBy, SortDirection, SortKey};
    use crate::error::Result;

    pub(crate) const SORT_FIELD: &str = "__sort";

    /// Escape regex metacharacters so user input matches literally
    pub fn escape_regex(input: &str) -> String {
        let mut escaped = String::with_capacity(input.len());
        for c in input.chars() {
            if "\\.^$|?*+()[]{}/-".contains(c) {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    impl Filter {
        pub fn to_document(&self) -> Result<Document> {
            Ok(match self {
                Filter::All => Document::new(),
                Filter::Contains { field, value } => doc! {
                    field.as_str(): { "$regex": escape_regex(value), "$options": "i" }
                },
                Filter::Equals { field, value } => doc! { field.as_str(): bson::to_bson(value)? },
                Filter::EqualsIgnoreCase { field, value } => doc! {
                    field.as_str(): { "$regex": format!("^{}$", escape_regex(value)), "$options": "i" }
                },
                Filter::Gte { field, value } => {
                    doc! { field.as_str(): { "$gte": bson::to_bson(value)? } }
                }
                Filter::Lte { field, value } => {
                    doc! { field.as_str(): { "$lte": bson::to_bson(value)? } }
                }
                Filter::IsSet { field, set: true } => doc! { field.as_str(): { "$ne": Bson::Null } },
                Filter::IsSet { field, set: false } => doc! { field.as_str(): Bson::Null },
                Filter::And { filters } => doc! { "$and": Self::documents(filters)? },
                Filter::Or { filters } => doc! { "$or": Self::documents(filters)? },
            })
        }

        fn documents(filters: &[Filter]) -> Result<Vec<Document>> {
            filters.iter().map(Filter::to_document).collect()
        }
    }

    impl OrderBy {
        /// `$addFields` stage needed before sorting, if any
        pub fn add_fields_stage(&self) -> Option<Document> {
            match &self.key {
                SortKey::Field(_) => None,
                SortKey::Count(path) => Some(doc! {
                    "$addFields": {
                        SORT_FIELD: { "$size": { "$ifNull": [format!("${}", path), []] } }
                    }
                }),
            }
        }

        pub fn sort_document(&self) -> Document {
            let direction = match self.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            };
            let field = match &self.key {
                SortKey::Field(path) => path.clone(),
                SortKey::Count(_) => SORT_FIELD.to_string(),
            };
            doc! { field: direction, "uid": 1 }
        }
    }
}

#[cfg(feature = "mongodb")]
pub use bson_query::escape_regex;
#[cfg(feature = "mongodb")]
pub(crate) use bson_query::SORT_FIELD;
