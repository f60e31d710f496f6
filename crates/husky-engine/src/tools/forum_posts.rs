use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, Filter, OrderBy};
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{field, join_blocks, link, text, Block};
use super::{non_blank, parse_args, DirectoryTool, ToolContext};

pub const NO_FORUM_POSTS: &str = "No forum posts found matching the given criteria.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForumPostsArgs {
    search: Option<String>,
    category: Option<String>,
    order_by: Option<PostOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PostOrder {
    #[default]
    CreatedAt,
    Replies,
}

pub struct ForumPostsTool {
    context: ToolContext,
}

impl ForumPostsTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    fn query(&self, args: &ForumPostsArgs) -> DirectoryQuery {
        let mut filters = Vec::new();
        if let Some(search) = non_blank(&args.search) {
            filters.push(Filter::any_contains(&["title", "content", "author"], search));
        }
        if let Some(category) = non_blank(&args.category) {
            filters.push(Filter::contains("category.name", category));
        }

        let order_by = match args.order_by.unwrap_or_default() {
            PostOrder::CreatedAt => OrderBy::desc("createdAt"),
            PostOrder::Replies => OrderBy::desc("replies"),
        };

        DirectoryQuery::new(DirectoryEntity::ForumPosts)
            .filter(Filter::and(filters))
            .order_by(order_by)
            .limit(self.context.page_size())
    }

    fn format(&self, row: &Value) -> String {
        let uid = text(row, "uid");
        let topic = field(row, "tid").unwrap_or_else(|| uid.clone());
        let forum = &self.context.config.links.forum_base_url;

        Block::new(format!("Forum post: {}", text(row, "title")))
            .line("ID", &uid)
            .line("Link", link(forum, "topic", &topic))
            .line("Author", text(row, "author"))
            .line("Category", text(row, "category.name"))
            .line("Replies", field(row, "replies").unwrap_or_else(|| "0".to_string()))
            .line("Created at", text(row, "createdAt"))
            .line("Content", text(row, "content"))
            .finish()
    }
}

#[async_trait]
impl DirectoryTool for ForumPostsTool {
    fn name(&self) -> &'static str {
        "forum_posts"
    }

    fn description(&self) -> &'static str {
        "Search community forum posts by text or category."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Free text matched against title, content and author"},
                "category": {"type": "string"},
                "order_by": {"type": "string", "enum": ["created_at", "replies"]}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ForumPostsArgs = parse_args(self.name(), args)?;
        let rows = self.context.directory.query(self.query(&args)).await?;
        if rows.is_empty() {
            return Ok(NO_FORUM_POSTS.to_string());
        }
        Ok(join_blocks(rows.iter().map(|row| self.format(row)).collect()))
    }
}
