use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, Filter, OrderBy};
use husky_types::EntityType;
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{field, join_blocks, list, text, Block, NOT_PROVIDED};
use super::{non_blank, parse_args, DirectoryTool, ToolContext};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AsksArgs {
    search: Option<String>,
    team: Option<String>,
    tag: Option<String>,
    status: Option<String>,
    order_by: Option<AskOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AskOrder {
    #[default]
    CreatedAt,
    Title,
}

/// Requests for help that teams post on the directory
pub struct AsksTool {
    context: ToolContext,
}

impl AsksTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    fn query(&self, args: &AsksArgs) -> DirectoryQuery {
        let mut filters = Vec::new();
        if let Some(search) = non_blank(&args.search) {
            filters.push(Filter::any_contains(&["title", "description", "tags"], search));
        }
        if let Some(team) = non_blank(&args.team) {
            filters.push(Filter::contains("team.name", team));
        }
        if let Some(tag) = non_blank(&args.tag) {
            filters.push(Filter::contains("tags", tag));
        }
        if let Some(status) = non_blank(&args.status) {
            filters.push(Filter::contains("status", status));
        }

        let order_by = match args.order_by.unwrap_or_default() {
            AskOrder::CreatedAt => OrderBy::desc("createdAt"),
            AskOrder::Title => OrderBy::asc("title"),
        };

        DirectoryQuery::new(DirectoryEntity::Asks)
            .filter(Filter::and(filters))
            .order_by(order_by)
            .limit(self.context.page_size())
    }

    fn format(&self, row: &Value) -> String {
        let team_link = field(row, "team.uid")
            .and_then(|uid| EntityType::Team.directory_link(self.context.directory_base_url(), &uid))
            .unwrap_or_else(|| NOT_PROVIDED.to_string());

        Block::new(format!("Ask: {}", text(row, "title")))
            .line("ID", text(row, "uid"))
            .line("Team", text(row, "team.name"))
            .line("Team link", team_link)
            .line("Description", text(row, "description"))
            .line("Tags", list(row, "tags"))
            .line("Status", text(row, "status"))
            .line("Created at", text(row, "createdAt"))
            .finish()
    }
}

#[async_trait]
impl DirectoryTool for AsksTool {
    fn name(&self) -> &'static str {
        "asks"
    }

    fn description(&self) -> &'static str {
        "Search the requests for help that teams have posted, newest first by default."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Free text matched against title, description and tags"},
                "team": {"type": "string"},
                "tag": {"type": "string"},
                "status": {"type": "string", "description": "For example OPEN or CLOSED"},
                "order_by": {"type": "string", "enum": ["created_at", "title"]}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: AsksArgs = parse_args(self.name(), args)?;
        let rows = self.context.directory.query(self.query(&args)).await?;
        Ok(join_blocks(rows.iter().map(|row| self.format(row)).collect()))
    }
}
