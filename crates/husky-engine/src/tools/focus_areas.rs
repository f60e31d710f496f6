use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, Filter, OrderBy};
use husky_types::EntityType;
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{join_blocks, relations, text, Block};
use super::{non_blank, parse_args, DirectoryTool, ToolContext};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FocusAreasArgs {
    search: Option<String>,
    title: Option<String>,
    order_by: Option<FocusAreaOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FocusAreaOrder {
    #[default]
    Title,
    TeamCount,
    ProjectCount,
}

pub struct FocusAreasTool {
    context: ToolContext,
}

impl FocusAreasTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    fn query(&self, args: &FocusAreasArgs) -> DirectoryQuery {
        let mut filters = Vec::new();
        if let Some(search) = non_blank(&args.search) {
            filters.push(Filter::any_contains(&["title", "description"], search));
        }
        if let Some(title) = non_blank(&args.title) {
            filters.push(Filter::contains("title", title));
        }

        let order_by = match args.order_by.unwrap_or_default() {
            FocusAreaOrder::Title => OrderBy::asc("title"),
            FocusAreaOrder::TeamCount => OrderBy::count_desc("teams"),
            FocusAreaOrder::ProjectCount => OrderBy::count_desc("projects"),
        };

        DirectoryQuery::new(DirectoryEntity::FocusAreas)
            .filter(Filter::and(filters))
            .order_by(order_by)
            .limit(self.context.page_size())
    }

    fn format(&self, row: &Value) -> String {
        let uid = text(row, "uid");
        Block::new(format!("Focus area: {}", text(row, "title")))
            .line("ID", &uid)
            .line(
                "Directory link",
                EntityType::FocusArea
                    .directory_link(self.context.directory_base_url(), &uid)
                    .unwrap_or_default(),
            )
            .line("Description", text(row, "description"))
            .line("Teams", relations(row, "teams", "name"))
            .line("Projects", relations(row, "projects", "name"))
            .finish()
    }
}

#[async_trait]
impl DirectoryTool for FocusAreasTool {
    fn name(&self) -> &'static str {
        "focus_areas"
    }

    fn description(&self) -> &'static str {
        "List focus areas with the teams and projects working on them."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Free text matched against title and description"},
                "title": {"type": "string"},
                "order_by": {"type": "string", "enum": ["title", "team_count", "project_count"]}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: FocusAreasArgs = parse_args(self.name(), args)?;
        let rows = self.context.directory.query(self.query(&args)).await?;
        Ok(join_blocks(rows.iter().map(|row| self.format(row)).collect()))
    }
}
