use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, Filter, OrderBy};
use husky_types::EntityType;
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{join_blocks, list, relations, text, Block};
use super::{non_blank, parse_args, DirectoryTool, ToolContext};

const SEARCH_FIELDS: &[&str] = &[
    "name",
    "shortDescription",
    "longDescription",
    "industryTags.title",
    "technologies.title",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TeamsArgs {
    search: Option<String>,
    name: Option<String>,
    industry_tag: Option<String>,
    funding_stage: Option<String>,
    technology: Option<String>,
    focus_area: Option<String>,
    order_by: Option<TeamOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TeamOrder {
    #[default]
    Name,
    CreatedAt,
}

pub struct TeamsTool {
    context: ToolContext,
}

impl TeamsTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    fn query(&self, args: &TeamsArgs) -> DirectoryQuery {
        let mut filters = Vec::new();
        if let Some(search) = non_blank(&args.search) {
            filters.push(Filter::any_contains(SEARCH_FIELDS, search));
        }
        if let Some(name) = non_blank(&args.name) {
            filters.push(Filter::contains("name", name));
        }
        if let Some(tag) = non_blank(&args.industry_tag) {
            filters.push(Filter::contains("industryTags.title", tag));
        }
        if let Some(stage) = non_blank(&args.funding_stage) {
            filters.push(Filter::contains("fundingStage.title", stage));
        }
        if let Some(technology) = non_blank(&args.technology) {
            filters.push(Filter::contains("technologies.title", technology));
        }
        if let Some(focus_area) = non_blank(&args.focus_area) {
            filters.push(Filter::contains("focusAreas.title", focus_area));
        }

        let order_by = match args.order_by.unwrap_or_default() {
            TeamOrder::Name => OrderBy::asc("name"),
            TeamOrder::CreatedAt => OrderBy::desc("createdAt"),
        };

        DirectoryQuery::new(DirectoryEntity::Teams)
            .filter(Filter::and(filters))
            .order_by(order_by)
            .limit(self.context.page_size())
    }

    fn format(&self, row: &Value) -> String {
        let uid = text(row, "uid");
        Block::new(format!("Team: {}", text(row, "name")))
            .line("ID", &uid)
            .line(
                "Directory link",
                EntityType::Team
                    .directory_link(self.context.directory_base_url(), &uid)
                    .unwrap_or_default(),
            )
            .line("Short description", text(row, "shortDescription"))
            .line("Long description", text(row, "longDescription"))
            .line("Website", text(row, "website"))
            .line("Funding stage", text(row, "fundingStage.title"))
            .line("Industry tags", list(row, "industryTags.title"))
            .line("Technologies", list(row, "technologies.title"))
            .line("Focus areas", list(row, "focusAreas.title"))
            .line("Members", relations(row, "members", "name"))
            .finish()
    }
}

#[async_trait]
impl DirectoryTool for TeamsTool {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn description(&self) -> &'static str {
        "Search the directory for teams by name, industry, funding stage, technology or focus area."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Free text matched against name, descriptions, industry tags and technologies"},
                "name": {"type": "string"},
                "industry_tag": {"type": "string"},
                "funding_stage": {"type": "string"},
                "technology": {"type": "string"},
                "focus_area": {"type": "string"},
                "order_by": {"type": "string", "enum": ["name", "created_at"]}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: TeamsArgs = parse_args(self.name(), args)?;
        let rows = self.context.directory.query(self.query(&args)).await?;
        Ok(join_blocks(rows.iter().map(|row| self.format(row)).collect()))
    }
}
