use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, Filter, OrderBy};
use husky_types::EntityType;
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{join_blocks, list, relations, text, Block};
use super::{non_blank, parse_args, DirectoryTool, ToolContext};

const SEARCH_FIELDS: &[&str] = &["name", "tagline", "description", "tags"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectsArgs {
    search: Option<String>,
    name: Option<String>,
    team: Option<String>,
    tag: Option<String>,
    looking_for_funding: Option<bool>,
    order_by: Option<ProjectOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProjectOrder {
    #[default]
    Name,
    CreatedAt,
    Score,
}

pub struct ProjectsTool {
    context: ToolContext,
}

impl ProjectsTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    fn query(&self, args: &ProjectsArgs) -> DirectoryQuery {
        let mut filters = Vec::new();
        if let Some(search) = non_blank(&args.search) {
            filters.push(Filter::any_contains(SEARCH_FIELDS, search));
        }
        if let Some(name) = non_blank(&args.name) {
            filters.push(Filter::contains("name", name));
        }
        if let Some(team) = non_blank(&args.team) {
            filters.push(Filter::any_contains(
                &["maintainingTeam.name", "contributingTeams.name"],
                team,
            ));
        }
        if let Some(tag) = non_blank(&args.tag) {
            filters.push(Filter::contains("tags", tag));
        }
        if let Some(looking) = args.looking_for_funding {
            filters.push(Filter::equals("lookingForFunding", looking));
        }

        let order_by = match args.order_by.unwrap_or_default() {
            ProjectOrder::Name => OrderBy::asc("name"),
            ProjectOrder::CreatedAt => OrderBy::desc("createdAt"),
            ProjectOrder::Score => OrderBy::desc("score"),
        };

        DirectoryQuery::new(DirectoryEntity::Projects)
            .filter(Filter::and(filters))
            .order_by(order_by)
            .limit(self.context.page_size())
    }

    fn format(&self, row: &Value) -> String {
        let uid = text(row, "uid");
        Block::new(format!("Project: {}", text(row, "name")))
            .line("ID", &uid)
            .line(
                "Directory link",
                EntityType::Project
                    .directory_link(self.context.directory_base_url(), &uid)
                    .unwrap_or_default(),
            )
            .line("Tagline", text(row, "tagline"))
            .line("Description", text(row, "description"))
            .line("Tags", list(row, "tags"))
            .line("Looking for funding", text(row, "lookingForFunding"))
            .line("Maintaining team", relations(row, "maintainingTeam", "name"))
            .line("Contributing teams", relations(row, "contributingTeams", "name"))
            .finish()
    }
}

#[async_trait]
impl DirectoryTool for ProjectsTool {
    fn name(&self) -> &'static str {
        "projects"
    }

    fn description(&self) -> &'static str {
        "Search the directory for projects by name, team, tag or funding status."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Free text matched against name, tagline, description and tags"},
                "name": {"type": "string"},
                "team": {"type": "string", "description": "Maintaining or contributing team name"},
                "tag": {"type": "string"},
                "looking_for_funding": {"type": "boolean"},
                "order_by": {"type": "string", "enum": ["name", "created_at", "score"]}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ProjectsArgs = parse_args(self.name(), args)?;
        let rows = self.context.directory.query(self.query(&args)).await?;
        Ok(join_blocks(rows.iter().map(|row| self.format(row)).collect()))
    }
}
