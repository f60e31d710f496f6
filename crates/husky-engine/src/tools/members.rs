use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, Filter, OrderBy};
use husky_types::EntityType;
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{field, join_blocks, list, relations, text, Block, NOT_PROVIDED};
use super::{non_blank, parse_args, DirectoryTool, ToolContext};

const SEARCH_FIELDS: &[&str] = &[
    "name",
    "email",
    "bio",
    "githubHandler",
    "discordHandler",
    "twitterHandler",
    "linkedinHandler",
    "telegramHandler",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MembersArgs {
    search: Option<String>,
    name: Option<String>,
    skill: Option<String>,
    team: Option<String>,
    country: Option<String>,
    city: Option<String>,
    has_office_hours: Option<bool>,
    order_by: Option<MemberOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MemberOrder {
    #[default]
    Name,
    CreatedAt,
    UpdatedAt,
}

pub struct MembersTool {
    context: ToolContext,
}

impl MembersTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    fn query(&self, args: &MembersArgs) -> DirectoryQuery {
        let mut filters = Vec::new();
        if let Some(search) = non_blank(&args.search) {
            filters.push(Filter::any_contains(SEARCH_FIELDS, search));
        }
        if let Some(name) = non_blank(&args.name) {
            filters.push(Filter::contains("name", name));
        }
        if let Some(skill) = non_blank(&args.skill) {
            filters.push(Filter::contains("skills.title", skill));
        }
        if let Some(team) = non_blank(&args.team) {
            filters.push(Filter::contains("teams.name", team));
        }
        if let Some(country) = non_blank(&args.country) {
            filters.push(Filter::contains("location.country", country));
        }
        if let Some(city) = non_blank(&args.city) {
            filters.push(Filter::contains("location.city", city));
        }
        if let Some(has_office_hours) = args.has_office_hours {
            filters.push(Filter::is_set("officeHours", has_office_hours));
        }

        let order_by = match args.order_by.unwrap_or_default() {
            MemberOrder::Name => OrderBy::asc("name"),
            MemberOrder::CreatedAt => OrderBy::desc("createdAt"),
            MemberOrder::UpdatedAt => OrderBy::desc("updatedAt"),
        };

        DirectoryQuery::new(DirectoryEntity::Members)
            .filter(Filter::and(filters))
            .order_by(order_by)
            .limit(self.context.page_size())
    }

    fn format(&self, row: &Value) -> String {
        let uid = text(row, "uid");
        let location = [field(row, "location.city"), field(row, "location.country")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        Block::new(format!("Member: {}", text(row, "name")))
            .line("ID", &uid)
            .line(
                "Directory link",
                EntityType::Member
                    .directory_link(self.context.directory_base_url(), &uid)
                    .unwrap_or_default(),
            )
            .line("Email", text(row, "email"))
            .line("Bio", text(row, "bio"))
            .line(
                "Location",
                if location.is_empty() {
                    NOT_PROVIDED.to_string()
                } else {
                    location
                },
            )
            .line("Skills", list(row, "skills.title"))
            .line("Teams", relations(row, "teams", "name"))
            .line("Roles", list(row, "teams.role"))
            .line("Office hours", text(row, "officeHours"))
            .line("GitHub", text(row, "githubHandler"))
            .line("Discord", text(row, "discordHandler"))
            .line("Twitter", text(row, "twitterHandler"))
            .line("LinkedIn", text(row, "linkedinHandler"))
            .line("Telegram", text(row, "telegramHandler"))
            .finish()
    }
}

#[async_trait]
impl DirectoryTool for MembersTool {
    fn name(&self) -> &'static str {
        "members"
    }

    fn description(&self) -> &'static str {
        "Search the directory for members by name, skill, team, location or office-hours availability."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Free text matched against name, email, bio and social handles"},
                "name": {"type": "string"},
                "skill": {"type": "string"},
                "team": {"type": "string", "description": "Name of a team the member belongs to"},
                "country": {"type": "string"},
                "city": {"type": "string"},
                "has_office_hours": {"type": "boolean"},
                "order_by": {"type": "string", "enum": ["name", "created_at", "updated_at"]}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: MembersArgs = parse_args(self.name(), args)?;
        let rows = self.context.directory.query(self.query(&args)).await?;
        Ok(join_blocks(rows.iter().map(|row| self.format(row)).collect()))
    }
}
