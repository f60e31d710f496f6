use anyhow::Result;
use async_trait::async_trait;
use husky_persist::{DirectoryEntity, DirectoryQuery, Filter, OrderBy};
use husky_types::EntityType;
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{field, join_blocks, text, Block};
use super::{non_blank, parse_args, DirectoryTool, ToolContext};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IrlEventsArgs {
    search: Option<String>,
    location: Option<String>,
    event_type: Option<String>,
    /// ISO-8601 date, events starting on or after it
    from_date: Option<String>,
    /// ISO-8601 date, events ending on or before it
    to_date: Option<String>,
    order_by: Option<EventOrder>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum EventOrder {
    #[default]
    StartDate,
    Name,
}

/// Date-only bounds cover the whole day against timestamped rows
fn end_of_day(date: &str) -> String {
    if date.contains('T') {
        date.to_string()
    } else {
        format!("{}T23:59:59.999Z", date)
    }
}

pub struct IrlEventsTool {
    context: ToolContext,
}

impl IrlEventsTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }

    fn query(&self, args: &IrlEventsArgs) -> DirectoryQuery {
        let mut filters = Vec::new();
        if let Some(search) = non_blank(&args.search) {
            filters.push(Filter::any_contains(&["name", "description", "location"], search));
        }
        if let Some(location) = non_blank(&args.location) {
            filters.push(Filter::contains("location", location));
        }
        if let Some(event_type) = non_blank(&args.event_type) {
            filters.push(Filter::contains("type", event_type));
        }
        if let Some(from) = non_blank(&args.from_date) {
            filters.push(Filter::gte("startDate", from));
        }
        if let Some(to) = non_blank(&args.to_date) {
            filters.push(Filter::lte("endDate", end_of_day(to)));
        }

        let order_by = match args.order_by.unwrap_or_default() {
            EventOrder::StartDate => OrderBy::desc("startDate"),
            EventOrder::Name => OrderBy::asc("name"),
        };

        DirectoryQuery::new(DirectoryEntity::IrlEvents)
            .filter(Filter::and(filters))
            .order_by(order_by)
            .limit(self.context.page_size())
    }

    fn format(&self, row: &Value) -> String {
        let uid = text(row, "uid");
        // event pages are addressed by slug when there is one
        let page = field(row, "slug").unwrap_or_else(|| uid.clone());
        let dates = match (field(row, "startDate"), field(row, "endDate")) {
            (Some(start), Some(end)) => format!("{} to {}", start, end),
            (Some(start), None) => start,
            (None, _) => text(row, "startDate"),
        };

        Block::new(format!("IRL event: {}", text(row, "name")))
            .line("ID", &uid)
            .line(
                "Directory link",
                EntityType::IrlEvent
                    .directory_link(self.context.directory_base_url(), &page)
                    .unwrap_or_default(),
            )
            .line("Type", text(row, "type"))
            .line("Location", text(row, "location"))
            .line("Dates", dates)
            .line("Description", text(row, "description"))
            .line("Website", text(row, "websiteUrl"))
            .finish()
    }
}

#[async_trait]
impl DirectoryTool for IrlEventsTool {
    fn name(&self) -> &'static str {
        "irl_events"
    }

    fn description(&self) -> &'static str {
        "Search in-person events by location, type or date range, most recent first by default."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search": {"type": "string", "description": "Free text matched against name, description and location"},
                "location": {"type": "string"},
                "event_type": {"type": "string"},
                "from_date": {"type": "string", "description": "ISO-8601 date, events starting on or after it"},
                "to_date": {"type": "string", "description": "ISO-8601 date, events ending on or before it"},
                "order_by": {"type": "string", "enum": ["start_date", "name"]}
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: IrlEventsArgs = parse_args(self.name(), args)?;
        let rows = self.context.directory.query(self.query(&args)).await?;
        Ok(join_blocks(rows.iter().map(|row| self.format(row)).collect()))
    }
}
