mod common;

use common::{fixture, fixture_with};
use husky_engine::{InvalidArguments, NO_FORUM_POSTS};
use husky_llm::MockLLMClient;
use husky_persist::DirectoryEntity;
use husky_types::HuskyConfig;
use serde_json::{json, Value};

fn members() -> Vec<Value> {
    vec![
        json!({"uid": "m4", "name": "Dave Brown", "email": "dave@example.com", "bio": "Storage engineer",
               "location": {"city": "Lisbon", "country": "Portugal"}, "skills": [{"title": "Go"}],
               "createdAt": "2024-04-01T00:00:00Z"}),
        json!({"uid": "m2", "name": "Bob Jones", "email": "alice.fan@example.com",
               "skills": [{"title": "Rust"}], "createdAt": "2024-02-01T00:00:00Z"}),
        json!({"uid": "m1", "name": "Alice Smith", "email": "alice@example.com", "bio": "Works on IPFS",
               "location": {"city": "Berlin", "country": "Germany"}, "skills": [{"title": "Rust"}, {"title": "Go"}],
               "teams": [{"uid": "t1", "name": "Lotus", "role": "Lead"}], "officeHours": "https://cal.example/alice",
               "githubHandler": "asmith", "createdAt": "2024-01-01T00:00:00Z"}),
        json!({"uid": "m3", "name": "Carol White", "email": "carol@example.com", "githubHandler": "ALICE-fanclub",
               "location": {"country": "Germany"}, "createdAt": "2024-03-01T00:00:00Z"}),
    ]
}

fn headings(output: &str) -> Vec<&str> {
    output
        .split("\n\n")
        .filter_map(|block| block.lines().next())
        .collect()
}

#[tokio::test]
async fn test_member_search_matches_text_and_handle_fields() {
    let f = fixture(MockLLMClient::new());
    f.directory.insert(DirectoryEntity::Members, members()).await;

    let output = f
        .engine
        .tools()
        .execute("members", json!({"search": "alice"}))
        .await
        .unwrap();

    assert_eq!(
        headings(&output),
        vec!["Member: Alice Smith", "Member: Bob Jones", "Member: Carol White"]
    );
}

#[tokio::test]
async fn test_member_search_is_idempotent() {
    let f = fixture(MockLLMClient::new());
    f.directory.insert(DirectoryEntity::Members, members()).await;
    let tools = f.engine.tools();

    let first = tools.execute("members", json!({"search": "alice"})).await.unwrap();
    let second = tools.execute("members", json!({"search": "alice"})).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_member_block_lists_relations_and_placeholders() {
    let f = fixture(MockLLMClient::new());
    f.directory.insert(DirectoryEntity::Members, members()).await;
    let tools = f.engine.tools();

    let alice = tools.execute("members", json!({"name": "alice smith"})).await.unwrap();
    assert!(alice.contains("ID: m1"));
    assert!(alice.contains("Directory link: https://directory.plnetwork.io/members/m1"));
    assert!(alice.contains("Location: Berlin, Germany"));
    assert!(alice.contains("Skills: Rust, Go"));
    assert!(alice.contains("Teams: Lotus (t1)"));
    assert!(alice.contains("Roles: Lead"));

    let bob = tools.execute("members", json!({"name": "bob"})).await.unwrap();
    assert!(bob.contains("Bio: Not provided"));
    assert!(bob.contains("Location: Not provided"));
    assert!(bob.contains("Teams: None"));
}

#[tokio::test]
async fn test_member_filters_are_and_combined() {
    let f = fixture(MockLLMClient::new());
    f.directory.insert(DirectoryEntity::Members, members()).await;
    let tools = f.engine.tools();

    let output = tools
        .execute("members", json!({"skill": "rust", "country": "germany"}))
        .await
        .unwrap();
    assert_eq!(headings(&output), vec!["Member: Alice Smith"]);

    let output = tools
        .execute("members", json!({"has_office_hours": false, "country": "Germany"}))
        .await
        .unwrap();
    assert_eq!(headings(&output), vec!["Member: Carol White"]);
}

#[tokio::test]
async fn test_member_order_and_page_size() {
    let mut config = HuskyConfig::default();
    config.tools.page_size = 2;
    let f = fixture_with(MockLLMClient::new(), config, &[]);
    f.directory.insert(DirectoryEntity::Members, members()).await;

    let output = f
        .engine
        .tools()
        .execute("members", json!({"order_by": "created_at"}))
        .await
        .unwrap();
    assert_eq!(headings(&output), vec!["Member: Dave Brown", "Member: Carol White"]);
}

#[tokio::test]
async fn test_no_match_is_an_empty_string() {
    let f = fixture(MockLLMClient::new());
    f.directory.insert(DirectoryEntity::Members, members()).await;

    let output = f
        .engine
        .tools()
        .execute("members", json!({"search": "zzz"}))
        .await
        .unwrap();
    assert_eq!(output, "");
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected() {
    let f = fixture(MockLLMClient::new());
    let err = f
        .engine
        .tools()
        .execute("members", json!({"order_by": "shoe_size"}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid arguments for tool 'members'"));
    assert!(err.downcast_ref::<InvalidArguments>().is_some());
}

#[tokio::test]
async fn test_teams_and_projects_filters() {
    let f = fixture(MockLLMClient::new());
    f.directory
        .insert(
            DirectoryEntity::Teams,
            [
                json!({"uid": "t1", "name": "Lotus", "technologies": [{"title": "Filecoin"}],
                       "fundingStage": {"title": "Series A"}}),
                json!({"uid": "t2", "name": "Boost", "technologies": [{"title": "IPFS"}]}),
            ],
        )
        .await;
    f.directory
        .insert(
            DirectoryEntity::Projects,
            [
                json!({"uid": "p1", "name": "Forest", "lookingForFunding": true, "tags": ["rust"],
                       "maintainingTeam": {"uid": "t3", "name": "ChainSafe"}}),
                json!({"uid": "p2", "name": "Venus", "lookingForFunding": false,
                       "contributingTeams": [{"uid": "t4", "name": "IPFS Force"}]}),
            ],
        )
        .await;
    let tools = f.engine.tools();

    let teams = tools.execute("teams", json!({"technology": "filecoin"})).await.unwrap();
    assert_eq!(headings(&teams), vec!["Team: Lotus"]);
    assert!(teams.contains("Funding stage: Series A"));
    assert!(teams.contains("Directory link: https://directory.plnetwork.io/teams/t1"));

    let projects = tools.execute("projects", json!({"looking_for_funding": true})).await.unwrap();
    assert_eq!(headings(&projects), vec!["Project: Forest"]);
    assert!(projects.contains("Maintaining team: ChainSafe (t3)"));

    let by_team = tools.execute("projects", json!({"team": "ipfs force"})).await.unwrap();
    assert_eq!(headings(&by_team), vec!["Project: Venus"]);
}

#[tokio::test]
async fn test_focus_areas_by_team_count() {
    let f = fixture(MockLLMClient::new());
    f.directory
        .insert(
            DirectoryEntity::FocusAreas,
            [
                json!({"uid": "f1", "title": "Digital Human Rights", "teams": [{"uid": "t1", "name": "A"}]}),
                json!({"uid": "f2", "title": "Public Goods", "teams": [{"uid": "t2", "name": "B"}, {"uid": "t3", "name": "C"}]}),
            ],
        )
        .await;
    let tools = f.engine.tools();

    let default = tools.execute("focus_areas", Value::Null).await.unwrap();
    assert_eq!(
        headings(&default),
        vec!["Focus area: Digital Human Rights", "Focus area: Public Goods"]
    );

    let by_count = tools.execute("focus_areas", json!({"order_by": "team_count"})).await.unwrap();
    assert_eq!(
        headings(&by_count),
        vec!["Focus area: Public Goods", "Focus area: Digital Human Rights"]
    );
}

#[tokio::test]
async fn test_asks_newest_first() {
    let f = fixture(MockLLMClient::new());
    f.directory
        .insert(
            DirectoryEntity::Asks,
            [
                json!({"uid": "a1", "title": "Need a Rust auditor", "status": "OPEN",
                       "createdAt": "2024-01-01T00:00:00Z", "team": {"uid": "t1", "name": "Lotus"}}),
                json!({"uid": "a2", "title": "Looking for designers", "status": "CLOSED",
                       "createdAt": "2024-06-01T00:00:00Z"}),
            ],
        )
        .await;
    let tools = f.engine.tools();

    let all = tools.execute("asks", json!({})).await.unwrap();
    assert_eq!(headings(&all), vec!["Ask: Looking for designers", "Ask: Need a Rust auditor"]);
    assert!(all.contains("Team link: https://directory.plnetwork.io/teams/t1"));
    assert!(all.contains("Team link: Not provided"));

    let open = tools.execute("asks", json!({"status": "open"})).await.unwrap();
    assert_eq!(headings(&open), vec!["Ask: Need a Rust auditor"]);
}

#[tokio::test]
async fn test_irl_events_date_range() {
    let f = fixture(MockLLMClient::new());
    f.directory
        .insert(
            DirectoryEntity::IrlEvents,
            [
                json!({"uid": "e1", "slug": "lisbon-2023", "name": "LabWeek 2023", "location": "Lisbon",
                       "startDate": "2023-11-01", "endDate": "2023-11-10"}),
                json!({"uid": "e2", "name": "FIL Dev Summit", "location": "Brussels",
                       "startDate": "2024-07-08", "endDate": "2024-07-10"}),
                json!({"uid": "e3", "name": "LabWeek 2024", "location": "Bangkok",
                       "startDate": "2024-11-10", "endDate": "2024-11-15"}),
            ],
        )
        .await;
    let tools = f.engine.tools();

    let all = tools.execute("irl_events", json!({})).await.unwrap();
    assert_eq!(
        headings(&all),
        vec!["IRL event: LabWeek 2024", "IRL event: FIL Dev Summit", "IRL event: LabWeek 2023"]
    );
    assert!(all.contains("Directory link: https://directory.plnetwork.io/events/irl/lisbon-2023"));
    assert!(all.contains("Dates: 2024-07-08 to 2024-07-10"));

    let in_2024 = tools
        .execute("irl_events", json!({"from_date": "2024-01-01", "to_date": "2024-08-01"}))
        .await
        .unwrap();
    assert_eq!(headings(&in_2024), vec!["IRL event: FIL Dev Summit"]);
}

#[tokio::test]
async fn test_irl_events_to_date_includes_events_ending_that_day() {
    let f = fixture(MockLLMClient::new());
    f.directory
        .insert(
            DirectoryEntity::IrlEvents,
            [
                json!({"uid": "e1", "name": "FIL Dev Summit", "location": "Brussels",
                       "startDate": "2024-07-08T09:00:00.000Z", "endDate": "2024-07-10T18:00:00.000Z"}),
                json!({"uid": "e2", "name": "Hack Week", "location": "Brussels",
                       "startDate": "2024-07-09T09:00:00.000Z", "endDate": "2024-07-11T10:00:00.000Z"}),
            ],
        )
        .await;
    let tools = f.engine.tools();

    let output = tools
        .execute("irl_events", json!({"from_date": "2024-07-08", "to_date": "2024-07-10"}))
        .await
        .unwrap();
    assert_eq!(headings(&output), vec!["IRL event: FIL Dev Summit"]);

    let exact = tools
        .execute("irl_events", json!({"to_date": "2024-07-10T12:00:00.000Z"}))
        .await
        .unwrap();
    assert!(exact.is_empty());
}

#[tokio::test]
async fn test_forum_posts_sentinel_and_links() {
    let f = fixture(MockLLMClient::new());
    let tools = f.engine.tools();

    assert_eq!(tools.execute("forum_posts", json!({})).await.unwrap(), NO_FORUM_POSTS);

    f.directory
        .insert(
            DirectoryEntity::ForumPosts,
            [json!({"uid": "p1", "tid": 42, "title": "Office hours recap", "author": "alice",
                    "category": {"name": "Events"}, "replies": 3, "createdAt": "2024-05-01"})],
        )
        .await;

    let output = tools.execute("forum_posts", json!({"category": "events"})).await.unwrap();
    assert!(output.contains("Forum post: Office hours recap"));
    assert!(output.contains("Link: https://forum.plnetwork.io/topic/42"));
    assert!(output.contains("Replies: 3"));

    let none = tools.execute("forum_posts", json!({"search": "nothing like this"})).await.unwrap();
    assert_eq!(none, NO_FORUM_POSTS);
}

#[tokio::test]
async fn test_non_directory_docs_applies_per_collection_thresholds() {
    let f = fixture(MockLLMClient::new());
    let query = "filecoin storage deals";
    f.seed("non_directory_docs", "g1", query, 0.6, json!({"page_content": "General doc kept", "metadata": {"source": "https://docs.filecoin.io"}})).await;
    f.seed("non_directory_docs", "g2", query, 0.42, json!({"page_content": "General doc dropped"})).await;
    f.seed("websearch_teams", "w1", query, 0.42, json!({"page_content": "Web page kept"})).await;
    f.seed("websearch_teams", "w2", query, 0.3, json!({"page_content": "Web page dropped"})).await;

    let output = f
        .engine
        .tools()
        .execute("non_directory_docs", json!({"query": query}))
        .await
        .unwrap();

    assert_eq!(
        output,
        "General doc kept (Source:https://docs.filecoin.io)\nWeb page kept"
    );
    assert_eq!(f.llm.embedded_inputs(), vec![query.to_string()]);
}

#[tokio::test]
async fn test_non_directory_docs_survives_one_failed_collection() {
    let f = fixture_with(MockLLMClient::new(), HuskyConfig::default(), &["websearch_teams"]);
    let query = "filecoin storage deals";
    f.seed("non_directory_docs", "g1", query, 0.6, json!({"page_content": "General doc kept"})).await;

    let output = f
        .engine
        .tools()
        .execute("non_directory_docs", json!({"query": query}))
        .await
        .unwrap();
    assert_eq!(output, "General doc kept");

    let f = fixture_with(
        MockLLMClient::new(),
        HuskyConfig::default(),
        &["non_directory_docs", "websearch_teams"],
    );
    assert!(f
        .engine
        .tools()
        .execute("non_directory_docs", json!({"query": query}))
        .await
        .is_err());
}

#[tokio::test]
async fn test_non_directory_docs_requires_query() {
    let f = fixture(MockLLMClient::new());
    assert!(f
        .engine
        .tools()
        .execute("non_directory_docs", json!({}))
        .await
        .is_err());
}

#[test]
fn test_registry_exposes_all_tools() {
    let f = fixture(MockLLMClient::new());
    let names: Vec<String> = f
        .engine
        .tools()
        .definitions()
        .into_iter()
        .map(|t| t.function.name)
        .collect();

    assert_eq!(
        names,
        vec![
            "members",
            "teams",
            "projects",
            "focus_areas",
            "asks",
            "irl_events",
            "forum_posts",
            "non_directory_docs"
        ]
    );
}
