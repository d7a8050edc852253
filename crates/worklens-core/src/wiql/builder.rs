//! WIQL query construction from chat commands and global filters.
//!
//! The builder is **total**: every `(keyword, parameter, filters)` triple
//! produces a syntactically valid query. Unknown keywords and missing
//! required parameters degrade to the permissive "non-closed items" query
//! instead of erroring, because a chat command that yields nothing at all is
//! worse than one that yields a broad result the user can refine.
//!
//! Scoping rule: queries run inside a project-scoped execution context, so
//! the builder never emits a predicate on `[System.TeamProject]`.

use std::fmt::Write as _;

use tracing::debug;

use crate::model::{GlobalFilters, Priority};

/// Field list every query selects. Kept in one place so result mapping and
/// query construction cannot drift apart.
const SELECT_FIELDS: &str = "[System.Id], [System.Title], [System.WorkItemType], \
     [System.State], [Microsoft.VSTS.Common.Priority], [System.AssignedTo], \
     [System.CreatedBy], [System.CreatedDate], [System.ChangedDate], \
     [System.AreaPath], [System.IterationPath], [System.Tags], \
     [Microsoft.VSTS.Scheduling.StoryPoints]";

/// Default rolling window for the `recent` command, in days.
const DEFAULT_RECENT_DAYS: u32 = 7;

/// A recognized chat command, ready to be rendered into WIQL.
///
/// Text-bearing commands substring-match (`CONTAINS`); categorical commands
/// match exactly (`=`). `Fallback` is the permissive non-closed query used
/// for unknown keywords, missing parameters, and the bare `project` command
/// (project scoping is implicit, so there is nothing to constrain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreatedBy(String),
    AssignedTo(String),
    State(String),
    Kind(String),
    PriorityIs(Priority),
    Tag(String),
    /// Free-text search across title and description.
    Search(String),
    /// Items changed within the last N days.
    Recent(u32),
    Fallback,
}

impl Command {
    /// Parse a `(keyword, parameter)` pair into a command. Total: anything
    /// unrecognized or missing a required parameter becomes [`Self::Fallback`].
    #[must_use]
    pub fn parse(keyword: &str, param: Option<&str>) -> Self {
        let param = param.map(str::trim).filter(|p| !p.is_empty());
        let parsed = match (keyword.trim().to_ascii_lowercase().as_str(), param) {
            ("created_by", Some(p)) => Some(Self::CreatedBy(p.to_string())),
            ("assigned_to", Some(p)) => Some(Self::AssignedTo(p.to_string())),
            ("state", Some(p)) => Some(Self::State(p.to_string())),
            ("type", Some(p)) => Some(Self::Kind(p.to_string())),
            ("priority", Some(p)) => p.parse::<Priority>().ok().map(Self::PriorityIs),
            ("tag", Some(p)) => Some(Self::Tag(p.to_string())),
            ("search" | "find", Some(p)) => Some(Self::Search(p.to_string())),
            ("recent", p) => Some(Self::Recent(
                p.and_then(|d| d.parse().ok())
                    .filter(|&d| d > 0)
                    .unwrap_or(DEFAULT_RECENT_DAYS),
            )),
            ("project", _) => Some(Self::Fallback),
            _ => None,
        };

        parsed.unwrap_or_else(|| {
            debug!(keyword, "unrecognized command, using permissive fallback");
            Self::Fallback
        })
    }

    /// The command's own WHERE predicate, without global filters.
    fn predicate(&self) -> String {
        match self {
            Self::CreatedBy(user) => {
                format!("[System.CreatedBy] CONTAINS '{}'", escape(user))
            }
            Self::AssignedTo(user) => {
                format!("[System.AssignedTo] CONTAINS '{}'", escape(user))
            }
            Self::State(state) => format!("[System.State] = '{}'", escape(state)),
            Self::Kind(kind) => format!("[System.WorkItemType] = '{}'", escape(kind)),
            Self::PriorityIs(priority) => {
                format!("[Microsoft.VSTS.Common.Priority] = {priority}")
            }
            Self::Tag(tag) => format!("[System.Tags] CONTAINS '{}'", escape(tag)),
            Self::Search(text) => {
                let escaped = escape(text);
                format!(
                    "([System.Title] CONTAINS '{escaped}' \
                     OR [System.Description] CONTAINS '{escaped}')"
                )
            }
            Self::Recent(days) => format!("[System.ChangedDate] >= @Today - {days}"),
            Self::Fallback => "[System.State] <> 'Closed'".to_string(),
        }
    }
}

/// Build a complete WIQL query for `command`, AND-ing in every active
/// global filter, ordered most-recently-changed first.
#[must_use]
pub fn build_query(command: &Command, filters: &GlobalFilters) -> String {
    let mut conditions = vec![command.predicate()];

    // The fallback already excludes the closed state; repeating the
    // predicate would be harmless but noisy.
    if filters.ignore_closed && *command != Command::Fallback {
        conditions.push("[System.State] <> 'Closed'".to_string());
    }
    for state in &filters.ignore_states {
        let state = state.trim();
        if !state.is_empty() {
            conditions.push(format!("[System.State] <> '{}'", escape(state)));
        }
    }
    if let Some(user) = filters.my_tickets_user() {
        conditions.push(format!("[System.AssignedTo] CONTAINS '{}'", escape(user)));
    }
    if let Some(days) = filters.ignore_older_than_days.filter(|&d| d > 0) {
        conditions.push(format!("[System.ChangedDate] >= @Today - {days}"));
    }
    for user in &filters.ignore_created_by {
        let user = user.trim();
        if !user.is_empty() {
            conditions.push(format!("[System.CreatedBy] NOT CONTAINS '{}'", escape(user)));
        }
    }

    let mut query = format!("SELECT {SELECT_FIELDS} FROM WorkItems");
    let _ = write!(query, " WHERE {}", conditions.join(" AND "));
    query.push_str(" ORDER BY [System.ChangedDate] DESC");
    query
}

/// Recognize a bare numeric token, optionally `#`-prefixed, as a direct id
/// lookup. Resolved upstream of the builder: an id fetch bypasses WIQL.
#[must_use]
pub fn parse_id_token(token: &str) -> Option<u64> {
    let digits = token.trim().strip_prefix('#').unwrap_or_else(|| token.trim());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Escape user text for a single-quoted WIQL string literal.
fn escape(text: &str) -> String {
    text.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::{Command, build_query, parse_id_token};
    use crate::model::{GlobalFilters, Priority};

    fn no_filters() -> GlobalFilters {
        GlobalFilters::default()
    }

    #[test]
    fn parse_recognizes_known_keywords() {
        assert_eq!(
            Command::parse("assigned_to", Some("dana")),
            Command::AssignedTo("dana".to_string())
        );
        assert_eq!(
            Command::parse("STATE", Some("Active")),
            Command::State("Active".to_string())
        );
        assert_eq!(
            Command::parse("priority", Some("1")),
            Command::PriorityIs(Priority::P1)
        );
        assert_eq!(Command::parse("recent", None), Command::Recent(7));
        assert_eq!(Command::parse("recent", Some("30")), Command::Recent(30));
    }

    #[test]
    fn parse_is_total_over_garbage() {
        assert_eq!(Command::parse("explode", Some("now")), Command::Fallback);
        assert_eq!(Command::parse("assigned_to", None), Command::Fallback);
        assert_eq!(Command::parse("assigned_to", Some("   ")), Command::Fallback);
        assert_eq!(Command::parse("priority", Some("99")), Command::Fallback);
        assert_eq!(Command::parse("project", Some("Contoso")), Command::Fallback);
        assert_eq!(Command::parse("recent", Some("-3")), Command::Recent(7));
    }

    #[test]
    fn text_commands_substring_match() {
        let q = build_query(&Command::AssignedTo("dana".to_string()), &no_filters());
        assert!(q.contains("[System.AssignedTo] CONTAINS 'dana'"));

        let q = build_query(&Command::Tag("infra".to_string()), &no_filters());
        assert!(q.contains("[System.Tags] CONTAINS 'infra'"));
    }

    #[test]
    fn categorical_commands_exact_match() {
        let q = build_query(&Command::State("Active".to_string()), &no_filters());
        assert!(q.contains("[System.State] = 'Active'"));

        let q = build_query(&Command::PriorityIs(Priority::P3), &no_filters());
        assert!(q.contains("[Microsoft.VSTS.Common.Priority] = 3"));
    }

    #[test]
    fn search_spans_title_and_description() {
        let q = build_query(&Command::Search("timeout".to_string()), &no_filters());
        assert!(q.contains("[System.Title] CONTAINS 'timeout'"));
        assert!(q.contains("[System.Description] CONTAINS 'timeout'"));
        assert!(q.contains(" OR "));
    }

    #[test]
    fn never_constrains_project_scope_field() {
        let commands = [
            Command::CreatedBy("o'brien".to_string()),
            Command::AssignedTo("dana".to_string()),
            Command::State("Active".to_string()),
            Command::Kind("Bug".to_string()),
            Command::PriorityIs(Priority::P1),
            Command::Tag("infra".to_string()),
            Command::Search("login".to_string()),
            Command::Recent(14),
            Command::Fallback,
        ];
        let filters = GlobalFilters {
            ignore_closed: true,
            ignore_states: vec!["Removed".to_string()],
            only_my_tickets: true,
            current_user: Some("dana".to_string()),
            ignore_older_than_days: Some(90),
            ignore_created_by: vec!["bot@example.com".to_string()],
        };
        for command in &commands {
            let q = build_query(command, &filters);
            assert!(
                !q.contains("[System.TeamProject]"),
                "query constrains project scope: {q}"
            );
        }
    }

    #[test]
    fn filters_append_as_and_predicates() {
        let filters = GlobalFilters {
            ignore_closed: true,
            ignore_states: vec!["Removed".to_string(), "Cut".to_string()],
            only_my_tickets: true,
            current_user: Some("dana@example.com".to_string()),
            ignore_older_than_days: Some(30),
            ignore_created_by: vec!["bot".to_string()],
        };
        let q = build_query(&Command::Kind("Bug".to_string()), &filters);
        assert!(q.contains("[System.WorkItemType] = 'Bug'"));
        assert!(q.contains("AND [System.State] <> 'Closed'"));
        assert!(q.contains("AND [System.State] <> 'Removed'"));
        assert!(q.contains("AND [System.State] <> 'Cut'"));
        assert!(q.contains("AND [System.AssignedTo] CONTAINS 'dana@example.com'"));
        assert!(q.contains("AND [System.ChangedDate] >= @Today - 30"));
        assert!(q.contains("AND [System.CreatedBy] NOT CONTAINS 'bot'"));
    }

    #[test]
    fn fallback_does_not_double_closed_predicate() {
        let filters = GlobalFilters {
            ignore_closed: true,
            ..GlobalFilters::default()
        };
        let q = build_query(&Command::Fallback, &filters);
        assert_eq!(q.matches("[System.State] <> 'Closed'").count(), 1);
    }

    #[test]
    fn my_tickets_without_user_is_skipped() {
        let filters = GlobalFilters {
            only_my_tickets: true,
            ..GlobalFilters::default()
        };
        let q = build_query(&Command::Fallback, &filters);
        assert!(!q.contains("[System.AssignedTo]"));
    }

    #[test]
    fn quotes_are_escaped() {
        let q = build_query(&Command::CreatedBy("o'brien".to_string()), &no_filters());
        assert!(q.contains("CONTAINS 'o''brien'"));
    }

    #[test]
    fn default_order_is_most_recently_changed_first() {
        let q = build_query(&Command::Fallback, &no_filters());
        assert!(q.ends_with("ORDER BY [System.ChangedDate] DESC"));
    }

    #[test]
    fn id_token_recognition() {
        assert_eq!(parse_id_token("1234"), Some(1234));
        assert_eq!(parse_id_token("#1234"), Some(1234));
        assert_eq!(parse_id_token("  #42 "), Some(42));
        assert_eq!(parse_id_token("12a4"), None);
        assert_eq!(parse_id_token("#"), None);
        assert_eq!(parse_id_token(""), None);
        assert_eq!(parse_id_token("bug 12"), None);
    }
}
