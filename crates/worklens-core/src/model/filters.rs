use serde::{Deserialize, Serialize};

/// Cross-cutting result filters a user configures once per session.
///
/// Immutable per request: the query builder reads it, nothing mutates it.
/// All fields default to "filter nothing".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalFilters {
    /// Exclude items in the closed state.
    pub ignore_closed: bool,
    /// Exclude items in any of these states (exact match).
    pub ignore_states: Vec<String>,
    /// Restrict results to items assigned to `current_user`.
    pub only_my_tickets: bool,
    /// Required when `only_my_tickets` is set; ignored otherwise.
    pub current_user: Option<String>,
    /// Exclude items not changed within the last N days; must be positive.
    pub ignore_older_than_days: Option<u32>,
    /// Exclude items created by any of these users.
    pub ignore_created_by: Vec<String>,
}

impl GlobalFilters {
    /// Returns `true` when no filter is active (every query passes through
    /// unchanged).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.ignore_closed
            && self.ignore_states.is_empty()
            && !self.only_my_tickets
            && self.ignore_older_than_days.is_none()
            && self.ignore_created_by.is_empty()
    }

    /// The user to scope "my tickets" to, when that filter is both enabled
    /// and usable. A missing or blank `current_user` disables the filter
    /// rather than producing a predicate that matches nothing.
    #[must_use]
    pub fn my_tickets_user(&self) -> Option<&str> {
        if !self.only_my_tickets {
            return None;
        }
        self.current_user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::GlobalFilters;

    #[test]
    fn default_filters_nothing() {
        let filters = GlobalFilters::default();
        assert!(filters.is_empty());
        assert!(filters.my_tickets_user().is_none());
    }

    #[test]
    fn my_tickets_requires_user() {
        let filters = GlobalFilters {
            only_my_tickets: true,
            ..GlobalFilters::default()
        };
        assert!(filters.my_tickets_user().is_none());

        let filters = GlobalFilters {
            only_my_tickets: true,
            current_user: Some("  ".to_string()),
            ..GlobalFilters::default()
        };
        assert!(filters.my_tickets_user().is_none());

        let filters = GlobalFilters {
            only_my_tickets: true,
            current_user: Some("dana@example.com".to_string()),
            ..GlobalFilters::default()
        };
        assert_eq!(filters.my_tickets_user(), Some("dana@example.com"));
    }

    #[test]
    fn user_without_flag_is_inactive() {
        let filters = GlobalFilters {
            current_user: Some("dana@example.com".to_string()),
            ..GlobalFilters::default()
        };
        assert!(filters.my_tickets_user().is_none());
        assert!(filters.is_empty());
    }

    #[test]
    fn non_empty_when_any_filter_set() {
        let filters = GlobalFilters {
            ignore_states: vec!["Removed".to_string()],
            ..GlobalFilters::default()
        };
        assert!(!filters.is_empty());
    }
}
