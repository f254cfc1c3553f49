// File: ./src/client/query.rs
//! Logical filters and sorts plus the outbound request parameters they shape.
use crate::model::TaskStatus;
use chrono::{DateTime, SecondsFormat, Utc};

/// Logical status filter for a list query.
///
/// `Completed` and `NeedsAction` widen the server-side visibility flags so
/// the page contains every candidate, then narrow precisely by status on the
/// client. `Overdue` is served entirely server-side through a due-date bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Completed,
    NeedsAction,
    Overdue,
}

impl Filter {
    /// The status the local filter narrows by, if any. `Overdue` needs no
    /// local pass since the due-date bound already did the work.
    pub fn status(self) -> Option<TaskStatus> {
        match self {
            Self::Completed => Some(TaskStatus::Completed),
            Self::NeedsAction => Some(TaskStatus::NeedsAction),
            Self::Overdue => None,
        }
    }
}

/// Requested ordering of the flat page before the tree is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Position,
    LatestFirst,
    OldestFirst,
}

/// Parameters for one task list query. Plain named fields, all optional;
/// whatever is unset is simply not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksQuery {
    pub completed_min: Option<String>,
    pub completed_max: Option<String>,
    pub due_min: Option<String>,
    pub due_max: Option<String>,
    pub updated_min: Option<String>,
    pub show_completed: Option<bool>,
    pub show_deleted: Option<bool>,
    pub show_hidden: Option<bool>,
    pub max_results: Option<i64>,
    pub page_token: Option<String>,
    /// Previously observed entity tag; the service answers 304 when the list
    /// snapshot still matches it.
    pub if_none_match: Option<String>,
}

impl ListTasksQuery {
    /// Folds a logical filter into the outbound parameters, evaluated against
    /// `now` at request time.
    pub fn apply_filter(&mut self, filter: Filter, now: DateTime<Utc>) {
        match filter {
            Filter::Overdue => {
                self.due_max = Some(now.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
            Filter::Completed => {
                self.show_hidden = Some(true);
                self.show_completed = Some(true);
            }
            Filter::NeedsAction => {
                self.show_hidden = Some(false);
                self.show_completed = Some(false);
            }
        }
    }

    /// The wire form of the set parameters, in the service's camelCase
    /// spelling. The entity-tag precondition travels as a header, not here.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push_str = |key, value: &Option<String>| {
            if let Some(v) = value {
                pairs.push((key, v.clone()));
            }
        };
        push_str("completedMin", &self.completed_min);
        push_str("completedMax", &self.completed_max);
        push_str("dueMin", &self.due_min);
        push_str("dueMax", &self.due_max);
        push_str("updatedMin", &self.updated_min);

        let mut push_bool = |key, value: Option<bool>| {
            if let Some(v) = value {
                pairs.push((key, v.to_string()));
            }
        };
        push_bool("showCompleted", self.show_completed);
        push_bool("showDeleted", self.show_deleted);
        push_bool("showHidden", self.show_hidden);

        if let Some(n) = self.max_results {
            pairs.push(("maxResults", n.to_string()));
        }
        if let Some(token) = &self.page_token {
            pairs.push(("pageToken", token.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn overdue_bounds_due_date_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut query = ListTasksQuery::default();
        query.apply_filter(Filter::Overdue, now);
        assert_eq!(query.due_max.as_deref(), Some("2024-06-01T12:00:00Z"));
        assert_eq!(query.show_completed, None);
    }

    #[test]
    fn status_filters_set_visibility_flags() {
        let now = Utc::now();

        let mut completed = ListTasksQuery::default();
        completed.apply_filter(Filter::Completed, now);
        assert_eq!(completed.show_completed, Some(true));
        assert_eq!(completed.show_hidden, Some(true));

        let mut pending = ListTasksQuery::default();
        pending.apply_filter(Filter::NeedsAction, now);
        assert_eq!(pending.show_completed, Some(false));
        assert_eq!(pending.show_hidden, Some(false));
    }

    #[test]
    fn unset_parameters_are_not_sent() {
        let query = ListTasksQuery {
            max_results: Some(20),
            ..ListTasksQuery::default()
        };
        assert_eq!(query.query_pairs(), vec![("maxResults", "20".to_string())]);
    }
}
