// File: ./src/model/item.rs
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "needsAction")]
    NeedsAction,
    #[serde(rename = "completed")]
    Completed,
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The wire spelling of the status, as the service sends it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsAction => "needsAction",
            Self::Completed => "completed",
        }
    }
}

/// One to-do item as returned by the remote service.
///
/// Timestamps (`updated`, `due`, `completed`) are kept in their RFC 3339 wire
/// form and parsed on demand; `position` is an opaque key whose ordinal string
/// comparison determines sibling order. `children` exists only on the client:
/// it is populated by [`pipeline::raise_tasks`](super::pipeline::raise_tasks)
/// and never serialized back to the service.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etag: String,
    pub title: String,
    pub updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub position: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    pub deleted: bool,
    pub hidden: bool,
    #[serde(skip)]
    pub children: Vec<Task>,
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| Error::Timestamp {
            value: value.to_string(),
            source,
        })
}

impl Task {
    /// The service omits `parent` for top-level tasks; some callers hand the
    /// empty string back instead, which means the same thing.
    pub fn is_top_level(&self) -> bool {
        self.parent.as_deref().is_none_or(str::is_empty)
    }

    pub fn updated_time(&self) -> Result<DateTime<Utc>> {
        parse_rfc3339(&self.updated)
    }

    pub fn due_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.due.as_deref().map(parse_rfc3339).transpose()
    }

    pub fn completed_time(&self) -> Result<Option<DateTime<Utc>>> {
        self.completed.as_deref().map(parse_rfc3339).transpose()
    }
}

/// Container entity owning zero or more tasks. Membership is extrinsic: the
/// service never nests tasks inside the list representation.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskList {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etag: String,
    pub title: String,
    pub updated: String,
}

impl TaskList {
    pub fn updated_time(&self) -> Result<DateTime<Utc>> {
        parse_rfc3339(&self.updated)
    }
}

/// One raw page of tasks exactly as the service returns it: an entity tag for
/// the snapshot plus a flat, unordered item list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPage {
    pub etag: String,
    pub items: Vec<Task>,
    pub next_page_token: Option<String>,
}

/// One raw page of task lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskListPage {
    pub etag: String,
    pub items: Vec<TaskList>,
    pub next_page_token: Option<String>,
}

/// The processed result of one list query: filtered, sorted, and raised into
/// a parent/child tree. Created fresh per query response and handed to the
/// caller; nothing is retained beyond the entity tag comparison.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TaskCollection {
    /// Entity tag of the list snapshot this collection was built from.
    pub etag: String,
    /// Top-level tasks, each with `children` populated.
    pub items: Vec<Task>,
    /// Ids of tasks whose `parent` did not resolve and that were promoted to
    /// top level. Empty for a well-formed snapshot.
    pub orphans: Vec<String>,
    /// Set when the service truncated the page. Following it is the caller's
    /// business; this layer processes a single page at a time.
    pub next_page_token: Option<String>,
}

impl TaskCollection {
    /// Most recent `updated` across every task in the collection, children
    /// included. `None` for an empty collection.
    pub fn latest_update(&self) -> Result<Option<DateTime<Utc>>> {
        fn visit(tasks: &[Task], latest: &mut Option<DateTime<Utc>>) -> Result<()> {
            for task in tasks {
                let t = task.updated_time()?;
                if latest.is_none_or(|l| t > l) {
                    *latest = Some(t);
                }
                visit(&task.children, latest)?;
            }
            Ok(())
        }

        let mut latest = None;
        visit(&self.items, &mut latest)?;
        Ok(latest)
    }

    /// Total number of tasks, children included.
    pub fn len(&self) -> usize {
        fn count(tasks: &[Task]) -> usize {
            tasks.iter().map(|t| 1 + count(&t.children)).sum()
        }
        count(&self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_absent_and_empty_both_mean_top_level() {
        let mut task = Task::default();
        assert!(task.is_top_level());
        task.parent = Some(String::new());
        assert!(task.is_top_level());
        task.parent = Some("abc".to_string());
        assert!(!task.is_top_level());
    }

    #[test]
    fn updated_time_surfaces_malformed_values() {
        let task = Task {
            updated: "not-a-date".to_string(),
            ..Task::default()
        };
        match task.updated_time() {
            Err(Error::Timestamp { value, .. }) => assert_eq!(value, "not-a-date"),
            other => panic!("expected Timestamp error, got {other:?}"),
        }
    }

    #[test]
    fn task_deserializes_from_wire_json() {
        let json = r#"{
            "kind": "tasks#task",
            "id": "t1",
            "etag": "\"v1\"",
            "title": "Buy milk",
            "updated": "2024-06-01T00:00:00.000Z",
            "position": "00000000000000000001",
            "status": "needsAction"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.status, TaskStatus::NeedsAction);
        assert!(task.is_top_level());
        assert!(task.updated_time().is_ok());
    }
}
