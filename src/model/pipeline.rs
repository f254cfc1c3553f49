// File: ./src/model/pipeline.rs
//! Post-processing over one fetched page of tasks: status filtering, the
//! three sort strategies, and parent/child tree reconstruction.
//!
//! Every function here is a pure transformation over an owned, in-memory
//! collection; nothing touches the network. The sorts are stable
//! adjacent-swap insertion sorts because pages arrive mostly ordered and
//! stability has to survive repeated passes over the same data.
use super::item::{Task, TaskStatus};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Keeps the tasks whose status equals `status`, preserving relative order.
pub fn status_filter(tasks: Vec<Task>, status: TaskStatus) -> Vec<Task> {
    tasks.into_iter().filter(|t| t.status == status).collect()
}

/// Sorts ascending by the opaque `position` key. Comparison is ordinal
/// (lexicographic over the raw string), never numeric.
pub fn positional_sort(tasks: &mut [Task]) {
    for i in 1..tasks.len() {
        let mut j = i;
        while j > 0 && tasks[j].position < tasks[j - 1].position {
            tasks.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Sorts most-recently-updated first.
///
/// Every `updated` field is parsed before the first swap, so a malformed
/// timestamp aborts the sort with the input order fully intact.
pub fn chronological_sort(tasks: &mut [Task]) -> Result<()> {
    let mut keys: Vec<DateTime<Utc>> = Vec::with_capacity(tasks.len());
    for task in tasks.iter() {
        keys.push(task.updated_time()?);
    }

    for i in 1..tasks.len() {
        let mut j = i;
        while j > 0 && keys[j] > keys[j - 1] {
            tasks.swap(j, j - 1);
            keys.swap(j, j - 1);
            j -= 1;
        }
    }
    Ok(())
}

/// Sorts oldest-first by running [`chronological_sort`] and reversing the
/// result in place.
///
/// This is a derivation, not an independent ascending sort: tasks with equal
/// timestamps come out in the opposite of their latest-first relative order,
/// and callers observe that.
pub fn reverse_chronological_sort(tasks: &mut [Task]) -> Result<()> {
    chronological_sort(tasks)?;
    tasks.reverse();
    Ok(())
}

/// Rebuilds the parent/child tree from a flat collection.
///
/// The input is positionally re-sorted first, unconditionally, so sibling
/// order in the output always follows `position`. A single pass then appends
/// top-level tasks to the output and attaches every other task to its
/// parent's `children`.
///
/// The service does not guarantee parent-before-child order within a page, so
/// a `parent` id may be unresolved at the moment a task is scanned. Such a
/// task is promoted to top level and its id reported in the second return
/// value; it is never silently attached to an unrelated task and it is never
/// dropped.
pub fn raise_tasks(mut tasks: Vec<Task>) -> (Vec<Task>, Vec<String>) {
    positional_sort(&mut tasks);

    let mut raised: Vec<Task> = Vec::new();
    let mut orphans: Vec<String> = Vec::new();
    // task id -> index of that task within the raised top-level sequence
    let mut top_level: HashMap<String, usize> = HashMap::new();

    for task in tasks {
        let parent_id = match task.parent.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => {
                top_level.insert(task.id.clone(), raised.len());
                raised.push(task);
                continue;
            }
        };

        match top_level.get(&parent_id) {
            Some(&idx) => raised[idx].children.push(task),
            None => {
                orphans.push(task.id.clone());
                top_level.insert(task.id.clone(), raised.len());
                raised.push(task);
            }
        }
    }

    (raised, orphans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, parent: &str, position: &str) -> Task {
        Task {
            id: id.to_string(),
            parent: if parent.is_empty() {
                None
            } else {
                Some(parent.to_string())
            },
            position: position.to_string(),
            updated: "2024-01-01T00:00:00Z".to_string(),
            ..Task::default()
        }
    }

    #[test]
    fn positional_sort_is_ordinal_not_numeric() {
        // "10" < "9" under ordinal comparison
        let mut tasks = vec![task("a", "", "9"), task("b", "", "10")];
        positional_sort(&mut tasks);
        assert_eq!(tasks[0].id, "b");
        assert_eq!(tasks[1].id, "a");
    }

    #[test]
    fn raise_handles_child_before_parent() {
        // Positions put the child ahead of its parent in the flat scan.
        let tasks = vec![task("child", "parent", "a"), task("parent", "", "b")];
        let (raised, orphans) = raise_tasks(tasks);
        assert_eq!(orphans, vec!["child".to_string()]);
        assert_eq!(raised.len(), 2);
        assert_eq!(raised[0].id, "child");
    }

    #[test]
    fn empty_and_single_inputs_are_noops() {
        let mut empty: Vec<Task> = vec![];
        positional_sort(&mut empty);
        assert!(chronological_sort(&mut empty).is_ok());

        let mut one = vec![task("a", "", "x")];
        assert!(reverse_chronological_sort(&mut one).is_ok());
        assert_eq!(one[0].id, "a");
    }
}
