// Tests for the flat-page sort strategies.
use tasq::Error;
use tasq::model::Task;
use tasq::model::pipeline::{chronological_sort, positional_sort, reverse_chronological_sort};

fn task(id: &str, position: &str, updated: &str) -> Task {
    Task {
        id: id.to_string(),
        position: position.to_string(),
        updated: updated.to_string(),
        ..Task::default()
    }
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn positional_sort_is_nondecreasing_and_idempotent() {
    let mut tasks = vec![
        task("c", "00003", "2024-01-01T00:00:00Z"),
        task("a", "00001", "2024-01-01T00:00:00Z"),
        task("b", "00002", "2024-01-01T00:00:00Z"),
    ];
    positional_sort(&mut tasks);
    assert!(tasks.windows(2).all(|w| w[0].position <= w[1].position));
    assert_eq!(ids(&tasks), vec!["a", "b", "c"]);

    let once = tasks.clone();
    positional_sort(&mut tasks);
    assert_eq!(tasks, once);
}

#[test]
fn latest_first_puts_june_before_january() {
    let mut tasks = vec![
        task("jan", "a", "2024-01-01T00:00:00Z"),
        task("jun", "b", "2024-06-01T00:00:00Z"),
    ];
    chronological_sort(&mut tasks).unwrap();
    assert_eq!(ids(&tasks), vec!["jun", "jan"]);

    let mut tasks = vec![
        task("jan", "a", "2024-01-01T00:00:00Z"),
        task("jun", "b", "2024-06-01T00:00:00Z"),
    ];
    reverse_chronological_sort(&mut tasks).unwrap();
    assert_eq!(ids(&tasks), vec!["jan", "jun"]);
}

#[test]
fn oldest_first_is_the_exact_reversal_of_latest_first() {
    // x and y share a timestamp; latest-first keeps their input order, so the
    // reversal must flip it. A direct ascending sort would not.
    let make = || {
        vec![
            task("x", "1", "2024-03-01T00:00:00Z"),
            task("y", "2", "2024-03-01T00:00:00Z"),
            task("late", "3", "2024-05-01T00:00:00Z"),
        ]
    };

    let mut latest = make();
    chronological_sort(&mut latest).unwrap();
    assert_eq!(ids(&latest), vec!["late", "x", "y"]);

    let mut oldest = make();
    reverse_chronological_sort(&mut oldest).unwrap();
    latest.reverse();
    assert_eq!(oldest, latest);
    assert_eq!(ids(&oldest), vec!["y", "x", "late"]);
}

#[test]
fn repeated_chronological_sort_is_stable() {
    let mut tasks = vec![
        task("a", "1", "2024-03-01T00:00:00Z"),
        task("b", "2", "2024-03-01T00:00:00Z"),
        task("c", "3", "2024-03-01T00:00:00Z"),
    ];
    chronological_sort(&mut tasks).unwrap();
    assert_eq!(ids(&tasks), vec!["a", "b", "c"]);
    chronological_sort(&mut tasks).unwrap();
    assert_eq!(ids(&tasks), vec!["a", "b", "c"]);
}

#[test]
fn malformed_timestamp_aborts_without_partial_reorder() {
    let mut tasks = vec![
        task("a", "1", "2024-01-01T00:00:00Z"),
        task("b", "2", "2024-06-01T00:00:00Z"),
        task("c", "3", "yesterday-ish"),
    ];
    let before = tasks.clone();

    match chronological_sort(&mut tasks) {
        Err(Error::Timestamp { value, .. }) => assert_eq!(value, "yesterday-ish"),
        other => panic!("expected Timestamp error, got {other:?}"),
    }
    assert_eq!(tasks, before, "input order must be fully intact");

    assert!(reverse_chronological_sort(&mut tasks).is_err());
    assert_eq!(tasks, before);
}
