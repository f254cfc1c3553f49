// Tests for parent/child tree reconstruction from a flat page.
use tasq::model::Task;
use tasq::model::pipeline::raise_tasks;

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

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

fn total(tasks: &[Task]) -> usize {
    tasks.iter().map(|t| 1 + total(&t.children)).sum()
}

#[test]
fn parent_with_child_and_empty_sibling() {
    let flat = vec![
        task("1", "", "a"),
        task("2", "1", "a"),
        task("3", "", "b"),
    ];
    let (raised, orphans) = raise_tasks(flat);

    assert!(orphans.is_empty());
    assert_eq!(ids(&raised), vec!["1", "3"]);
    assert_eq!(ids(&raised[0].children), vec!["2"]);
    assert!(raised[1].children.is_empty());
}

#[test]
fn no_task_is_lost_or_duplicated() {
    let flat = vec![
        task("r1", "", "b"),
        task("r2", "", "a"),
        task("c1", "r1", "c"),
        task("c2", "r1", "d"),
        task("c3", "r2", "e"),
    ];
    let (raised, orphans) = raise_tasks(flat);

    assert!(orphans.is_empty());
    assert_eq!(total(&raised), 5);
    // top-level ordering follows the positional key
    assert_eq!(ids(&raised), vec!["r2", "r1"]);
}

#[test]
fn children_come_out_in_positional_order() {
    let flat = vec![
        task("p", "", "0"),
        task("c-late", "p", "zz"),
        task("c-mid", "p", "mm"),
        task("c-early", "p", "aa"),
    ];
    let (raised, _) = raise_tasks(flat);
    assert_eq!(ids(&raised[0].children), vec!["c-early", "c-mid", "c-late"]);
}

#[test]
fn input_order_is_irrelevant_thanks_to_positional_presort() {
    let shuffled = vec![
        task("3", "", "b"),
        task("2", "1", "aa"),
        task("1", "", "a"),
    ];
    let (raised, orphans) = raise_tasks(shuffled);
    assert!(orphans.is_empty());
    assert_eq!(ids(&raised), vec!["1", "3"]);
    assert_eq!(ids(&raised[0].children), vec!["2"]);
}

#[test]
fn unresolved_parent_is_promoted_and_reported() {
    let flat = vec![
        task("root", "", "a"),
        task("stray", "gone", "b"),
    ];
    let (raised, orphans) = raise_tasks(flat);

    assert_eq!(orphans, vec!["stray".to_string()]);
    // The stray task is never attached to an unrelated root.
    assert_eq!(ids(&raised), vec!["root", "stray"]);
    assert!(raised[0].children.is_empty());
}

#[test]
fn promoted_orphan_still_collects_its_own_children() {
    // "mid" points at a parent outside the page; "leaf" points at "mid".
    let flat = vec![
        task("mid", "gone", "a"),
        task("leaf", "mid", "b"),
    ];
    let (raised, orphans) = raise_tasks(flat);

    assert_eq!(orphans, vec!["mid".to_string()]);
    assert_eq!(ids(&raised), vec!["mid"]);
    assert_eq!(ids(&raised[0].children), vec!["leaf"]);
}

#[test]
fn empty_input_raises_to_nothing() {
    let (raised, orphans) = raise_tasks(Vec::new());
    assert!(raised.is_empty());
    assert!(orphans.is_empty());
}
