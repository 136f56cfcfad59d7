use std::collections::BTreeSet;

use qdag::workflow::{MemoryStore, SubmitOptions};
use qdag_test_utils::{init_tracing, workflow_from_edges, FakeScheduler};

/// Diamond: A -> {B, C} -> D. The shared predecessor A is visited once per
/// dependent but must reach the scheduler exactly once.
#[test]
fn shared_predecessor_is_submitted_once() {
    init_tracing();

    let (mut workflow, ids) = workflow_from_edges(&[
        ("A", &[]),
        ("B", &["A"]),
        ("C", &["A"]),
        ("D", &["B", "C"]),
    ]);

    let closure = workflow.all_dependencies(ids["D"]).unwrap();
    assert_eq!(closure, BTreeSet::from([ids["A"], ids["B"], ids["C"]]));

    let mut scheduler = FakeScheduler::new();
    let mut store = MemoryStore::new();
    let report = workflow.submit(&mut scheduler, &mut store, &SubmitOptions::default());

    assert!(report.is_success());
    assert_eq!(scheduler.submission_count(), 4);
    assert_eq!(
        scheduler
            .submitted_names()
            .iter()
            .filter(|n| n.as_str() == "A")
            .count(),
        1
    );

    // D waits on both arms of the diamond, not on A directly.
    let d_req = scheduler.request_for("D").unwrap();
    assert_eq!(d_req.resource_spec, "-W depend=afterany:fake-2:fake-3");
}

/// Re-invoking submit on the same workflow instance does nothing new: the
/// in-memory log already has every job.
#[test]
fn resubmitting_same_workflow_is_a_noop() {
    init_tracing();

    let (mut workflow, _ids) =
        workflow_from_edges(&[("A", &[]), ("B", &["A"])]);

    let mut scheduler = FakeScheduler::new();
    let mut store = MemoryStore::new();
    let first = workflow.submit(&mut scheduler, &mut store, &SubmitOptions::default());
    assert_eq!(first.submitted.len(), 2);

    let second = workflow.submit(&mut scheduler, &mut store, &SubmitOptions::default());
    assert!(second.is_success());
    assert!(second.submitted.is_empty());
    assert_eq!(scheduler.submission_count(), 2);
}
