use qdag::job::Job;
use qdag::workflow::{MemoryStore, SubmitOptions, Workflow};
use qdag_test_utils::{init_tracing, FakeScheduler};

/// A and B have no dependencies, C waits for both, D waits for C.
/// Predecessors must reach the scheduler before dependents, and each
/// dependent's resource spec must carry the ids of its predecessors.
#[test]
fn chain_is_submitted_predecessors_first() {
    init_tracing();

    let mut workflow = Workflow::new();
    let a = workflow.add_job(Job::new("echo a", "-l nodes=1:c2").with_name("A"));
    let b = workflow.add_job(Job::new("echo b", "-l nodes=1:c2").with_name("B"));
    let c = workflow.add_job(Job::new("echo c", "-l nodes=1:c2").with_name("C"));
    let d = workflow.add_job(Job::new("echo d", "").with_name("D"));
    workflow.add_dependency(c, a).unwrap();
    workflow.add_dependency(c, b).unwrap();
    workflow.add_dependency(d, c).unwrap();

    let mut scheduler = FakeScheduler::new();
    let mut store = MemoryStore::new();
    let report = workflow.submit(&mut scheduler, &mut store, &SubmitOptions::default());

    assert!(report.is_success());
    assert_eq!(report.submitted.len(), 4);

    let names = scheduler.submitted_names();
    let pos = |n: &str| names.iter().position(|x| x == n).unwrap();
    assert!(pos("A") < pos("C"));
    assert!(pos("B") < pos("C"));
    assert!(pos("C") < pos("D"));

    // C waits on both A's and B's ids; D waits on C's.
    let c_req = scheduler.request_for("C").unwrap();
    assert_eq!(
        c_req.resource_spec,
        "-l nodes=1:c2 -W depend=afterany:fake-1:fake-2"
    );
    let d_req = scheduler.request_for("D").unwrap();
    assert_eq!(d_req.resource_spec, "-W depend=afterany:fake-3");

    // Root jobs carry no directive.
    let a_req = scheduler.request_for("A").unwrap();
    assert_eq!(a_req.resource_spec, "-l nodes=1:c2");
}

/// The inter-submission delay only spaces out top-level jobs; it does not
/// change what gets submitted.
#[test]
fn delay_between_top_level_submissions_is_harmless() {
    init_tracing();

    let mut workflow = Workflow::new();
    let a = workflow.add_job(Job::new("echo a", "").with_name("A"));
    let b = workflow.add_job(Job::new("echo b", "").with_name("B"));
    workflow.add_dependency(b, a).unwrap();

    let mut scheduler = FakeScheduler::new();
    let mut store = MemoryStore::new();
    let options = SubmitOptions {
        delay: Some(std::time::Duration::from_millis(1)),
    };
    let report = workflow.submit(&mut scheduler, &mut store, &options);

    assert!(report.is_success());
    assert_eq!(scheduler.submitted_names(), vec!["A", "B"]);
}

/// Registration order does not matter: dependents registered before their
/// predecessors are still submitted after them.
#[test]
fn registration_order_is_irrelevant() {
    init_tracing();

    let mut workflow = Workflow::new();
    let d = workflow.add_job(Job::new("echo d", "").with_name("D"));
    let c = workflow.add_job(Job::new("echo c", "").with_name("C"));
    let a = workflow.add_job(Job::new("echo a", "").with_name("A"));
    workflow.add_dependency(c, a).unwrap();
    workflow.add_dependency(d, c).unwrap();

    let mut scheduler = FakeScheduler::new();
    let mut store = MemoryStore::new();
    let report = workflow.submit(&mut scheduler, &mut store, &SubmitOptions::default());

    assert!(report.is_success());
    assert_eq!(scheduler.submitted_names(), vec!["A", "C", "D"]);
}
