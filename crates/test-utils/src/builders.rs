#![allow(dead_code)]

use std::collections::BTreeMap;

use qdag::job::Job;
use qdag::workflow::{JobId, Workflow};

/// Build a workflow from `(name, after)` pairs with trivial commands, wiring
/// the `after` edges. Jobs must be listed after their dependencies.
pub fn workflow_from_edges(jobs: &[(&str, &[&str])]) -> (Workflow, BTreeMap<String, JobId>) {
    let mut workflow = Workflow::new();
    let mut ids: BTreeMap<String, JobId> = BTreeMap::new();

    for (name, after) in jobs {
        let id = workflow.add_job(Job::new(format!("echo {name}"), "").with_name(*name));
        for dep in after.iter() {
            let dep_id = ids[*dep];
            workflow
                .add_dependency(id, dep_id)
                .expect("builder edges must be acyclic");
        }
        ids.insert(name.to_string(), id);
    }

    (workflow, ids)
}
