//! Integration tests for readiness joins and run-to-completion ordering.

use std::sync::Arc;
use std::time::Duration;

use horizon_select_core::{
    Document, DocumentTreeDebug, Event, EventType, JoinBarrier, ObserverOptions, TreeFormatOptions,
    UpgradePolicy,
};
use parking_lot::Mutex;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn joined(first_is_panel: bool) -> Vec<&'static str> {
    let doc = Document::new();
    doc.set_upgrade_policy(UpgradePolicy::Manual);
    let panel = doc.create_custom_element("x-panel");
    let list = doc.create_custom_element("x-list");
    doc.append_child(panel, list).unwrap();
    doc.append_child(doc.body(), panel).unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let join = JoinBarrier::new(2, move || sink.lock().push("joined"));
    for (id, name) in [(panel, "panel"), (list, "list")] {
        let join = join.clone();
        let sink = log.clone();
        doc.await_ready(id, move || {
            sink.lock().push(name);
            join.arrive();
        })
        .unwrap();
    }

    let (first, second) = if first_is_panel { (panel, list) } else { (list, panel) };
    doc.mark_ready(first).unwrap();
    assert!(!join.is_complete());
    doc.mark_ready(second).unwrap();
    assert!(join.is_complete());

    let log = log.lock().clone();
    log
}

#[test]
fn test_join_completes_in_either_order() {
    setup();
    assert_eq!(joined(true), vec!["panel", "list", "joined"]);
    assert_eq!(joined(false), vec!["list", "panel", "joined"]);
}

#[test]
fn test_work_triggered_by_a_task_runs_after_it() {
    setup();
    let doc = Document::new();
    let button = doc.create_element("button");
    doc.append_child(doc.body(), button).unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let observed = log.clone();
    doc.observe(button, ObserverOptions::new().attributes(), move |records| {
        observed.lock().push(format!("mutations:{}", records.len()));
    })
    .unwrap();

    let sink = log.clone();
    let inner_doc = doc.clone();
    let _click = doc.listen(button, EventType::Click, move |_| {
        sink.lock().push("click:start".to_owned());
        inner_doc.set_attribute(button, "data-pressed", "").unwrap();
        inner_doc.dispatch_event(button, Event::change());
        let later = sink.clone();
        inner_doc.set_timeout(Duration::from_millis(5), move || {
            later.lock().push("timer".to_owned());
        });
        sink.lock().push("click:end".to_owned());
    });
    let sink = log.clone();
    let _change = doc.listen(button, EventType::Change, move |_| {
        sink.lock().push("change".to_owned());
    });

    doc.click(button);
    doc.advance_time(Duration::from_millis(5));

    assert_eq!(
        *log.lock(),
        vec!["click:start", "click:end", "mutations:1", "change", "timer"]
    );
}

#[test]
fn test_tree_dump_shows_custom_elements() {
    setup();
    let doc = Document::new();
    let panel = doc.create_custom_element("x-panel");
    doc.set_attribute(panel, "data-open", "").unwrap();
    doc.append_child(doc.body(), panel).unwrap();

    let dump = DocumentTreeDebug::with_options(TreeFormatOptions::minimal())
        .format_subtree(&doc, doc.body());
    assert!(dump.contains("body"));
    assert!(dump.contains("x-panel"));
}
