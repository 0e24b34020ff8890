mod common;

use common::{ids, pairs_to_records};
use flatree::model::{AnomalyKind, AnomalyReport, FailFast, LogAndContinue, Tree, TreeError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

// ============= Default policy =============

#[test]
fn test_missing_parent_fails_by_default() {
    let err = Tree::from_value(json!([{"id": 123, "parent": 456}])).unwrap_err();

    assert_eq!(
        err,
        TreeError::MissingParent {
            id: "123".to_string(),
            parent_id: "456".to_string()
        }
    );
    assert_eq!(err.to_string(), "Node with ID 123 points to non-existent parent with ID 456");
    assert!(err.is_anomaly());
}

#[test]
fn test_missing_empty_parent_message() {
    let err = Tree::from_value(json!([{"id": 1, "parent": 0}, {"id": 2, "parent": ""}])).unwrap_err();
    assert_eq!(err.to_string(), "Node with ID 2 points to non-existent parent with empty parent ID");
}

#[test]
fn test_self_reference_fails_by_default() {
    let err = Tree::from_value(json!([
        {"id": 123, "parent": 0},
        {"id": 678, "parent": 678},
    ]))
    .unwrap_err();

    assert_eq!(err, TreeError::SelfReference { id: "678".to_string() });
    assert_eq!(err.to_string(), "Node with ID 678 references its own ID as parent ID");
}

#[test]
fn test_self_reference_with_different_id_types() {
    let err = Tree::from_value(json!([{"id": "5", "parent": 5}])).unwrap_err();
    assert!(err.to_string().contains("references its own ID as parent"));
}

#[test]
fn test_top_level_self_reference_fails() {
    let err = Tree::builder()
        .with_root_id("5")
        .build_from_value(json!([{"id": 5, "parent": "5"}]))
        .unwrap_err();

    assert_eq!(err, TreeError::SelfReference { id: "5".to_string() });
}

#[test]
fn test_parent_cycle_fails_by_default() {
    let err = Tree::new(pairs_to_records(&[
        (json!(1), json!(0)),
        (json!(2), json!(3)),
        (json!(3), json!(2)),
    ]))
    .unwrap_err();

    assert!(matches!(err, TreeError::ParentCycle { .. }));
    assert!(err.is_anomaly());
}

#[test]
fn test_explicit_fail_fast() {
    let result = Tree::builder()
        .with_anomaly_handler(FailFast)
        .build_from_value(json!([{"id": 1, "parent": 2}]));
    assert!(matches!(result, Err(TreeError::MissingParent { .. })));
}

#[test]
fn test_non_anomaly_errors() {
    assert!(!TreeError::UnknownId("1".to_string()).is_anomaly());
    assert!(!TreeError::DuplicateId { id: "1".to_string() }.is_anomaly());
}

// ============= Custom policies =============

#[test]
fn test_callback_receives_node_and_parent_id() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);

    let tree = Tree::builder()
        .with_anomaly_callback(move |anomaly| {
            seen.borrow_mut().push((
                anomaly.kind(),
                anomaly.node().id().clone(),
                anomaly.parent_id().clone(),
            ));
            Ok(())
        })
        .build_from_value(json!([{"id": 1, "parent": 0}, {"id": 2, "parent": ""}]))
        .unwrap();

    assert_eq!(
        *calls.borrow(),
        vec![(AnomalyKind::MissingParent, json!(2), json!(""))]
    );
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_callback_can_abort_with_own_error() {
    let err = Tree::builder()
        .with_anomaly_callback(|anomaly| {
            Err(TreeError::invalid_datatype(format!("rejected {}", anomaly.node())))
        })
        .build_from_value(json!([{"id": 7, "parent": 8}]))
        .unwrap_err();

    assert_eq!(err, TreeError::InvalidDatatype("rejected 7".to_string()));
}

#[test]
fn test_absorbed_orphan_stays_reachable_by_id() {
    let tree = Tree::builder()
        .with_anomaly_handler(LogAndContinue)
        .build(pairs_to_records(&[
            (json!(1), json!(0)),
            (json!(2), json!(99)),
            (json!(3), json!(2)),
        ]))
        .unwrap();

    // The orphan and its subtree are excluded from traversal
    assert_eq!(ids(tree.nodes()), ["1"]);
    assert_eq!(tree.len(), 3);

    let orphan = tree.node_by_id(2).unwrap();
    assert_eq!(orphan.parent(), None);
    assert_eq!(orphan.level(), 0);
    assert!(orphan.siblings().is_empty());
    assert_eq!(orphan.siblings_and_self(), vec![orphan]);
    assert_eq!(orphan.preceding_sibling(), None);
    assert_eq!(orphan.following_sibling(), None);
    assert_eq!(ids(orphan.children()), ["3"]);
    assert_eq!(tree.node_by_id(3).unwrap().level(), 1);
    assert!(tree.is_valid());

    assert_eq!(
        tree.anomalies(),
        [AnomalyReport {
            kind: AnomalyKind::MissingParent,
            node_id: json!(2),
            parent_id: json!(99),
            message: "Node with ID 2 points to non-existent parent with ID 99".to_string(),
        }]
    );
}

#[test]
fn test_absorbed_self_reference() {
    let tree = Tree::builder()
        .with_anomaly_handler(LogAndContinue)
        .build(pairs_to_records(&[(json!(1), json!(0)), (json!(2), json!(2))]))
        .unwrap();

    assert_eq!(ids(tree.nodes()), ["1"]);
    assert_eq!(tree.anomalies().len(), 1);
    assert_eq!(tree.anomalies()[0].kind, AnomalyKind::SelfReference);
    assert!(tree.node_by_id(2).unwrap().children().is_empty());
}

#[test]
fn test_absorbed_top_level_self_reference_is_not_attached() {
    let tree = Tree::builder()
        .with_anomaly_handler(LogAndContinue)
        .build(pairs_to_records(&[(json!(0), json!(0)), (json!(1), json!(0))]))
        .unwrap();

    assert_eq!(ids(tree.root_nodes()), ["1"]);
    assert_eq!(tree.len(), 2);

    let node = tree.node_by_id(0).unwrap();
    assert_eq!(node.level(), 0);
    assert_eq!(node.parent(), None);
    assert_eq!(
        tree.anomalies(),
        [AnomalyReport {
            kind: AnomalyKind::SelfReference,
            node_id: json!(0),
            parent_id: json!(0),
            message: "Node with ID 0 references its own ID as parent ID".to_string(),
        }]
    );
}

#[test]
fn test_absorbed_parent_cycle_is_broken() {
    let tree = Tree::builder()
        .with_anomaly_handler(LogAndContinue)
        .build(pairs_to_records(&[
            (json!(1), json!(0)),
            (json!(2), json!(4)),
            (json!(3), json!(2)),
            (json!(4), json!(3)),
            (json!(5), json!(4)),
        ]))
        .unwrap();

    assert_eq!(ids(tree.nodes()), ["1"]);
    assert_eq!(tree.anomalies().len(), 1);
    assert_eq!(tree.anomalies()[0].kind, AnomalyKind::ParentCycle);
    assert!(tree.is_valid());

    // Every traversal terminates once the loop is cut
    for id in 2..=5 {
        let node = tree.node_by_id(id).unwrap();
        assert!(node.ancestors().len() < 4);
        assert!(node.descendants().len() < 4);
        assert!(node.level() < 4);
    }

    let detached = tree.node_by_id(tree.anomalies()[0].node_id.clone()).unwrap();
    assert_eq!(detached.level(), 0);
    assert_eq!(detached.descendants().len(), 3);
}

#[test]
fn test_anomalies_reset_on_rebuild() {
    let mut tree = Tree::builder()
        .with_anomaly_handler(LogAndContinue)
        .build(pairs_to_records(&[(json!(1), json!(5))]))
        .unwrap();
    assert_eq!(tree.anomalies().len(), 1);

    tree.rebuild_with_data(pairs_to_records(&[(json!(1), json!(0))]))
        .unwrap();
    assert!(tree.anomalies().is_empty());
    assert_eq!(ids(tree.nodes()), ["1"]);
}

#[test]
fn test_handler_state_persists_across_rebuilds() {
    let count = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&count);

    let records = || pairs_to_records(&[(json!(1), json!(0)), (json!(2), json!(3))]);
    let mut tree = Tree::builder()
        .with_anomaly_callback(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        })
        .build(records())
        .unwrap();
    tree.rebuild_with_data(records()).unwrap();

    assert_eq!(*count.borrow(), 2);
}
