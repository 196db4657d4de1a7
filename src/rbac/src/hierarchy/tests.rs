//! Hierarchy tests: cycle rejection, ancestor resolution, freeze semantics

use super::RoleHierarchy;
use crate::catalog::RoleCatalog;
use crate::error::RbacError;
use crate::types::Namespace;
use std::sync::Arc;

fn catalog(ids: &[&str]) -> Arc<RoleCatalog> {
    let mut roles = RoleCatalog::new();
    for id in ids {
        roles.register(*id, Namespace::Core).unwrap();
    }
    roles.freeze();
    Arc::new(roles)
}

fn names(set: &std::collections::BTreeSet<String>) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}

// ============================================================================
// Edge Insertion Tests
// ============================================================================

#[test]
fn test_unknown_role_rejected() {
    let mut hierarchy = RoleHierarchy::new(catalog(&["senior_labeler"]));

    let result = hierarchy.add_edge("senior_labeler", "junior_labeler");
    assert!(matches!(result, Err(RbacError::UnknownRole(ref r)) if r == "junior_labeler"));

    let result = hierarchy.add_edge("lead_labeler", "senior_labeler");
    assert!(matches!(result, Err(RbacError::UnknownRole(ref r)) if r == "lead_labeler"));
    assert_eq!(hierarchy.edge_count(), 0);
}

#[test]
fn test_duplicate_edge_is_noop() {
    let mut hierarchy = RoleHierarchy::new(catalog(&["a", "b"]));
    hierarchy.add_edge("a", "b").unwrap();
    hierarchy.add_edge("a", "b").unwrap();

    assert_eq!(hierarchy.edge_count(), 1);
    assert_eq!(hierarchy.parents_of("a"), &["b".to_string()]);
}

#[test]
fn test_self_reference_prevention() {
    let mut hierarchy = RoleHierarchy::new(catalog(&["manager"]));

    let result = hierarchy.add_edge("manager", "manager");
    assert!(matches!(result, Err(RbacError::CycleDetected(_))));
    assert!(hierarchy.parents_of("manager").is_empty());
}

#[test]
fn test_direct_cycle_detection() {
    // A -> B -> A
    let mut hierarchy = RoleHierarchy::new(catalog(&["role_a", "role_b"]));
    hierarchy.add_edge("role_a", "role_b").unwrap();

    match hierarchy.add_edge("role_b", "role_a") {
        Err(RbacError::CycleDetected(msg)) => {
            assert_eq!(msg, "role_b -> role_a -> role_b");
        }
        other => panic!("Expected CycleDetected, got {:?}", other),
    }
}

#[test]
fn test_indirect_cycle_leaves_graph_unchanged() {
    // A -> B -> C, then C -> A would close the loop
    let mut hierarchy = RoleHierarchy::new(catalog(&["role_a", "role_b", "role_c"]));
    hierarchy.add_edge("role_a", "role_b").unwrap();
    hierarchy.add_edge("role_b", "role_c").unwrap();

    let before = hierarchy.ancestors_of("role_c").unwrap();
    let result = hierarchy.add_edge("role_c", "role_a");

    match result {
        Err(RbacError::CycleDetected(msg)) => {
            assert!(msg.contains("role_a"));
            assert!(msg.contains("role_b"));
            assert!(msg.contains("role_c"));
        }
        other => panic!("Expected CycleDetected, got {:?}", other),
    }

    assert_eq!(hierarchy.edge_count(), 2);
    assert!(hierarchy.parents_of("role_c").is_empty());
    assert_eq!(hierarchy.ancestors_of("role_c").unwrap(), before);
}

// ============================================================================
// Ancestor Resolution Tests
// ============================================================================

#[test]
fn test_ancestors_exclude_self() {
    let mut hierarchy = RoleHierarchy::new(catalog(&["junior", "senior"]));
    hierarchy.add_edge("senior", "junior").unwrap();

    assert!(hierarchy.ancestors_of("junior").unwrap().is_empty());
    assert_eq!(names(&hierarchy.ancestors_of("senior").unwrap()), vec!["junior"]);
}

#[test]
fn test_diamond_ancestors() {
    // tech_lead inherits manager and developer, both inherit employee
    let mut hierarchy =
        RoleHierarchy::new(catalog(&["employee", "manager", "developer", "tech_lead"]));
    hierarchy.add_edge("manager", "employee").unwrap();
    hierarchy.add_edge("developer", "employee").unwrap();
    hierarchy.add_edge("tech_lead", "manager").unwrap();
    hierarchy.add_edge("tech_lead", "developer").unwrap();

    let ancestors = hierarchy.ancestors_of("tech_lead").unwrap();
    assert_eq!(names(&ancestors), vec!["developer", "employee", "manager"]);
}

#[test]
fn test_ancestors_of_unknown_role() {
    let hierarchy = RoleHierarchy::new(catalog(&["reviewer"]));
    assert!(matches!(
        hierarchy.ancestors_of("ghost"),
        Err(RbacError::UnknownRole(_))
    ));
}

// ============================================================================
// Freeze Tests
// ============================================================================

#[test]
fn test_add_edge_after_freeze() {
    let mut hierarchy = RoleHierarchy::new(catalog(&["a", "b", "c"]));
    hierarchy.add_edge("b", "a").unwrap();
    hierarchy.freeze().unwrap();

    assert!(matches!(hierarchy.add_edge("c", "b"), Err(RbacError::HierarchyFrozen)));
    // Even an already-present edge is refused once frozen
    assert!(matches!(hierarchy.add_edge("b", "a"), Err(RbacError::HierarchyFrozen)));
}

#[test]
fn test_freeze_is_idempotent() {
    let mut hierarchy = RoleHierarchy::new(catalog(&["a"]));
    hierarchy.freeze().unwrap();
    hierarchy.freeze().unwrap();
    assert!(hierarchy.is_frozen());
}

#[test]
fn test_memoized_matches_traversal() {
    // Complex hierarchy:
    // base_user <- verified_user <- premium_user
    //           <- contributor <- maintainer <- admin
    let ids = [
        "base_user",
        "verified_user",
        "premium_user",
        "contributor",
        "maintainer",
        "admin",
    ];
    let mut hierarchy = RoleHierarchy::new(catalog(&ids));
    hierarchy.add_edge("verified_user", "base_user").unwrap();
    hierarchy.add_edge("premium_user", "verified_user").unwrap();
    hierarchy.add_edge("contributor", "base_user").unwrap();
    hierarchy.add_edge("maintainer", "contributor").unwrap();
    hierarchy.add_edge("admin", "maintainer").unwrap();

    let before: Vec<_> = ids
        .iter()
        .map(|id| hierarchy.ancestors_of(id).unwrap())
        .collect();

    hierarchy.freeze().unwrap();

    for (id, expected) in ids.iter().zip(before) {
        assert_eq!(hierarchy.ancestors_of(id).unwrap(), expected, "role {}", id);
    }

    assert_eq!(
        names(&hierarchy.ancestors_of("admin").unwrap()),
        vec!["base_user", "contributor", "maintainer"]
    );
}

#[test]
fn test_edges_added_out_of_order() {
    // Children registered before parents in the catalog
    let mut hierarchy = RoleHierarchy::new(catalog(&["admin", "maintainer", "contributor"]));
    hierarchy.add_edge("admin", "maintainer").unwrap();
    hierarchy.add_edge("maintainer", "contributor").unwrap();
    hierarchy.freeze().unwrap();

    assert_eq!(
        names(&hierarchy.ancestors_of("admin").unwrap()),
        vec!["contributor", "maintainer"]
    );
}
