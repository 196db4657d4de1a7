//! Built-in TETRIX model tests

use std::collections::BTreeSet;
use std::io::Write;
use tetrix_rbac::{AuthorizationEngine, Decision, ModelDefinition, Namespace, RbacError};

fn builtin_engine() -> AuthorizationEngine {
    AuthorizationEngine::new(ModelDefinition::builtin().unwrap().load().unwrap())
}

#[test]
fn test_every_namespace_has_roles() {
    let engine = builtin_engine();
    let roles = engine.model().roles();

    for namespace in Namespace::ALL {
        assert!(
            !roles.list_by_namespace(namespace).is_empty(),
            "namespace {} has no roles",
            namespace
        );
    }

    let annotator: Vec<&str> = roles
        .list_by_namespace(Namespace::DataAnnotator)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert!(annotator.contains(&"senior_labeler"));
    assert!(annotator.contains(&"junior_labeler"));
    assert!(!annotator.contains(&"student"));
}

#[test]
fn test_senior_labeler_contains_junior_labeler() {
    let engine = builtin_engine();

    let junior = engine.effective_permissions(["junior_labeler"]).unwrap();
    let senior = engine.effective_permissions(["senior_labeler"]).unwrap();

    assert!(junior.is_subset(&senior));
    assert!(senior.contains("quality:approve"));
    assert!(!junior.contains("quality:approve"));
}

/// Effective permissions of every built-in role except the superuser
const PLATFORM_GRANTS: &[(&str, &[&str])] = &[
    ("owner", &[]),
    (
        "task_admin",
        &[
            "analytics:view", "billing:view", "project:create", "project:delete",
            "project:update", "quality:review", "task:assign", "task:review",
        ],
    ),
    (
        "reviewer",
        &["quality:metrics", "quality:review", "task:approve", "task:reject", "task:review"],
    ),
    ("labeler", &["dataset:annotate", "progress:view", "task:submit"]),
    (
        "billing_admin",
        &["analytics:export", "analytics:view", "billing:manage", "billing:view"],
    ),
    (
        "coding_student",
        &["assignment:submit", "course:enroll", "course:view", "progress:view", "resource:access"],
    ),
    (
        "academy_reviewer",
        &["assignment:grade", "assignment:review", "certificate:generate", "course:grade"],
    ),
    (
        "project_manager",
        &[
            "analytics:view", "dataset:download", "dataset:upload", "project:assign",
            "project:create", "project:update", "task:assign", "task:create",
        ],
    ),
    (
        "senior_labeler",
        &["dataset:annotate", "quality:approve", "quality:review", "task:submit"],
    ),
    ("junior_labeler", &["dataset:annotate", "task:submit"]),
    (
        "quality_assurance",
        &["quality:approve", "quality:metrics", "quality:review", "task:approve", "task:reject"],
    ),
    (
        "data_scientist",
        &["analytics:export", "analytics:view", "dataset:download", "quality:metrics"],
    ),
    (
        "student",
        &["assignment:submit", "course:enroll", "course:view", "progress:view", "resource:access"],
    ),
    (
        "advanced_student",
        &[
            "assignment:submit", "course:enroll", "course:view", "progress:view",
            "resource:access", "resource:share",
        ],
    ),
    (
        "teaching_assistant",
        &["assignment:grade", "assignment:review", "progress:view", "resource:create", "resource:share"],
    ),
    (
        "instructor",
        &[
            "assignment:grade", "assignment:review", "certificate:generate", "course:grade",
            "course:submit", "resource:create", "resource:share",
        ],
    ),
    (
        "curriculum_manager",
        &["certificate:generate", "course:grade", "course:submit", "resource:create", "resource:share"],
    ),
    (
        "client_admin",
        &[
            "api:access", "api:key-manage", "org:update", "org:view", "report:export",
            "report:generate", "user:invite", "user:remove", "user:role-assign",
        ],
    ),
    ("client_user", &["api:access", "org:view", "report:generate"]),
    ("client_viewer", &["org:view", "report:generate"]),
    (
        "integration_manager",
        &[
            "api:access", "api:key-manage", "api:rate-limit", "integration:create",
            "integration:delete", "integration:update",
        ],
    ),
];

#[test]
fn test_builtin_roles_match_platform_grants() {
    let engine = builtin_engine();
    let roles = engine.model().roles();

    // Every role but the superuser is listed
    assert_eq!(PLATFORM_GRANTS.len() + 1, roles.len());

    for (role, expected) in PLATFORM_GRANTS {
        let effective = engine.effective_permissions([*role]).unwrap();
        let expected: BTreeSet<String> = expected.iter().map(|p| p.to_string()).collect();
        assert_eq!(*effective, expected, "effective permissions of {}", role);
    }
}

#[test]
fn test_inheritance_adds_nothing_beyond_platform_grants() {
    let engine = builtin_engine();

    assert_eq!(
        engine.authorize(["instructor"], "progress:view").unwrap(),
        Decision::Deny
    );
    assert!(engine.effective_permissions(["owner"]).unwrap().is_empty());
    assert!(engine.model().hierarchy().parents_of("instructor").is_empty());
    assert!(engine.model().hierarchy().parents_of("owner").is_empty());
}

#[test]
fn test_enterprise_chain_is_transitive() {
    let engine = builtin_engine();
    let ancestors = engine.model().hierarchy().ancestors_of("client_admin").unwrap();

    assert!(ancestors.contains("client_user"));
    assert!(ancestors.contains("client_viewer"));

    assert_eq!(
        engine.authorize(["client_admin"], "org:view").unwrap(),
        Decision::Allow
    );
    assert_eq!(
        engine.authorize(["client_viewer"], "api:access").unwrap(),
        Decision::Deny
    );
}

#[test]
fn test_super_admin_holds_every_permission() {
    let engine = builtin_engine();
    let all = engine.effective_permissions(["super_admin"]).unwrap();

    assert_eq!(all.len(), engine.model().permissions().len());
    assert!(all.contains("rbac:inspect"));
}

#[test]
fn test_multi_role_union_across_namespaces() {
    let engine = builtin_engine();

    let decision = engine
        .authorize(["student", "junior_labeler"], "dataset:annotate")
        .unwrap();
    assert_eq!(decision, Decision::Allow);

    let decision = engine
        .authorize(["student", "junior_labeler"], "course:grade")
        .unwrap();
    assert_eq!(decision, Decision::Deny);
}

#[test]
fn test_role_ids_are_case_sensitive() {
    let engine = builtin_engine();
    let result = engine.authorize(["Senior_Labeler"], "dataset:annotate");
    assert!(matches!(result, Err(RbacError::UnknownRole(_))));
}

#[test]
fn test_load_from_file() {
    let json = r#"{
        "permissions": ["report:view"],
        "roles": [
            {"id": "analyst", "namespace": "enterprise"},
            {"id": "lead", "namespace": "enterprise", "description": "Team lead"}
        ],
        "inherits": [{"child": "lead", "parent": "analyst"}],
        "grants": {"analyst": ["report:view"]}
    }"#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let model = ModelDefinition::from_path(file.path()).unwrap().load().unwrap();
    let engine = AuthorizationEngine::new(model);

    assert_eq!(
        engine.authorize(["lead"], "report:view").unwrap(),
        Decision::Allow
    );
    assert_eq!(
        engine.model().roles().get("lead").unwrap().description.as_deref(),
        Some("Team lead")
    );
}

#[test]
fn test_grant_to_unknown_permission_fails_load() {
    let json = r#"{
        "permissions": [],
        "roles": [{"id": "analyst", "namespace": "core"}],
        "grants": {"analyst": ["report:view"]}
    }"#;

    let result = ModelDefinition::from_json_str(json).unwrap().load();
    assert!(matches!(result, Err(RbacError::UnknownPermission(ref p)) if p == "report:view"));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = ModelDefinition::from_path("/nonexistent/rbac-model.json");
    assert!(matches!(result, Err(RbacError::Io(_))));
}
