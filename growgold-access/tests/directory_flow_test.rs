//! Integration tests for the sub-admin lifecycle across directory, form and audit

use growgold_access::{
    AuditEventType, AuditSink, DirectoryBuilder, FileAuditSink, MemoryAuditSink, ModuleCatalog,
    NewSubAdmin, ProvisionError, ScriptedProvisioner, SubAdminForm, SubAdminUpdate, SubmitError,
};
use growgold_admin_api::{Action, ModuleId, PermissionOverrides};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_ada_scenario() {
    let audit = Arc::new(MemoryAuditSink::new());
    let directory = DirectoryBuilder::new()
        .audit(audit.clone())
        .build()
        .expect("Failed to build directory");

    let stored = directory
        .add(
            NewSubAdmin::new("Ada", "ada@x.com", "pw123")
                .with_permissions(json!({ "faq": { "view": true } })),
        )
        .await
        .expect("Add failed");

    let records = directory.list().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], stored);
    assert!(stored.permissions.get(&ModuleId::Faq, &Action::View));
    assert!(!stored.permissions.get(&ModuleId::Faq, &Action::Add));
    assert!(!stored.permissions.get(&ModuleId::Dashboard, &Action::View));

    let created = audit.find_by_type(AuditEventType::SubAdminCreated);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].subject, stored.id);
}

#[tokio::test]
async fn test_full_lifecycle_through_form() {
    let audit = Arc::new(MemoryAuditSink::new());
    let directory = DirectoryBuilder::new()
        .audit(audit.clone())
        .build()
        .expect("Failed to build directory");

    // Create
    let mut form = SubAdminForm::create(directory.catalog());
    form.set_name("Bea");
    form.set_email("bea@x.com");
    form.set_password("secret");
    form.toggle_module(&ModuleId::SubAdmin);
    form.toggle_action(&ModuleId::SubAdmin, &Action::Add);
    let created = form.submit(&directory).await.expect("Create failed");
    assert_eq!(created.permissions.granted(&ModuleId::SubAdmin).len(), 2);

    // Edit: swap sub-admin access for the dashboard
    let mut form = SubAdminForm::edit(&directory, &created.id)
        .await
        .expect("Edit form failed");
    form.toggle_module(&ModuleId::SubAdmin);
    form.toggle_module(&ModuleId::Dashboard);
    let edited = form.submit(&directory).await.expect("Edit failed");
    assert!(!edited.permissions.is_module_enabled(&ModuleId::SubAdmin));
    assert!(edited.permissions.get(&ModuleId::Dashboard, &Action::View));
    assert_eq!(edited.id, created.id);

    // Delete
    assert!(directory.delete(&created.id).await);
    assert!(directory.is_empty().await);

    let kinds: Vec<AuditEventType> = audit.events().iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            AuditEventType::SubAdminCreated,
            AuditEventType::SubAdminUpdated,
            AuditEventType::SubAdminDeleted,
        ]
    );
}

#[tokio::test]
async fn test_remote_rejection_is_surfaced_and_not_retried() {
    let provisioner = Arc::new(ScriptedProvisioner::new().fail_with(
        ProvisionError::from_response(422, &json!({ "error": "Email is invalid" })),
    ));
    let directory = DirectoryBuilder::new()
        .provisioner(provisioner.clone())
        .build()
        .expect("Failed to build directory");

    let mut form = SubAdminForm::create(directory.catalog());
    form.set_name("Cy");
    form.set_email("not-an-email");
    form.set_password("pw");
    form.toggle_module(&ModuleId::Faq);

    let err = form.submit(&directory).await.unwrap_err();

    assert!(matches!(err, SubmitError::Rejected { .. }));
    assert_eq!(form.submission_error(), Some("Email is invalid"));
    assert_eq!(provisioner.request_count(), 1);
    assert!(directory.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_writers_are_serialized() {
    let directory = DirectoryBuilder::new()
        .build()
        .expect("Failed to build directory");

    let mut handles = Vec::new();
    for i in 0..8 {
        let directory = directory.clone();
        handles.push(tokio::spawn(async move {
            directory
                .add(NewSubAdmin::new(
                    format!("Admin {}", i),
                    format!("admin{}@x.com", i),
                    "pw",
                ))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("Task panicked").expect("Add failed");
    }

    let records = directory.list().await;
    assert_eq!(records.len(), 8);

    let first = records[0].id.clone();
    let updated = directory
        .update(
            &first,
            SubAdminUpdate::new().permissions(
                PermissionOverrides::new().grant(ModuleId::Dashboard, Action::View),
            ),
        )
        .await
        .expect("Update failed");
    assert_eq!(updated.permissions.len(), ModuleCatalog::default().len());
}

#[tokio::test]
async fn test_file_audit_trail() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("audit.jsonl");

    let sink = Arc::new(FileAuditSink::new(&path).expect("Failed to open audit log"));
    let directory = DirectoryBuilder::new()
        .audit(sink.clone())
        .build()
        .expect("Failed to build directory");

    let stored = directory
        .add(NewSubAdmin::new("Ada", "ada@x.com", "pw123"))
        .await
        .expect("Add failed");
    directory.delete(&stored.id).await;
    sink.flush().expect("Flush failed");

    let content = std::fs::read_to_string(&path).expect("Failed to read audit log");
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event_type"], "sub_admin_created");
    assert_eq!(lines[1]["event_type"], "sub_admin_deleted");
    assert!(!content.contains("pw123"));
}
