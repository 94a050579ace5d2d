//! Sub-admin directory: the authoritative in-memory collection of records
//!
//! Every mutation normalizes permissions against the module catalog. Writers
//! are serialized by a gate held across the provisioner call, so a pending
//! `add` and a later `update` never interleave.

use growgold_admin_api::{CreateAdminRequest, PermissionMatrix, PermissionOverrides};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::audit::{self, AuditEvent, AuditSink};
use crate::permission::{normalize, ModuleCatalog};
use crate::provision::{AdminProvisioner, ProvisionError};

/// Error type for directory mutations
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Sub-admin id already exists: {0}")]
    DuplicateId(String),
}

impl DirectoryError {
    /// Text suitable for a submission banner
    pub fn user_message(&self) -> String {
        match self {
            Self::Provision(err) => err.user_message(),
            Self::DuplicateId(_) => self.to_string(),
        }
    }
}

/// A stored sub-admin record
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SubAdmin {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub permissions: PermissionMatrix,
}

impl fmt::Debug for SubAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubAdmin")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Input for [`SubAdminDirectory::add`]
///
/// Permissions are raw overrides; the directory normalizes them.
#[derive(Clone, Default)]
pub struct NewSubAdmin {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub permissions: PermissionOverrides,
}

impl NewSubAdmin {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            permissions: PermissionOverrides::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: impl Into<PermissionOverrides>) -> Self {
        self.permissions = permissions.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl fmt::Debug for NewSubAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewSubAdmin")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Clone, Default)]
pub struct SubAdminUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub permissions: Option<PermissionOverrides>,
}

impl SubAdminUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn permissions(mut self, permissions: impl Into<PermissionOverrides>) -> Self {
        self.permissions = Some(permissions.into());
        self
    }
}

impl fmt::Debug for SubAdminUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubAdminUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("permissions", &self.permissions.is_some())
            .finish()
    }
}

/// Thread-safe directory of sub-admins
///
/// Clones share the same collection.
#[derive(Clone)]
pub struct SubAdminDirectory {
    inner: Arc<RwLock<DirectoryInner>>,
    write_gate: Arc<Mutex<()>>,
    catalog: ModuleCatalog,
    provisioner: Arc<dyn AdminProvisioner>,
    audit: Arc<dyn AuditSink>,
}

struct DirectoryInner {
    /// Insertion order is display order
    records: Vec<SubAdmin>,
}

impl DirectoryInner {
    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }
}

impl SubAdminDirectory {
    /// Create a directory holding `seeds`, normalized against `catalog`
    pub fn with_seeds(
        catalog: ModuleCatalog,
        provisioner: Arc<dyn AdminProvisioner>,
        audit: Arc<dyn AuditSink>,
        seeds: Vec<NewSubAdmin>,
    ) -> Result<Self, DirectoryError> {
        let mut records: Vec<SubAdmin> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let id = seed.id.unwrap_or_else(new_id);
            if records.iter().any(|record| record.id == id) {
                return Err(DirectoryError::DuplicateId(id));
            }
            records.push(SubAdmin {
                id,
                name: seed.name,
                email: seed.email,
                password: seed.password,
                permissions: normalize(&catalog, Some(&seed.permissions)),
            });
        }

        tracing::debug!(count = records.len(), "Directory seeded");

        Ok(Self {
            inner: Arc::new(RwLock::new(DirectoryInner { records })),
            write_gate: Arc::new(Mutex::new(())),
            catalog,
            provisioner,
            audit,
        })
    }

    /// Create an empty directory
    pub fn new(
        catalog: ModuleCatalog,
        provisioner: Arc<dyn AdminProvisioner>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(DirectoryInner {
                records: Vec::new(),
            })),
            write_gate: Arc::new(Mutex::new(())),
            catalog,
            provisioner,
            audit,
        }
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Provision and store a new sub-admin
    ///
    /// Nothing is stored unless the provisioner succeeds. Server-assigned
    /// fields win over the payload; an id is generated when neither has one.
    pub async fn add(&self, payload: NewSubAdmin) -> Result<SubAdmin, DirectoryError> {
        let _gate = self.write_gate.lock().await;

        if let Some(id) = &payload.id {
            if self.inner.read().await.position(id).is_some() {
                return Err(DirectoryError::DuplicateId(id.clone()));
            }
        }

        let permissions = normalize(&self.catalog, Some(&payload.permissions));
        let request = CreateAdminRequest {
            email: payload.email.clone(),
            name: payload.name.clone(),
            password: payload.password.clone(),
            permissions: permissions.clone(),
        };

        let provisioned = match self.provisioner.create_admin(&request).await {
            Ok(provisioned) => provisioned,
            Err(err) => {
                tracing::warn!(email = %payload.email, error = %err, "Admin provisioning failed");
                self.record(audit::provisioning_failed(&payload.email, &err.user_message()));
                return Err(err.into());
            }
        };

        let record = SubAdmin {
            id: provisioned.id.or(payload.id).unwrap_or_else(new_id),
            name: provisioned.name.unwrap_or(payload.name),
            email: provisioned.email.unwrap_or(payload.email),
            password: payload.password,
            permissions: match provisioned.permissions {
                Some(server) => normalize(&self.catalog, Some(&server)),
                None => permissions,
            },
        };

        let mut inner = self.inner.write().await;
        // The server may hand back an id we already hold
        if inner.position(&record.id).is_some() {
            return Err(DirectoryError::DuplicateId(record.id));
        }
        inner.records.push(record.clone());
        drop(inner);

        tracing::info!(id = %record.id, email = %record.email, "Sub-admin added");
        self.record(audit::sub_admin_created(&record));
        Ok(record)
    }

    /// Apply `updates` to the record with `id`
    ///
    /// Supplied permissions replace the stored matrix wholesale: modules they
    /// omit revert to all false. Returns `None` when `id` is unknown.
    pub async fn update(&self, id: &str, updates: SubAdminUpdate) -> Option<SubAdmin> {
        let _gate = self.write_gate.lock().await;
        let mut inner = self.inner.write().await;

        let Some(index) = inner.position(id) else {
            tracing::debug!(id = %id, "Update ignored for unknown sub-admin");
            return None;
        };

        let record = &mut inner.records[index];
        if let Some(name) = updates.name {
            record.name = name;
        }
        if let Some(email) = updates.email {
            record.email = email;
        }
        if let Some(password) = updates.password {
            record.password = password;
        }
        if let Some(permissions) = updates.permissions {
            record.permissions = normalize(&self.catalog, Some(&permissions));
        }
        let updated = record.clone();
        drop(inner);

        tracing::info!(id = %id, "Sub-admin updated");
        self.record(audit::sub_admin_updated(&updated));
        Some(updated)
    }

    /// Remove the record with `id`; returns whether one was removed
    pub async fn delete(&self, id: &str) -> bool {
        let _gate = self.write_gate.lock().await;
        let mut inner = self.inner.write().await;

        let Some(index) = inner.position(id) else {
            tracing::debug!(id = %id, "Delete ignored for unknown sub-admin");
            return false;
        };
        inner.records.remove(index);
        drop(inner);

        tracing::info!(id = %id, "Sub-admin deleted");
        self.record(audit::sub_admin_deleted(id));
        true
    }

    pub async fn get_by_id(&self, id: &str) -> Option<SubAdmin> {
        let inner = self.inner.read().await;
        inner.records.iter().find(|record| record.id == id).cloned()
    }

    /// All records in insertion order
    pub async fn list(&self) -> Vec<SubAdmin> {
        self.inner.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    fn record(&self, event: AuditEvent) {
        if let Err(err) = self.audit.record(event) {
            tracing::warn!(error = %err, "Failed to record audit event");
        }
    }
}

impl fmt::Debug for SubAdminDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubAdminDirectory")
            .field("catalog_modules", &self.catalog.len())
            .field("remote", &self.provisioner.is_remote())
            .finish_non_exhaustive()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEventType, MemoryAuditSink};
    use crate::provision::{LocalProvisioner, ScriptedProvisioner};
    use growgold_admin_api::{Action, ModuleId};
    use serde_json::json;

    fn directory_with(
        provisioner: Arc<dyn AdminProvisioner>,
    ) -> (SubAdminDirectory, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::new());
        let directory =
            SubAdminDirectory::new(ModuleCatalog::default(), provisioner, audit.clone());
        (directory, audit)
    }

    fn ada() -> NewSubAdmin {
        NewSubAdmin::new("Ada", "ada@x.com", "pw123")
            .with_permissions(PermissionOverrides::new().grant(ModuleId::Faq, Action::View))
    }

    #[tokio::test]
    async fn test_add_normalizes_permissions() {
        let (directory, audit) = directory_with(Arc::new(LocalProvisioner::new()));

        let stored = directory.add(ada()).await.unwrap();

        assert_eq!(directory.len().await, 1);
        assert!(stored.permissions.get(&ModuleId::Faq, &Action::View));
        assert!(!stored.permissions.get(&ModuleId::Faq, &Action::Add));
        assert!(!stored.permissions.get(&ModuleId::Dashboard, &Action::View));
        assert!(Uuid::parse_str(&stored.id).is_ok());
        assert_eq!(directory.get_by_id(&stored.id).await, Some(stored.clone()));
        assert_eq!(audit.find_by_type(AuditEventType::SubAdminCreated).len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_whole_matrix() {
        let (directory, _) = directory_with(Arc::new(LocalProvisioner::new()));
        let overrides = PermissionOverrides::new()
            .grant(ModuleId::Faq, Action::View)
            .grant(ModuleId::Dashboard, Action::View);
        let stored = directory
            .add(NewSubAdmin::new("Ada", "ada@x.com", "pw123").with_permissions(overrides))
            .await
            .unwrap();

        let updated = directory
            .update(
                &stored.id,
                SubAdminUpdate::new()
                    .permissions(PermissionOverrides::new().grant(ModuleId::Faq, Action::Delete)),
            )
            .await
            .unwrap();

        assert!(updated.permissions.get(&ModuleId::Faq, &Action::Delete));
        assert!(!updated.permissions.get(&ModuleId::Faq, &Action::View));
        assert!(!updated.permissions.get(&ModuleId::Dashboard, &Action::View));
        assert_eq!(updated.name, "Ada");
    }

    #[tokio::test]
    async fn test_update_without_permissions_keeps_matrix() {
        let (directory, _) = directory_with(Arc::new(LocalProvisioner::new()));
        let stored = directory.add(ada()).await.unwrap();

        let updated = directory
            .update(&stored.id, SubAdminUpdate::new().name("Ada L."))
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.permissions, stored.permissions);
    }

    #[tokio::test]
    async fn test_unknown_id_is_a_silent_no_op() {
        let (directory, audit) = directory_with(Arc::new(LocalProvisioner::new()));
        directory.add(ada()).await.unwrap();
        let before = directory.list().await;

        assert!(directory
            .update("missing", SubAdminUpdate::new().name("Ghost"))
            .await
            .is_none());
        assert!(!directory.delete("missing").await);

        assert_eq!(directory.list().await, before);
        assert_eq!(audit.count(), 1);
    }

    #[tokio::test]
    async fn test_delete_keeps_order_of_others() {
        let (directory, _) = directory_with(Arc::new(LocalProvisioner::new()));
        let first = directory.add(ada()).await.unwrap();
        let second = directory
            .add(NewSubAdmin::new("Bea", "bea@x.com", "pw"))
            .await
            .unwrap();
        let third = directory
            .add(NewSubAdmin::new("Cy", "cy@x.com", "pw"))
            .await
            .unwrap();

        assert!(directory.delete(&second.id).await);

        let ids: Vec<String> = directory.list().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[tokio::test]
    async fn test_provisioning_failure_leaves_directory_unchanged() {
        let provisioner = ScriptedProvisioner::new().fail_with(ProvisionError::Rejected {
            status: 409,
            message: Some("Email already in use".into()),
        });
        let (directory, audit) = directory_with(Arc::new(provisioner));

        let err = directory.add(ada()).await.unwrap_err();

        assert_eq!(err.user_message(), "Email already in use");
        assert!(directory.is_empty().await);
        let failures = audit.find_by_type(AuditEventType::ProvisioningFailed);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].subject, "ada@x.com");
    }

    #[tokio::test]
    async fn test_server_assigned_fields_are_merged() {
        let provisioner = Arc::new(ScriptedProvisioner::new().respond_with(json!({
            "admin": {
                "_id": "srv-42",
                "name": "",
                "permissions": { "dashboard": { "view": true } }
            }
        })));
        let (directory, _) = directory_with(provisioner.clone());

        let stored = directory.add(ada()).await.unwrap();

        assert_eq!(stored.id, "srv-42");
        assert_eq!(stored.name, "Ada");
        assert!(stored.permissions.get(&ModuleId::Dashboard, &Action::View));
        assert!(!stored.permissions.get(&ModuleId::Faq, &Action::View));

        let sent = &provisioner.requests()[0];
        assert_eq!(sent.email, "ada@x.com");
        assert!(sent.permissions.get(&ModuleId::Faq, &Action::View));
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected() {
        let (directory, _) = directory_with(Arc::new(LocalProvisioner::new()));
        directory.add(ada().with_id("sa-1")).await.unwrap();

        let err = directory.add(ada().with_id("sa-1")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateId(id) if id == "sa-1"));
        assert_eq!(directory.len().await, 1);
    }

    #[test]
    fn test_seeds_are_normalized() {
        let directory = SubAdminDirectory::with_seeds(
            ModuleCatalog::default(),
            Arc::new(LocalProvisioner::new()),
            Arc::new(MemoryAuditSink::new()),
            vec![ada().with_id("sa-1")],
        )
        .unwrap();

        let rt = tokio::runtime::Runtime::new().unwrap();
        let stored = rt.block_on(directory.get_by_id("sa-1")).unwrap();
        assert_eq!(stored.permissions.len(), 3);

        let dup = SubAdminDirectory::with_seeds(
            ModuleCatalog::default(),
            Arc::new(LocalProvisioner::new()),
            Arc::new(MemoryAuditSink::new()),
            vec![ada().with_id("sa-1"), ada().with_id("sa-1")],
        );
        assert!(matches!(dup, Err(DirectoryError::DuplicateId(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let record = SubAdmin {
            id: "sa-1".into(),
            name: "Ada".into(),
            email: "ada@x.com".into(),
            password: "pw123".into(),
            permissions: PermissionMatrix::new(),
        };
        let text = format!("{:?}", record);
        assert!(!text.contains("pw123"));
        assert!(!serde_json::to_string(&record).unwrap().contains("pw123"));
    }
}
