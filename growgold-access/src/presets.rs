//! Pre-configured directory setups for common use cases
//!
//! Provides ready-to-use directories that applications can use directly or
//! as starting points for customization.

use growgold_admin_api::{ModuleId, PermissionOverrides};
use std::path::Path;
use std::sync::Arc;

use crate::audit::{AuditSink, CompositeAuditSink, FileAuditSink, MemoryAuditSink, NullAuditSink};
use crate::directory::{DirectoryError, NewSubAdmin, SubAdminDirectory};
use crate::permission::{from_module_list, CatalogError, ModuleCatalog};
use crate::provision::{AdminProvisioner, LocalProvisioner};

/// Error type for preset initialization
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Failed to load catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to initialize audit: {0}")]
    AuditInit(String),

    #[error("Invalid seed data: {0}")]
    Seed(#[from] DirectoryError),
}

/// Builder for sub-admin directories
pub struct DirectoryBuilder {
    catalog: ModuleCatalog,
    provisioner: Option<Arc<dyn AdminProvisioner>>,
    audit: Option<Arc<dyn AuditSink>>,
    seeds: Vec<NewSubAdmin>,
}

impl DirectoryBuilder {
    pub fn new() -> Self {
        Self {
            catalog: ModuleCatalog::default(),
            provisioner: None,
            audit: None,
            seeds: Vec::new(),
        }
    }

    pub fn catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Load the catalog from a JSON file
    pub fn catalog_file(mut self, path: impl AsRef<Path>) -> Result<Self, PresetError> {
        self.catalog = ModuleCatalog::load(path)?;
        Ok(self)
    }

    pub fn provisioner(mut self, provisioner: impl AdminProvisioner + 'static) -> Self {
        self.provisioner = Some(Arc::new(provisioner));
        self
    }

    pub fn audit(mut self, audit: impl AuditSink + 'static) -> Self {
        self.audit = Some(Arc::new(audit));
        self
    }

    /// Add a record present from the start
    pub fn seed(mut self, seed: NewSubAdmin) -> Self {
        self.seeds.push(seed);
        self
    }

    pub fn build(self) -> Result<SubAdminDirectory, PresetError> {
        let directory = SubAdminDirectory::with_seeds(
            self.catalog,
            self.provisioner
                .unwrap_or_else(|| Arc::new(LocalProvisioner::new())),
            self.audit.unwrap_or_else(|| Arc::new(NullAuditSink)),
            self.seeds,
        )?;
        Ok(directory)
    }
}

impl Default for DirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

/// Preset directories for common use cases
pub struct DirectoryPresets;

impl DirectoryPresets {
    /// Demo directory
    ///
    /// - Default catalog
    /// - Local provisioner
    /// - Memory-based audit
    /// - Two seeded sub-admins stored as legacy module lists
    pub fn demo() -> Result<SubAdminDirectory, PresetError> {
        let catalog = ModuleCatalog::default();
        let saanvi = from_module_list(&catalog, &[ModuleId::Faq, ModuleId::Dashboard]);
        let arjun = from_module_list(&catalog, &[ModuleId::SubAdmin]);

        DirectoryBuilder::new()
            .catalog(catalog)
            .audit(MemoryAuditSink::new())
            .seed(
                NewSubAdmin::new("Saanvi", "saanvi@growgold.com", "welcome123")
                    .with_permissions(PermissionOverrides::from(saanvi)),
            )
            .seed(
                NewSubAdmin::new("Arjun", "arjun@growgold.com", "goldenpass")
                    .with_permissions(PermissionOverrides::from(arjun)),
            )
            .build()
    }

    /// Testing mode (empty, in-memory)
    pub fn testing() -> SubAdminDirectory {
        SubAdminDirectory::new(
            ModuleCatalog::default(),
            Arc::new(LocalProvisioner::new()),
            Arc::new(MemoryAuditSink::new()),
        )
    }

    /// Remote mode
    ///
    /// - Default catalog
    /// - Caller-supplied provisioner
    /// - File-based audit log, mirrored in memory
    pub fn remote(
        provisioner: impl AdminProvisioner + 'static,
        audit_path: impl AsRef<Path>,
    ) -> Result<SubAdminDirectory, PresetError> {
        let file = FileAuditSink::new(audit_path)
            .map_err(|e| PresetError::AuditInit(e.to_string()))?;
        let audit = CompositeAuditSink::new()
            .with_sink(file)
            .with_sink(MemoryAuditSink::new());

        DirectoryBuilder::new()
            .provisioner(provisioner)
            .audit(audit)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::ScriptedProvisioner;
    use growgold_admin_api::Action;
    use serde_json::json;

    #[tokio::test]
    async fn test_demo_preset() {
        let directory = DirectoryPresets::demo().unwrap();
        let records = directory.list().await;

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Saanvi", "Arjun"]);
        assert!(records[0].permissions.get(&ModuleId::Faq, &Action::Delete));
        assert!(records[0].permissions.get(&ModuleId::Dashboard, &Action::View));
        assert!(!records[0].permissions.is_module_enabled(&ModuleId::SubAdmin));
        assert_eq!(records[1].permissions.granted(&ModuleId::SubAdmin).len(), 4);
    }

    #[tokio::test]
    async fn test_testing_preset() {
        let directory = DirectoryPresets::testing();
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_remote_preset_writes_audit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let provisioner =
            ScriptedProvisioner::new().respond_with(json!({ "data": { "id": "srv-7" } }));

        let directory = DirectoryPresets::remote(provisioner, &path).unwrap();
        let stored = directory
            .add(NewSubAdmin::new("Ada", "ada@x.com", "pw123"))
            .await
            .unwrap();
        assert_eq!(stored.id, "srv-7");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("sub_admin_created"));
        assert!(content.contains("srv-7"));
    }

    #[tokio::test]
    async fn test_remote_audit_is_readable_while_directory_is_live() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let provisioner = ScriptedProvisioner::new();
        let directory = DirectoryPresets::remote(provisioner, &path).unwrap();

        for i in 0..3 {
            directory
                .add(NewSubAdmin::new("Admin", format!("admin{}@x.com", i), "pw"))
                .await
                .unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.lines().all(|line| line.contains("sub_admin_created")));
        assert_eq!(directory.len().await, 3);
    }

    #[test]
    fn test_builder_rejects_duplicate_seeds() {
        let result = DirectoryBuilder::new()
            .seed(NewSubAdmin::new("A", "a@x.com", "pw").with_id("dup"))
            .seed(NewSubAdmin::new("B", "b@x.com", "pw").with_id("dup"))
            .build();
        assert!(matches!(result, Err(PresetError::Seed(_))));
    }

    #[test]
    fn test_builder_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modules.json");
        std::fs::write(&path, r#"[{"id": "team", "label": "Team", "actions": ["view"]}]"#)
            .unwrap();

        let builder = DirectoryBuilder::new().catalog_file(&path).unwrap();
        let directory = builder.build().unwrap();
        assert_eq!(directory.catalog().len(), 1);

        let missing = DirectoryBuilder::new().catalog_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(PresetError::Catalog(_))));
    }
}
