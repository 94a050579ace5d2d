//! growgold-access: Sub-admin access control for the Grow Gold admin panel
//!
//! This crate manages sub-admin records and their per-module permissions:
//! the module catalog, permission normalization, the sub-admin directory,
//! and the form controller used to create and edit records.

pub mod audit;
pub mod directory;
pub mod form;
pub mod permission;
pub mod presets;
pub mod provision;

pub use audit::{
    AuditError, AuditEvent, AuditEventType, AuditSink, CompositeAuditSink, FileAuditSink,
    MemoryAuditSink, NullAuditSink,
};
pub use directory::{DirectoryError, NewSubAdmin, SubAdmin, SubAdminDirectory, SubAdminUpdate};
pub use form::{
    Draft, FieldErrors, FormError, FormField, FormMode, ModuleSummary, SubAdminForm,
    SubmissionHandle, SubmitError,
};
pub use permission::{
    empty_permissions, from_module_list, normalize, CatalogError, Module, ModuleCatalog,
};
pub use presets::{DirectoryBuilder, DirectoryPresets, PresetError};
pub use provision::{
    AdminProvisioner, LocalProvisioner, ProvisionError, ScriptedProvisioner,
    DEFAULT_FAILURE_MESSAGE,
};
pub use growgold_admin_api::{Action, ModuleId, PermissionMatrix, PermissionOverrides};
