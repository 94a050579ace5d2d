//! growgold-admin-api: Shared types for Grow Gold access control
//!
//! This crate defines the permission vocabulary (modules, actions, the
//! permission matrix) and the payloads exchanged with the admin-creation
//! service. Catalog-aware logic lives in `growgold-access`.

mod ids;
mod matrix;
mod wire;

pub use ids::{Action, CustomId, ModuleId};
pub use matrix::{truthy, ActionGrants, PermissionMatrix, PermissionOverrides};
pub use wire::{error_message, extract_admin_payload, CreateAdminRequest, ProvisionedAdmin};
