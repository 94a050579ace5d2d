//! Permission vocabulary bound to a module catalog
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ModuleCatalog                           │
//! │   faq: view add edit delete │ dashboard: view │ subAdmin: …  │
//! └──────────────┬───────────────────────────────┬───────────────┘
//!                │                               │
//!        ┌───────▼────────┐              ┌───────▼────────┐
//!        │   normalize    │              │    restrict    │
//!        │ (permissive)   │              │    (strict)    │
//!        └───────┬────────┘              └────────────────┘
//!                │
//!        PermissionMatrix ──▶ SubAdminDirectory / SubAdminForm
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use growgold_access::permission::{normalize, ModuleCatalog};
//! use growgold_admin_api::{Action, ModuleId, PermissionOverrides};
//!
//! let catalog = ModuleCatalog::default();
//! let overrides = PermissionOverrides::new().grant(ModuleId::Faq, Action::View);
//! let matrix = normalize(&catalog, Some(&overrides));
//!
//! assert!(matrix.get(&ModuleId::Faq, &Action::View));
//! assert!(!matrix.get(&ModuleId::Dashboard, &Action::View));
//! ```

mod catalog;
mod normalize;

pub use catalog::{CatalogError, Module, ModuleCatalog};
pub use normalize::{empty_permissions, from_module_list, normalize};
