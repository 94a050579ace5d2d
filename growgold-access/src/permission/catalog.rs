//! Module catalog: the fixed vocabulary of manageable modules
//!
//! The catalog is an immutable value handed to the directory and to forms.
//! Cloning it is cheap.

use growgold_admin_api::{Action, ModuleId, PermissionMatrix};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Error type for catalog construction
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate module id: {0}")]
    DuplicateModule(ModuleId),

    #[error("Module {0} declares no actions")]
    NoActions(ModuleId),

    #[error("Module {module} declares unsupported action {action}")]
    UnsupportedAction { module: ModuleId, action: Action },

    #[error("Module {module} declares action {action} more than once")]
    DuplicateAction { module: ModuleId, action: Action },
}

/// One manageable area of the admin panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub label: String,
    /// Permitted actions, in display order
    pub actions: Vec<Action>,
}

impl Module {
    pub fn new(id: ModuleId, label: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            id,
            label: label.into(),
            actions,
        }
    }

    /// Whether `action` is declared for this module
    pub fn allows(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.actions.is_empty() {
            return Err(CatalogError::NoActions(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for action in &self.actions {
            if !action.is_standard() {
                return Err(CatalogError::UnsupportedAction {
                    module: self.id.clone(),
                    action: action.clone(),
                });
            }
            if !seen.insert(action) {
                return Err(CatalogError::DuplicateAction {
                    module: self.id.clone(),
                    action: action.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Ordered registry of modules and their actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCatalog {
    modules: Arc<[Module]>,
}

impl ModuleCatalog {
    /// Build a catalog, checking that ids are unique and action sets valid
    pub fn new(modules: Vec<Module>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for module in &modules {
            if !ids.insert(&module.id) {
                return Err(CatalogError::DuplicateModule(module.id.clone()));
            }
            module.check()?;
        }

        Ok(Self {
            modules: modules.into(),
        })
    }

    /// Load a catalog from a JSON array of modules
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path.as_ref())?;
        let modules: Vec<Module> = serde_json::from_reader(BufReader::new(file))?;
        Self::new(modules)
    }

    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let modules: Vec<Module> = serde_json::from_str(json)?;
        Self::new(modules)
    }

    /// The catalog shipped with the admin panel
    pub fn sub_admin_modules() -> Self {
        Self {
            modules: vec![
                Module::new(ModuleId::Faq, "FAQ", Action::VOCABULARY.to_vec()),
                Module::new(ModuleId::Dashboard, "Dashboard", vec![Action::View]),
                Module::new(ModuleId::SubAdmin, "Sub-Admin", Action::VOCABULARY.to_vec()),
            ]
            .into(),
        }
    }

    /// All modules in catalog order; every call yields the same order
    pub fn list_modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|module| &module.id == id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.module(id).is_some()
    }

    /// Display label of a module, or the raw id when the catalog lacks it
    pub fn label<'a>(&'a self, id: &'a ModuleId) -> &'a str {
        self.module(id)
            .map(|module| module.label.as_str())
            .unwrap_or_else(|| id.as_str())
    }

    /// Whether `action` is declared for `module`
    pub fn allows(&self, module: &ModuleId, action: &Action) -> bool {
        self.module(module).is_some_and(|m| m.allows(action))
    }

    /// Strict view of a matrix: catalog modules and their declared actions only
    pub fn restrict(&self, matrix: &PermissionMatrix) -> PermissionMatrix {
        let mut strict = PermissionMatrix::new();
        for module in self.modules.iter() {
            for action in &module.actions {
                strict.set(
                    module.id.clone(),
                    action.clone(),
                    matrix.get(&module.id, action),
                );
            }
        }
        strict
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::sub_admin_modules()
    }
}
