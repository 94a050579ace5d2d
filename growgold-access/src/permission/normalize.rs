//! Permission matrix normalization
//!
//! Turns arbitrary, partial permission input into a complete matrix: every
//! catalog module is present, values are strict booleans. The merge is
//! permissive: unknown modules and undeclared actions are kept so that data
//! survives catalog changes. Use [`ModuleCatalog::restrict`] for a strict view.
//!
//! [`ModuleCatalog::restrict`]: super::catalog::ModuleCatalog::restrict

use growgold_admin_api::{truthy, ModuleId, PermissionMatrix, PermissionOverrides};

use super::catalog::ModuleCatalog;

/// Every catalog module with all of its declared actions set to `false`
pub fn empty_permissions(catalog: &ModuleCatalog) -> PermissionMatrix {
    let mut matrix = PermissionMatrix::new();
    for module in catalog.list_modules() {
        let actions = module
            .actions
            .iter()
            .map(|action| (action.clone(), false))
            .collect();
        matrix.replace_module(module.id.clone(), actions);
    }
    matrix
}

/// Merge `overrides` onto the all-false base of `catalog`
///
/// Modules not mentioned in `overrides` stay all false; this is a replace
/// from the override, not a merge with any previous state.
pub fn normalize(
    catalog: &ModuleCatalog,
    overrides: Option<&PermissionOverrides>,
) -> PermissionMatrix {
    let mut matrix = empty_permissions(catalog);

    for (module, actions) in overrides.into_iter().flat_map(|o| o.iter()) {
        let grants = matrix.actions_mut(module.clone());
        for (action, value) in actions {
            grants.insert(action.clone(), truthy(value));
        }
    }

    matrix
}

/// Convert a legacy module list into a matrix
///
/// Early records stored only the ids of the modules a sub-admin could open.
/// Each listed catalog module is granted all of its declared actions; ids the
/// catalog does not know are kept with an empty action map.
pub fn from_module_list(catalog: &ModuleCatalog, modules: &[ModuleId]) -> PermissionMatrix {
    let mut matrix = empty_permissions(catalog);
    for id in modules {
        match catalog.module(id) {
            Some(module) => {
                let actions = module
                    .actions
                    .iter()
                    .map(|action| (action.clone(), true))
                    .collect();
                matrix.replace_module(id.clone(), actions);
            }
            None => {
                matrix.actions_mut(id.clone());
            }
        }
    }
    matrix
}
