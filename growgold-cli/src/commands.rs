//! Command handlers

use growgold_access::{normalize, ModuleCatalog, SubAdmin, SubAdminDirectory, SubAdminForm};
use growgold_admin_api::{Action, ModuleId, PermissionOverrides};
use serde_json::Value;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::{CliError, CliResult, Output, UserError};

/// A `--grant` value: `module` or `module:action`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub module: ModuleId,
    pub action: Option<Action>,
}

impl FromStr for Grant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, action) = match s.split_once(':') {
            Some((module, action)) => (module.trim(), Some(action.trim())),
            None => (s.trim(), None),
        };
        if module.is_empty() || action.is_some_and(str::is_empty) {
            return Err(format!("expected module or module:action, got '{}'", s));
        }
        Ok(Self {
            module: ModuleId::from(module),
            action: action.map(Action::from),
        })
    }
}

/// Arguments of `growgold create`
#[derive(Clone, clap::Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "GROWGOLD_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Permission to grant; a bare module id enables it view-only
    #[arg(long = "grant", value_name = "MODULE[:ACTION]")]
    pub grants: Vec<Grant>,
}

impl fmt::Debug for CreateArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateArgs")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("grants", &self.grants)
            .finish()
    }
}

/// List the catalog
pub fn modules(catalog: &ModuleCatalog) -> CliResult<Output> {
    let mut out = String::new();
    for module in catalog.list_modules() {
        let actions: Vec<&str> = module.actions.iter().map(Action::as_str).collect();
        let _ = writeln!(out, "{:<12} {:<12} {}", module.id, module.label, actions.join(", "));
    }
    Ok(Output::Text(out.trim_end().to_string()))
}

/// Normalize a raw permission object against the catalog
pub fn normalize_json(catalog: &ModuleCatalog, raw: &str) -> CliResult<Output> {
    let value: Value = serde_json::from_str(raw).map_err(|e| UserError::InvalidArgument {
        arg: raw.to_string(),
        reason: e.to_string(),
    })?;
    let matrix = normalize(catalog, Some(&PermissionOverrides::from_json(&value)));
    Ok(Output::Json(serde_json::to_string_pretty(&matrix)?))
}

/// Show every sub-admin in display order
pub async fn directory(directory: &SubAdminDirectory, json: bool) -> CliResult<Output> {
    let records = directory.list().await;
    if json {
        return Ok(Output::Json(serde_json::to_string_pretty(&records)?));
    }
    if records.is_empty() {
        return Ok(Output::Text("No sub-admins yet.".to_string()));
    }

    let catalog = directory.catalog();
    let mut out = String::new();
    for record in &records {
        let _ = writeln!(
            out,
            "{}  {} <{}>  {}",
            record.id,
            record.name,
            record.email,
            describe(catalog, record)
        );
    }
    Ok(Output::Text(out.trim_end().to_string()))
}

/// Create a sub-admin through the form controller
pub async fn create(directory: &SubAdminDirectory, args: CreateArgs) -> CliResult<Output> {
    let catalog = directory.catalog();
    let mut form = SubAdminForm::create(catalog);
    form.set_name(args.name);
    form.set_email(args.email);
    form.set_password(args.password);

    for grant in &args.grants {
        let Some(module) = catalog.module(&grant.module) else {
            return Err(unknown_grant(grant, "module is not in the catalog"));
        };
        match &grant.action {
            Some(action) if !module.allows(action) => {
                return Err(unknown_grant(grant, "action is not declared for this module"));
            }
            Some(action) => {
                if !form.draft().permissions.get(&grant.module, action) {
                    form.toggle_action(&grant.module, action);
                }
            }
            None => {
                if !form.draft().permissions.is_module_enabled(&grant.module) {
                    form.toggle_module(&grant.module);
                }
            }
        }
    }

    let record = form.submit(directory).await?;
    Ok(Output::Text(format!(
        "Created {} <{}> ({})\n{}",
        record.name,
        record.email,
        record.id,
        describe(catalog, &record)
    )))
}

fn unknown_grant(grant: &Grant, reason: &str) -> CliError {
    let arg = match &grant.action {
        Some(action) => format!("--grant {}:{}", grant.module, action),
        None => format!("--grant {}", grant.module),
    };
    CliError::User(UserError::InvalidArgument {
        arg,
        reason: reason.to_string(),
    })
}

/// `FAQ (View, Add); Dashboard (View)` for the enabled modules
///
/// Catalog modules come first in catalog order, then any module the catalog
/// does not know.
fn describe(catalog: &ModuleCatalog, record: &SubAdmin) -> String {
    let unknown = record
        .permissions
        .modules()
        .filter(|module| !catalog.contains(module));
    let parts: Vec<String> = catalog
        .list_modules()
        .iter()
        .map(|module| &module.id)
        .chain(unknown)
        .filter(|module| record.permissions.is_module_enabled(module))
        .map(|module| {
            let actions: Vec<&str> = record
                .permissions
                .granted(module)
                .into_iter()
                .map(Action::label)
                .collect();
            format!("{} ({})", catalog.label(module), actions.join(", "))
        })
        .collect();

    if parts.is_empty() {
        "no modules".to_string()
    } else {
        parts.join("; ")
    }
}
