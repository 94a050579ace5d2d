//! Sub-admin form controller
//!
//! Holds an unsaved draft of one record and commits it through the
//! directory. The draft is never written anywhere until `submit` succeeds,
//! so abandoning a form (or dropping a pending submit) leaves no trace.
//!
//! # Module toggles
//!
//! Turning a module off clears every declared action and remembers what was
//! granted. Turning it back on restores that state; with nothing to restore
//! it starts from view-only access, so a module that declares no `view`
//! stays off until one of its actions is toggled.

use growgold_admin_api::{Action, ActionGrants, ModuleId, PermissionMatrix, PermissionOverrides};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::directory::{DirectoryError, NewSubAdmin, SubAdmin, SubAdminDirectory, SubAdminUpdate};
use crate::permission::{empty_permissions, normalize, ModuleCatalog};

/// Form input that can carry a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Email,
    Password,
    Permissions,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::Permissions => "permissions",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation messages keyed by field
pub type FieldErrors = BTreeMap<FormField, String>;

/// Error type for opening a form
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Sub-admin not found: {0}")]
    UnknownSubAdmin(String),
}

/// Error type for [`SubAdminForm::submit`]
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),

    #[error("A submission is already in progress")]
    InFlight,

    #[error("Sub-admin {0} no longer exists")]
    Missing(String),

    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: DirectoryError,
    },
}

/// Unsaved field values
#[derive(Clone, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub permissions: PermissionMatrix,
}

impl fmt::Debug for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Whether the form creates a record or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// Shared submission-in-flight flag
///
/// Forms opened in the same session share one handle, so only one of them
/// can be submitting at a time.
#[derive(Debug, Clone, Default)]
pub struct SubmissionHandle {
    in_flight: Arc<AtomicBool>,
}

impl SubmissionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                in_flight: self.in_flight.clone(),
            })
    }
}

/// Clears the in-flight flag when the submission ends or is dropped
struct InFlightGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// One module of the permission preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub module: ModuleId,
    pub label: String,
    /// Labels of the granted actions, in catalog order
    pub actions: Vec<String>,
}

/// Form controller for creating or editing one sub-admin
pub struct SubAdminForm {
    catalog: ModuleCatalog,
    mode: FormMode,
    draft: Draft,
    remembered: BTreeMap<ModuleId, ActionGrants>,
    errors: FieldErrors,
    submission_error: Option<String>,
    submission: SubmissionHandle,
}

impl SubAdminForm {
    /// Empty draft with every catalog action off
    pub fn create(catalog: &ModuleCatalog) -> Self {
        Self::with_draft(
            catalog.clone(),
            FormMode::Create,
            Draft {
                name: String::new(),
                email: String::new(),
                password: String::new(),
                permissions: empty_permissions(catalog),
            },
        )
    }

    /// Draft loaded from the stored record with `id`
    pub async fn edit(directory: &SubAdminDirectory, id: &str) -> Result<Self, FormError> {
        let record = directory
            .get_by_id(id)
            .await
            .ok_or_else(|| FormError::UnknownSubAdmin(id.to_string()))?;
        let catalog = directory.catalog().clone();
        let permissions = normalize(&catalog, Some(&PermissionOverrides::from(record.permissions)));

        Ok(Self::with_draft(
            catalog,
            FormMode::Edit(record.id),
            Draft {
                name: record.name,
                email: record.email,
                password: record.password,
                permissions,
            },
        ))
    }

    fn with_draft(catalog: ModuleCatalog, mode: FormMode, draft: Draft) -> Self {
        Self {
            catalog,
            mode,
            draft,
            remembered: BTreeMap::new(),
            errors: FieldErrors::new(),
            submission_error: None,
            submission: SubmissionHandle::new(),
        }
    }

    /// Share the in-flight flag of a session
    pub fn in_session(mut self, handle: &SubmissionHandle) -> Self {
        self.submission = handle.clone();
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.draft.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.draft.password = password.into();
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_in_flight()
    }

    /// Turn a whole module off, or back on
    pub fn toggle_module(&mut self, module: &ModuleId) {
        let Some(declared) = self.catalog.module(module) else {
            return;
        };

        let permissions = &mut self.draft.permissions;
        if permissions.is_module_enabled(module) {
            if let Some(current) = permissions.actions(module) {
                self.remembered.insert(module.clone(), current.clone());
            }
            let cleared = declared
                .actions
                .iter()
                .map(|action| (action.clone(), false))
                .collect();
            permissions.replace_module(module.clone(), cleared);
            return;
        }

        let restored: Option<ActionGrants> = self
            .remembered
            .remove(module)
            .map(|previous| {
                declared
                    .actions
                    .iter()
                    .map(|action| {
                        let granted = previous.get(action).copied().unwrap_or(false);
                        (action.clone(), granted)
                    })
                    .collect::<ActionGrants>()
            })
            .filter(|grants| grants.values().any(|granted| *granted));

        // Only view defaults on; a module without view stays all false
        let grants = restored.unwrap_or_else(|| {
            declared
                .actions
                .iter()
                .map(|action| (action.clone(), *action == Action::View))
                .collect()
        });
        permissions.replace_module(module.clone(), grants);
    }

    /// Flip one declared action of one module
    pub fn toggle_action(&mut self, module: &ModuleId, action: &Action) {
        let Some(declared) = self.catalog.module(module) else {
            return;
        };
        if !declared.allows(action) {
            return;
        }

        let current = self.draft.permissions.actions(module);
        let mut grants: ActionGrants = declared
            .actions
            .iter()
            .map(|a| (a.clone(), current.and_then(|c| c.get(a)).copied().unwrap_or(false)))
            .collect();
        if let Some(granted) = grants.get_mut(action) {
            *granted = !*granted;
        }
        self.draft.permissions.replace_module(module.clone(), grants);
    }

    /// Recompute field errors; returns whether the draft can be submitted
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();

        for (field, value) in [
            (FormField::Name, &self.draft.name),
            (FormField::Email, &self.draft.email),
            (FormField::Password, &self.draft.password),
        ] {
            if value.trim().is_empty() {
                errors.insert(
                    field,
                    format!("Enter at least one word for the {}.", field),
                );
            }
        }

        if !self.draft.permissions.has_any_grant() {
            errors.insert(
                FormField::Permissions,
                "Enable at least one module permission.".to_string(),
            );
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and commit the draft through `directory`
    ///
    /// On failure the draft stays as it was so the caller can retry.
    pub async fn submit(&mut self, directory: &SubAdminDirectory) -> Result<SubAdmin, SubmitError> {
        let Some(_guard) = self.submission.try_begin() else {
            tracing::debug!("Submit rejected while another is in flight");
            return Err(SubmitError::InFlight);
        };

        if !self.validate() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }
        self.submission_error = None;

        let name = self.draft.name.trim().to_string();
        let email = self.draft.email.trim().to_string();
        let password = self.draft.password.trim().to_string();
        let permissions = PermissionOverrides::from(normalize(
            &self.catalog,
            Some(&PermissionOverrides::from(&self.draft.permissions)),
        ));

        let result = match &self.mode {
            FormMode::Create => directory
                .add(NewSubAdmin::new(name, email, password).with_permissions(permissions))
                .await
                .map_err(|source| SubmitError::Rejected {
                    message: source.user_message(),
                    source,
                }),
            FormMode::Edit(id) => directory
                .update(
                    id,
                    SubAdminUpdate {
                        name: Some(name),
                        email: Some(email),
                        password: Some(password),
                        permissions: Some(permissions),
                    },
                )
                .await
                .ok_or_else(|| SubmitError::Missing(id.clone())),
        };

        if let Err(err) = &result {
            tracing::warn!(error = %err, "Sub-admin submission failed");
            self.submission_error = Some(err.to_string());
        }
        result
    }

    /// Enabled catalog modules with the labels of their granted actions
    pub fn summary(&self) -> Vec<ModuleSummary> {
        self.catalog
            .list_modules()
            .iter()
            .filter(|module| self.draft.permissions.is_module_enabled(&module.id))
            .map(|module| ModuleSummary {
                module: module.id.clone(),
                label: module.label.clone(),
                actions: module
                    .actions
                    .iter()
                    .filter(|action| self.draft.permissions.get(&module.id, action))
                    .map(|action| action.label().to_string())
                    .collect(),
            })
            .collect()
    }
}

impl fmt::Debug for SubAdminForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubAdminForm")
            .field("mode", &self.mode)
            .field("draft", &self.draft)
            .field("errors", &self.errors)
            .field("submitting", &self.is_submitting())
            .finish_non_exhaustive()
    }
}
