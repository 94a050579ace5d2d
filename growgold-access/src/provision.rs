//! Admin provisioning: the boundary to the external admin-creation service
//!
//! The directory never talks to the network itself. It hands a
//! [`CreateAdminRequest`] to an [`AdminProvisioner`] and only mutates local
//! state once the provisioner reports success.

use async_trait::async_trait;
use growgold_admin_api::{error_message, CreateAdminRequest, ProvisionedAdmin};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::Notify;

/// Message shown when a failure carries no usable text
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to save sub-admin. Please try again.";

/// Error type for provisioning calls
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Not authorized to create admins (status {0})")]
    Unauthorized(u16),

    #[error("Admin creation rejected with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Admin service unavailable: {0}")]
    Unavailable(String),
}

impl ProvisionError {
    /// Classify a non-success response
    pub fn from_response(status: u16, body: &Value) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(status),
            _ => Self::Rejected {
                status,
                message: error_message(body),
            },
        }
    }

    /// Text suitable for a submission banner
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } => DEFAULT_FAILURE_MESSAGE.to_string(),
            Self::Unavailable(reason) if !reason.trim().is_empty() => reason.clone(),
            Self::Unavailable(_) => DEFAULT_FAILURE_MESSAGE.to_string(),
            Self::Unauthorized(_) => self.to_string(),
        }
    }
}

/// Trait for the admin-creation service
///
/// Implementations must not retry on their own: a failure is authoritative
/// and goes straight back to the caller.
#[async_trait]
pub trait AdminProvisioner: Send + Sync {
    /// Create the admin remotely and return any server-assigned fields
    async fn create_admin(
        &self,
        request: &CreateAdminRequest,
    ) -> Result<ProvisionedAdmin, ProvisionError>;

    /// Whether calls leave the process
    fn is_remote(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: AdminProvisioner + ?Sized> AdminProvisioner for Arc<T> {
    async fn create_admin(
        &self,
        request: &CreateAdminRequest,
    ) -> Result<ProvisionedAdmin, ProvisionError> {
        (**self).create_admin(request).await
    }

    fn is_remote(&self) -> bool {
        (**self).is_remote()
    }
}

// ============================================================================
// Local Provisioner
// ============================================================================

/// Provisioner for a directory with no backend
///
/// Always succeeds and assigns nothing; the directory generates the id.
#[derive(Debug, Default)]
pub struct LocalProvisioner;

impl LocalProvisioner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AdminProvisioner for LocalProvisioner {
    async fn create_admin(
        &self,
        _request: &CreateAdminRequest,
    ) -> Result<ProvisionedAdmin, ProvisionError> {
        Ok(ProvisionedAdmin::default())
    }

    fn is_remote(&self) -> bool {
        false
    }
}

// ============================================================================
// Scripted Provisioner (for testing and offline demos)
// ============================================================================

/// Provisioner that replays queued service responses and records requests
///
/// Queued bodies go through the same payload extraction a real client would
/// apply. Once the queue is empty every call answers with `{}`, which means
/// "no server-assigned fields".
#[derive(Debug, Default)]
pub struct ScriptedProvisioner {
    responses: Mutex<VecDeque<Result<Value, ProvisionError>>>,
    requests: Mutex<Vec<CreateAdminRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body
    pub fn respond_with(self, body: Value) -> Self {
        self.lock_responses().push_back(Ok(body));
        self
    }

    /// Queue a failure
    pub fn fail_with(self, error: ProvisionError) -> Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    /// Hold every call until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CreateAdminRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<Value, ProvisionError>>> {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AdminProvisioner for ScriptedProvisioner {
    async fn create_admin(
        &self,
        request: &CreateAdminRequest,
    ) -> Result<ProvisionedAdmin, ProvisionError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.lock_responses().pop_front();
        let body = next.unwrap_or_else(|| Ok(Value::Object(Default::default())))?;
        Ok(ProvisionedAdmin::from_response(&body, request))
    }
}
