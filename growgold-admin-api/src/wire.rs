//! Request and response shapes of the admin-creation service

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::matrix::{PermissionMatrix, PermissionOverrides};

/// Body of a create-admin call
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub permissions: PermissionMatrix,
}

impl fmt::Debug for CreateAdminRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAdminRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Pick the admin object out of a service response body
///
/// Servers wrap the record differently; the first of `data`, `admin`, `user`
/// or the body itself that is a JSON object wins. When none is, the request
/// that was sent stands in for the record.
pub fn extract_admin_payload(body: &Value, fallback: &CreateAdminRequest) -> Value {
    let candidate = ["data", "admin", "user"]
        .iter()
        .find_map(|key| body.get(key).filter(|v| !v.is_null()))
        .unwrap_or(body);

    if candidate.is_object() {
        candidate.clone()
    } else {
        serde_json::to_value(fallback).unwrap_or(Value::Null)
    }
}

/// Pull a human-readable error out of a failed response body
///
/// Looks at `message` first, then `error`.
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Server-assigned fields of a freshly created admin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionedAdmin {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub permissions: Option<PermissionOverrides>,
}

impl ProvisionedAdmin {
    /// Read the fields the directory cares about from an admin object
    ///
    /// Accepts `id` or `_id`, as a string or a number. Empty strings are
    /// treated as absent.
    pub fn from_payload(payload: &Value) -> Self {
        let id = ["id", "_id"].iter().find_map(|key| match payload.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });

        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        Self {
            id,
            name: text("name"),
            email: text("email"),
            permissions: payload
                .get("permissions")
                .filter(|p| p.is_object())
                .map(PermissionOverrides::from_json),
        }
    }

    /// Extract and read a response body in one step
    pub fn from_response(body: &Value, request: &CreateAdminRequest) -> Self {
        Self::from_payload(&extract_admin_payload(body, request))
    }
}
