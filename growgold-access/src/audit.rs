//! Audit trail for sub-admin directory changes
//!
//! Provides a trait-based audit system so applications can send directory
//! events to their preferred destination.

use chrono::{SecondsFormat, Utc};
use growgold_admin_api::{ModuleId, PermissionMatrix};
use serde::Serialize;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;

use crate::directory::SubAdmin;

/// Audit event describing one directory change
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub event_type: AuditEventType,
    /// Sub-admin id, or the email when no record exists yet
    pub subject: String,
    pub details: AuditDetails,
}

impl AuditEvent {
    pub fn new(
        event_type: AuditEventType,
        subject: impl Into<String>,
        details: AuditDetails,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event_type,
            subject: subject.into(),
            details,
        }
    }
}

/// Type of audit event
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    SubAdminCreated,
    SubAdminUpdated,
    SubAdminDeleted,
    /// The admin-creation service refused or failed
    ProvisioningFailed,
}

/// Details about the audit event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AuditDetails {
    /// Permission state after the change
    Permissions {
        fingerprint: String,
        enabled_modules: Vec<ModuleId>,
    },
    Removed,
    Failure { reason: String },
}

impl AuditDetails {
    fn permissions(matrix: &PermissionMatrix) -> Self {
        let enabled_modules = matrix
            .modules()
            .filter(|module| matrix.is_module_enabled(module))
            .cloned()
            .collect();
        Self::Permissions {
            fingerprint: matrix.fingerprint(),
            enabled_modules,
        }
    }
}

/// Error type for audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to write audit log: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to serialize audit event: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Trait for audit event sinks
pub trait AuditSink: Send + Sync {
    /// Record an audit event
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;

    /// Flush any buffered events
    fn flush(&self) -> Result<(), AuditError>;
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        (**self).record(event)
    }

    fn flush(&self) -> Result<(), AuditError> {
        (**self).flush()
    }
}

// ============================================================================
// Default Implementations
// ============================================================================

/// File-based audit sink (JSON Lines)
pub struct FileAuditSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileAuditSink {
    /// Open (or create) the log file in append mode
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let json = serde_json::to_string(&event)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", json)?;
        // One event per line on disk as soon as it is recorded
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), AuditError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Debug for FileAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAuditSink")
            .field("path", &self.path)
            .finish()
    }
}

/// In-memory audit sink with FIFO eviction
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
    max_events: usize,
}

impl MemoryAuditSink {
    /// Create a new memory sink holding up to 1000 events
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::with_capacity(max_events.min(1000))),
            max_events,
        }
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn find_by_type(&self, event_type: AuditEventType) -> Vec<AuditEvent> {
        self.filtered(|e| e.event_type == event_type)
    }

    pub fn find_by_subject(&self, subject: &str) -> Vec<AuditEvent> {
        self.filtered(|e| e.subject == subject)
    }

    fn filtered(&self, keep: impl Fn(&AuditEvent) -> bool) -> Vec<AuditEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        if self.max_events == 0 {
            return Ok(());
        }
        if events.len() >= self.max_events {
            events.remove(0);
        }
        events.push(event);
        Ok(())
    }

    fn flush(&self) -> Result<(), AuditError> {
        Ok(())
    }
}

impl fmt::Debug for MemoryAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryAuditSink")
            .field("count", &self.count())
            .field("max_events", &self.max_events)
            .finish()
    }
}

/// Audit sink that discards everything
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }

    fn flush(&self) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Fan-out sink writing to several sinks in order
#[derive(Default)]
pub struct CompositeAuditSink {
    sinks: Vec<Box<dyn AuditSink>>,
}

impl CompositeAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl AuditSink for CompositeAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        for sink in &self.sinks {
            sink.record(event.clone())?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), AuditError> {
        for sink in &self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompositeAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAuditSink")
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

// ============================================================================
// Helper functions
// ============================================================================

pub fn sub_admin_created(record: &SubAdmin) -> AuditEvent {
    AuditEvent::new(
        AuditEventType::SubAdminCreated,
        &record.id,
        AuditDetails::permissions(&record.permissions),
    )
}

pub fn sub_admin_updated(record: &SubAdmin) -> AuditEvent {
    AuditEvent::new(
        AuditEventType::SubAdminUpdated,
        &record.id,
        AuditDetails::permissions(&record.permissions),
    )
}

pub fn sub_admin_deleted(id: &str) -> AuditEvent {
    AuditEvent::new(AuditEventType::SubAdminDeleted, id, AuditDetails::Removed)
}

pub fn provisioning_failed(email: &str, reason: &str) -> AuditEvent {
    AuditEvent::new(
        AuditEventType::ProvisioningFailed,
        email,
        AuditDetails::Failure {
            reason: reason.to_string(),
        },
    )
}
