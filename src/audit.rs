//! Audit notifications for access decisions.
//!
//! The permission-granting strategy reports the entry that decided a request
//! to an [`AuditLogger`] when that entry asks for it (`audit_success` on a
//! grant, `audit_failure` on a denial). Administrative checks are never audited.
//!
//! Sinks are plain values injected into
//! [`DefaultPermissionGrantingStrategy`](crate::DefaultPermissionGrantingStrategy);
//! there is no process-wide default.
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use acl_core::{Ace, AuditLogger};
//!
//! struct CountingSink {
//!     denials: AtomicU64,
//! }
//!
//! impl AuditLogger for CountingSink {
//!     fn audit(&self, granted: bool, _ace: &Ace) {
//!         if !granted {
//!             self.denials.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

use serde::Serialize;
use tracing::info;

use crate::types::{Ace, Identifier, Permission, Sid};

/// Receives the entry that decided an audited access request.
///
/// Called synchronously from inside `Acl::is_granted`. Implementations must be
/// cheap and must not call back into `is_granted` on the same ACL.
pub trait AuditLogger: Send + Sync {
    fn audit(&self, granted: bool, ace: &Ace);
}

/// Serializable snapshot of an audited decision.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub granted: bool,
    pub acl_id: Identifier,
    pub ace_id: Option<Identifier>,
    pub sid: Sid,
    pub permission: Permission,
}

impl AuditRecord {
    pub fn new(granted: bool, ace: &Ace) -> Self {
        AuditRecord {
            granted,
            acl_id: ace.acl_id().clone(),
            ace_id: ace.id().cloned(),
            sid: ace.sid().clone(),
            permission: ace.permission(),
        }
    }
}

/// Default sink: emits one `info` event per audited decision.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn audit(&self, granted: bool, ace: &Ace) {
        let record = AuditRecord::new(granted, ace);
        info!(
            event = "Audit",
            outcome = if granted { "granted" } else { "denied" },
            ace = ace.to_string(),
            record = serde_json::to_string(&record).unwrap_or_default()
        );
    }
}

/// Sink that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuditLogger;

impl AuditLogger for NoOpAuditLogger {
    fn audit(&self, _granted: bool, _ace: &Ace) {}
}
