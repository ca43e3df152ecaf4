//! The permission-granting algorithm behind [`Acl::is_granted`].

use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::acl::Acl;
use crate::audit::AuditLogger;
use crate::error::AclError;
use crate::types::{Ace, Permission, Sid};

/// Turns an ACL's entries plus a request into a grant/deny decision.
pub trait PermissionGrantingStrategy: Send + Sync {
    /// Called by [`Acl::is_granted`] once the request has been validated
    /// (non-empty inputs, all `sids` loaded).
    fn is_granted(
        &self,
        acl: &Acl,
        permissions: &[Permission],
        sids: &[Sid],
        admin: bool,
    ) -> Result<bool, AclError>;
}

/// First-match-wins evaluation with immediate grants and provisional denials.
///
/// For each permission (in request order) and each sid (in request order),
/// the first entry whose mask overlaps the permission and whose sid is equal
/// decides that pair:
///
/// * a granting entry grants the whole request at once;
/// * a denying entry settles the permission as denied and moves on to the next
///   permission, the first such entry being kept for auditing;
/// * no entry moves on to the next sid.
///
/// If nothing granted but something denied, the request is denied. If nothing
/// matched at all, an inheriting ACL defers to its parent and any other ACL
/// reports [`AclError::NoMatchingEntry`].
pub struct DefaultPermissionGrantingStrategy {
    audit: Arc<dyn AuditLogger>,
}

impl DefaultPermissionGrantingStrategy {
    pub fn new(audit: Arc<dyn AuditLogger>) -> Self {
        DefaultPermissionGrantingStrategy { audit }
    }
}

impl PermissionGrantingStrategy for DefaultPermissionGrantingStrategy {
    fn is_granted(
        &self,
        acl: &Acl,
        permissions: &[Permission],
        sids: &[Sid],
        admin: bool,
    ) -> Result<bool, AclError> {
        let aces = acl.entries();
        let mut first_rejection: Option<&Ace> = None;

        for permission in permissions {
            for sid in sids {
                let Some(ace) = aces
                    .iter()
                    .find(|ace| ace.permission().matches(*permission) && ace.sid() == sid)
                else {
                    continue;
                };

                if ace.is_granting() {
                    debug!(
                        event = "IsGranted",
                        phase = "Granted",
                        acl = acl.object_identity().to_string(),
                        ace = ace.to_string()
                    );
                    if !admin && ace.is_audit_success() {
                        self.audit.audit(true, ace);
                    }
                    return Ok(true);
                }

                if first_rejection.is_none() {
                    first_rejection = Some(ace);
                }
                break;
            }
        }

        if let Some(ace) = first_rejection {
            debug!(
                event = "IsGranted",
                phase = "Denied",
                acl = acl.object_identity().to_string(),
                ace = ace.to_string()
            );
            if !admin && ace.is_audit_failure() {
                self.audit.audit(false, ace);
            }
            return Ok(false);
        }

        match acl.parent() {
            Some(parent) if acl.is_entries_inheriting() => {
                debug!(
                    event = "IsGranted",
                    phase = "Inherit",
                    acl = acl.object_identity().to_string(),
                    parent = parent.object_identity().to_string()
                );
                parent.is_granted(permissions, sids, admin)
            }
            _ => Err(AclError::NoMatchingEntry(format!(
                "no entry in acl for {} matches permissions [{}] for [{}]",
                acl.object_identity(),
                permissions.iter().map(|p| p.mask()).join(", "),
                sids.iter().join(", ")
            ))),
        }
    }
}
