//! Access-control entries.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identifier::Identifier;
use super::permission::Permission;
use super::sid::Sid;

/// One grant-or-deny rule binding a [`Sid`] to a [`Permission`] inside an ACL.
///
/// Entries are owned by exactly one ACL (referenced here by its primary key)
/// and can only be changed through that ACL's mutators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct Ace {
    id: Option<Identifier>,
    acl_id: Identifier,
    sid: Sid,
    permission: Permission,
    granting: bool,
    audit_success: bool,
    audit_failure: bool,
}

impl Ace {
    /// Primary key, `None` until a persistence layer assigns one.
    pub fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    /// Primary key of the owning ACL.
    pub fn acl_id(&self) -> &Identifier {
        &self.acl_id
    }

    pub fn sid(&self) -> &Sid {
        &self.sid
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn is_granting(&self) -> bool {
        self.granting
    }

    pub fn is_audit_success(&self) -> bool {
        self.audit_success
    }

    pub fn is_audit_failure(&self) -> bool {
        self.audit_failure
    }

    pub(crate) fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    pub(crate) fn set_auditing(&mut self, success: bool, failure: bool) {
        self.audit_success = success;
        self.audit_failure = failure;
    }
}

impl Display for Ace {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let id = self
            .id
            .as_ref()
            .map_or_else(|| "none".to_string(), Identifier::to_string);
        write!(
            f,
            "Ace[id: {id}; granting: {}; sid: {}; permission: {}; audit_success: {}; audit_failure: {}]",
            self.granting, self.sid, self.permission, self.audit_success, self.audit_failure
        )
    }
}

/// An entry that is not yet attached to an ACL.
///
/// Persistence layers use this to rebuild entries with their stored ids and
/// audit flags through [`AclBuilder::entry`](crate::AclBuilder::entry).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NewAce {
    pub id: Option<Identifier>,
    pub sid: Sid,
    pub permission: Permission,
    pub granting: bool,
    pub audit_success: bool,
    pub audit_failure: bool,
}

impl NewAce {
    pub fn new(sid: Sid, permission: Permission, granting: bool) -> Self {
        NewAce {
            id: None,
            sid,
            permission,
            granting,
            audit_success: false,
            audit_failure: false,
        }
    }

    pub fn with_id<I: Into<Identifier>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_auditing(mut self, success: bool, failure: bool) -> Self {
        self.audit_success = success;
        self.audit_failure = failure;
        self
    }

    pub(crate) fn attach(self, acl_id: Identifier) -> Ace {
        Ace {
            id: self.id,
            acl_id,
            sid: self.sid,
            permission: self.permission,
            granting: self.granting,
            audit_success: self.audit_success,
            audit_failure: self.audit_failure,
        }
    }
}
